use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::driver::{TrackingDriver, TrackingSummary};
use crate::engine::SlamEngine;
use crate::error::Result;
use crate::export::{ExportOutcome, export_point_cloud};
use crate::frame_source::FrameSource;
use crate::trajectory::export_trajectory;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub tracking: TrackingSummary,
    pub trajectory_saved: bool,
    pub point_cloud: ExportOutcome,
}

/// Video in, trajectory and point cloud out, run once.
pub struct Pipeline {
    config: PipelineConfig,
    show_progress: bool,
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Pipeline {
        Pipeline {
            config,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Pipeline {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Tracks the whole video, then saves the trajectory, exports the point
    /// cloud and shuts the engine down, in that order.
    ///
    /// An unopenable video fails before the engine sees any frame.
    pub fn run<E: SlamEngine + ?Sized>(&self, engine: &mut E) -> Result<PipelineReport> {
        let config = &self.config;
        config.validate()?;
        let frames = FrameSource::open(&config.video, config.frame_size())?;
        info!("tracking {}", config.video.display());

        let driver = TrackingDriver::new(config.pacing()).with_progress(self.show_progress);
        let tracking = driver.run(engine, frames);
        info!(
            "tracked {} frames, {} without pose",
            tracking.frames, tracking.lost_frames
        );

        if let Err(e) = ensure_parent_dir(&config.trajectory_output) {
            warn!("cannot create trajectory output directory: {}", e);
        }
        let trajectory_saved = export_trajectory(&*engine, &config.trajectory_output);

        let point_cloud = ensure_parent_dir(&config.point_cloud_output)
            .and_then(|()| export_point_cloud(&*engine, &config.point_cloud_output));

        engine.shutdown();
        let point_cloud = point_cloud?;

        Ok(PipelineReport {
            tracking,
            trajectory_saved,
            point_cloud,
        })
    }
}
