//! Headless engine used for dry runs of the pipeline.
//!
//! It performs no feature tracking. Every frame gets an identity pose, and
//! the active map is whatever snapshot it was seeded with.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::DynamicImage;
use log::{debug, info, warn};
use nalgebra as na;
use rerun::RecordingStream;

use super::{EngineSettings, SlamEngine};
use crate::error::{Error, Result};
use crate::types::MapSnapshot;
use crate::visualization::{log_frame, log_map_points};

pub struct OfflineEngine {
    settings: EngineSettings,
    map: Option<MapSnapshot>,
    trajectory: Vec<(f64, na::Isometry3<f32>)>,
    frame_w_h: Option<(u32, u32)>,
    recording: Option<RecordingStream>,
    is_shutdown: bool,
}

impl OfflineEngine {
    pub fn new(settings: EngineSettings) -> Result<OfflineEngine> {
        for (what, path) in [
            ("vocabulary", &settings.vocabulary),
            ("settings", &settings.settings),
        ] {
            if !path.is_file() {
                return Err(Error::EngineInit(format!(
                    "cannot open {} file {}",
                    what,
                    path.display()
                )));
            }
        }
        info!("vocabulary: {}", settings.vocabulary.display());
        info!("settings: {}", settings.settings.display());

        let recording = match &settings.viewer_output {
            Some(rrd) => Some(
                rerun::RecordingStreamBuilder::new("vslam-export")
                    .save(rrd)
                    .map_err(|e| Error::EngineInit(format!("viewer: {}", e)))?,
            ),
            None => None,
        };

        Ok(OfflineEngine {
            settings,
            map: None,
            trajectory: Vec::new(),
            frame_w_h: None,
            recording,
            is_shutdown: false,
        })
    }

    /// Seeds the active map reported by `current_map`.
    pub fn with_map(mut self, map: MapSnapshot) -> OfflineEngine {
        info!(
            "active map seeded with {} map points, {} reference",
            map.points.len(),
            map.reference.len()
        );
        self.map = Some(map);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn trajectory(&self) -> &[(f64, na::Isometry3<f32>)] {
        &self.trajectory
    }

    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.frame_w_h
    }

    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown
    }
}

impl SlamEngine for OfflineEngine {
    fn track_monocular(
        &mut self,
        image: &DynamicImage,
        timestamp: f64,
    ) -> Option<na::Isometry3<f32>> {
        if self.is_shutdown {
            warn!("frame at {:.3}s ignored, engine is shut down", timestamp);
            return None;
        }
        let w_h = (image.width(), image.height());
        if let Some(prev) = self.frame_w_h {
            if prev != w_h {
                debug!("frame size changed from {:?} to {:?}", prev, w_h);
            }
        }
        self.frame_w_h = Some(w_h);

        if let Some(recording) = &self.recording {
            log_frame(recording, self.trajectory.len() as i64, image);
        }

        let pose = na::Isometry3::identity();
        self.trajectory.push((timestamp, pose));
        Some(pose)
    }

    fn current_map(&self) -> Option<MapSnapshot> {
        self.map.clone()
    }

    fn save_trajectory_tum(&self, path: &Path) -> Result<()> {
        let traj_err = |source| Error::Trajectory {
            path: path.to_path_buf(),
            source,
        };
        let mut file = BufWriter::new(File::create(path).map_err(traj_err)?);
        for (timestamp, tcw) in &self.trajectory {
            let twc = tcw.inverse();
            let t = twc.translation.vector;
            let q = twc.rotation;
            writeln!(
                file,
                "{:.6} {:.9} {:.9} {:.9} {:.9} {:.9} {:.9} {:.9}",
                timestamp, t.x, t.y, t.z, q.i, q.j, q.k, q.w
            )
            .map_err(traj_err)?;
        }
        file.flush().map_err(traj_err)?;
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.is_shutdown {
            return;
        }
        if let Some(recording) = self.recording.take() {
            if let Some(map) = &self.map {
                log_map_points(&recording, "/world", map);
            }
        }
        info!("engine shut down after {} frames", self.trajectory.len());
        self.is_shutdown = true;
    }
}
