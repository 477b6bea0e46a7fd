use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::EngineSettings;
use crate::error::{Error, Result};
use crate::io::object_from_json;

pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Everything one pipeline run needs. No path is baked into the library;
/// defaults for the outputs come from here or from the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub video: PathBuf,
    pub vocabulary: PathBuf,
    pub settings: PathBuf,
    pub trajectory_output: PathBuf,
    pub point_cloud_output: PathBuf,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Delay between frames in milliseconds, `None` for headless runs.
    pub pacing_ms: Option<u64>,
    pub viewer_output: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            video: PathBuf::new(),
            vocabulary: PathBuf::new(),
            settings: PathBuf::new(),
            trajectory_output: PathBuf::from("CameraTrajectory.txt"),
            point_cloud_output: PathBuf::from("PointCloud.txt"),
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            pacing_ms: Some(30),
            viewer_output: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<PipelineConfig> {
        object_from_json(path)
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    pub fn pacing(&self) -> Option<Duration> {
        self.pacing_ms.map(Duration::from_millis)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            vocabulary: self.vocabulary.clone(),
            settings: self.settings.clone(),
            viewer_output: self.viewer_output.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("video", &self.video),
            ("vocabulary", &self.vocabulary),
            ("settings", &self.settings),
            ("trajectory_output", &self.trajectory_output),
            ("point_cloud_output", &self.point_cloud_output),
        ];
        for (name, path) in required {
            if path.as_os_str().is_empty() {
                return Err(Error::Config(format!("{} path is not set", name)));
            }
        }
        if self.point_cloud_output.file_name().is_none() {
            return Err(Error::Config(format!(
                "point cloud output {} is not a file path",
                self.point_cloud_output.display()
            )));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(Error::Config(format!(
                "frame size {}x{} is empty",
                self.frame_width, self.frame_height
            )));
        }
        Ok(())
    }
}
