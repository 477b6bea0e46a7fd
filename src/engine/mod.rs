pub mod offline;

pub use offline::*;

use std::path::{Path, PathBuf};

use image::DynamicImage;
use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::MapSnapshot;

/// Contract of the visual SLAM engine driven by the pipeline.
///
/// Every call blocks until the engine is done with it. Worker threads the
/// engine runs internally are its own business.
pub trait SlamEngine {
    /// Tracks one monocular frame. `None` means tracking is lost or not
    /// initialized yet.
    fn track_monocular(&mut self, image: &DynamicImage, timestamp: f64)
    -> Option<na::Isometry3<f32>>;

    /// All landmarks and reference landmarks of the active map, taken
    /// together. `None` when there is no active map.
    fn current_map(&self) -> Option<MapSnapshot>;

    /// Persists the camera trajectory in TUM format.
    fn save_trajectory_tum(&self, path: &Path) -> Result<()>;

    fn shutdown(&mut self);
}

/// Paths handed to the engine untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub vocabulary: PathBuf,
    pub settings: PathBuf,
    /// Record a rerun `.rrd` of the session when set.
    #[serde(default)]
    pub viewer_output: Option<PathBuf>,
}
