use std::path::Path;

use log::{info, warn};

use crate::engine::SlamEngine;

/// Asks the engine to save its camera trajectory in TUM format.
///
/// Failures belong to the engine and are only logged. Returns whether the
/// file was written.
pub fn export_trajectory<E: SlamEngine + ?Sized>(engine: &E, path: &Path) -> bool {
    info!("saving camera trajectory to {}", path.display());
    match engine.save_trajectory_tum(path) {
        Ok(()) => true,
        Err(e) => {
            warn!("trajectory was not saved: {}", e);
            false
        }
    }
}
