use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The video source could not be opened; no frame was produced.
    #[error("cannot open video source {}: {reason}", .path.display())]
    SourceOpen { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("engine initialization failed: {0}")]
    EngineInit(String),

    /// Writing one of the point cloud files failed.
    #[error("failed to export point cloud to {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save trajectory to {}: {source}", .path.display())]
    Trajectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
