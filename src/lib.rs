pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod export;
pub mod frame_source;
pub mod io;
pub mod pipeline;
pub mod trajectory;
pub mod types;
#[cfg(feature = "opencv")]
pub mod video_capture;
pub mod visualization;

pub use error::{Error, Result};
