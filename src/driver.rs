use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, trace};
use serde::Serialize;

use crate::engine::SlamEngine;
use crate::types::Frame;

pub const DEFAULT_PACING: Duration = Duration::from_millis(30);

/// Counters gathered while feeding frames to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackingSummary {
    pub frames: usize,
    pub lost_frames: usize,
    pub first_timestamp: Option<f64>,
    pub last_timestamp: Option<f64>,
}

/// Feeds frames to the engine one at a time, in arrival order.
pub struct TrackingDriver {
    pacing: Option<Duration>,
    show_progress: bool,
}

impl Default for TrackingDriver {
    fn default() -> Self {
        TrackingDriver::new(Some(DEFAULT_PACING))
    }
}

impl TrackingDriver {
    /// `pacing` is slept between consecutive tracking calls; `None` runs headless.
    pub fn new(pacing: Option<Duration>) -> TrackingDriver {
        TrackingDriver {
            pacing,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> TrackingDriver {
        self.show_progress = show_progress;
        self
    }

    pub fn pacing(&self) -> Option<Duration> {
        self.pacing
    }

    /// Runs until `frames` is exhausted. Each frame is tracked exactly once
    /// and dropped as soon as the engine returns.
    pub fn run<E, I>(&self, engine: &mut E, frames: I) -> TrackingSummary
    where
        E: SlamEngine + ?Sized,
        I: IntoIterator<Item = Frame>,
    {
        let progress = if self.show_progress {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed}] {pos} frames {msg}") {
                pb.set_style(style);
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut summary = TrackingSummary::default();
        for frame in frames {
            if summary.frames > 0 {
                if let Some(pacing) = self.pacing {
                    thread::sleep(pacing);
                }
            }
            let Frame { image, timestamp } = frame;
            trace!(
                "frame {} at {:.3}s ({}x{})",
                summary.frames,
                timestamp,
                image.width(),
                image.height()
            );
            if engine.track_monocular(&image, timestamp).is_none() {
                debug!("no pose for frame {} at {:.3}s", summary.frames, timestamp);
                summary.lost_frames += 1;
            }
            drop(image);

            summary.frames += 1;
            if summary.first_timestamp.is_none() {
                summary.first_timestamp = Some(timestamp);
            }
            summary.last_timestamp = Some(timestamp);
            progress.inc(1);
            progress.set_message(format!("t={:.2}s", timestamp));
        }
        progress.finish_and_clear();
        summary
    }
}
