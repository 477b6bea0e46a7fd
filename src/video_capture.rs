//! Container decoding through OpenCV's `VideoCapture`, for `.mp4`, `.avi`
//! and anything else the local OpenCV build has a backend for.

use std::path::Path;

use image::{DynamicImage, RgbImage};
use log::{debug, warn};
use opencv::core::{AlgorithmHint, Mat};
use opencv::prelude::*;
use opencv::{imgproc, videoio};

use crate::error::{Error, Result};
use crate::frame_source::VideoDecoder;

pub struct VideoCaptureDecoder {
    cap: videoio::VideoCapture,
    frame: Mat,
    rgb: Mat,
}

impl VideoCaptureDecoder {
    pub fn open(path: &Path) -> Result<VideoCaptureDecoder> {
        let source_open = |reason: String| Error::SourceOpen {
            path: path.to_path_buf(),
            reason,
        };
        let cap = videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)
            .map_err(|e| source_open(e.to_string()))?;
        if !cap.is_opened().map_err(|e| source_open(e.to_string()))? {
            return Err(source_open("VideoCapture could not open the file".to_string()));
        }
        if let (Ok(w), Ok(h)) = (
            cap.get(videoio::CAP_PROP_FRAME_WIDTH),
            cap.get(videoio::CAP_PROP_FRAME_HEIGHT),
        ) {
            debug!("opened {} ({}x{})", path.display(), w, h);
        }
        Ok(VideoCaptureDecoder {
            cap,
            frame: Mat::default(),
            rgb: Mat::default(),
        })
    }

    fn frame_to_image(&mut self) -> opencv::Result<Option<DynamicImage>> {
        let code = match self.frame.channels() {
            1 => imgproc::COLOR_GRAY2RGB,
            3 => imgproc::COLOR_BGR2RGB,
            4 => imgproc::COLOR_BGRA2RGB,
            n => {
                warn!("unsupported frame with {} channels", n);
                return Ok(None);
            }
        };
        imgproc::cvt_color(
            &self.frame,
            &mut self.rgb,
            code,
            0,
            AlgorithmHint::ALGO_HINT_DEFAULT,
        )?;
        let (w, h) = (self.rgb.cols() as u32, self.rgb.rows() as u32);
        let bytes = self.rgb.data_bytes()?.to_vec();
        Ok(RgbImage::from_raw(w, h, bytes).map(DynamicImage::ImageRgb8))
    }
}

impl VideoDecoder for VideoCaptureDecoder {
    fn next_image(&mut self) -> Option<DynamicImage> {
        match self.cap.read(&mut self.frame) {
            Ok(true) if !self.frame.empty() => {}
            Ok(_) => return None,
            Err(e) => {
                warn!("failed to read video frame: {}", e);
                return None;
            }
        }
        match self.frame_to_image() {
            Ok(img) => img,
            Err(e) => {
                warn!("failed to convert video frame: {}", e);
                None
            }
        }
    }
}
