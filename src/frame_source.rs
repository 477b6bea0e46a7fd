use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use glob::glob;
use image::codecs::gif;
use image::imageops::FilterType;
use image::{AnimationDecoder, DynamicImage, ImageReader};
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::types::Frame;

/// Produces raw decoded images one at a time.
///
/// Returning `None` ends the stream, whether the container is exhausted or a
/// read failed.
pub trait VideoDecoder {
    fn next_image(&mut self) -> Option<DynamicImage>;
}

impl<D: VideoDecoder + ?Sized> VideoDecoder for Box<D> {
    fn next_image(&mut self) -> Option<DynamicImage> {
        (**self).next_image()
    }
}

fn img_filter(rp: glob::GlobResult) -> Option<PathBuf> {
    if let Ok(p) = rp {
        for ext in &[".png", ".jpg", ".jpeg"] {
            if p.as_os_str().to_string_lossy().to_lowercase().ends_with(ext) {
                return Some(p);
            }
        }
    }
    None
}

/// Still frames stored in a directory, played back in path order.
pub struct ImageSequenceDecoder {
    paths: std::vec::IntoIter<PathBuf>,
}

impl ImageSequenceDecoder {
    pub fn open(folder: &Path) -> Result<ImageSequenceDecoder> {
        let pattern = folder.join("*");
        let img_paths = glob(&pattern.to_string_lossy()).map_err(|e| Error::SourceOpen {
            path: folder.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut sorted_path: Vec<PathBuf> = img_paths.into_iter().filter_map(img_filter).collect();
        if sorted_path.is_empty() {
            return Err(Error::SourceOpen {
                path: folder.to_path_buf(),
                reason: "no .png or .jpg frames found".to_string(),
            });
        }
        sorted_path.sort();
        debug!("found {} frames in {}", sorted_path.len(), folder.display());
        Ok(ImageSequenceDecoder {
            paths: sorted_path.into_iter(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl VideoDecoder for ImageSequenceDecoder {
    fn next_image(&mut self) -> Option<DynamicImage> {
        let path = self.paths.next()?;
        match ImageReader::open(&path).and_then(|r| r.with_guessed_format()) {
            Ok(reader) => match reader.decode() {
                Ok(img) => Some(img),
                Err(e) => {
                    warn!("failed to decode {}: {}", path.display(), e);
                    self.paths = Vec::new().into_iter();
                    None
                }
            },
            Err(e) => {
                warn!("failed to read {}: {}", path.display(), e);
                self.paths = Vec::new().into_iter();
                None
            }
        }
    }
}

/// Frames of an animated GIF container.
pub struct GifDecoder {
    frames: image::Frames<'static>,
}

impl GifDecoder {
    pub fn open(path: &Path) -> Result<GifDecoder> {
        let source_open = |reason: String| Error::SourceOpen {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::open(path).map_err(|e| source_open(e.to_string()))?;
        let decoder =
            gif::GifDecoder::new(BufReader::new(file)).map_err(|e| source_open(e.to_string()))?;
        Ok(GifDecoder {
            frames: decoder.into_frames(),
        })
    }
}

impl VideoDecoder for GifDecoder {
    fn next_image(&mut self) -> Option<DynamicImage> {
        match self.frames.next()? {
            Ok(frame) => Some(DynamicImage::ImageRgba8(frame.into_buffer())),
            Err(e) => {
                warn!("failed to decode gif frame: {}", e);
                None
            }
        }
    }
}

#[cfg(feature = "opencv")]
fn open_video_container(path: &Path) -> Result<Box<dyn VideoDecoder>> {
    Ok(Box::new(crate::video_capture::VideoCaptureDecoder::open(path)?))
}

#[cfg(not(feature = "opencv"))]
fn open_video_container(path: &Path) -> Result<Box<dyn VideoDecoder>> {
    Err(Error::SourceOpen {
        path: path.to_path_buf(),
        reason: "unsupported container, expected a .gif file or a frame directory \
                 (build with the `opencv` feature for other video formats)"
            .to_string(),
    })
}

/// Lazy, finite sequence of resized, timestamped frames.
///
/// Timestamps are wall-clock seconds elapsed since the source was created,
/// so they follow the playback rate rather than the container's frame rate.
pub struct FrameSource<D: VideoDecoder = Box<dyn VideoDecoder>> {
    decoder: D,
    target_w_h: (u32, u32),
    start: Instant,
    yielded: usize,
    finished: bool,
}

impl FrameSource {
    /// Opens a directory of still frames, an animated `.gif` file, or, with the
    /// `opencv` feature, any container `VideoCapture` can read.
    pub fn open(path: &Path, target_w_h: (u32, u32)) -> Result<FrameSource> {
        let decoder: Box<dyn VideoDecoder> = if path.is_dir() {
            Box::new(ImageSequenceDecoder::open(path)?)
        } else if !path.exists() {
            return Err(Error::SourceOpen {
                path: path.to_path_buf(),
                reason: "no such file or directory".to_string(),
            });
        } else {
            let is_gif = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("gif"))
                .unwrap_or(false);
            if is_gif {
                Box::new(GifDecoder::open(path)?)
            } else {
                open_video_container(path)?
            }
        };
        Ok(FrameSource::new(decoder, target_w_h))
    }
}

impl<D: VideoDecoder> FrameSource<D> {
    pub fn new(decoder: D, target_w_h: (u32, u32)) -> FrameSource<D> {
        FrameSource {
            decoder,
            target_w_h,
            start: Instant::now(),
            yielded: 0,
            finished: false,
        }
    }

    pub fn frames_yielded(&self) -> usize {
        self.yielded
    }

    pub fn target_size(&self) -> (u32, u32) {
        self.target_w_h
    }
}

impl<D: VideoDecoder> Iterator for FrameSource<D> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }
        let Some(raw) = self.decoder.next_image() else {
            self.finished = true;
            return None;
        };
        let (w, h) = self.target_w_h;
        let image = if raw.width() == w && raw.height() == h {
            raw
        } else {
            raw.resize_exact(w, h, FilterType::Triangle)
        };
        let timestamp = self.start.elapsed().as_secs_f64();
        self.yielded += 1;
        Some(Frame { image, timestamp })
    }
}

impl<D: VideoDecoder> std::iter::FusedIterator for FrameSource<D> {}
