#![allow(dead_code)]

use image::{DynamicImage, Rgba, RgbaImage};
use nalgebra as na;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use video_slam_export::engine::SlamEngine;
use video_slam_export::types::{Landmark, MapSnapshot};

/// Engine double that remembers every call made on it.
#[derive(Default)]
pub struct MockEngine {
    pub map: Option<MapSnapshot>,
    pub tracked: Vec<(f64, (u32, u32))>,
    pub lose_every: Option<usize>,
    pub saved_trajectories: RefCell<Vec<PathBuf>>,
    pub fail_trajectory: bool,
    pub shutdown_calls: usize,
}

impl SlamEngine for MockEngine {
    fn track_monocular(
        &mut self,
        image: &DynamicImage,
        timestamp: f64,
    ) -> Option<na::Isometry3<f32>> {
        self.tracked.push((timestamp, (image.width(), image.height())));
        match self.lose_every {
            Some(n) if self.tracked.len() % n == 0 => None,
            _ => Some(na::Isometry3::identity()),
        }
    }

    fn current_map(&self) -> Option<MapSnapshot> {
        self.map.clone()
    }

    fn save_trajectory_tum(&self, path: &Path) -> video_slam_export::Result<()> {
        self.saved_trajectories.borrow_mut().push(path.to_path_buf());
        if self.fail_trajectory {
            return Err(video_slam_export::Error::Trajectory {
                path: path.to_path_buf(),
                source: std::io::Error::other("disk full"),
            });
        }
        std::fs::write(path, "")?;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.shutdown_calls += 1;
    }
}

pub fn pos(x: f32, y: f32, z: f32) -> na::Vector3<f32> {
    na::Vector3::new(x, y, z)
}

/// A, B reference; C plain; D bad.
pub fn abcd_snapshot() -> MapSnapshot {
    let a = Landmark::new(1, pos(1.0, 2.0, 3.0));
    let b = Landmark::new(2, pos(-1.5, 0.25, 4.0));
    let c = Landmark::new(3, pos(0.5, 0.5, 0.5));
    let d = Landmark::bad(4, pos(9.0, 9.0, 9.0));
    MapSnapshot::new(vec![a, b, c, d], vec![b.id, a.id])
}

pub fn test_image(w: u32, h: u32, shade: u8) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([shade, shade / 2, 255 - shade, 255]))
}

/// Writes `n` png frames named 0000.png, 0001.png, ...
pub fn write_png_sequence(dir: &Path, n: usize, w: u32, h: u32) {
    for i in 0..n {
        test_image(w, h, (i * 20) as u8)
            .save(dir.join(format!("{:04}.png", i)))
            .unwrap();
    }
}

pub fn write_gif(path: &Path, n: usize, w: u32, h: u32) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = image::codecs::gif::GifEncoder::new(file);
    for i in 0..n {
        encoder
            .encode_frame(image::Frame::new(test_image(w, h, (i * 40) as u8)))
            .unwrap();
    }
}
