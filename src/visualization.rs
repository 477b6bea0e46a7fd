use image::DynamicImage;
use log::warn;
use rerun::RecordingStream;
use std::io::Cursor;

use crate::export::partition_landmarks;
use crate::types::MapSnapshot;

const MAP_POINT_RGB: [u8; 3] = [160, 160, 160];
const REFERENCE_POINT_RGB: [u8; 3] = [230, 40, 40];

pub fn log_image_as_compressed(
    recording: &RecordingStream,
    topic: &str,
    img: &DynamicImage,
    format: image::ImageFormat,
) {
    let mut bytes: Vec<u8> = Vec::new();

    if let Err(e) = img.to_luma8().write_to(&mut Cursor::new(&mut bytes), format) {
        warn!("failed to encode {} image: {}", topic, e);
        return;
    }

    let image = rerun::EncodedImage::from_file_contents(bytes);
    if let Err(e) = recording.log(format!("{}/image", topic), &image) {
        warn!("failed to log {} image: {}", topic, e);
    }
}

/// Logs one tracked frame on the `frame` timeline.
pub fn log_frame(recording: &RecordingStream, frame_idx: i64, img: &DynamicImage) {
    recording.set_time_sequence("frame", frame_idx);
    log_image_as_compressed(recording, "/cam0", img, image::ImageFormat::Png);
}

/// Logs the non-bad landmarks, reference points in red and the rest in grey.
pub fn log_map_points(recording: &RecordingStream, topic: &str, snapshot: &MapSnapshot) {
    let (map_points, reference_points) = partition_landmarks(snapshot);
    let (pts, colors): (Vec<_>, Vec<_>) = map_points
        .iter()
        .map(|p| (p, MAP_POINT_RGB))
        .chain(reference_points.iter().map(|p| (p, REFERENCE_POINT_RGB)))
        .map(|(p, color)| {
            let pos = p.world_pos();
            (
                [pos.x, pos.y, pos.z],
                rerun::Color::from_rgb(color[0], color[1], color[2]),
            )
        })
        .unzip();

    if let Err(e) = recording.log(
        format!("{}/map_points", topic),
        &rerun::Points3D::new(pts)
            .with_colors(colors)
            .with_radii([rerun::Radius::new_ui_points(2.0)]),
    ) {
        warn!("failed to log map points: {}", e);
    }
}
