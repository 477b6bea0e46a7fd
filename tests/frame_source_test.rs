mod common;

use common::{write_gif, write_png_sequence};
use std::fs;
use tempfile::TempDir;
use video_slam_export::Error;
use video_slam_export::frame_source::{FrameSource, ImageSequenceDecoder};

#[test]
fn test_png_sequence_yields_every_frame() {
    let temp_dir = TempDir::new().unwrap();
    write_png_sequence(temp_dir.path(), 5, 320, 200);

    let mut source = FrameSource::open(temp_dir.path(), (640, 480)).unwrap();
    let frames: Vec<_> = source.by_ref().collect();
    assert_eq!(frames.len(), 5);
    assert_eq!(source.frames_yielded(), 5);
    assert!(source.next().is_none());

    for f in &frames {
        assert_eq!((f.image.width(), f.image.height()), (640, 480));
        assert!(f.timestamp >= 0.0);
    }
    assert!(frames.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_sequence_order_and_filtering() {
    let temp_dir = TempDir::new().unwrap();
    write_png_sequence(temp_dir.path(), 3, 16, 16);
    fs::write(temp_dir.path().join("notes.txt"), "not a frame").unwrap();

    let decoder = ImageSequenceDecoder::open(temp_dir.path()).unwrap();
    assert_eq!(decoder.remaining(), 3);

    // shades grow with the file index, so red channel must increase
    let reds: Vec<u8> = FrameSource::new(decoder, (16, 16))
        .map(|f| f.image.to_rgba8().get_pixel(0, 0)[0])
        .collect();
    assert_eq!(reds, vec![0, 20, 40]);
}

#[test]
fn test_gif_container() {
    let temp_dir = TempDir::new().unwrap();
    let gif_path = temp_dir.path().join("clip.gif");
    write_gif(&gif_path, 4, 64, 48);

    let frames: Vec<_> = FrameSource::open(&gif_path, (640, 480)).unwrap().collect();
    assert_eq!(frames.len(), 4);
    assert!(frames.iter().all(|f| f.image.width() == 640 && f.image.height() == 480));
    assert!(frames.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_corrupt_frame_ends_stream() {
    let temp_dir = TempDir::new().unwrap();
    write_png_sequence(temp_dir.path(), 2, 16, 16);
    fs::write(temp_dir.path().join("0002.png"), b"garbage").unwrap();
    common::test_image(16, 16, 10)
        .save(temp_dir.path().join("0003.png"))
        .unwrap();

    let frames: Vec<_> = FrameSource::open(temp_dir.path(), (16, 16)).unwrap().collect();
    assert_eq!(frames.len(), 2);
}

#[test]
fn test_unopenable_sources() {
    let temp_dir = TempDir::new().unwrap();

    let missing = temp_dir.path().join("missing.gif");
    assert!(matches!(
        FrameSource::open(&missing, (640, 480)),
        Err(Error::SourceOpen { .. })
    ));

    let empty_dir = temp_dir.path().join("empty");
    fs::create_dir(&empty_dir).unwrap();
    assert!(matches!(
        FrameSource::open(&empty_dir, (640, 480)),
        Err(Error::SourceOpen { .. })
    ));

    let not_gif = temp_dir.path().join("clip.gif");
    fs::write(&not_gif, b"definitely not a gif").unwrap();
    assert!(matches!(
        FrameSource::open(&not_gif, (640, 480)),
        Err(Error::SourceOpen { .. })
    ));

    let mp4 = temp_dir.path().join("clip.mp4");
    fs::write(&mp4, b"").unwrap();
    assert!(matches!(
        FrameSource::open(&mp4, (640, 480)),
        Err(Error::SourceOpen { .. })
    ));
}

#[cfg(feature = "opencv")]
#[test]
fn test_video_capture_container() {
    use opencv::core::{CV_8UC3, Mat, Scalar, Size};
    use opencv::prelude::*;
    use opencv::videoio::VideoWriter;

    let temp_dir = TempDir::new().unwrap();
    let avi_path = temp_dir.path().join("clip.avi");
    let fourcc = VideoWriter::fourcc('M', 'J', 'P', 'G').unwrap();
    let mut writer = VideoWriter::new(
        &avi_path.to_string_lossy(),
        fourcc,
        10.0,
        Size::new(160, 120),
        true,
    )
    .unwrap();
    assert!(writer.is_opened().unwrap());
    for i in 0..6 {
        let frame =
            Mat::new_rows_cols_with_default(120, 160, CV_8UC3, Scalar::all(30.0 * i as f64))
                .unwrap();
        writer.write(&frame).unwrap();
    }
    writer.release().unwrap();

    let frames: Vec<_> = FrameSource::open(&avi_path, (640, 480)).unwrap().collect();
    assert_eq!(frames.len(), 6);
    assert!(frames.iter().all(|f| f.image.width() == 640 && f.image.height() == 480));
    assert!(frames.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}
