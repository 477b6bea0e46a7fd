use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;
use std::time::Instant;
use video_slam_export::config::PipelineConfig;
use video_slam_export::engine::OfflineEngine;
use video_slam_export::export::ExportOutcome;
use video_slam_export::io::{object_from_json, object_to_json};
use video_slam_export::pipeline::Pipeline;
use video_slam_export::types::MapSnapshot;

#[derive(Parser)]
#[command(version, about, author)]
struct VslamCli {
    /// video source: animated .gif or a folder of frames
    video: Option<PathBuf>,

    /// vocabulary file passed to the engine
    vocabulary: Option<PathBuf>,

    /// engine settings file
    settings: Option<PathBuf>,

    /// pipeline config json, command line values override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// trajectory output in TUM format
    #[arg(long)]
    trajectory: Option<PathBuf>,

    /// point cloud output, reference points go to ref_<name>
    #[arg(long)]
    point_cloud: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// delay between frames in milliseconds
    #[arg(long, conflicts_with = "headless")]
    pacing_ms: Option<u64>,

    /// no delay between frames
    #[arg(long)]
    headless: bool,

    /// map snapshot json the engine reports as its active map
    #[arg(long)]
    map_snapshot: Option<PathBuf>,

    /// save a rerun recording of the session
    #[arg(long)]
    viewer_output: Option<PathBuf>,

    /// write a json summary of the run
    #[arg(long)]
    report: Option<PathBuf>,
}

fn build_config(cli: &VslamCli) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(video) = &cli.video {
        config.video = video.clone();
    }
    if let Some(vocabulary) = &cli.vocabulary {
        config.vocabulary = vocabulary.clone();
    }
    if let Some(settings) = &cli.settings {
        config.settings = settings.clone();
    }
    if let Some(trajectory) = &cli.trajectory {
        config.trajectory_output = trajectory.clone();
    }
    if let Some(point_cloud) = &cli.point_cloud {
        config.point_cloud_output = point_cloud.clone();
    }
    if let Some(width) = cli.width {
        config.frame_width = width;
    }
    if let Some(height) = cli.height {
        config.frame_height = height;
    }
    if cli.headless {
        config.pacing_ms = None;
    } else if let Some(pacing_ms) = cli.pacing_ms {
        config.pacing_ms = Some(pacing_ms);
    }
    if cli.viewer_output.is_some() {
        config.viewer_output = cli.viewer_output.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: VslamCli) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&cli)?;
    let mut engine = OfflineEngine::new(config.engine_settings())?;
    if let Some(path) = &cli.map_snapshot {
        let snapshot: MapSnapshot = object_from_json(path)?;
        engine = engine.with_map(snapshot);
    }

    let now = Instant::now();
    let report = Pipeline::new(config).run(&mut engine)?;
    let duration_sec = now.elapsed().as_secs_f64();
    println!(
        "tracked {} frames in {:.3} sec",
        report.tracking.frames, duration_sec
    );
    match &report.point_cloud {
        ExportOutcome::Written {
            primary,
            reference,
            primary_rows,
            reference_rows,
        } => {
            println!("{} map points -> {}", primary_rows, primary.display());
            println!("{} reference map points -> {}", reference_rows, reference.display());
        }
        ExportOutcome::NoActiveMap => println!("no active map, point cloud not saved"),
        ExportOutcome::EmptyMap => println!("active map is empty, point cloud not saved"),
    }

    if let Some(path) = &cli.report {
        object_to_json(path, &report)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = VslamCli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
