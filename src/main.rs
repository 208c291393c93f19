//! Gaze session replay tool: reduces a recorded session and renders its overlays.

use anyhow::{Context, Result};
use clap::Parser;
use gaze_tracking::{
    config::Config,
    render::RenderMode,
    replay::{Recording, ReplayApp},
};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded session to replay (JSON)
    #[arg(short, long)]
    recording: String,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Directory for the stored result and overlay images
    #[arg(short, long, default_value = "gaze-output")]
    output: String,

    /// Heatmap grid size (overrides the configuration)
    #[arg(short, long)]
    grid: Option<usize>,

    /// Overlay to render (heatmap, scanpath, fixations); repeat for several, default all
    #[arg(long = "overlay")]
    overlays: Vec<RenderMode>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Gaze Session Replay");

    let mut settings = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    if let Some(grid) = args.grid {
        settings.heatmap.grid_size = grid;
    }

    let recording = Recording::from_file(&args.recording)
        .with_context(|| format!("Failed to load recording {}", args.recording))?;

    let app = ReplayApp::new(settings, &args.output)?.with_overlays(args.overlays);
    let summary = app.run(&recording)?;

    let params = &summary.report.parameters;
    info!(
        "Session {}: {} of {} samples valid, {} fixations, {} ms",
        summary.session_id,
        params.valid_point_count,
        params.raw_point_count,
        summary.report.result.fixation_points.len(),
        params.session_duration
    );
    for issue in &params.validation_issues {
        info!("  issue: {}", issue);
    }

    Ok(())
}
