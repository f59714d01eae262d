mod analyze;
mod engine;
mod model;
mod sched;
#[cfg(test)]
mod testutil;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use duelstamp_detect::config::DetectConfig;
use duelstamp_detect::names::NameGallery;
use duelstamp_io::output::ReportWriter;
use duelstamp_io::{assets, FrameSource, FrameStore, StoreConfig};

use crate::analyze::{CancelToken, Pipeline};
use crate::engine::EngineTuning;
use crate::sched::Cadence;

#[derive(clap::Parser)]
#[command(about = "Extract match timestamps from a recorded duel video")]
struct Cli {
    /// Input video file
    video: PathBuf,
    /// Directory holding `charselect.png` plus the `name_l/` and `name_r/`
    /// galleries
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    /// Where the timestamp and statistics files are written
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Also dump the match events as JSON to stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt::init();

    let config = DetectConfig::default();
    let select = assets::load_reference(&cli.assets.join("charselect.png"))
        .context("loading the character-select reference")?;
    let left = NameGallery::new(assets::load_name_gallery(
        &cli.assets.join("name_l"),
        "hq1_",
    )?);
    let right = NameGallery::new(assets::load_name_gallery(
        &cli.assets.join("name_r"),
        "hq2_",
    )?);
    info!(left = left.len(), right = right.len(), "galleries loaded");
    let pipeline = Pipeline::new(&config, select, left, right);

    let mut store = FrameStore::open(&cli.video, StoreConfig::default())?;
    let total = store.total_frames();
    let fps = store.fps();
    info!(video = %cli.video.display(), total, fps, "opened video");

    let started = chrono::Local::now();
    let bar = ProgressBar::new(total as u64).with_style(
        ProgressStyle::with_template("{wide_bar} {percent:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let cancel = CancelToken::new();
    let mut progress = |fraction: f64, position: &str| {
        bar.set_position((fraction * total as f64) as u64);
        bar.set_message(position.to_string());
    };

    let report = analyze::run(
        &mut store,
        &pipeline,
        EngineTuning::default(),
        Cadence::default(),
        &cancel,
        &mut progress,
    )?;
    bar.finish_and_clear();
    let finished = chrono::Local::now();

    let writer = ReportWriter::new(&cli.out_dir);
    let lines = model::timestamp_lines(&report.events, report.fps);
    let timestamps = writer.write_timestamps(&lines)?;
    let video_name = cli.video.to_string_lossy();
    let meta = model::RunMeta {
        file_name: &video_name,
        started,
        finished,
        total_frames: report.total_frames,
        fps: report.fps,
    };
    let statistics = writer.write_statistics(&model::statistics_text(&report.tally, &meta))?;

    info!(
        matches = report.events.len(),
        voided = report.voided,
        cancelled = report.cancelled,
        elapsed_secs = report.elapsed.as_secs(),
        timestamps = %timestamps.display(),
        statistics = %statistics.display(),
        "analysis finished"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.events)?);
    }

    Ok(())
}
