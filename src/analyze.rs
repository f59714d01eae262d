//! The single-threaded sampling driver.
//!
//! Pull-based: compute the next frame index, block on the store, run the
//! classifiers and the engine in-line, repeat. The only external control
//! input is the cancellation token, checked once per sampled frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use opencv::core::Mat;
use tracing::debug;

use duelstamp_detect::config::DetectConfig;
use duelstamp_detect::flags::FlagReader;
use duelstamp_detect::names::{NameGallery, NameIdentifier};
use duelstamp_detect::screen::ScreenClassifier;
use duelstamp_io::time::frame_hms;
use duelstamp_io::{FrameSource, StoreError};

use crate::engine::{EngineTuning, MatchEngine};
use crate::model::{MatchEvent, StateTally};
use crate::sched::{Cadence, Scheduler};

/// Cancellation signal shared with the embedding UI. Setting it stops the
/// loop at the next sample; events already appended stay valid.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The classifiers for one video, built once from the configuration and
/// the loaded assets.
pub struct Pipeline {
    pub flags: FlagReader,
    pub screen: ScreenClassifier,
    pub left_names: NameIdentifier,
    pub right_names: NameIdentifier,
}

impl Pipeline {
    pub fn new(
        config: &DetectConfig,
        select_template: Mat,
        left_gallery: NameGallery,
        right_gallery: NameGallery,
    ) -> Self {
        Self {
            flags: FlagReader::new(config.flags.clone(), config.bands.clone()),
            screen: ScreenClassifier::new(
                select_template,
                config.select_region,
                config.select_threshold,
                config.blackout_max_brightness,
            ),
            left_names: NameIdentifier::new(
                config.name_left,
                config.name_threshold,
                left_gallery,
            ),
            right_names: NameIdentifier::new(
                config.name_right,
                config.name_threshold,
                right_gallery,
            ),
        }
    }
}

pub struct AnalysisReport {
    pub events: Vec<MatchEvent>,
    pub tally: StateTally,
    pub voided: u32,
    pub total_frames: i64,
    pub fps: f64,
    pub elapsed: Duration,
    pub cancelled: bool,
}

/// Runs the sampling loop to the end of the stream or cancellation.
///
/// `progress` receives `(fraction, video position)` once per sample.
pub fn run(
    source: &mut dyn FrameSource,
    pipeline: &Pipeline,
    tuning: EngineTuning,
    cadence: Cadence,
    cancel: &CancelToken,
    progress: &mut dyn FnMut(f64, &str),
) -> Result<AnalysisReport> {
    let started = Instant::now();
    let total = source.total_frames();
    let fps = source.fps();

    let mut engine = MatchEngine::new(fps, tuning);
    let scheduler = Scheduler::new(fps, cadence);
    let mut tally = StateTally::default();
    let mut cancelled = false;
    let mut index = 0i64;

    loop {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        let frame = match source.seek(index) {
            Ok(frame) => frame,
            // Past the last frame: the scan is simply over.
            Err(StoreError::EndOfStream(_)) => break,
            Err(err) => return Err(err.into()),
        };

        let board = pipeline.flags.read(&frame.mat)?;
        let screen = pipeline.screen.classify(&frame.mat, board.pulse())?;
        debug!(index, ?screen, "sampled");

        engine.observe(
            &frame,
            &board,
            screen,
            source,
            &pipeline.left_names,
            &pipeline.right_names,
        )?;
        tally.record(screen, engine.phase());
        progress(index as f64 / total as f64, &frame_hms(index, fps));

        index += scheduler.next_interval(engine.phase(), screen);
    }

    Ok(AnalysisReport {
        events: engine.events().to_vec(),
        tally,
        voided: engine.voided(),
        total_frames: total,
        fps,
        elapsed: started.elapsed(),
        cancelled,
    })
}
