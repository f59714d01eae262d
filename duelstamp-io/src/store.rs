//! Seek-based frame access over a single opened decoder handle.
//!
//! Opening a capture per lookup is expensive and wasteful, so we open the
//! file once and seek around in it. Two seek strategies exist: a requested
//! index a short distance ahead of the decoder is reached by sequential
//! `grab()` reads (keyframe-relative decoding makes those cheap), anything
//! else by one positional seek. Decoded frames are normalized to a fixed
//! baseline resolution so every downstream region coordinate is
//! resolution-independent, then kept in a small insertion-order cache that
//! matches the forward-scanning access pattern.

use std::collections::VecDeque;
use std::path::Path;

use opencv::core::{Mat, Size};
use opencv::prelude::*;
use opencv::{imgproc, videoio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The source cannot be opened, or reports one frame or fewer
    /// (a still image, not a video).
    #[error("`{0}` is not a readable video")]
    NotAVideo(String),
    /// A read past the last frame. Normal termination for a forward scan.
    #[error("end of stream seeking frame {0}")]
    EndOfStream(i64),
    #[error(transparent)]
    Decode(#[from] opencv::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Resolution every decoded frame is resized to before caching.
    pub baseline: Size,
    /// Cached frames kept before the oldest insertion is evicted.
    pub cache_capacity: usize,
    /// Largest forward distance covered by sequential reads instead of a
    /// positional seek.
    pub seek_ahead_max: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            baseline: Size::new(1280, 720),
            cache_capacity: 30,
            seek_ahead_max: 40,
        }
    }
}

/// A decoded frame at the baseline resolution. Never mutated after
/// creation; clones share pixel storage.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: i64,
    pub mat: Mat,
}

/// The seam between the sampling loop and the decoder, so the loop can be
/// driven by scripted synthetic sources in tests.
pub trait FrameSource {
    fn total_frames(&self) -> i64;
    fn fps(&self) -> f64;
    fn seek(&mut self, index: i64) -> Result<Frame, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeekPlan {
    /// Advance by grabbing this many frames, then read.
    Sequential(i64),
    /// One hard positional seek.
    Positional,
}

fn plan_seek(pos: i64, target: i64, ahead_max: i64) -> SeekPlan {
    if target >= pos && target - pos <= ahead_max {
        SeekPlan::Sequential(target - pos)
    } else {
        SeekPlan::Positional
    }
}

#[derive(Debug)]
struct FrameCache {
    capacity: usize,
    entries: VecDeque<Frame>,
}

impl FrameCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    fn get(&self, index: i64) -> Option<Frame> {
        self.entries.iter().find(|f| f.index == index).cloned()
    }

    fn insert(&mut self, frame: Frame) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(frame);
    }
}

pub struct FrameStore {
    capture: videoio::VideoCapture,
    config: StoreConfig,
    cache: FrameCache,
    total: i64,
    fps: f64,
    /// Index of the next frame the decoder would produce.
    pos: i64,
}

impl FrameStore {
    pub fn open(path: &Path, config: StoreConfig) -> Result<Self, StoreError> {
        let name = path.to_string_lossy().into_owned();
        let capture = videoio::VideoCapture::from_file(&name, videoio::CAP_ANY)
            .map_err(|_| StoreError::NotAVideo(name.clone()))?;
        if !capture.is_opened()? {
            return Err(StoreError::NotAVideo(name));
        }

        let total = capture.get(videoio::CAP_PROP_FRAME_COUNT)? as i64;
        if total <= 1 {
            return Err(StoreError::NotAVideo(name));
        }

        let mut fps = capture.get(videoio::CAP_PROP_FPS)?;
        if !fps.is_finite() || fps <= 0.0 {
            tracing::warn!(fps, "container reports no usable frame rate, assuming 30");
            fps = 30.0;
        }

        let cache = FrameCache::new(config.cache_capacity);
        Ok(Self {
            capture,
            config,
            cache,
            total,
            fps,
            pos: 0,
        })
    }

    fn normalize(&self, raw: &Mat) -> Result<Mat, StoreError> {
        if raw.size()? == self.config.baseline {
            return Ok(raw.clone());
        }
        let mut resized = Mat::default();
        imgproc::resize(
            raw,
            &mut resized,
            self.config.baseline,
            0.0,
            0.0,
            imgproc::INTER_AREA,
        )?;
        Ok(resized)
    }
}

impl FrameSource for FrameStore {
    fn total_frames(&self) -> i64 {
        self.total
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn seek(&mut self, index: i64) -> Result<Frame, StoreError> {
        if index < 0 || index >= self.total {
            return Err(StoreError::EndOfStream(index));
        }
        if let Some(frame) = self.cache.get(index) {
            return Ok(frame);
        }

        match plan_seek(self.pos, index, self.config.seek_ahead_max) {
            SeekPlan::Sequential(skip) => {
                for _ in 0..skip {
                    if !self.capture.grab()? {
                        return Err(StoreError::EndOfStream(index));
                    }
                }
            }
            SeekPlan::Positional => {
                self.capture
                    .set(videoio::CAP_PROP_POS_FRAMES, index as f64)?;
            }
        }

        let mut raw = Mat::default();
        if !self.capture.read(&mut raw)? {
            return Err(StoreError::EndOfStream(index));
        }
        self.pos = index + 1;

        let frame = Frame {
            index,
            mat: self.normalize(&raw)?,
        };
        self.cache.insert(frame.clone());
        Ok(frame)
    }
}
