//! Scripted synthetic frame sources for driving the sampling loop and the
//! engine without fixture videos. Frames are composed at the baseline
//! resolution from the same regions the default configuration reads.

use opencv::core::{Mat, Scalar, Vec3b, CV_8UC1, CV_8UC3};
use opencv::prelude::*;

use duelstamp_detect::color::FlagColor;
use duelstamp_detect::config::DetectConfig;
use duelstamp_detect::flags::FLAG_POSITIONS;
use duelstamp_detect::names::NameGallery;
use duelstamp_detect::utils::Region;
use duelstamp_io::{Frame, FrameSource, StoreError};

use crate::analyze::Pipeline;

/// Low on purpose: keeps scripted timelines short while every cadence
/// still converts to at least one frame.
pub const TEST_FPS: f64 = 4.0;

pub fn pattern(rows: i32, cols: i32, seed: u32) -> Mat {
    let mut m = Mat::new_rows_cols_with_default(rows, cols, CV_8UC1, Scalar::all(0.0)).unwrap();
    let mut state = seed;
    for y in 0..rows {
        for x in 0..cols {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            *m.at_2d_mut::<u8>(y, x).unwrap() = (state >> 24) as u8;
        }
    }
    m
}

pub struct TestRig {
    pub cfg: DetectConfig,
    pub pipeline: Pipeline,
    select: Mat,
    left_label: Mat,
    right_label: Mat,
}

/// Default configuration plus a pipeline whose select template and name
/// galleries match what [`script_source`] paints: Gustav on the left,
/// Marie on the right.
pub fn rig() -> TestRig {
    let cfg = DetectConfig::default();
    let select = pattern(60, 200, 7);
    let gustav = pattern(32, 120, 11);
    let marie = pattern(32, 120, 22);
    let left_gallery = NameGallery::new(vec![
        ("Gustav".to_string(), gustav.clone()),
        ("Jacek".to_string(), pattern(32, 120, 12)),
    ]);
    let right_gallery = NameGallery::new(vec![
        ("Isabella".to_string(), pattern(32, 120, 21)),
        ("Marie".to_string(), marie.clone()),
    ]);
    let pipeline = Pipeline::new(&cfg, select.clone(), left_gallery, right_gallery);
    TestRig {
        cfg,
        pipeline,
        select,
        left_label: gustav,
        right_label: marie,
    }
}

#[derive(Clone, Copy)]
pub enum Shot {
    /// Character-select screen with both name labels visible.
    Select,
    /// In-game score rail with explicit per-position marks.
    Marks {
        left: [FlagColor; FLAG_POSITIONS],
        right: [FlagColor; FLAG_POSITIONS],
    },
}

/// A rail with `slots` valid marks per side, of which the innermost
/// `left_red`/`right_red` have turned red.
pub fn fight(slots: usize, left_red: usize, right_red: usize) -> Shot {
    let side = |red: usize| {
        let mut marks = [FlagColor::NotAFlag; FLAG_POSITIONS];
        for (i, mark) in marks.iter_mut().enumerate().take(slots) {
            *mark = if i < red {
                FlagColor::Red
            } else {
                FlagColor::White
            };
        }
        marks
    };
    Shot::Marks {
        left: side(left_red),
        right: side(right_red),
    }
}

pub fn not_started(slots: usize) -> Shot {
    fight(slots, 0, 0)
}

fn blit(frame: &mut Mat, x: i32, y: i32, label: &Mat) {
    for row in 0..label.rows() {
        for col in 0..label.cols() {
            let v = *label.at_2d::<u8>(row, col).unwrap();
            *frame.at_2d_mut::<Vec3b>(y + row, x + col).unwrap() = Vec3b::from([v, v, v]);
        }
    }
}

fn fill(frame: &mut Mat, region: Region, color: Scalar) {
    let bgr = Vec3b::from([color[0] as u8, color[1] as u8, color[2] as u8]);
    for y in region.y..region.y + region.h {
        for x in region.x..region.x + region.w {
            *frame.at_2d_mut::<Vec3b>(y, x).unwrap() = bgr;
        }
    }
}

fn mark_color(mark: FlagColor) -> Option<Scalar> {
    match mark {
        FlagColor::White => Some(Scalar::new(255.0, 255.0, 255.0, 0.0)),
        FlagColor::Red => Some(Scalar::new(0.0, 0.0, 255.0, 0.0)),
        FlagColor::NotAFlag => None,
    }
}

fn render(rig: &TestRig, shot: &Shot) -> Mat {
    let mut frame =
        Mat::new_rows_cols_with_default(720, 1280, CV_8UC3, Scalar::all(0.0)).unwrap();
    match shot {
        Shot::Select => {
            blit(
                &mut frame,
                rig.cfg.select_region.x,
                rig.cfg.select_region.y,
                &rig.select,
            );
            blit(
                &mut frame,
                rig.cfg.name_left.x,
                rig.cfg.name_left.y,
                &rig.left_label,
            );
            blit(
                &mut frame,
                rig.cfg.name_right.x,
                rig.cfg.name_right.y,
                &rig.right_label,
            );
        }
        Shot::Marks { left, right } => {
            for i in 0..FLAG_POSITIONS {
                if let Some(color) = mark_color(left[i]) {
                    fill(&mut frame, rig.cfg.flags.left[i], color);
                }
                if let Some(color) = mark_color(right[i]) {
                    fill(&mut frame, rig.cfg.flags.right[i], color);
                }
            }
        }
    }
    frame
}

pub struct ScriptSource {
    frames: Vec<Mat>,
    fps: f64,
}

/// Expands `(repeat, shot)` segments into one frame per index.
pub fn script_source(rig: &TestRig, script: &[(usize, Shot)]) -> ScriptSource {
    let mut frames = Vec::new();
    for (count, shot) in script {
        let mat = render(rig, shot);
        for _ in 0..*count {
            frames.push(mat.clone());
        }
    }
    ScriptSource {
        frames,
        fps: TEST_FPS,
    }
}

impl FrameSource for ScriptSource {
    fn total_frames(&self) -> i64 {
        self.frames.len() as i64
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn seek(&mut self, index: i64) -> Result<Frame, StoreError> {
        if index < 0 || index >= self.total_frames() {
            return Err(StoreError::EndOfStream(index));
        }
        Ok(Frame {
            index,
            mat: self.frames[index as usize].clone(),
        })
    }
}
