//! The round-point flag board: seven fixed mark boxes per side.
//!
//! The board is read once per sampled frame; every score-related signal
//! is then a pure function over the classified marks, so the engine and
//! the tests never touch pixels for these.

use opencv::core::Mat;

use crate::color::{classify_mark, FlagColor, MarkBands};
use crate::utils::{crop, Region};

pub const FLAG_POSITIONS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// The during-match signal derived from both position-1 marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MatchPulse {
    /// Either position-1 box holds no mark; the score rail is not on screen.
    NotInMatch,
    /// Both first marks are white: rail up, no round taken yet.
    NotStarted,
    /// At least one first mark has turned red.
    Started,
}

/// Mark boxes for both sides, position 1 innermost.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FlagLayout {
    pub left: [Region; FLAG_POSITIONS],
    pub right: [Region; FLAG_POSITIONS],
}

pub struct FlagReader {
    layout: FlagLayout,
    bands: MarkBands,
}

impl FlagReader {
    pub fn new(layout: FlagLayout, bands: MarkBands) -> Self {
        Self { layout, bands }
    }

    pub fn read(&self, frame: &Mat) -> opencv::Result<FlagBoard> {
        let mut board = FlagBoard {
            left: [FlagColor::NotAFlag; FLAG_POSITIONS],
            right: [FlagColor::NotAFlag; FLAG_POSITIONS],
        };
        for i in 0..FLAG_POSITIONS {
            board.left[i] = classify_mark(&crop(frame, self.layout.left[i])?, &self.bands)?;
            board.right[i] = classify_mark(&crop(frame, self.layout.right[i])?, &self.bands)?;
        }
        Ok(board)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagBoard {
    pub left: [FlagColor; FLAG_POSITIONS],
    pub right: [FlagColor; FLAG_POSITIONS],
}

impl FlagBoard {
    /// Mark at a 1-based position.
    pub fn mark(&self, side: Side, position: usize) -> FlagColor {
        debug_assert!((1..=FLAG_POSITIONS).contains(&position));
        match side {
            Side::Left => self.left[position - 1],
            Side::Right => self.right[position - 1],
        }
    }

    pub fn pulse(&self) -> MatchPulse {
        let (l, r) = (self.mark(Side::Left, 1), self.mark(Side::Right, 1));
        if l == FlagColor::NotAFlag || r == FlagColor::NotAFlag {
            MatchPulse::NotInMatch
        } else if l == FlagColor::White && r == FlagColor::White {
            MatchPulse::NotStarted
        } else {
            MatchPulse::Started
        }
    }

    /// The round target: the longest contiguous run of valid marks present
    /// on both sides simultaneously, capped at seven. Color does not
    /// matter here, only mark presence.
    pub fn max_flags(&self) -> usize {
        for position in 1..=FLAG_POSITIONS {
            if self.mark(Side::Left, position) == FlagColor::NotAFlag
                || self.mark(Side::Right, position) == FlagColor::NotAFlag
            {
                return position - 1;
            }
        }
        FLAG_POSITIONS
    }

    /// One side is one round away from winning.
    pub fn is_last_flag(&self, max_flags: usize) -> bool {
        match max_flags {
            0 => false,
            1 => true,
            _ => {
                self.mark(Side::Left, max_flags - 1) == FlagColor::Red
                    || self.mark(Side::Right, max_flags - 1) == FlagColor::Red
            }
        }
    }

    /// A red mark at exactly the target position ends the match; the left
    /// side is checked first.
    pub fn finished(&self, max_flags: usize) -> Option<Side> {
        if !(1..=FLAG_POSITIONS).contains(&max_flags) {
            return None;
        }
        if self.mark(Side::Left, max_flags) == FlagColor::Red {
            Some(Side::Left)
        } else if self.mark(Side::Right, max_flags) == FlagColor::Red {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Contiguous red run from position 1, broken by the first non-red
    /// mark. Marks are rendered contiguously, so the first break bounds
    /// the count and stale highlight artifacts further down never inflate
    /// it.
    pub fn run_length(&self, side: Side, max_flags: usize) -> u32 {
        let mut run = 0;
        for position in 1..=max_flags.min(FLAG_POSITIONS) {
            if self.mark(side, position) != FlagColor::Red {
                break;
            }
            run += 1;
        }
        run
    }

    /// Final (left, right) score once `winner` is known: the winner holds
    /// the target by definition, the loser the scanned run.
    pub fn score(&self, max_flags: usize, winner: Side) -> (u32, u32) {
        let target = max_flags as u32;
        match winner {
            Side::Left => (target, self.run_length(Side::Right, max_flags)),
            Side::Right => (self.run_length(Side::Left, max_flags), target),
        }
    }
}

#[cfg(test)]
mod tests {
    use opencv::core::{Scalar, CV_8UC3};
    use opencv::prelude::*;

    use super::*;
    use crate::config::DetectConfig;

    use crate::color::FlagColor::{NotAFlag, Red, White};

    fn board(left: [FlagColor; 7], right: [FlagColor; 7]) -> FlagBoard {
        FlagBoard { left, right }
    }

    fn slots(colors: &[FlagColor]) -> [FlagColor; 7] {
        let mut out = [NotAFlag; 7];
        out[..colors.len()].copy_from_slice(colors);
        out
    }

    #[test]
    fn pulse_needs_both_first_marks() {
        assert_eq!(board(slots(&[]), slots(&[White])).pulse(), MatchPulse::NotInMatch);
        assert_eq!(
            board(slots(&[White]), slots(&[White])).pulse(),
            MatchPulse::NotStarted
        );
        assert_eq!(
            board(slots(&[Red]), slots(&[White])).pulse(),
            MatchPulse::Started
        );
        assert_eq!(
            board(slots(&[White]), slots(&[Red])).pulse(),
            MatchPulse::Started
        );
    }

    #[test]
    fn max_flags_is_zero_without_a_first_mark() {
        assert_eq!(board(slots(&[]), slots(&[White, White])).max_flags(), 0);
        assert_eq!(board(slots(&[White]), slots(&[])).max_flags(), 0);
    }

    #[test]
    fn max_flags_counts_the_joint_run() {
        let b = board(
            slots(&[White, White, White, White, White]),
            slots(&[White, White, White]),
        );
        assert_eq!(b.max_flags(), 3);
    }

    #[test]
    fn max_flags_caps_at_seven_regardless_of_color() {
        let b = board([Red; 7], [White; 7]);
        assert_eq!(b.max_flags(), 7);
    }

    #[test]
    fn last_flag_at_target_one_or_penultimate_red() {
        let fresh = board(slots(&[White, White, White]), slots(&[White, White, White]));
        assert!(fresh.is_last_flag(1));
        assert!(!fresh.is_last_flag(3));

        let close = board(slots(&[Red, Red, White]), slots(&[White, White, White]));
        assert!(close.is_last_flag(3));
    }

    #[test]
    fn finish_requires_red_at_the_target_position() {
        let b = board(slots(&[Red, Red, Red]), slots(&[Red, White, White]));
        assert_eq!(b.finished(3), Some(Side::Left));
        assert_eq!(b.finished(4), None);

        let b = board(slots(&[White, White, White]), slots(&[Red, Red, Red]));
        assert_eq!(b.finished(3), Some(Side::Right));
    }

    #[test]
    fn run_breaks_at_the_first_non_red_mark() {
        let b = board(slots(&[Red, White, Red, Red, Red]), slots(&[White; 5]));
        assert_eq!(b.run_length(Side::Left, 5), 1);
        assert_eq!(b.run_length(Side::Right, 5), 0);
    }

    #[test]
    fn score_assigns_target_to_the_winner() {
        let b = board(slots(&[Red; 5]), slots(&[Red, Red, White, White, White]));
        assert_eq!(b.score(5, Side::Left), (5, 2));
    }

    #[test]
    fn reader_classifies_painted_marks() {
        let cfg = DetectConfig::default();
        let mut frame =
            Mat::new_rows_cols_with_default(720, 1280, CV_8UC3, Scalar::all(0.0)).unwrap();
        let paint = |frame: &mut Mat, region: Region, color: Scalar| {
            let bgr =
                opencv::core::Vec3b::from([color[0] as u8, color[1] as u8, color[2] as u8]);
            for y in region.y..region.y + region.h {
                for x in region.x..region.x + region.w {
                    *frame.at_2d_mut::<opencv::core::Vec3b>(y, x).unwrap() = bgr;
                }
            }
        };
        // Three slots per side: left holds one round, right none.
        for i in 0..3 {
            let color = if i == 0 {
                Scalar::new(0.0, 0.0, 255.0, 0.0)
            } else {
                Scalar::new(255.0, 255.0, 255.0, 0.0)
            };
            paint(&mut frame, cfg.flags.left[i], color);
            paint(
                &mut frame,
                cfg.flags.right[i],
                Scalar::new(255.0, 255.0, 255.0, 0.0),
            );
        }

        let reader = FlagReader::new(cfg.flags.clone(), cfg.bands.clone());
        let b = reader.read(&frame).unwrap();
        assert_eq!(b.pulse(), MatchPulse::Started);
        assert_eq!(b.max_flags(), 3);
        assert_eq!(b.run_length(Side::Left, 3), 1);
        assert_eq!(b.mark(Side::Right, 1), White);
    }
}
