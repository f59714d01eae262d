//! Whole-frame screen classification.

use opencv::core::Mat;

use crate::color;
use crate::flags::MatchPulse;
use crate::matchers::{self, ColorMode};
use crate::utils::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ScreenState {
    CharacterSelect,
    MatchNotStarted,
    MatchStarted,
    Blackout,
    Unclassified,
}

pub struct ScreenClassifier {
    select_template: Mat,
    select_region: Region,
    select_threshold: f32,
    blackout_max: f64,
}

impl ScreenClassifier {
    pub fn new(
        select_template: Mat,
        select_region: Region,
        select_threshold: f32,
        blackout_max: f64,
    ) -> Self {
        Self {
            select_template,
            select_region,
            select_threshold,
            blackout_max,
        }
    }

    /// Fixed precedence: the in-match pulse first (cheapest and most
    /// discriminating, so it short-circuits template matching on most
    /// frames), then the character-select marker, then blackout.
    ///
    /// `pulse` is the flag-board signal of this same frame, computed once
    /// by the caller and shared with the score path.
    pub fn classify(&self, frame: &Mat, pulse: MatchPulse) -> opencv::Result<ScreenState> {
        match pulse {
            MatchPulse::NotStarted => return Ok(ScreenState::MatchNotStarted),
            MatchPulse::Started => return Ok(ScreenState::MatchStarted),
            MatchPulse::NotInMatch => {}
        }
        if matchers::matches(
            frame,
            self.select_region,
            &self.select_template,
            ColorMode::Intensity,
            self.select_threshold,
        )? {
            return Ok(ScreenState::CharacterSelect);
        }
        if color::brightness(frame)? < self.blackout_max {
            return Ok(ScreenState::Blackout);
        }
        Ok(ScreenState::Unclassified)
    }
}
