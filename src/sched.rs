//! State-dependent sampling cadence.
//!
//! States near an event boundary are sampled densely, steady-state
//! screens sparsely. Cadence is specified in seconds per state and
//! converted to a frame skip through the container frame rate.

use duelstamp_detect::screen::ScreenState;

use crate::engine::Phase;

#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    /// Character select needs fine timing for the name marker.
    pub select_secs: f64,
    /// One round from the end; the finish must not be overshot.
    pub match_point_secs: f64,
    pub blackout_secs: f64,
    pub steady_secs: f64,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            select_secs: 0.25,
            match_point_secs: 0.5,
            blackout_secs: 1.0,
            steady_secs: 2.0,
        }
    }
}

pub struct Scheduler {
    fps: f64,
    cadence: Cadence,
}

impl Scheduler {
    pub fn new(fps: f64, cadence: Cadence) -> Self {
        Self { fps, cadence }
    }

    /// Frames to advance before the next sample, never less than one.
    pub fn next_interval(&self, phase: Phase, screen: ScreenState) -> i64 {
        let secs = match (phase, screen) {
            (Phase::MatchPointImminent, _) => self.cadence.match_point_secs,
            (_, ScreenState::Blackout) => self.cadence.blackout_secs,
            (Phase::CharacterSelect, _) => self.cadence.select_secs,
            _ => self.cadence.steady_secs,
        };
        ((secs * self.fps).round() as i64).max(1)
    }
}
