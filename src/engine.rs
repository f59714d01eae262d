//! The match-progress state machine.
//!
//! All cross-frame memory lives here: the current phase, the provisional
//! start frame, the resolved contestants, and the round target captured
//! once at match start. Per-frame misreads never surface as errors; the
//! conclusion step's consistency check absorbs them by voiding the
//! apparent match instead.

use anyhow::Result;
use tracing::{debug, info, warn};

use duelstamp_detect::flags::{FlagBoard, Side};
use duelstamp_detect::names::NameIdentifier;
use duelstamp_detect::screen::ScreenState;
use duelstamp_io::{Frame, FrameSource, StoreError};

use crate::model::{Contestant, MatchEvent, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CharacterSelect,
    MatchNotStarted,
    MatchStarted,
    MatchPointImminent,
    MatchConcluded,
}

/// Temporal offsets tied to the game's transition animations. Tuned
/// empirically; carried as configuration so other footage can adjust them.
#[derive(Debug, Clone, Copy)]
pub struct EngineTuning {
    /// How far before the first in-match sample the match is considered to
    /// have started, covering the loading transition.
    pub start_rewind_secs: f64,
    /// How far before the last character-select sample the name frame is
    /// taken, stepping behind the select-to-match blur.
    pub name_backtrack_secs: f64,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            start_rewind_secs: 3.0,
            name_backtrack_secs: 0.25,
        }
    }
}

pub struct MatchEngine {
    tuning: EngineTuning,
    fps: f64,
    phase: Phase,
    /// Latest sampled frame that still showed the character-select screen.
    select_marker: Option<i64>,
    left: Contestant,
    right: Contestant,
    /// Round target for the current match; 0 until observed.
    max_flags: usize,
    start_frame: i64,
    /// Started attempts, including ones later voided.
    attempts: u32,
    voided: u32,
    events: Vec<MatchEvent>,
}

impl MatchEngine {
    pub fn new(fps: f64, tuning: EngineTuning) -> Self {
        Self {
            tuning,
            fps,
            phase: Phase::CharacterSelect,
            select_marker: None,
            left: Contestant::unknown(),
            right: Contestant::unknown(),
            max_flags: 0,
            start_frame: 0,
            attempts: 0,
            voided: 0,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn voided(&self) -> u32 {
        self.voided
    }

    /// Advances the state machine by one sampled frame.
    ///
    /// `source` is only touched for the backward name lookup at a match
    /// start; the store's cache and positional seek make that detour cheap
    /// and forward sampling resumes unaffected.
    pub fn observe(
        &mut self,
        frame: &Frame,
        board: &FlagBoard,
        screen: ScreenState,
        source: &mut dyn FrameSource,
        left_names: &NameIdentifier,
        right_names: &NameIdentifier,
    ) -> Result<()> {
        let index = frame.index;
        match self.phase {
            Phase::CharacterSelect => match screen {
                ScreenState::CharacterSelect => {
                    self.select_marker = Some(index);
                }
                ScreenState::MatchNotStarted | ScreenState::MatchStarted => {
                    self.begin_match(index, board, source, left_names, right_names)?;
                    if screen == ScreenState::MatchStarted {
                        self.phase = Phase::MatchStarted;
                        self.track_progress(index, board);
                    }
                }
                _ => {}
            },
            Phase::MatchNotStarted => match screen {
                ScreenState::MatchStarted => {
                    self.phase = Phase::MatchStarted;
                    self.track_progress(index, board);
                }
                ScreenState::CharacterSelect => self.abandon(index),
                _ => {}
            },
            Phase::MatchStarted | Phase::MatchPointImminent => match screen {
                ScreenState::MatchStarted => self.track_progress(index, board),
                ScreenState::CharacterSelect => self.abandon(index),
                // Between-round resets and blackouts carry no signal here.
                _ => {}
            },
            Phase::MatchConcluded => match screen {
                ScreenState::CharacterSelect => {
                    self.phase = Phase::CharacterSelect;
                    self.select_marker = Some(index);
                }
                // Both first marks back to white without a trip through the
                // menu: a rematch. A still-red board is just the concluded
                // match lingering on screen.
                ScreenState::MatchNotStarted => self.begin_rematch(index),
                _ => {}
            },
        }
        Ok(())
    }

    fn frames(&self, secs: f64) -> i64 {
        (secs * self.fps).round() as i64
    }

    /// First transition out of character select: resolve both names from a
    /// frame slightly before the recorded marker, capture the round target
    /// once, and backdate the provisional start past the loading
    /// transition.
    fn begin_match(
        &mut self,
        index: i64,
        board: &FlagBoard,
        source: &mut dyn FrameSource,
        left_names: &NameIdentifier,
        right_names: &NameIdentifier,
    ) -> Result<()> {
        let anchor = self.select_marker.unwrap_or(index);
        let name_index = (anchor - self.frames(self.tuning.name_backtrack_secs)).max(0);
        let (left, right) = match source.seek(name_index) {
            Ok(name_frame) => (
                left_names.identify(&name_frame.mat)?.into(),
                right_names.identify(&name_frame.mat)?.into(),
            ),
            Err(StoreError::EndOfStream(_)) => (Contestant::unknown(), Contestant::unknown()),
            Err(err) => return Err(err.into()),
        };
        self.left = left;
        self.right = right;
        self.max_flags = board.max_flags();
        self.start_frame = (index - self.frames(self.tuning.start_rewind_secs)).max(0);
        self.attempts += 1;
        self.phase = Phase::MatchNotStarted;
        info!(
            attempt = self.attempts,
            start = self.start_frame,
            target = self.max_flags,
            left = self.left.display(),
            right = self.right.display(),
            "match starting"
        );
        Ok(())
    }

    /// Rematch without an intervening character select: contestants and
    /// round target carry over, only the start bookkeeping resets.
    fn begin_rematch(&mut self, index: i64) {
        self.start_frame = (index - self.frames(self.tuning.start_rewind_secs)).max(0);
        self.attempts += 1;
        self.phase = Phase::MatchNotStarted;
        info!(
            attempt = self.attempts,
            start = self.start_frame,
            left = self.left.display(),
            right = self.right.display(),
            "rematch starting"
        );
    }

    fn track_progress(&mut self, index: i64, board: &FlagBoard) {
        if let Some(winner) = board.finished(self.max_flags) {
            self.conclude(index, board, winner);
            return;
        }
        if self.phase != Phase::MatchPointImminent && board.is_last_flag(self.max_flags) {
            debug!(frame = index, "match point imminent");
            self.phase = Phase::MatchPointImminent;
        }
    }

    /// A finish mark only produces an event when the scanned run actually
    /// reaches the round target; anything else is an anomalous read and
    /// the apparent match is discarded.
    fn conclude(&mut self, index: i64, board: &FlagBoard, winner: Side) {
        let left_run = board.run_length(Side::Left, self.max_flags);
        let right_run = board.run_length(Side::Right, self.max_flags);
        let target = self.max_flags as u32;
        if left_run.max(right_run) != target {
            warn!(
                frame = index,
                left_run, right_run, target, "finish mark without a full run, voiding match"
            );
            self.voided += 1;
            self.phase = Phase::MatchConcluded;
            return;
        }

        let score = board.score(self.max_flags, winner);
        let event = MatchEvent {
            number: self.events.len() as u32 + 1,
            start_frame: self.start_frame,
            end_frame: index,
            left: self.left.clone(),
            right: self.right.clone(),
            score,
            outcome: Outcome::from_score(score.0, score.1),
        };
        info!(
            frame = index,
            number = event.number,
            left = event.left.display(),
            right = event.right.display(),
            score_left = score.0,
            score_right = score.1,
            "match concluded"
        );
        self.events.push(event);
        self.phase = Phase::MatchConcluded;
    }

    /// Return to the menu from a running match, e.g. a quit mid-set: the
    /// attempt is void and nothing is logged.
    fn abandon(&mut self, index: i64) {
        warn!(frame = index, "match abandoned before a finish, voiding");
        self.voided += 1;
        self.phase = Phase::CharacterSelect;
        self.select_marker = Some(index);
    }
}
