//! Value types for the analysis result: the append-only match-event log,
//! line rendering for the timestamp file, and the per-state sampling
//! tally behind the statistics summary.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use duelstamp_detect::names::NameRead;
use duelstamp_detect::screen::ScreenState;
use duelstamp_io::time::{frame_hms, hms};

use crate::engine::Phase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contestant {
    pub name: Option<String>,
    pub confidence: f32,
}

impl Contestant {
    pub fn unknown() -> Self {
        Self {
            name: None,
            confidence: -1.0,
        }
    }

    pub fn display(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

impl From<NameRead> for Contestant {
    fn from(read: NameRead) -> Self {
        Self {
            name: read.name,
            confidence: read.confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Draw,
    Player1Win,
    Player2Win,
}

impl Outcome {
    pub fn from_score(left: u32, right: u32) -> Self {
        match left.cmp(&right) {
            std::cmp::Ordering::Greater => Outcome::Player1Win,
            std::cmp::Ordering::Less => Outcome::Player2Win,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Draw => "Draw",
            Outcome::Player1Win => "Player1 win",
            Outcome::Player2Win => "Player2 win",
        }
    }
}

/// One completed match. Appended to the log only after the conclusion
/// consistency check passes; never rewritten afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub number: u32,
    pub start_frame: i64,
    pub end_frame: i64,
    pub left: Contestant,
    pub right: Contestant,
    pub score: (u32, u32),
    pub outcome: Outcome,
}

impl MatchEvent {
    pub fn header_line(&self, fps: f64) -> String {
        format!(
            "{} M{:02}: Player1 - {} vs Player2 - {}",
            frame_hms(self.start_frame, fps),
            self.number,
            self.left.display(),
            self.right.display(),
        )
    }

    pub fn outcome_line(&self) -> String {
        format!(
            "{} by {}:{}",
            self.outcome.label(),
            self.score.0,
            self.score.1
        )
    }
}

/// The full timestamp log: a session marker at time zero, then a header
/// and an outcome line per match.
pub fn timestamp_lines(events: &[MatchEvent], fps: f64) -> Vec<String> {
    let mut lines = Vec::with_capacity(1 + events.len() * 2);
    lines.push("0:00:00 Stream start".to_string());
    for event in events {
        lines.push(event.header_line(fps));
        lines.push(event.outcome_line());
    }
    lines
}

/// Per-state counts of sampled frames. Observability only; nothing feeds
/// back into the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateTally {
    pub select: u64,
    pub blackout: u64,
    pub fighting: u64,
    pub last_flag: u64,
    pub concluded: u64,
    pub other: u64,
}

impl StateTally {
    pub fn record(&mut self, screen: ScreenState, phase: Phase) {
        match screen {
            ScreenState::CharacterSelect => self.select += 1,
            ScreenState::Blackout => self.blackout += 1,
            ScreenState::MatchNotStarted | ScreenState::MatchStarted => match phase {
                Phase::MatchPointImminent => self.last_flag += 1,
                Phase::MatchConcluded => self.concluded += 1,
                _ => self.fighting += 1,
            },
            ScreenState::Unclassified => self.other += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.select + self.blackout + self.fighting + self.last_flag + self.concluded + self.other
    }
}

pub struct RunMeta<'a> {
    pub file_name: &'a str,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub total_frames: i64,
    pub fps: f64,
}

pub fn statistics_text(tally: &StateTally, meta: &RunMeta) -> String {
    let sampled = tally.total();
    let pct = |n: u64| {
        if sampled == 0 {
            0.0
        } else {
            n as f64 / sampled as f64 * 100.0
        }
    };
    let elapsed = (meta.finished - meta.started).num_seconds().max(0) as f64;
    let coverage = if meta.total_frames > 0 {
        sampled as f64 / meta.total_frames as f64 * 100.0
    } else {
        0.0
    };

    let mut text = format!("Input file: {}\n\n", meta.file_name);
    text.push_str(&format!(
        "Started : {}\n",
        meta.started.format("%Y-%m-%d %H:%M:%S")
    ));
    text.push_str(&format!(
        "Finished: {}\n",
        meta.finished.format("%Y-%m-%d %H:%M:%S")
    ));
    text.push_str(&format!("Elapsed : {}\n", hms(elapsed)));
    text.push_str(&format!(
        "Video length: {}\n\n",
        frame_hms(meta.total_frames, meta.fps)
    ));
    text.push_str("Sampled frame classification\n");
    text.push_str(&format!(
        "Character select: {:7} ({:5.1}%)\n",
        tally.select,
        pct(tally.select)
    ));
    text.push_str(&format!(
        "Blackout        : {:7} ({:5.1}%)\n",
        tally.blackout,
        pct(tally.blackout)
    ));
    text.push_str(&format!(
        "In match        : {:7} ({:5.1}%)\n",
        tally.fighting,
        pct(tally.fighting)
    ));
    text.push_str(&format!(
        "Match point     : {:7} ({:5.1}%)\n",
        tally.last_flag,
        pct(tally.last_flag)
    ));
    text.push_str(&format!(
        "Concluded       : {:7} ({:5.1}%)\n",
        tally.concluded,
        pct(tally.concluded)
    ));
    text.push_str(&format!(
        "Other           : {:7} ({:5.1}%)\n",
        tally.other,
        pct(tally.other)
    ));
    text.push_str("----------------------------\n");
    text.push_str(&format!("Total           : {sampled:7} (100.0%)\n"));
    text.push_str(&format!(
        "Sampled/total frames: {}/{} ({:.1}%)",
        sampled, meta.total_frames, coverage
    ));
    text
}
