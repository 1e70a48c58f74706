//! Chart model: immutable note descriptors sorted by timing.

mod provider;

pub use provider::{BuiltinCharts, ChartProvider, DEMO_TRACK};

use serde::{Deserialize, Serialize};

use crate::config::LANE_COUNT;

/// Whether a note is hit once or held for a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteKind {
    Short,
    Long,
}

/// One note as authored in a chart. Timings are milliseconds of chart time;
/// `duration_ms` is zero for short notes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub lane: usize,
    pub timing_ms: f64,
    pub kind: NoteKind,
    pub duration_ms: f64,
}

impl Note {
    pub fn short(lane: usize, timing_ms: f64) -> Self {
        Self {
            lane,
            timing_ms,
            kind: NoteKind::Short,
            duration_ms: 0.0,
        }
    }

    pub fn long(lane: usize, timing_ms: f64, duration_ms: f64) -> Self {
        Self {
            lane,
            timing_ms,
            kind: NoteKind::Long,
            duration_ms,
        }
    }

    /// End of the hold for long notes; equal to `timing_ms` for short notes.
    pub fn end_ms(&self) -> f64 {
        self.timing_ms + self.duration_ms
    }
}

/// An immutable chart. Notes are kept sorted ascending by timing; duplicate
/// lane/timing pairs are allowed and judged independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    notes: Vec<Note>,
}

impl Chart {
    pub fn new(mut notes: Vec<Note>) -> Self {
        notes.retain(|n| n.lane < LANE_COUNT);
        notes.sort_by(|a, b| a.timing_ms.total_cmp(&b.timing_ms));
        Self { notes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// End time of the last-ending note, or `None` for an empty chart.
    pub fn last_end_ms(&self) -> Option<f64> {
        self.notes
            .iter()
            .map(Note::end_ms)
            .max_by(f64::total_cmp)
    }
}
