//! Live note bookkeeping: the pending queue, the active set, promotion and
//! retirement.

use std::collections::VecDeque;

use tracing::debug;

use crate::chart::{Chart, Note, NoteKind};

use super::judge::JudgeWindows;

/// Long-note lifecycle. `Missed` and `Completed` are terminal; such notes
/// stay in the active set (render collaborators fade them out) but take no
/// further judgments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    Waiting,
    Holding,
    Missed,
    Completed,
}

/// Per-long-note hold bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct HoldTracker {
    pub state: HoldState,
    /// Whether the player's finger/key is still down on this note. Stays true
    /// after a forced miss until the physical release arrives.
    pub is_held: bool,
    /// Combo value snapshotted just before the start-edge judgment, used to
    /// compute the tick shortfall at release.
    pub held_combo: u32,
    /// Chart time of the last awarded hold tick.
    pub last_tick_ms: f64,
}

impl HoldTracker {
    fn new() -> Self {
        Self {
            state: HoldState::Waiting,
            is_held: false,
            held_combo: 0,
            last_tick_ms: 0.0,
        }
    }
}

/// A chart note plus its live judgment state.
#[derive(Debug, Clone, Copy)]
pub struct LiveNote {
    pub note: Note,
    pub hold: Option<HoldTracker>,
}

impl LiveNote {
    fn from_note(note: Note) -> Self {
        let hold = matches!(note.kind, NoteKind::Long).then(HoldTracker::new);
        Self { note, hold }
    }

    pub fn end_ms(&self) -> f64 {
        self.note.end_ms()
    }

    pub fn is_held(&self) -> bool {
        self.hold.is_some_and(|h| h.is_held)
    }

    pub fn hold_state(&self) -> Option<HoldState> {
        self.hold.map(|h| h.state)
    }

    fn is_completed(&self) -> bool {
        self.hold_state() == Some(HoldState::Completed)
    }
}

/// Pending and active note sets for one bound chart.
#[derive(Debug, Default)]
pub struct Timeline {
    pending: VecDeque<LiveNote>,
    active: Vec<LiveNote>,
}

impl Timeline {
    /// Rebuilds the play queue from the immutable chart, shifting every raw
    /// timing by `latency_offset_ms`. Always starts from the raw timings, so
    /// binding twice with the same offset yields the same queue.
    pub fn bind(&mut self, chart: &Chart, latency_offset_ms: f64) {
        self.pending = chart
            .notes()
            .iter()
            .map(|n| {
                let mut note = *n;
                note.timing_ms += latency_offset_ms;
                LiveNote::from_note(note)
            })
            .collect();
        self.active.clear();
        debug!(
            notes = self.pending.len(),
            offset_ms = latency_offset_ms,
            "chart bound"
        );
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.active.clear();
    }

    /// Moves pending notes whose timing is within the lookahead horizon into
    /// the active set.
    pub fn promote(&mut self, now_ms: f64, lookahead_ms: f64) {
        while self
            .pending
            .front()
            .is_some_and(|head| head.note.timing_ms <= now_ms + lookahead_ms)
        {
            if let Some(live) = self.pending.pop_front() {
                self.active.push(live);
            }
        }
    }

    /// Drops notes that have left play, returning the lane of every note
    /// retired as a miss. A note past the passed line that is neither held
    /// nor completed misses; long notes otherwise linger until the late
    /// grace after their hold end has elapsed.
    pub fn retire(&mut self, now_ms: f64, passed_ms: f64, late_grace_ms: f64) -> Vec<usize> {
        let mut missed = Vec::new();
        self.active.retain(|live| {
            let past_line = now_ms - live.note.timing_ms > passed_ms;
            if past_line && !live.is_held() && !live.is_completed() {
                missed.push(live.note.lane);
                return false;
            }
            match live.note.kind {
                NoteKind::Long => now_ms <= live.end_ms() + late_grace_ms,
                NoteKind::Short => !past_line,
            }
        });
        missed
    }

    /// Index of the active note in `lane` closest to `now`, restricted to
    /// notes inside the judgement range. Held and terminal long notes are
    /// not press candidates.
    pub fn closest_pressable(
        &self,
        lane: usize,
        now_ms: f64,
        windows: &JudgeWindows,
    ) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, live) in self.active.iter().enumerate() {
            if live.note.lane != lane {
                continue;
            }
            if let Some(h) = &live.hold {
                if h.state != HoldState::Waiting {
                    continue;
                }
            }
            let delta = live.note.timing_ms - now_ms;
            if !windows.in_judgement_range(delta) {
                continue;
            }
            let abs = delta.abs();
            if best.is_none_or(|(_, b)| abs < b) {
                best = Some((i, abs));
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn active(&self) -> &[LiveNote] {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut [LiveNote] {
        &mut self.active
    }

    pub fn remove_active(&mut self, index: usize) -> LiveNote {
        self.active.remove(index)
    }

    /// True once every note has been promoted and retired.
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty() && self.active.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
