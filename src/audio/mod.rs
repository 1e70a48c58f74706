//! Audio playback behind the [`AudioTrack`] seam.
//!
//! Production rounds run on [`KiraTrack`]; tests and the headless demo run
//! on [`ManualTrack`], whose playback position is set by hand so game time
//! is fully deterministic.

mod calibration;
mod clock;
mod kira_track;
mod session;

pub use calibration::{PROBE_TIMEOUT, latency_from_probe};
pub use clock::SongClock;
pub use kira_track::KiraTrack;
pub use session::AudioSession;

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;

/// A playable piece of audio whose position drives the game clock.
pub trait AudioTrack {
    /// Current playback position in seconds. Advances only while playing.
    fn position_secs(&self) -> f64;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
    /// Whether the track has played to its end.
    fn is_ended(&self) -> bool;
}

#[derive(Debug, Default)]
struct ManualTrackState {
    position_secs: Cell<f64>,
    playing: Cell<bool>,
    ended: Cell<bool>,
}

/// Hand-driven track. Clones share state, so a host (or test) can keep one
/// handle and move the position while the engine owns the other.
#[derive(Debug, Clone, Default)]
pub struct ManualTrack {
    state: Rc<ManualTrackState>,
}

impl ManualTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position_secs(&self, secs: f64) {
        self.state.position_secs.set(secs);
    }

    pub fn set_position_ms(&self, ms: f64) {
        self.set_position_secs(ms / 1000.0);
    }

    pub fn advance_ms(&self, ms: f64) {
        let pos = self.state.position_secs.get();
        self.state.position_secs.set(pos + ms / 1000.0);
    }

    pub fn finish(&self) {
        self.state.ended.set(true);
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing.get()
    }
}

impl AudioTrack for ManualTrack {
    fn position_secs(&self) -> f64 {
        self.state.position_secs.get()
    }

    fn play(&mut self) -> Result<()> {
        self.state.playing.set(true);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.state.playing.set(false);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.state.playing.set(true);
        Ok(())
    }

    fn is_ended(&self) -> bool {
        self.state.ended.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_position() {
        let track = ManualTrack::new();
        let handle = track.clone();
        handle.set_position_ms(1500.0);
        assert_eq!(track.position_secs(), 1.5);
        handle.advance_ms(500.0);
        assert_eq!(track.position_secs(), 2.0);
    }

    #[test]
    fn play_pause_and_end() {
        let mut track = ManualTrack::new();
        assert!(!track.is_playing());
        track.play().unwrap();
        assert!(track.is_playing());
        track.pause().unwrap();
        assert!(!track.is_playing());
        track.resume().unwrap();
        assert!(track.is_playing());
        assert!(!track.is_ended());
        track.finish();
        assert!(track.is_ended());
    }
}
