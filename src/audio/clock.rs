//! Game time derived from audio playback position.
//!
//! All judgment arithmetic runs on this clock, never on frame timestamps:
//! pausing the track pauses time, and no drift between audio and logic can
//! accumulate.

/// Millisecond clock anchored at the playback position observed when the
/// round started.
#[derive(Debug, Clone, Copy, Default)]
pub struct SongClock {
    start_position_secs: f64,
}

impl SongClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches the track position at round start.
    pub fn start(&mut self, position_secs: f64) {
        self.start_position_secs = position_secs;
    }

    /// Chart time in milliseconds for the given playback position.
    pub fn now_ms(&self, position_secs: f64) -> f64 {
        (position_secs - self.start_position_secs) * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_relative_to_start() {
        let mut clock = SongClock::new();
        clock.start(2.5);
        assert_eq!(clock.now_ms(2.5), 0.0);
        assert_eq!(clock.now_ms(3.75), 1250.0);
    }

    #[test]
    fn fresh_clock_starts_at_zero() {
        let clock = SongClock::new();
        assert_eq!(clock.now_ms(1.0), 1000.0);
    }
}
