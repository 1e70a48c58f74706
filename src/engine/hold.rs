//! Pure long-note hold-tick arithmetic.
//!
//! The engine calls [`catch_up`] once per frame per held note. Because the
//! clock comes from audio playback, any number of tick intervals may elapse
//! between frames; the catch-up reconstructs every interval instant and
//! awards exactly the ones inside the tick window, so ticks are neither
//! dropped nor double-counted across stalled frames.

/// Chart-time window in which hold ticks are awarded: from the note's start
/// to `end - normal + tick_safety`. The tail margin keeps the final tick from
/// colliding with the release window.
#[derive(Debug, Clone, Copy)]
pub struct TickWindow {
    pub start_ms: f64,
    pub end_ms: f64,
}

impl TickWindow {
    pub fn for_note(timing_ms: f64, duration_ms: f64, normal_ms: f64, safety_ms: f64) -> Self {
        Self {
            start_ms: timing_ms,
            end_ms: timing_ms + duration_ms - normal_ms + safety_ms,
        }
    }
}

/// Advances `last_tick_ms` to `now_ms` in whole intervals, returning how many
/// interval instants fell inside `window` and the new `last_tick_ms`.
///
/// `last_tick_ms` moves to the last *awarded* instant, so intervals clipped
/// by the window tail do not consume the cursor.
pub fn catch_up(last_tick_ms: f64, now_ms: f64, interval_ms: f64, window: TickWindow) -> (u32, f64) {
    let elapsed = now_ms - last_tick_ms;
    if elapsed < interval_ms {
        return (0, last_tick_ms);
    }
    let intervals = (elapsed / interval_ms).floor() as u32;
    let mut awarded = 0;
    let mut cursor = last_tick_ms;
    for i in 1..=intervals {
        let instant = last_tick_ms + f64::from(i) * interval_ms;
        if instant >= window.start_ms && instant <= window.end_ms {
            awarded += 1;
            cursor = instant;
        }
    }
    (awarded, cursor)
}

/// How many ticks a full hold of `duration_ms` is expected to produce:
/// `ceil(duration / interval) - 1` (the end-point judgment covers the last
/// interval).
pub fn expected_ticks(duration_ms: f64, interval_ms: f64) -> u32 {
    let intervals = (duration_ms / interval_ms).ceil() as i64;
    (intervals - 1).max(0) as u32
}
