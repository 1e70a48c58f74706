//! Output latency measurement.
//!
//! A short, near-silent tone is played through the real output path; the
//! difference between when it should have finished and when the handle
//! reports it finished is the pipeline latency. The probe is bounded by a
//! timeout and degrades to zero rather than failing the round.

use std::sync::Arc;
use std::time::{Duration, Instant};

use kira::sound::PlaybackState;
use kira::sound::static_sound::StaticSoundData;
use kira::{AudioManager, DefaultBackend, Frame};
use tracing::{debug, warn};

/// Upper bound on how long the probe may run before assuming zero latency.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

const PROBE_SAMPLE_RATE: u32 = 48_000;
const PROBE_FREQUENCY_HZ: f64 = 440.0;
const PROBE_DURATION: Duration = Duration::from_millis(100);
// Quiet enough to be inaudible but non-zero so the output path is exercised.
const PROBE_AMPLITUDE: f32 = 0.001;

/// Latency implied by a probe tone that should have ended at `expected_end`
/// (relative to its start) but was observed to end at `observed_end`.
/// Observations earlier than expected clamp to zero: the pipeline cannot
/// have negative latency, only the observation jitter can.
pub fn latency_from_probe(expected_end: Duration, observed_end: Duration) -> f64 {
    observed_end.saturating_sub(expected_end).as_secs_f64() * 1000.0
}

fn probe_tone() -> StaticSoundData {
    let frame_count = (PROBE_DURATION.as_secs_f64() * f64::from(PROBE_SAMPLE_RATE)) as usize;
    let frames: Arc<[Frame]> = (0..frame_count)
        .map(|i| {
            let t = i as f64 / f64::from(PROBE_SAMPLE_RATE);
            let sample =
                (t * PROBE_FREQUENCY_HZ * std::f64::consts::TAU).sin() as f32 * PROBE_AMPLITUDE;
            Frame::from_mono(sample)
        })
        .collect();
    StaticSoundData {
        sample_rate: PROBE_SAMPLE_RATE,
        frames,
        settings: Default::default(),
        slice: None,
    }
}

/// Runs the probe against a live audio manager and returns the measured
/// latency in milliseconds, or zero when the probe cannot complete in time.
pub fn measure_output_latency(
    manager: &mut AudioManager<DefaultBackend>,
    timeout: Duration,
) -> f64 {
    let tone = probe_tone();
    let expected_end = tone.duration();
    let started = Instant::now();
    let handle = match manager.play(tone) {
        Ok(handle) => handle,
        Err(e) => {
            warn!("latency probe could not start, assuming zero latency: {e}");
            return 0.0;
        }
    };
    loop {
        if handle.state() == PlaybackState::Stopped {
            let latency = latency_from_probe(expected_end, started.elapsed());
            debug!(latency_ms = latency, "latency probe completed");
            return latency;
        }
        if started.elapsed() > timeout {
            warn!("latency probe timed out, assuming zero latency");
            return 0.0;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_latency_is_the_overshoot() {
        let expected = Duration::from_millis(100);
        let observed = Duration::from_millis(135);
        assert_eq!(latency_from_probe(expected, observed), 35.0);
    }

    #[test]
    fn early_observation_clamps_to_zero() {
        let expected = Duration::from_millis(100);
        let observed = Duration::from_millis(90);
        assert_eq!(latency_from_probe(expected, observed), 0.0);
    }

    #[test]
    fn exact_observation_is_zero() {
        let d = Duration::from_millis(100);
        assert_eq!(latency_from_probe(d, d), 0.0);
    }

    #[test]
    fn probe_tone_shape() {
        let tone = probe_tone();
        assert_eq!(tone.sample_rate, PROBE_SAMPLE_RATE);
        assert_eq!(tone.frames.len(), 4800);
        // Near-silent by construction.
        assert!(tone.frames.iter().all(|f| f.left.abs() <= PROBE_AMPLITUDE));
    }
}
