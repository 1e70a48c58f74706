//! Process-wide audio session: one output connection, reused across rounds,
//! with a cached latency measurement.

use std::path::Path;

use anyhow::{Context, Result, bail};
use kira::{AudioManager, AudioManagerSettings, DefaultBackend};
use tracing::{debug, info, warn};

use super::calibration;
use super::kira_track::KiraTrack;

/// Owns the one kira manager for the process. Connecting is idempotent and
/// failure-tolerant: when no output device is available the session stays
/// disconnected, rounds run silent on a manual track and latency reads as
/// zero.
pub struct AudioSession {
    manager: Option<AudioManager<DefaultBackend>>,
    latency_ms: Option<f64>,
}

impl AudioSession {
    pub fn new() -> Self {
        Self {
            manager: None,
            latency_ms: None,
        }
    }

    /// Connects to the audio output, reusing an existing connection.
    /// Returns whether a connection is available.
    pub fn connect(&mut self) -> bool {
        if self.manager.is_some() {
            debug!("reusing existing audio output");
            return true;
        }
        match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(manager) => {
                info!("audio output connected");
                self.manager = Some(manager);
                true
            }
            Err(e) => {
                warn!("audio output unavailable, running silent: {e}");
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_some()
    }

    /// The cached latency, zero while unmeasured.
    pub fn latency_ms(&self) -> f64 {
        self.latency_ms.unwrap_or(0.0)
    }

    /// Measures output latency once and caches it for the session. A probe
    /// that yields zero (timeout or silent degradation) is not cached, so a
    /// later call retries.
    pub fn calibrate(&mut self) -> f64 {
        if let Some(cached) = self.latency_ms {
            debug!(latency_ms = cached, "using cached latency");
            return cached;
        }
        self.connect();
        let Some(manager) = self.manager.as_mut() else {
            return 0.0;
        };
        let measured = calibration::measure_output_latency(manager, calibration::PROBE_TIMEOUT);
        if measured > 0.0 {
            info!(latency_ms = measured, "output latency calibrated");
            self.latency_ms = Some(measured);
        }
        measured
    }

    /// Forgets the cached latency, e.g. after an output device change.
    pub fn invalidate_latency(&mut self) {
        self.latency_ms = None;
    }

    /// Loads a track file for playback through this session's output.
    pub fn load_track(&mut self, path: &Path) -> Result<KiraTrack> {
        self.connect();
        let Some(manager) = self.manager.as_mut() else {
            bail!("no audio output available to play {}", path.display());
        };
        KiraTrack::load(manager, path)
            .with_context(|| format!("failed to load track {}", path.display()))
    }
}

impl Default for AudioSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Connecting and probing require audio hardware; only the pure cache
    // behavior is covered here.

    #[test]
    fn fresh_session_reports_zero_latency() {
        let session = AudioSession::new();
        assert!(!session.is_connected());
        assert_eq!(session.latency_ms(), 0.0);
    }

    #[test]
    fn invalidate_on_unmeasured_session_is_harmless() {
        let mut session = AudioSession::new();
        session.invalidate_latency();
        assert_eq!(session.latency_ms(), 0.0);
    }
}
