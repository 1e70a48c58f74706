//! kira-backed [`AudioTrack`].

use std::path::Path;

use anyhow::{Result, anyhow};
use kira::sound::PlaybackState;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, DefaultBackend, Tween};

use super::AudioTrack;

/// A loaded track and its playback handle. Loading starts the sound paused
/// at position zero; `play` releases it.
pub struct KiraTrack {
    handle: StaticSoundHandle,
}

impl KiraTrack {
    pub fn load(manager: &mut AudioManager<DefaultBackend>, path: &Path) -> Result<Self> {
        let data = StaticSoundData::from_file(path)
            .map_err(|e| anyhow!("failed to decode {}: {e}", path.display()))?;
        let mut handle = manager
            .play(data)
            .map_err(|e| anyhow!("failed to start playback: {e}"))?;
        // Park at the start until the round begins.
        handle.pause(Tween::default());
        Ok(Self { handle })
    }
}

impl AudioTrack for KiraTrack {
    fn position_secs(&self) -> f64 {
        self.handle.position()
    }

    fn play(&mut self) -> Result<()> {
        self.handle.resume(Tween::default());
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.handle.pause(Tween::default());
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.handle.resume(Tween::default());
        Ok(())
    }

    fn is_ended(&self) -> bool {
        self.handle.state() == PlaybackState::Stopped
    }
}

// Playback tests require audio hardware; KiraTrack is exercised through the
// AudioTrack trait by the engine tests running on ManualTrack.
