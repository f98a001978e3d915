//! Audio backend seam and the kira-backed production implementation.
//!
//! The player owns at most one live handle at a time, so the backend surface
//! is deliberately small: start a file, ask a handle whether it is still
//! playing, stop it. Tests swap in a recording mock to observe handle
//! ordering.

use std::path::Path;

use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::sound::PlaybackState;
use kira::{AudioManager, AudioManagerSettings, DefaultBackend, Tween};

use crate::error::{Error, Result};

/// One in-flight audio stream.
pub trait PlaybackHandle: Send {
    /// Whether the stream is still producing audio. A finished or stopped
    /// stream reports false.
    fn is_playing(&self) -> bool;

    /// Stops the stream. Idempotent; stopping a finished stream is a no-op.
    fn stop(&mut self);
}

/// Starts playback of audio files.
pub trait AudioBackend: Send {
    type Handle: PlaybackHandle;

    /// Starts playing the file at `path` once (no looping). A missing or
    /// undecodable file is fatal.
    fn start(&mut self, path: &Path) -> Result<Self::Handle>;
}

/// Production backend: one kira `AudioManager` over the default cpal stream.
pub struct KiraBackend {
    manager: AudioManager<DefaultBackend>,
}

impl KiraBackend {
    pub fn new() -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| Error::AudioInit(e.to_string()))?;
        Ok(Self { manager })
    }
}

impl AudioBackend for KiraBackend {
    type Handle = KiraHandle;

    fn start(&mut self, path: &Path) -> Result<KiraHandle> {
        let sound = StaticSoundData::from_file(path)
            .map_err(|e| Error::Playback(format!("failed to load {}: {}", path.display(), e)))?;
        let handle = self
            .manager
            .play(sound)
            .map_err(|e| Error::Playback(e.to_string()))?;
        Ok(KiraHandle(handle))
    }
}

/// Handle to a sound playing through the kira mixer.
pub struct KiraHandle(StaticSoundHandle);

impl PlaybackHandle for KiraHandle {
    fn is_playing(&self) -> bool {
        matches!(
            self.0.state(),
            PlaybackState::Playing | PlaybackState::Pausing | PlaybackState::Resuming
        )
    }

    fn stop(&mut self) {
        self.0.stop(Tween::default());
    }
}
