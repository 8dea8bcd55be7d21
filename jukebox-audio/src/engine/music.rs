use jukebox_types::{BusKind, ClipId};

use super::backend::{AudioBackend, BackendResult};
use super::channel::Channel;
use crate::catalog::Clip;

/// The single persistent background-music channel.
///
/// Starting a clip while another plays is a hard stop-and-replace;
/// smooth transitions are the fade scheduler's job.
pub struct MusicChannel {
    channel: Channel,
}

impl MusicChannel {
    /// Create the music channel on the backend, looped by default.
    pub fn new(backend: &dyn AudioBackend) -> BackendResult<Self> {
        let mut channel = Channel::create(backend, BusKind::Music, None)?;
        channel.set_loop(backend, true)?;
        Ok(Self { channel })
    }

    /// Assign and start `clip` immediately.
    pub fn play(&mut self, backend: &dyn AudioBackend, clip: &Clip) -> BackendResult {
        log::debug!(target: "audio::music", "playing {:?}", clip.name());
        self.channel.start(backend, clip)
    }

    /// Assign `clip` without starting it. A later `resume` starts it.
    pub fn cue(&mut self, clip: &Clip) {
        self.channel.assign(clip.id());
    }

    /// Start whatever clip is assigned. No-op when nothing is cued.
    pub fn resume(&mut self, backend: &dyn AudioBackend, clip: &Clip) -> BackendResult {
        if self.channel.clip() != Some(clip.id()) {
            return Ok(());
        }
        self.channel.start(backend, clip)
    }

    /// Halt and clear. The loop flag is left as configured.
    pub fn stop(&mut self, backend: &dyn AudioBackend) -> BackendResult {
        let looping = self.channel.is_looping();
        self.channel.release(backend)?;
        // release() drops the loop flag; music keeps its own setting
        self.channel.set_loop(backend, looping)
    }

    pub fn current(&self) -> Option<ClipId> {
        self.channel.clip()
    }

    pub fn is_playing(&self, backend: &dyn AudioBackend) -> bool {
        self.channel.is_playing(backend)
    }

    pub fn volume(&self) -> f32 {
        self.channel.volume()
    }

    pub fn set_volume(&mut self, backend: &dyn AudioBackend, volume: f32) -> BackendResult {
        self.channel.set_volume(backend, volume)
    }

    pub fn pitch(&self) -> f32 {
        self.channel.pitch()
    }

    /// Set the playback pitch. Conventionally -3..=3; not range-checked.
    pub fn set_pitch(&mut self, backend: &dyn AudioBackend, pitch: f32) -> BackendResult {
        self.channel.set_pitch(backend, pitch)
    }

    pub fn set_loop(&mut self, backend: &dyn AudioBackend, looping: bool) -> BackendResult {
        self.channel.set_loop(backend, looping)
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub(crate) fn channel_mut(&mut self) -> &mut Channel {
        &mut self.channel
    }
}
