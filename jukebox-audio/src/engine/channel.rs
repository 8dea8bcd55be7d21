use jukebox_types::{BusKind, ClipId, EntityId};

use super::backend::{AudioBackend, BackendResult, ChannelHandle};
use crate::catalog::Clip;

/// Engine-side mirror of one backend channel.
///
/// Channels live as long as the engine; only the assigned clip changes.
/// `clip == None` means the channel is free. The mirror only changes once
/// the backend has accepted the matching call.
#[derive(Debug, Clone)]
pub struct Channel {
    handle: ChannelHandle,
    bus: BusKind,
    clip: Option<ClipId>,
    looping: bool,
    volume: f32,
    pitch: f32,
}

impl Channel {
    pub(crate) fn new(handle: ChannelHandle, bus: BusKind) -> Self {
        Self {
            handle,
            bus,
            clip: None,
            looping: false,
            volume: 1.0,
            pitch: 1.0,
        }
    }

    /// Create a channel on the backend and wrap it.
    pub(crate) fn create(backend: &dyn AudioBackend, bus: BusKind, anchor: Option<EntityId>) -> BackendResult<Self> {
        let handle = backend.create_channel(bus, anchor)?;
        Ok(Self::new(handle, bus))
    }

    pub fn handle(&self) -> ChannelHandle {
        self.handle
    }

    pub fn bus(&self) -> BusKind {
        self.bus
    }

    pub fn clip(&self) -> Option<ClipId> {
        self.clip
    }

    pub fn is_free(&self) -> bool {
        self.clip.is_none()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn is_playing(&self, backend: &dyn AudioBackend) -> bool {
        self.clip.is_some() && backend.is_playing(self.handle)
    }

    pub(crate) fn assign(&mut self, clip: ClipId) {
        self.clip = Some(clip);
    }

    /// Start `clip` on this channel, assigning it first.
    pub(crate) fn start(&mut self, backend: &dyn AudioBackend, clip: &Clip) -> BackendResult {
        self.clip = Some(clip.id());
        backend.play(self.handle, clip)
    }

    /// Halt playback but keep the assignment.
    pub(crate) fn halt(&self, backend: &dyn AudioBackend) -> BackendResult {
        backend.stop(self.handle)
    }

    /// Halt playback, drop the loop flag and free the channel.
    ///
    /// A refused stop leaves the clip assigned: the channel may still be
    /// sounding, and `ChannelPool::reclaim_finished` frees it once the
    /// backend reports it idle.
    pub(crate) fn release(&mut self, backend: &dyn AudioBackend) -> BackendResult {
        backend.stop(self.handle)?;
        self.clip = None;
        self.set_loop(backend, false)
    }

    /// Forget the clip without touching the backend (it already stopped).
    pub(crate) fn clear(&mut self) {
        self.clip = None;
        self.looping = false;
    }

    /// Put volume and pitch back to unity before the channel is reused.
    /// Values already at unity are not sent again.
    pub(crate) fn reset_tuning(&mut self, backend: &dyn AudioBackend) -> BackendResult {
        if self.volume != 1.0 {
            self.set_volume(backend, 1.0)?;
        }
        if self.pitch != 1.0 {
            self.set_pitch(backend, 1.0)?;
        }
        Ok(())
    }

    pub(crate) fn set_loop(&mut self, backend: &dyn AudioBackend, looping: bool) -> BackendResult {
        backend.set_loop(self.handle, looping)?;
        self.looping = looping;
        Ok(())
    }

    pub(crate) fn set_volume(&mut self, backend: &dyn AudioBackend, volume: f32) -> BackendResult {
        backend.set_volume(self.handle, volume)?;
        self.volume = volume;
        Ok(())
    }

    pub(crate) fn set_pitch(&mut self, backend: &dyn AudioBackend, pitch: f32) -> BackendResult {
        backend.set_pitch(self.handle, pitch)?;
        self.pitch = pitch;
        Ok(())
    }
}
