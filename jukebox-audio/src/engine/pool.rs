use jukebox_types::{BusKind, ClipId};

use super::backend::{AudioBackend, BackendResult};
use super::channel::Channel;

/// Default number of effect channels.
pub const DEFAULT_EFFECT_CAPACITY: usize = 15;

/// Default number of channels allowed to hold the same clip at once.
pub const DEFAULT_DUPLICATE_LIMIT: usize = 3;

/// Fixed-capacity set of effect channels.
///
/// The pool only tracks assignments; it never starts playback itself.
/// Allocation failures (every slot busy, or the clip already at its
/// duplicate limit) return `None` and are expected in steady state:
/// the sound is dropped, never queued.
pub struct ChannelPool {
    channels: Vec<Channel>,
    duplicate_limit: usize,
}

impl ChannelPool {
    /// Pre-create `capacity` channels on the effects bus.
    pub fn new(backend: &dyn AudioBackend, capacity: usize, duplicate_limit: usize) -> BackendResult<Self> {
        let channels = (0..capacity)
            .map(|_| Channel::create(backend, BusKind::Effects, None))
            .collect::<BackendResult<Vec<_>>>()?;
        Ok(Self::from_channels(channels, duplicate_limit))
    }

    pub(crate) fn from_channels(channels: Vec<Channel>, duplicate_limit: usize) -> Self {
        Self {
            channels,
            duplicate_limit,
        }
    }

    pub fn capacity(&self) -> usize {
        self.channels.len()
    }

    pub fn duplicate_limit(&self) -> usize {
        self.duplicate_limit
    }

    /// Number of channels that currently hold a clip.
    pub fn occupied(&self) -> usize {
        self.channels.iter().filter(|c| !c.is_free()).count()
    }

    /// Assign `clip` to the lowest-indexed free channel.
    ///
    /// Fails when no channel is free, or when `duplicate_limit` channels
    /// already hold `clip` (even if a slot is free). The pool is left
    /// untouched on failure.
    pub fn acquire(&mut self, clip: ClipId) -> Option<usize> {
        let duplicates = self.find_by_clip(clip).count();
        if duplicates >= self.duplicate_limit {
            log::debug!(
                target: "audio::pool",
                "clip {} dropped: {} of {} allowed copies playing",
                clip,
                duplicates,
                self.duplicate_limit
            );
            return None;
        }

        let Some(index) = self.channels.iter().position(Channel::is_free) else {
            log::debug!(target: "audio::pool", "clip {} dropped: all {} channels busy", clip, self.capacity());
            return None;
        };

        self.channels[index].assign(clip);
        Some(index)
    }

    /// Indices of channels currently assigned to `clip`, in slot order.
    pub fn find_by_clip(&self, clip: ClipId) -> impl Iterator<Item = usize> + '_ {
        self.channels
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.clip() == Some(clip))
            .map(|(i, _)| i)
    }

    /// Free every assigned channel whose playback has stopped.
    /// Returns how many channels were reclaimed.
    ///
    /// Must run before the frame's first `acquire` so a sound that ended
    /// this frame frees its slot for reuse in the same frame.
    pub fn reclaim_finished(&mut self, backend: &dyn AudioBackend) -> usize {
        let mut reclaimed = 0;
        for channel in self.channels.iter_mut().filter(|c| !c.is_free()) {
            if !backend.is_playing(channel.handle()) {
                channel.clear();
                reclaimed += 1;
            }
        }
        if reclaimed > 0 {
            log::trace!(target: "audio::pool", "reclaimed {} finished channels", reclaimed);
        }
        reclaimed
    }

    /// Stop and free one channel. Returns false for an out-of-range or
    /// already free index, and when the backend refused the stop (the
    /// channel then stays assigned until it is reclaimed).
    pub fn release(&mut self, backend: &dyn AudioBackend, index: usize) -> bool {
        match self.channels.get_mut(index) {
            Some(channel) if !channel.is_free() => release_logged(backend, channel),
            _ => false,
        }
    }

    /// Stop and free every channel holding `clip`. Returns how many were freed.
    pub fn release_clip(&mut self, backend: &dyn AudioBackend, clip: ClipId) -> usize {
        self.channels
            .iter_mut()
            .filter(|c| c.clip() == Some(clip))
            .map(|channel| release_logged(backend, channel))
            .filter(|freed| *freed)
            .count()
    }

    /// Stop and free every channel. Calling it again is a no-op.
    pub fn release_all(&mut self, backend: &dyn AudioBackend) -> usize {
        self.channels
            .iter_mut()
            .filter(|c| !c.is_free())
            .map(|channel| release_logged(backend, channel))
            .filter(|freed| *freed)
            .count()
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub(crate) fn channel_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }
}

/// Release one channel, logging a refused stop. Returns whether the
/// channel is free afterwards.
fn release_logged(backend: &dyn AudioBackend, channel: &mut Channel) -> bool {
    if let Err(e) = channel.release(backend) {
        log::warn!(target: "audio::backend", "failed to stop {}: {}", channel.handle(), e);
    }
    channel.is_free()
}
