use std::collections::HashMap;

use jukebox_types::{BusKind, ClipId, EntityId};

use super::backend::{AudioBackend, BackendResult};
use super::channel::Channel;
use crate::catalog::Clip;

/// Positional channels attached to scene entities, outside the shared pool.
///
/// Each entity accumulates channels lazily, one per concurrently sounding
/// clip, and reuses any idle channel on the requested bus. Spatial playback
/// ignores the pool's duplicate limit.
///
/// A stopped spatial channel keeps its last clip; idleness, not the clip,
/// decides reuse.
#[derive(Default)]
pub struct SpatialChannelBinder {
    bindings: HashMap<EntityId, Vec<Channel>>,
}

impl SpatialChannelBinder {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Play `clip` on an idle channel of `entity` routed to `bus`, binding a
    /// new channel when none is idle. A reused channel starts at unity
    /// volume and pitch. Returns the slot index on the entity.
    pub fn play_on_entity(
        &mut self,
        backend: &dyn AudioBackend,
        entity: EntityId,
        clip: &Clip,
        bus: BusKind,
        looping: bool,
    ) -> BackendResult<usize> {
        let channels = self.bindings.entry(entity).or_default();

        let slot = match channels
            .iter()
            .position(|c| c.bus() == bus && !backend.is_playing(c.handle()))
        {
            Some(slot) => slot,
            None => {
                let channel = Channel::create(backend, bus, Some(entity))?;
                channels.push(channel);
                log::debug!(
                    target: "audio::spatial",
                    "entity {} bound channel #{} on {} bus",
                    entity,
                    channels.len() - 1,
                    bus
                );
                channels.len() - 1
            }
        };

        let channel = &mut channels[slot];
        channel.reset_tuning(backend)?;
        channel.set_loop(backend, looping)?;
        channel.start(backend, clip)?;
        Ok(slot)
    }

    /// Stop every channel on `entity` currently holding `clip`.
    pub fn stop_on_entity(&mut self, backend: &dyn AudioBackend, entity: EntityId, clip: ClipId) -> usize {
        self.stop_matching(backend, entity, |c| c.clip() == Some(clip))
    }

    /// Stop every channel on `entity` routed to `bus`, whatever it plays.
    pub fn stop_all_on_entity(&mut self, backend: &dyn AudioBackend, entity: EntityId, bus: BusKind) -> usize {
        self.stop_matching(backend, entity, |c| c.bus() == bus)
    }

    fn stop_matching(
        &mut self,
        backend: &dyn AudioBackend,
        entity: EntityId,
        matches: impl Fn(&Channel) -> bool,
    ) -> usize {
        let Some(channels) = self.bindings.get(&entity) else {
            return 0;
        };
        let mut stopped = 0;
        for channel in channels.iter().filter(|c| matches(c)) {
            if let Err(e) = channel.halt(backend) {
                log::warn!(target: "audio::backend", "failed to stop {}: {}", channel.handle(), e);
            }
            stopped += 1;
        }
        stopped
    }

    /// Channels bound to `entity`; empty for an unknown entity.
    pub fn channels(&self, entity: EntityId) -> &[Channel] {
        self.bindings.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn channel(&self, entity: EntityId, slot: usize) -> Option<&Channel> {
        self.bindings.get(&entity)?.get(slot)
    }

    pub(crate) fn channel_mut(&mut self, entity: EntityId, slot: usize) -> Option<&mut Channel> {
        self.bindings.get_mut(&entity)?.get_mut(slot)
    }

    /// Drop the bookkeeping for an entity the host destroyed. The backend
    /// channels went away with the entity.
    pub fn forget_entity(&mut self, entity: EntityId) -> bool {
        self.bindings.remove(&entity).is_some()
    }

    pub fn entity_count(&self) -> usize {
        self.bindings.len()
    }
}
