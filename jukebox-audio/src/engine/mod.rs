pub mod backend;
pub mod channel;
pub mod fade;
pub mod music;
pub mod pool;
pub mod spatial;

use jukebox_types::{BusKind, ClipId, EntityId};
use serde::Serialize;

use crate::catalog::{Clip, ClipCatalog};
use crate::config::EngineSettings;
use crate::error::AudioError;
use crate::mixer::MixerBus;
use crate::snapshot::{EffectSnapshot, EngineSnapshot, MusicSnapshot, SpatialSnapshot};
use backend::{AudioBackend, BackendResult, ChannelHandle};
use channel::Channel;
use fade::{FadeAction, FadeScheduler, FadeState, FadeStep};
use music::MusicChannel;
use pool::ChannelPool;
use spatial::SpatialChannelBinder;

/// Address of any channel the engine owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChannelId {
    Music,
    Effect(usize),
    Spatial { entity: EntityId, slot: usize },
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelId::Music => write!(f, "music"),
            ChannelId::Effect(index) => write!(f, "effect #{}", index),
            ChannelId::Spatial { entity, slot } => write!(f, "entity {} #{}", entity, slot),
        }
    }
}

/// Borrowed handle for starting and tuning one channel.
pub struct ChannelControl<'a> {
    backend: &'a dyn AudioBackend,
    catalog: &'a ClipCatalog,
    channel: &'a mut Channel,
}

impl ChannelControl<'_> {
    pub fn handle(&self) -> ChannelHandle {
        self.channel.handle()
    }

    pub fn bus(&self) -> BusKind {
        self.channel.bus()
    }

    pub fn clip(&self) -> Option<ClipId> {
        self.channel.clip()
    }

    pub fn volume(&self) -> f32 {
        self.channel.volume()
    }

    pub fn pitch(&self) -> f32 {
        self.channel.pitch()
    }

    pub fn is_looping(&self) -> bool {
        self.channel.is_looping()
    }

    pub fn is_playing(&self) -> bool {
        self.channel.is_playing(self.backend)
    }

    /// Linear volume, clamped to 0..=1.
    pub fn set_volume(&mut self, volume: f32) -> BackendResult {
        self.channel.set_volume(self.backend, clamp_volume(volume))
    }

    pub fn set_pitch(&mut self, pitch: f32) -> BackendResult {
        self.channel.set_pitch(self.backend, pitch)
    }

    pub fn set_loop(&mut self, looping: bool) -> BackendResult {
        self.channel.set_loop(self.backend, looping)
    }

    /// Start the assigned clip from the beginning. No-op on a free channel.
    pub fn play(&mut self) -> BackendResult {
        let Some(id) = self.channel.clip() else {
            return Ok(());
        };
        self.channel.start(self.backend, self.catalog.expect(id))
    }

    /// Halt playback. A pool channel is freed on the next `update`.
    pub fn stop(&mut self) -> BackendResult {
        self.channel.halt(self.backend)
    }
}

/// Playback facade: the single entry point hosts talk to.
///
/// Owns the backend, the clip catalog, the bus gains, the effect pool, the
/// music channel, running fades and spatial bindings. Constructing it is
/// initialization; dropping it is shutdown. Everything is driven from the
/// host's frame loop through `update`.
pub struct AudioEngine {
    backend: Box<dyn AudioBackend>,
    catalog: ClipCatalog,
    mixer: MixerBus,
    pool: ChannelPool,
    music: MusicChannel,
    fades: FadeScheduler,
    spatial: SpatialChannelBinder,
}

impl AudioEngine {
    /// Apply the configured bus gains and pre-create the effect pool and the
    /// music channel on `backend`.
    pub fn new(
        backend: Box<dyn AudioBackend>,
        catalog: ClipCatalog,
        settings: &EngineSettings,
    ) -> Result<Self, AudioError> {
        let mut mixer = MixerBus::new();
        for bus in BusKind::ALL {
            mixer.set_gain(backend.as_ref(), bus, settings.bus_gain(bus))?;
        }

        let pool = ChannelPool::new(
            backend.as_ref(),
            settings.effect_capacity,
            settings.duplicate_limit.max(1),
        )?;
        let music = MusicChannel::new(backend.as_ref())?;

        log::info!(
            target: "audio::engine",
            "engine ready: {} clips, {} effect channels, duplicate limit {}",
            catalog.len(),
            pool.capacity(),
            pool.duplicate_limit()
        );

        Ok(Self {
            backend,
            catalog,
            mixer,
            pool,
            music,
            fades: FadeScheduler::new(),
            spatial: SpatialChannelBinder::new(),
        })
    }

    pub fn backend(&self) -> &dyn AudioBackend {
        self.backend.as_ref()
    }

    pub fn catalog(&self) -> &ClipCatalog {
        &self.catalog
    }

    pub fn pool(&self) -> &ChannelPool {
        &self.pool
    }

    pub fn music(&self) -> &MusicChannel {
        &self.music
    }

    pub fn fades(&self) -> &FadeScheduler {
        &self.fades
    }

    pub fn spatial(&self) -> &SpatialChannelBinder {
        &self.spatial
    }

    // ── Per-frame tick ──────────────────────────────────────────

    /// Reclaim finished effect channels, then advance fades by
    /// `delta_secs` and apply their volumes and clip switches.
    pub fn update(&mut self, delta_secs: f32) {
        self.pool.reclaim_finished(self.backend.as_ref());

        for step in self.fades.advance(delta_secs) {
            self.apply_fade_step(step);
        }
    }

    fn apply_fade_step(&mut self, step: FadeStep) {
        let backend = self.backend.as_ref();

        let Some(channel) = resolve_channel(&mut self.pool, &mut self.music, &mut self.spatial, step.channel)
        else {
            if step.state == FadeState::Running {
                self.fades.cancel(step.channel);
            }
            return;
        };
        if let Err(e) = channel.set_volume(backend, step.volume) {
            log::warn!(target: "audio::backend", "fade on {} failed: {}", step.channel, e);
        }

        if let Some(FadeAction::SwitchClip(next)) = step.action {
            let clip = self.catalog.expect(next);
            log::debug!(target: "audio::fade", "crossfade switching to {:?}", clip.name());
            if let Err(e) = self.music.play(backend, clip) {
                log::warn!(target: "audio::backend", "crossfade switch failed: {}", e);
            }
        }
    }

    // ── Music ───────────────────────────────────────────────────

    /// Start `clip` on the music channel, replacing whatever plays.
    /// A running fade keeps going.
    ///
    /// # Panics
    /// If `clip` is not in the catalog.
    pub fn play_music(&mut self, clip: ClipId) -> BackendResult {
        let clip = self.catalog.expect(clip);
        self.music.play(self.backend.as_ref(), clip)
    }

    /// Stop the music and cancel any fade on it.
    pub fn stop_music(&mut self) -> BackendResult {
        self.fades.cancel(ChannelId::Music);
        self.music.stop(self.backend.as_ref())
    }

    /// Make `clip` the music channel's clip without starting it.
    pub fn cue_music(&mut self, clip: ClipId) {
        let clip = self.catalog.expect(clip);
        self.music.cue(clip);
    }

    /// Start the cued music clip. No-op when nothing is cued.
    pub fn resume_music(&mut self) -> BackendResult {
        let Some(current) = self.music.current() else {
            return Ok(());
        };
        let clip = self.catalog.expect(current);
        self.music.resume(self.backend.as_ref(), clip)
    }

    pub fn current_music(&self) -> Option<ClipId> {
        self.music.current()
    }

    pub fn is_music_playing(&self) -> bool {
        self.music.is_playing(self.backend.as_ref())
    }

    pub fn music_volume(&self) -> f32 {
        self.music.volume()
    }

    /// Linear volume, clamped to 0..=1. A running fade overrides it on the
    /// next `update`.
    pub fn set_music_volume(&mut self, volume: f32) -> BackendResult {
        self.music.set_volume(self.backend.as_ref(), clamp_volume(volume))
    }

    pub fn set_music_pitch(&mut self, pitch: f32) -> BackendResult {
        self.music.set_pitch(self.backend.as_ref(), pitch)
    }

    pub fn set_music_loop(&mut self, looping: bool) -> BackendResult {
        self.music.set_loop(self.backend.as_ref(), looping)
    }

    // ── Fades ───────────────────────────────────────────────────

    /// Start `clip` and fade it from the current music volume up to 1.0.
    pub fn fade_in_music(&mut self, clip: ClipId, duration_secs: f32) -> BackendResult {
        let start = self.music.volume();
        self.fade_in_music_with(clip, duration_secs, start, 1.0)
    }

    /// Start `clip` at `start_volume` and fade it to `end_volume`.
    pub fn fade_in_music_with(
        &mut self,
        clip: ClipId,
        duration_secs: f32,
        start_volume: f32,
        end_volume: f32,
    ) -> BackendResult {
        let clip = self.catalog.expect(clip);
        let (start, end) = (clamp_volume(start_volume), clamp_volume(end_volume));
        self.fades.cancel(ChannelId::Music);

        let backend = self.backend.as_ref();
        self.music.play(backend, clip)?;
        self.music.set_volume(backend, start)?;
        self.fades.start_fade(ChannelId::Music, duration_secs, start, end);
        Ok(())
    }

    /// Fade the music from its current volume down to silence.
    /// The clip keeps playing at volume 0.
    pub fn fade_out_music(&mut self, duration_secs: f32) {
        let start = self.music.volume();
        self.fade_out_music_with(duration_secs, start, 0.0);
    }

    pub fn fade_out_music_with(&mut self, duration_secs: f32, start_volume: f32, end_volume: f32) {
        let (start, end) = (clamp_volume(start_volume), clamp_volume(end_volume));
        self.fades.start_fade(ChannelId::Music, duration_secs, start, end);
    }

    /// Fade the current music out to silence, switch to `next`, and fade
    /// back in to the starting volume. Takes `2 * duration_secs` in total.
    pub fn crossfade_music(&mut self, next: ClipId, duration_secs: f32) {
        let start = self.music.volume();
        self.crossfade_music_with(next, duration_secs, start, 0.0);
    }

    pub fn crossfade_music_with(
        &mut self,
        next: ClipId,
        duration_secs: f32,
        start_volume: f32,
        end_volume: f32,
    ) {
        // Fail at the call site, not frames later when the switch fires
        self.catalog.expect(next);
        let (start, end) = (clamp_volume(start_volume), clamp_volume(end_volume));
        self.fades
            .start_crossfade(ChannelId::Music, next, duration_secs, start, end);
    }

    pub fn cancel_music_fade(&mut self) -> bool {
        self.fades.cancel(ChannelId::Music).is_some()
    }

    // ── Effects ─────────────────────────────────────────────────

    /// Play an effect on a free pool channel.
    ///
    /// Returns `None` when the pool is exhausted or the clip is already at
    /// its duplicate limit; the sound is dropped.
    ///
    /// # Panics
    /// If `clip` is not in the catalog.
    pub fn play_effect(&mut self, clip: ClipId, looping: bool) -> Option<ChannelId> {
        let clip = self.catalog.expect(clip);
        let backend = self.backend.as_ref();
        let index = self.pool.acquire(clip.id())?;
        let channel = self.pool.channel_mut(index)?;

        if let Err(e) = start_effect(backend, channel, clip, looping) {
            log::warn!(target: "audio::backend", "effect {:?} dropped: {}", clip.name(), e);
            // Never started, so nothing is sounding
            channel.clear();
            return None;
        }
        Some(ChannelId::Effect(index))
    }

    /// Reserve a pool channel for `clip` without starting it, at unity
    /// volume and pitch. Start it with `channel_control(id)` and
    /// `ChannelControl::play` before the next `update`, or it is reclaimed
    /// as finished.
    pub fn acquire_effect(&mut self, clip: ClipId) -> Option<ChannelId> {
        let clip = self.catalog.expect(clip);
        let backend = self.backend.as_ref();
        let index = self.pool.acquire(clip.id())?;
        let channel = self.pool.channel_mut(index)?;

        if let Err(e) = channel.reset_tuning(backend) {
            log::warn!(target: "audio::backend", "effect {:?} dropped: {}", clip.name(), e);
            channel.clear();
            return None;
        }
        Some(ChannelId::Effect(index))
    }

    /// Stop every pool channel playing `clip`. Returns how many stopped.
    pub fn stop_effect(&mut self, clip: ClipId) -> usize {
        self.pool.release_clip(self.backend.as_ref(), clip)
    }

    pub fn stop_all_effects(&mut self) -> usize {
        let stopped = self.pool.release_all(self.backend.as_ref());
        if stopped > 0 {
            log::debug!(target: "audio::engine", "stopped {} effects", stopped);
        }
        stopped
    }

    pub fn find_effect_channels(&self, clip: ClipId) -> impl Iterator<Item = ChannelId> + '_ {
        self.pool.find_by_clip(clip).map(ChannelId::Effect)
    }

    pub fn find_effect_channel(&self, clip: ClipId) -> Option<ChannelId> {
        self.find_effect_channels(clip).next()
    }

    pub fn effect_channel(&self, index: usize) -> Option<&Channel> {
        self.pool.channel(index)
    }

    // ── Spatial ─────────────────────────────────────────────────

    /// Play `clip` on a channel anchored to `entity`, routed to the clip's
    /// default bus.
    pub fn play_spatial(&mut self, entity: EntityId, clip: ClipId, looping: bool) -> Option<ChannelId> {
        let bus = self.catalog.expect(clip).kind().default_bus();
        self.play_spatial_on(entity, clip, bus, looping)
    }

    pub fn play_spatial_on(
        &mut self,
        entity: EntityId,
        clip: ClipId,
        bus: BusKind,
        looping: bool,
    ) -> Option<ChannelId> {
        let clip = self.catalog.expect(clip);
        match self
            .spatial
            .play_on_entity(self.backend.as_ref(), entity, clip, bus, looping)
        {
            Ok(slot) => Some(ChannelId::Spatial { entity, slot }),
            Err(e) => {
                log::warn!(
                    target: "audio::backend",
                    "spatial {:?} on entity {} dropped: {}",
                    clip.name(),
                    entity,
                    e
                );
                None
            }
        }
    }

    pub fn stop_spatial(&mut self, entity: EntityId, clip: ClipId) -> usize {
        self.spatial.stop_on_entity(self.backend.as_ref(), entity, clip)
    }

    pub fn stop_all_spatial(&mut self, entity: EntityId, bus: BusKind) -> usize {
        self.spatial.stop_all_on_entity(self.backend.as_ref(), entity, bus)
    }

    pub fn spatial_channels(&self, entity: EntityId) -> &[Channel] {
        self.spatial.channels(entity)
    }

    /// Drop an entity's bindings and any fades targeting them.
    pub fn forget_entity(&mut self, entity: EntityId) -> bool {
        let slots = self.spatial.channels(entity).len();
        for slot in 0..slots {
            self.fades.cancel(ChannelId::Spatial { entity, slot });
        }
        self.spatial.forget_entity(entity)
    }

    // ── Mixer ───────────────────────────────────────────────────

    pub fn set_bus_gain(&mut self, bus: BusKind, db: f32) -> BackendResult {
        self.mixer.set_gain(self.backend.as_ref(), bus, db)
    }

    pub fn bus_gain(&self, bus: BusKind) -> f32 {
        self.mixer.gain(bus)
    }

    // ── Channel access ──────────────────────────────────────────

    /// Tuning handle for a channel returned by one of the play calls.
    /// `None` for an out-of-range index, unknown entity or slot.
    pub fn channel_control(&mut self, id: ChannelId) -> Option<ChannelControl<'_>> {
        let channel = resolve_channel(&mut self.pool, &mut self.music, &mut self.spatial, id)?;
        Some(ChannelControl {
            backend: self.backend.as_ref(),
            catalog: &self.catalog,
            channel,
        })
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let backend = self.backend.as_ref();
        let music = self.music.channel();

        EngineSnapshot {
            bus_gains: BusKind::ALL.map(|bus| (bus, self.mixer.gain(bus))),
            music: MusicSnapshot {
                clip: music.clip(),
                name: music
                    .clip()
                    .and_then(|id| self.catalog.get(id))
                    .map(|c| c.name().to_string()),
                playing: music.is_playing(backend),
                volume: music.volume(),
                pitch: music.pitch(),
                looping: music.is_looping(),
            },
            effects: self
                .pool
                .channels()
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.is_free())
                .map(|(index, c)| EffectSnapshot {
                    index,
                    clip: c.clip(),
                    playing: c.is_playing(backend),
                    volume: c.volume(),
                    looping: c.is_looping(),
                })
                .collect(),
            effect_capacity: self.pool.capacity(),
            fades: self.fades.active().to_vec(),
            spatial: SpatialSnapshot {
                entities: self.spatial.entity_count(),
            },
        }
    }
}

fn resolve_channel<'a>(
    pool: &'a mut ChannelPool,
    music: &'a mut MusicChannel,
    spatial: &'a mut SpatialChannelBinder,
    id: ChannelId,
) -> Option<&'a mut Channel> {
    match id {
        ChannelId::Music => Some(music.channel_mut()),
        ChannelId::Effect(index) => pool.channel_mut(index),
        ChannelId::Spatial { entity, slot } => spatial.channel_mut(entity, slot),
    }
}

/// Per-call tuning from an earlier sound on the slot does not carry over.
fn start_effect(backend: &dyn AudioBackend, channel: &mut Channel, clip: &Clip, looping: bool) -> BackendResult {
    channel.reset_tuning(backend)?;
    channel.set_loop(backend, looping)?;
    channel.start(backend, clip)
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}
