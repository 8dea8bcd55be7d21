use jukebox_types::{BusKind, ClipId};
use serde::Serialize;

use crate::engine::fade::FadeTask;

/// Point-in-time view of the engine for diagnostics and tooling.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub bus_gains: [(BusKind, f32); 3],
    pub music: MusicSnapshot,
    /// Occupied pool channels only.
    pub effects: Vec<EffectSnapshot>,
    pub effect_capacity: usize,
    pub fades: Vec<FadeTask>,
    pub spatial: SpatialSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct MusicSnapshot {
    pub clip: Option<ClipId>,
    pub name: Option<String>,
    pub playing: bool,
    pub volume: f32,
    pub pitch: f32,
    pub looping: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectSnapshot {
    pub index: usize,
    pub clip: Option<ClipId>,
    pub playing: bool,
    pub volume: f32,
    pub looping: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpatialSnapshot {
    pub entities: usize,
}
