use std::sync::Arc;

use jukebox_audio::{AudioEngine, TestBackend};
use jukebox_types::{BusKind, EntityId};

pub const FRAME_SECS: f32 = 1.0 / 60.0;

const CAR: EntityId = EntityId::new(7);

/// One scripted host request.
#[derive(Debug, Clone)]
pub enum Cue {
    FadeInMusic { name: &'static str, secs: f32 },
    Effect { name: &'static str, repeat: usize },
    Spatial { entity: EntityId, name: &'static str, looping: bool },
    Crossfade { name: &'static str, secs: f32 },
    StopEffects,
    StopSpatial { entity: EntityId },
    FadeOutMusic { secs: f32 },
}

fn default_script() -> Vec<(f32, Cue)> {
    vec![
        (0.0, Cue::FadeInMusic { name: "title", secs: 2.0 }),
        // Four requests against a duplicate limit of three
        (1.0, Cue::Effect { name: "shot", repeat: 4 }),
        (3.0, Cue::Spatial { entity: CAR, name: "engine", looping: true }),
        (5.0, Cue::Crossfade { name: "battle", secs: 1.5 }),
        (6.0, Cue::Effect { name: "shot", repeat: 2 }),
        (9.0, Cue::StopEffects),
        (9.0, Cue::StopSpatial { entity: CAR }),
        (9.5, Cue::FadeOutMusic { secs: 2.0 }),
    ]
}

/// Drives an engine through a fixed timeline, one frame per `step`.
pub struct Session {
    engine: AudioEngine,
    backend: Arc<TestBackend>,
    script: Vec<(f32, Cue)>,
    next_cue: usize,
    time: f32,
}

impl Session {
    pub fn new(engine: AudioEngine, backend: Arc<TestBackend>) -> Self {
        Self::with_script(engine, backend, default_script())
    }

    pub fn with_script(engine: AudioEngine, backend: Arc<TestBackend>, script: Vec<(f32, Cue)>) -> Self {
        Self {
            engine,
            backend,
            script,
            next_cue: 0,
            time: 0.0,
        }
    }

    pub fn engine(&self) -> &AudioEngine {
        &self.engine
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance simulated playback by one frame, tick the engine, then fire
    /// every cue that has come due.
    pub fn step(&mut self) {
        self.backend.advance(FRAME_SECS);
        self.engine.update(FRAME_SECS);

        while let Some((at, cue)) = self.script.get(self.next_cue) {
            if *at > self.time {
                break;
            }
            let cue = cue.clone();
            self.next_cue += 1;
            self.fire(cue);
        }

        self.time += FRAME_SECS;
    }

    fn fire(&mut self, cue: Cue) {
        log::debug!("t={:.2}s cue {:?}", self.time, cue);
        let catalog = self.engine.catalog();

        let result = match cue {
            Cue::FadeInMusic { name, secs } => match catalog.music_id(name) {
                Some(id) => self.engine.fade_in_music_with(id, secs, 0.0, 1.0),
                None => return missing(name),
            },
            Cue::Effect { name, repeat } => {
                let Some(id) = catalog.effect_id(name) else {
                    return missing(name);
                };
                let played = (0..repeat)
                    .filter(|_| self.engine.play_effect(id, false).is_some())
                    .count();
                if played < repeat {
                    log::info!("{} of {} {:?} requests dropped", repeat - played, repeat, name);
                }
                Ok(())
            }
            Cue::Spatial { entity, name, looping } => {
                let Some(id) = catalog.effect_id(name) else {
                    return missing(name);
                };
                self.engine.play_spatial(entity, id, looping);
                Ok(())
            }
            Cue::Crossfade { name, secs } => {
                let Some(id) = catalog.music_id(name) else {
                    return missing(name);
                };
                self.engine.crossfade_music(id, secs);
                Ok(())
            }
            Cue::StopEffects => {
                self.engine.stop_all_effects();
                Ok(())
            }
            Cue::StopSpatial { entity } => {
                self.engine.stop_all_spatial(entity, BusKind::Effects);
                Ok(())
            }
            Cue::FadeOutMusic { secs } => {
                self.engine.fade_out_music(secs);
                Ok(())
            }
        };

        if let Err(e) = result {
            log::warn!("cue failed: {}", e);
        }
    }
}

fn missing(name: &str) {
    log::warn!("clip {:?} not in catalog, cue skipped", name);
}
