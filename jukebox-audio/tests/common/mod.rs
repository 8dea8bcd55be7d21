#![allow(dead_code)]
//! Test harness utilities for jukebox-audio integration tests.

use std::sync::Arc;
use std::time::Duration;

use jukebox_audio::{AudioEngine, ClipCatalog, EngineSettings, SharedTestBackend, TestBackend};
use jukebox_types::ClipId;

/// Catalog with two music tracks and three effects of known lengths.
pub fn make_test_catalog() -> ClipCatalog {
    ClipCatalog::builder()
        .music("title", Duration::from_secs(30))
        .music("battle", Duration::from_secs(45))
        .effect("shot", Duration::from_millis(500))
        .effect("coin", Duration::from_secs(1))
        .effect("engine", Duration::from_secs(2))
        .build()
}

/// Build an engine over a shared `TestBackend` so tests can inspect
/// operations and move simulated playback time.
pub fn make_engine(settings: EngineSettings) -> (AudioEngine, Arc<TestBackend>) {
    let backend = Arc::new(TestBackend::new());
    let engine = AudioEngine::new(
        Box::new(SharedTestBackend(Arc::clone(&backend))),
        make_test_catalog(),
        &settings,
    )
    .unwrap();
    (engine, backend)
}

pub fn make_default_engine() -> (AudioEngine, Arc<TestBackend>) {
    make_engine(EngineSettings::default())
}

pub fn music(engine: &AudioEngine, name: &str) -> ClipId {
    engine
        .catalog()
        .music_id(name)
        .unwrap_or_else(|| panic!("no music clip {:?}", name))
}

pub fn effect(engine: &AudioEngine, name: &str) -> ClipId {
    engine
        .catalog()
        .effect_id(name)
        .unwrap_or_else(|| panic!("no effect clip {:?}", name))
}

/// Move simulated time and tick the engine, one frame at a time.
pub fn run_frames(engine: &mut AudioEngine, backend: &TestBackend, frames: usize, frame_secs: f32) {
    for _ in 0..frames {
        backend.advance(frame_secs);
        engine.update(frame_secs);
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
