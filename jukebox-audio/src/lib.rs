//! Playback core for game audio: one looped music channel with fades and
//! crossfades, a bounded pool of sound-effect channels with a per-clip
//! concurrency limit, and channels anchored to scene entities for
//! positional sound.
//!
//! The core never decodes or mixes samples. It drives an [`AudioBackend`]
//! and is advanced by the host once per frame through
//! [`AudioEngine::update`].

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod mixer;
pub mod snapshot;

pub use catalog::{Clip, ClipCatalog};
pub use config::{AudioConfig, EngineSettings};
pub use engine::backend::{
    AudioBackend, BackendError, BackendResult, ChannelHandle, NullBackend, SharedTestBackend,
    TestBackend, TestOp,
};
pub use engine::{AudioEngine, ChannelControl, ChannelId};
pub use error::AudioError;
pub use snapshot::EngineSnapshot;
