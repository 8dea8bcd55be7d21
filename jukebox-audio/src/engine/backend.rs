//! Audio backend trait: a semantic-level abstraction over the playback device.
//!
//! `AudioBackend` captures what the engine *means* to do (create a channel,
//! start a clip on it, change a bus gain) independently of how the host's
//! audio library does it. Decoding, mixing, and 3D attenuation all live
//! behind this trait. It also enables unit testing of allocation and fade
//! logic without an audio device.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use jukebox_types::{BusKind, EntityId};

use crate::catalog::Clip;

/// Result type for backend operations.
pub type BackendResult<T = ()> = Result<T, BackendError>;

/// A backend call the device refused, tagged with the call's name so log
/// lines read `play: channel busy` rather than a bare reason.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendError {
    call: &'static str,
    reason: String,
}

impl BackendError {
    pub fn new(call: &'static str, reason: impl Into<String>) -> Self {
        Self {
            call,
            reason: reason.into(),
        }
    }

    /// Name of the `AudioBackend` method that failed.
    pub fn call(&self) -> &'static str {
        self.call
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.call, self.reason)
    }
}

impl std::error::Error for BackendError {}

/// Opaque handle to a playback channel owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHandle(pub u32);

impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Semantic-level audio backend trait.
///
/// Implementations translate these calls into a concrete audio library
/// or record them for testing. Volumes are linear; bus gains are decibels
/// and converted by the backend itself.
pub trait AudioBackend: Send {
    /// Set the gain of a mixer bus, in decibels.
    fn set_bus_gain(&self, bus: BusKind, db: f32) -> BackendResult;

    /// Create a channel routed through `bus`.
    ///
    /// `anchor` is the scene entity for positional channels; `None` creates
    /// a flat (non-spatial) channel.
    fn create_channel(&self, bus: BusKind, anchor: Option<EntityId>) -> BackendResult<ChannelHandle>;

    /// Start `clip` on a channel from the beginning, replacing whatever it held.
    fn play(&self, channel: ChannelHandle, clip: &Clip) -> BackendResult;

    /// Halt playback on a channel.
    fn stop(&self, channel: ChannelHandle) -> BackendResult;

    fn set_loop(&self, channel: ChannelHandle, looping: bool) -> BackendResult;

    /// Set the linear channel volume (0.0..=1.0).
    fn set_volume(&self, channel: ChannelHandle, volume: f32) -> BackendResult;

    /// Set the playback pitch. Values are passed through unchecked.
    fn set_pitch(&self, channel: ChannelHandle, pitch: f32) -> BackendResult;

    /// Whether the channel is currently sounding. A one-shot clip that ran
    /// to its end reports `false`.
    fn is_playing(&self, channel: ChannelHandle) -> bool;
}

// ─── Test Backend ───────────────────────────────────────────────────

/// An operation recorded by `TestBackend` for assertion in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum TestOp {
    SetBusGain {
        bus: BusKind,
        db: f32,
    },
    CreateChannel {
        handle: ChannelHandle,
        bus: BusKind,
        anchor: Option<EntityId>,
    },
    Play {
        handle: ChannelHandle,
        clip: String,
    },
    Stop(ChannelHandle),
    SetLoop {
        handle: ChannelHandle,
        looping: bool,
    },
    SetVolume {
        handle: ChannelHandle,
        volume: f32,
    },
    SetPitch {
        handle: ChannelHandle,
        pitch: f32,
    },
}

impl TestOp {
    /// The `AudioBackend` method that produced this operation.
    pub fn call(&self) -> &'static str {
        match self {
            TestOp::SetBusGain { .. } => "set_bus_gain",
            TestOp::CreateChannel { .. } => "create_channel",
            TestOp::Play { .. } => "play",
            TestOp::Stop(_) => "stop",
            TestOp::SetLoop { .. } => "set_loop",
            TestOp::SetVolume { .. } => "set_volume",
            TestOp::SetPitch { .. } => "set_pitch",
        }
    }
}

/// Simulated state of one backend channel.
#[derive(Debug, Clone)]
pub struct SimChannel {
    pub bus: BusKind,
    pub anchor: Option<EntityId>,
    pub playing: bool,
    pub looping: bool,
    pub volume: f32,
    pub pitch: f32,
    /// Seconds played since the last `play`.
    pub position: f32,
    /// Length of the clip last started, in seconds.
    pub length: f32,
}

#[derive(Default)]
struct TestState {
    ops: Vec<TestOp>,
    channels: Vec<SimChannel>,
    failing: bool,
}

/// A test backend that records all operations and simulates playback time.
///
/// Channels only stop by themselves when `advance` moves a one-shot clip
/// past its length, or when `finish` is called. Uses `Mutex` for interior
/// mutability so the backend is `Send + Sync` (needed for `Arc<TestBackend>`
/// sharing).
pub struct TestBackend {
    state: Mutex<TestState>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TestState::default()),
        }
    }

    /// Return all recorded operations.
    pub fn operations(&self) -> Vec<TestOp> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Clear recorded operations. Simulated channel state is kept.
    pub fn clear(&self) {
        self.state.lock().unwrap().ops.clear();
    }

    /// Count operations matching a predicate.
    pub fn count<F: Fn(&TestOp) -> bool>(&self, f: F) -> usize {
        self.state.lock().unwrap().ops.iter().filter(|op| f(op)).count()
    }

    /// Find the first operation matching a predicate.
    pub fn find<F: Fn(&TestOp) -> bool>(&self, f: F) -> Option<TestOp> {
        self.state.lock().unwrap().ops.iter().find(|op| f(op)).cloned()
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    /// Snapshot of a simulated channel.
    pub fn channel(&self, handle: ChannelHandle) -> Option<SimChannel> {
        self.state
            .lock()
            .unwrap()
            .channels
            .get(handle.0 as usize)
            .cloned()
    }

    /// Number of channels created so far.
    pub fn channel_count(&self) -> usize {
        self.state.lock().unwrap().channels.len()
    }

    /// Number of channels currently sounding.
    pub fn playing_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .channels
            .iter()
            .filter(|c| c.playing)
            .count()
    }

    /// Force a channel to stop as if its clip reached the end.
    pub fn finish(&self, handle: ChannelHandle) {
        if let Some(ch) = self.state.lock().unwrap().channels.get_mut(handle.0 as usize) {
            ch.playing = false;
        }
    }

    /// Advance simulated playback time. One-shot clips whose position passes
    /// their length stop; looping clips wrap.
    pub fn advance(&self, delta_secs: f32) {
        let mut state = self.state.lock().unwrap();
        for ch in state.channels.iter_mut().filter(|c| c.playing) {
            ch.position += delta_secs;
            if ch.position >= ch.length {
                if ch.looping && ch.length > 0.0 {
                    ch.position %= ch.length;
                } else {
                    ch.playing = false;
                }
            }
        }
    }

    /// Last gain set on a bus, if any.
    pub fn bus_gain(&self, bus: BusKind) -> Option<f32> {
        self.state
            .lock()
            .unwrap()
            .ops
            .iter()
            .rev()
            .find_map(|op| match op {
                TestOp::SetBusGain { bus: b, db } if *b == bus => Some(*db),
                _ => None,
            })
    }

    fn record<T>(&self, op: TestOp, apply: impl FnOnce(&mut TestState) -> T) -> BackendResult<T> {
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(BackendError::new(op.call(), "rejected by test backend"));
        }
        state.ops.push(op);
        Ok(apply(&mut state))
    }

    fn with_channel(&self, op: TestOp, handle: ChannelHandle, f: impl FnOnce(&mut SimChannel)) -> BackendResult {
        let call = op.call();
        self.record(op, |state| state.channels.get_mut(handle.0 as usize).map(f))?
            .ok_or_else(|| BackendError::new(call, format!("no channel {}", handle)))
    }
}

impl AudioBackend for TestBackend {
    fn set_bus_gain(&self, bus: BusKind, db: f32) -> BackendResult {
        self.record(TestOp::SetBusGain { bus, db }, |_| ())
    }

    fn create_channel(&self, bus: BusKind, anchor: Option<EntityId>) -> BackendResult<ChannelHandle> {
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(BackendError::new("create_channel", "rejected by test backend"));
        }
        let handle = ChannelHandle(state.channels.len() as u32);
        state.channels.push(SimChannel {
            bus,
            anchor,
            playing: false,
            looping: false,
            volume: 1.0,
            pitch: 1.0,
            position: 0.0,
            length: 0.0,
        });
        state.ops.push(TestOp::CreateChannel { handle, bus, anchor });
        Ok(handle)
    }

    fn play(&self, channel: ChannelHandle, clip: &Clip) -> BackendResult {
        let length = clip.duration().as_secs_f32();
        let op = TestOp::Play {
            handle: channel,
            clip: clip.name().to_string(),
        };
        self.with_channel(op, channel, |ch| {
            ch.playing = true;
            ch.position = 0.0;
            ch.length = length;
        })
    }

    fn stop(&self, channel: ChannelHandle) -> BackendResult {
        self.with_channel(TestOp::Stop(channel), channel, |ch| ch.playing = false)
    }

    fn set_loop(&self, channel: ChannelHandle, looping: bool) -> BackendResult {
        let op = TestOp::SetLoop {
            handle: channel,
            looping,
        };
        self.with_channel(op, channel, |ch| ch.looping = looping)
    }

    fn set_volume(&self, channel: ChannelHandle, volume: f32) -> BackendResult {
        let op = TestOp::SetVolume {
            handle: channel,
            volume,
        };
        self.with_channel(op, channel, |ch| ch.volume = volume)
    }

    fn set_pitch(&self, channel: ChannelHandle, pitch: f32) -> BackendResult {
        let op = TestOp::SetPitch {
            handle: channel,
            pitch,
        };
        self.with_channel(op, channel, |ch| ch.pitch = pitch)
    }

    fn is_playing(&self, channel: ChannelHandle) -> bool {
        self.state
            .lock()
            .unwrap()
            .channels
            .get(channel.0 as usize)
            .is_some_and(|ch| ch.playing)
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps `Arc<TestBackend>` to implement `AudioBackend` so the engine can
/// own a `Box<dyn AudioBackend>` while tests retain an `Arc` for assertions.
pub struct SharedTestBackend(pub Arc<TestBackend>);

impl AudioBackend for SharedTestBackend {
    fn set_bus_gain(&self, bus: BusKind, db: f32) -> BackendResult {
        self.0.set_bus_gain(bus, db)
    }
    fn create_channel(&self, bus: BusKind, anchor: Option<EntityId>) -> BackendResult<ChannelHandle> {
        self.0.create_channel(bus, anchor)
    }
    fn play(&self, channel: ChannelHandle, clip: &Clip) -> BackendResult {
        self.0.play(channel, clip)
    }
    fn stop(&self, channel: ChannelHandle) -> BackendResult {
        self.0.stop(channel)
    }
    fn set_loop(&self, channel: ChannelHandle, looping: bool) -> BackendResult {
        self.0.set_loop(channel, looping)
    }
    fn set_volume(&self, channel: ChannelHandle, volume: f32) -> BackendResult {
        self.0.set_volume(channel, volume)
    }
    fn set_pitch(&self, channel: ChannelHandle, pitch: f32) -> BackendResult {
        self.0.set_pitch(channel, pitch)
    }
    fn is_playing(&self, channel: ChannelHandle) -> bool {
        self.0.is_playing(channel)
    }
}

// ─── NullBackend ────────────────────────────────────────────────────

/// A no-op backend that silently succeeds. Nothing ever reports as
/// playing, so every effect channel is reclaimed on the next update.
/// Useful as a default when no audio device is available.
pub struct NullBackend {
    next_handle: AtomicU32,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU32::new(0),
        }
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for NullBackend {
    fn set_bus_gain(&self, _: BusKind, _: f32) -> BackendResult { Ok(()) }
    fn create_channel(&self, _: BusKind, _: Option<EntityId>) -> BackendResult<ChannelHandle> {
        Ok(ChannelHandle(self.next_handle.fetch_add(1, Ordering::Relaxed)))
    }
    fn play(&self, _: ChannelHandle, _: &Clip) -> BackendResult { Ok(()) }
    fn stop(&self, _: ChannelHandle) -> BackendResult { Ok(()) }
    fn set_loop(&self, _: ChannelHandle, _: bool) -> BackendResult { Ok(()) }
    fn set_volume(&self, _: ChannelHandle, _: f32) -> BackendResult { Ok(()) }
    fn set_pitch(&self, _: ChannelHandle, _: f32) -> BackendResult { Ok(()) }
    fn is_playing(&self, _: ChannelHandle) -> bool { false }
}
