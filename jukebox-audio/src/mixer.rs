use jukebox_types::{BusKind, MAX_BUS_DB, MIN_BUS_DB};

use crate::engine::backend::{AudioBackend, BackendResult};

/// Gain control surface for the master, music and effects buses.
///
/// Gains are decibels (0 dB = unity). The backend owns the dB → linear
/// curve; this type only remembers what was last applied.
#[derive(Debug, Clone)]
pub struct MixerBus {
    gains: [f32; 3],
}

impl MixerBus {
    pub fn new() -> Self {
        Self { gains: [0.0; 3] }
    }

    /// Apply a bus gain, clamped to `MIN_BUS_DB..=MAX_BUS_DB`.
    ///
    /// The stored value only changes when the backend accepts it.
    pub fn set_gain(&mut self, backend: &dyn AudioBackend, bus: BusKind, db: f32) -> BackendResult {
        let clamped = clamp_db(db);
        if clamped != db {
            log::debug!(target: "audio::mixer", "{} gain {} dB clamped to {} dB", bus, db, clamped);
        }
        backend.set_bus_gain(bus, clamped)?;
        self.gains[bus.index()] = clamped;
        Ok(())
    }

    pub fn gain(&self, bus: BusKind) -> f32 {
        self.gains[bus.index()]
    }
}

impl Default for MixerBus {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn clamp_db(db: f32) -> f32 {
    if db.is_nan() {
        return MIN_BUS_DB;
    }
    db.clamp(MIN_BUS_DB, MAX_BUS_DB)
}
