use std::path::{Path, PathBuf};

use jukebox_types::BusKind;
use serde::Deserialize;

use crate::engine::pool::{DEFAULT_DUPLICATE_LIMIT, DEFAULT_EFFECT_CAPACITY};
use crate::error::AudioError;
use crate::mixer::clamp_db;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Upper bound on the effect pool size accepted from configuration.
pub const MAX_EFFECT_CAPACITY: usize = 256;

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    channels: ChannelsConfig,
    #[serde(default)]
    buses: BusesConfig,
    #[serde(default)]
    clips: ClipsConfig,
}

#[derive(Deserialize, Default)]
struct ChannelsConfig {
    effect_capacity: Option<usize>,
    duplicate_limit: Option<usize>,
}

#[derive(Deserialize, Default)]
struct BusesConfig {
    master_db: Option<f32>,
    music_db: Option<f32>,
    effects_db: Option<f32>,
}

#[derive(Deserialize, Default)]
struct ClipsConfig {
    dir: Option<PathBuf>,
}

/// Everything `AudioEngine::new` needs besides the backend and catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub effect_capacity: usize,
    pub duplicate_limit: usize,
    pub master_db: f32,
    pub music_db: f32,
    pub effects_db: f32,
}

impl EngineSettings {
    pub fn bus_gain(&self, bus: BusKind) -> f32 {
        match bus {
            BusKind::Master => self.master_db,
            BusKind::Music => self.music_db,
            BusKind::Effects => self.effects_db,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            effect_capacity: DEFAULT_EFFECT_CAPACITY,
            duplicate_limit: DEFAULT_DUPLICATE_LIMIT,
            master_db: 0.0,
            music_db: 0.0,
            effects_db: 0.0,
        }
    }
}

/// Layered configuration: embedded defaults, then the user's file.
pub struct AudioConfig {
    channels: ChannelsConfig,
    buses: BusesConfig,
    clips: ClipsConfig,
}

impl AudioConfig {
    /// Load the embedded defaults and merge `~/.config/jukebox/config.toml`
    /// when present. A malformed user file is logged and ignored.
    pub fn load() -> Self {
        let mut config = Self::defaults();

        if let Some(path) = user_config_path() {
            if path.exists() {
                if let Err(e) = config.merge_file(&path) {
                    log::warn!(target: "config", "ignoring config {}: {}", path.display(), e);
                }
            }
        }

        config
    }

    /// The embedded defaults alone.
    pub fn defaults() -> Self {
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        Self {
            channels: base.channels,
            buses: base.buses,
            clips: base.clips,
        }
    }

    /// Merge the keys set in a TOML file over the current values.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), AudioError> {
        let contents = std::fs::read_to_string(path).map_err(|e| AudioError::io(path, e))?;
        self.merge_str(&contents)
    }

    /// Merge the keys set in a TOML document over the current values.
    pub fn merge_str(&mut self, contents: &str) -> Result<(), AudioError> {
        let user: ConfigFile = toml::from_str(contents)?;
        merge_channels(&mut self.channels, user.channels);
        merge_buses(&mut self.buses, user.buses);
        if user.clips.dir.is_some() {
            self.clips.dir = user.clips.dir;
        }
        Ok(())
    }

    /// Effect pool size, clamped to 1..=MAX_EFFECT_CAPACITY.
    pub fn effect_capacity(&self) -> usize {
        self.channels
            .effect_capacity
            .unwrap_or(DEFAULT_EFFECT_CAPACITY)
            .clamp(1, MAX_EFFECT_CAPACITY)
    }

    /// Per-clip concurrency limit, at least 1.
    pub fn duplicate_limit(&self) -> usize {
        self.channels
            .duplicate_limit
            .unwrap_or(DEFAULT_DUPLICATE_LIMIT)
            .max(1)
    }

    /// Configured gain for a bus, clamped to the accepted dB range.
    pub fn bus_gain(&self, bus: BusKind) -> f32 {
        let db = match bus {
            BusKind::Master => self.buses.master_db,
            BusKind::Music => self.buses.music_db,
            BusKind::Effects => self.buses.effects_db,
        };
        clamp_db(db.unwrap_or(0.0))
    }

    pub fn clips_dir(&self) -> PathBuf {
        self.clips
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("assets/audio"))
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            effect_capacity: self.effect_capacity(),
            duplicate_limit: self.duplicate_limit(),
            master_db: self.bus_gain(BusKind::Master),
            music_db: self.bus_gain(BusKind::Music),
            effects_db: self.bus_gain(BusKind::Effects),
        }
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("jukebox").join("config.toml"))
}

fn merge_channels(base: &mut ChannelsConfig, user: ChannelsConfig) {
    if user.effect_capacity.is_some() {
        base.effect_capacity = user.effect_capacity;
    }
    if user.duplicate_limit.is_some() {
        base.duplicate_limit = user.duplicate_limit;
    }
}

fn merge_buses(base: &mut BusesConfig, user: BusesConfig) {
    if user.master_db.is_some() {
        base.master_db = user.master_db;
    }
    if user.music_db.is_some() {
        base.music_db = user.music_db;
    }
    if user.effects_db.is_some() {
        base.effects_db = user.effects_db;
    }
}
