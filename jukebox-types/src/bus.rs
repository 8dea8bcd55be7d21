use serde::{Deserialize, Serialize};

/// Lowest gain accepted by a mixer bus, in decibels.
pub const MIN_BUS_DB: f32 = -80.0;

/// Highest gain accepted by a mixer bus, in decibels.
pub const MAX_BUS_DB: f32 = 20.0;

/// Named gain group a channel is routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusKind {
    Master,
    Music,
    Effects,
}

impl BusKind {
    pub const ALL: [BusKind; 3] = [BusKind::Master, BusKind::Music, BusKind::Effects];

    pub fn index(self) -> usize {
        match self {
            BusKind::Master => 0,
            BusKind::Music => 1,
            BusKind::Effects => 2,
        }
    }
}

impl std::fmt::Display for BusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BusKind::Master => "master",
            BusKind::Music => "music",
            BusKind::Effects => "effects",
        };
        f.write_str(name)
    }
}

/// Which catalog section a clip was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipKind {
    Music,
    Effect,
}

impl ClipKind {
    /// Bus a clip of this kind is routed to by default.
    pub fn default_bus(self) -> BusKind {
        match self {
            ClipKind::Music => BusKind::Music,
            ClipKind::Effect => BusKind::Effects,
        }
    }
}
