//! # jukebox-types
//!
//! Shared identifiers for the jukebox playback core.
//! Hosts depend on this crate to name clips, entities and buses without
//! pulling in the engine itself.

mod bus;

pub use bus::{BusKind, ClipKind, MAX_BUS_DB, MIN_BUS_DB};

/// Stable identifier for a loaded clip.
///
/// Assigned by the clip catalog at load time and never reused for a
/// different clip while the catalog lives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ClipId(u32);

impl ClipId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a host scene entity that spatial channels are anchored to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_id_serializes_transparently() {
        let json = serde_json::to_string(&ClipId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: ClipId = serde_json::from_str("7").unwrap();
        assert_eq!(back, ClipId::new(7));
    }

    #[test]
    fn entity_id_display() {
        assert_eq!(EntityId::new(42).to_string(), "42");
    }
}
