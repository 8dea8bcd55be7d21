//! Clip catalog: stable identifiers for every loadable sound.
//!
//! The catalog is filled once at startup and is read-only afterwards.
//! Ids are dense indices assigned in load order, so lookups never compare
//! names.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jukebox_types::{ClipId, ClipKind};

use crate::error::AudioError;

/// Sub-directory of the clip root holding background music.
pub const MUSIC_DIR: &str = "music";
/// Sub-directory of the clip root holding sound effects.
pub const EFFECTS_DIR: &str = "effects";

/// An immutable, pre-loaded playable sound.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    id: ClipId,
    name: String,
    kind: ClipKind,
    duration: Duration,
    source: PathBuf,
}

impl Clip {
    pub fn new(
        id: ClipId,
        name: impl Into<String>,
        kind: ClipKind,
        duration: Duration,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            duration,
            source: source.into(),
        }
    }

    pub fn id(&self) -> ClipId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClipKind {
        self.kind
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Resource the backend decodes. Opaque to the engine.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Read-only mapping from `ClipId` to `Clip`.
#[derive(Debug, Clone, Default)]
pub struct ClipCatalog {
    clips: Vec<Clip>,
    by_name: HashMap<(ClipKind, String), ClipId>,
}

impl ClipCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Load every `.wav` file under `root/music` and `root/effects`.
    ///
    /// Files are taken in file-name order, music first, so ids are stable
    /// across runs for an unchanged asset tree. A missing sub-directory is
    /// treated as empty.
    pub fn load_dir(root: &Path) -> Result<Self, AudioError> {
        let mut builder = CatalogBuilder::default();
        for (dir, kind) in [(MUSIC_DIR, ClipKind::Music), (EFFECTS_DIR, ClipKind::Effect)] {
            let dir = root.join(dir);
            if !dir.is_dir() {
                log::debug!(target: "audio::catalog", "no clip directory at {}", dir.display());
                continue;
            }
            for path in wav_files(&dir)? {
                let duration = wav_duration(&path)?;
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                builder = builder.add(kind, name, duration, path);
            }
        }
        let catalog = builder.build();
        log::info!(
            target: "audio::catalog",
            "loaded {} music and {} effect clips from {}",
            catalog.music().count(),
            catalog.effects().count(),
            root.display()
        );
        Ok(catalog)
    }

    pub fn get(&self, id: ClipId) -> Option<&Clip> {
        self.clips.get(id.get() as usize)
    }

    /// Look up a clip that callers are required to know exists.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this catalog. Requesting an unknown
    /// clip is a programming error and must fail loudly.
    pub fn expect(&self, id: ClipId) -> &Clip {
        match self.get(id) {
            Some(clip) => clip,
            None => panic!(
                "unknown clip id {} (catalog holds {} clips)",
                id,
                self.clips.len()
            ),
        }
    }

    pub fn id_of(&self, kind: ClipKind, name: &str) -> Option<ClipId> {
        self.by_name.get(&(kind, name.to_string())).copied()
    }

    pub fn music_id(&self, name: &str) -> Option<ClipId> {
        self.id_of(ClipKind::Music, name)
    }

    pub fn effect_id(&self, name: &str) -> Option<ClipId> {
        self.id_of(ClipKind::Effect, name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    pub fn music(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter().filter(|c| c.kind == ClipKind::Music)
    }

    pub fn effects(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter().filter(|c| c.kind == ClipKind::Effect)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Builds a catalog in memory, assigning ids in insertion order.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    clips: Vec<Clip>,
}

impl CatalogBuilder {
    pub fn add(
        mut self,
        kind: ClipKind,
        name: impl Into<String>,
        duration: Duration,
        source: impl Into<PathBuf>,
    ) -> Self {
        let id = ClipId::new(self.clips.len() as u32);
        self.clips.push(Clip::new(id, name, kind, duration, source));
        self
    }

    pub fn music(self, name: &str, duration: Duration) -> Self {
        let source = Path::new(MUSIC_DIR).join(format!("{}.wav", name));
        self.add(ClipKind::Music, name, duration, source)
    }

    pub fn effect(self, name: &str, duration: Duration) -> Self {
        let source = Path::new(EFFECTS_DIR).join(format!("{}.wav", name));
        self.add(ClipKind::Effect, name, duration, source)
    }

    /// Finish the catalog. A later clip with the same kind and name shadows
    /// the earlier one for name lookups; both keep their ids.
    pub fn build(self) -> ClipCatalog {
        let mut by_name = HashMap::new();
        for clip in &self.clips {
            if by_name
                .insert((clip.kind, clip.name.clone()), clip.id)
                .is_some()
            {
                log::warn!(target: "audio::catalog", "duplicate clip name {:?}", clip.name);
            }
        }
        ClipCatalog {
            clips: self.clips,
            by_name,
        }
    }
}

fn wav_files(dir: &Path) -> Result<Vec<PathBuf>, AudioError> {
    let entries = std::fs::read_dir(dir).map_err(|e| AudioError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| AudioError::io(dir, e))?.path();
        let is_wav = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if path.is_file() && is_wav {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Duration of a WAV file from its header.
fn wav_duration(path: &Path) -> Result<Duration, AudioError> {
    let reader = hound::WavReader::open(path).map_err(|e| AudioError::wav(path, e))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Ok(Duration::ZERO);
    }
    let frames = reader.duration();
    Ok(Duration::from_secs_f64(frames as f64 / spec.sample_rate as f64))
}
