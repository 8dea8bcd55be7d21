mod session;

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use jukebox_audio::config::user_config_path;
use jukebox_audio::{AudioConfig, AudioEngine, ClipCatalog, SharedTestBackend, TestBackend};
use session::{Session, FRAME_SECS};

/// Write the session log beside the user config, or into the temp dir when
/// that is not writable. With neither, the demo runs unlogged.
fn init_logging(verbose: bool, seconds: f32) {
    use simplelog::*;

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    let config_path = user_config_path();

    let beside_config = config_path
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join("demo.log"));
    let opened = beside_config
        .into_iter()
        .chain(std::iter::once(std::env::temp_dir().join("jukebox-demo.log")))
        .find_map(|path| {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            File::create(&path).ok().map(|file| (path, file))
        });
    let Some((log_path, log_file)) = opened else {
        eprintln!("jukebox: no writable log location, running without a log");
        return;
    };

    // Engine logs are split by target (audio::pool, audio::fade, ...)
    let log_config = ConfigBuilder::new().set_target_level(LevelFilter::Error).build();
    if WriteLogger::init(level, log_config, log_file).is_err() {
        eprintln!("jukebox: logger already installed");
        return;
    }

    log::info!(
        target: "demo",
        "scripted session of {:.1}s, logging {:?} to {}",
        seconds,
        level,
        log_path.display()
    );
    match config_path {
        Some(path) if path.exists() => log::info!(target: "demo", "user config {}", path.display()),
        _ => log::info!(target: "demo", "no user config, built-in defaults only"),
    }
}

/// Clips used when the configured directory has nothing to offer.
fn builtin_catalog() -> ClipCatalog {
    ClipCatalog::builder()
        .music("title", Duration::from_secs(40))
        .music("battle", Duration::from_secs(55))
        .effect("shot", Duration::from_millis(350))
        .effect("engine", Duration::from_secs(3))
        .build()
}

fn load_catalog(config: &AudioConfig) -> ClipCatalog {
    let dir = config.clips_dir();
    match ClipCatalog::load_dir(&dir) {
        Ok(catalog) if !catalog.is_empty() => catalog,
        Ok(_) => {
            log::warn!("no clips under {}, using built-in clips", dir.display());
            builtin_catalog()
        }
        Err(e) => {
            log::warn!("cannot load clips from {}: {}", dir.display(), e);
            builtin_catalog()
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let json = args.iter().any(|a| a == "--json");
    let seconds: f32 = args
        .iter()
        .position(|a| a == "--seconds")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(12.0);
    init_logging(verbose, seconds);

    let config = AudioConfig::load();
    let catalog = load_catalog(&config);

    // Simulated device: playback time only moves when the session advances it
    let backend = Arc::new(TestBackend::new());
    let engine = match AudioEngine::new(
        Box::new(SharedTestBackend(Arc::clone(&backend))),
        catalog,
        &config.settings(),
    ) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("jukebox: {}", e);
            std::process::exit(1);
        }
    };

    let mut session = Session::new(engine, backend);
    let frames = (seconds / FRAME_SECS).ceil() as usize;
    let report_every = (1.0 / FRAME_SECS).round() as usize;

    for frame in 0..frames {
        session.step();
        if frame % report_every != 0 {
            continue;
        }
        let snapshot = session.engine().snapshot();
        if json {
            match serde_json::to_string(&snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => log::warn!("snapshot not serializable: {}", e),
            }
        } else {
            println!(
                "t={:5.2}s music={:<8} vol={:.2} effects={}/{} fades={}",
                session.time(),
                snapshot.music.name.as_deref().unwrap_or("-"),
                snapshot.music.volume,
                snapshot.effects.len(),
                snapshot.effect_capacity,
                snapshot.fades.len()
            );
        }
    }

    log::info!(target: "demo", "session finished after {:.2}s", session.time());
}
