mod common;

use jukebox_audio::{ChannelId, TestOp};
use common::approx;

#[test]
fn test_fade_out_two_seconds() {
    let (mut engine, _backend) = common::make_default_engine();
    let title = common::music(&engine, "title");
    engine.play_music(title).unwrap();

    engine.fade_out_music_with(2.0, 1.0, 0.0);
    engine.update(1.0);
    assert!(approx(engine.music_volume(), 0.5));
    assert!(engine.fades().is_fading(ChannelId::Music));

    engine.update(1.0);
    assert!(approx(engine.music_volume(), 0.0));
    assert!(engine.fades().is_empty());
    // Fading out does not stop the clip
    assert_eq!(engine.current_music(), Some(title));
}

#[test]
fn test_default_fade_out_starts_from_current_volume() {
    let (mut engine, _backend) = common::make_default_engine();
    let title = common::music(&engine, "title");
    engine.play_music(title).unwrap();
    engine.set_music_volume(0.6).unwrap();

    engine.fade_out_music(1.0);
    let task = engine.fades().task(ChannelId::Music).unwrap();
    assert!(approx(task.start_volume(), 0.6));
    assert!(approx(task.end_volume(), 0.0));
}

#[test]
fn test_fade_in_starts_clip_at_start_volume() {
    let (mut engine, backend) = common::make_default_engine();
    let battle = common::music(&engine, "battle");

    engine.fade_in_music_with(battle, 1.0, 0.2, 0.8).unwrap();
    assert!(engine.is_music_playing());
    assert!(approx(engine.music_volume(), 0.2));

    common::run_frames(&mut engine, &backend, 4, 0.25);
    assert!(approx(engine.music_volume(), 0.8));
    assert!(engine.fades().is_empty());
}

#[test]
fn test_crossfade_switches_between_phases() {
    let (mut engine, _backend) = common::make_default_engine();
    let title = common::music(&engine, "title");
    let battle = common::music(&engine, "battle");
    engine.play_music(title).unwrap();
    engine.set_music_volume(0.8).unwrap();

    engine.crossfade_music(battle, 1.0);

    engine.update(0.5);
    assert!(approx(engine.music_volume(), 0.4));
    assert_eq!(engine.current_music(), Some(title));

    engine.update(0.5);
    assert!(approx(engine.music_volume(), 0.0));
    assert_eq!(engine.current_music(), Some(battle));
    assert!(engine.is_music_playing());

    engine.update(0.5);
    assert!(approx(engine.music_volume(), 0.4));

    engine.update(0.5);
    assert!(approx(engine.music_volume(), 0.8));
    assert!(engine.fades().is_empty());
}

#[test]
fn test_new_fade_cancels_pending_switch() {
    let (mut engine, _backend) = common::make_default_engine();
    let title = common::music(&engine, "title");
    let battle = common::music(&engine, "battle");
    engine.play_music(title).unwrap();

    engine.crossfade_music(battle, 1.0);
    engine.update(0.5);
    engine.fade_out_music(1.0);
    engine.update(2.0);

    assert_eq!(engine.current_music(), Some(title));
    assert!(engine.fades().is_empty());
}

#[test]
fn test_stop_music_cancels_fade() {
    let (mut engine, backend) = common::make_default_engine();
    let title = common::music(&engine, "title");
    engine.fade_in_music(title, 2.0).unwrap();

    engine.stop_music().unwrap();
    assert!(engine.fades().is_empty());
    assert_eq!(engine.current_music(), None);

    backend.clear();
    engine.update(1.0);
    assert_eq!(backend.count(|op| matches!(op, TestOp::SetVolume { .. })), 0);
}

#[test]
fn test_zero_duration_fade_lands_next_update() {
    let (mut engine, _backend) = common::make_default_engine();
    let title = common::music(&engine, "title");
    engine.play_music(title).unwrap();

    engine.fade_out_music(0.0);
    engine.update(0.0);
    assert!(approx(engine.music_volume(), 0.0));
    assert!(engine.fades().is_empty());
}

#[test]
fn test_fade_volumes_are_clamped() {
    let (mut engine, _backend) = common::make_default_engine();
    engine.fade_out_music_with(1.0, 3.0, -1.0);

    let task = engine.fades().task(ChannelId::Music).unwrap();
    assert_eq!(task.start_volume(), 1.0);
    assert_eq!(task.end_volume(), 0.0);
}

#[test]
fn test_cue_then_resume() {
    let (mut engine, _backend) = common::make_default_engine();
    let battle = common::music(&engine, "battle");

    engine.cue_music(battle);
    assert_eq!(engine.current_music(), Some(battle));
    assert!(!engine.is_music_playing());

    engine.resume_music().unwrap();
    assert!(engine.is_music_playing());
}

#[test]
fn test_music_pitch_and_bus_gain() {
    let (mut engine, backend) = common::make_default_engine();
    engine.set_music_pitch(-2.5).unwrap();
    assert_eq!(engine.music().pitch(), -2.5);

    engine.set_bus_gain(jukebox_types::BusKind::Music, -100.0).unwrap();
    assert_eq!(engine.bus_gain(jukebox_types::BusKind::Music), -80.0);
    assert_eq!(backend.bus_gain(jukebox_types::BusKind::Music), Some(-80.0));
}

#[test]
#[should_panic(expected = "unknown clip id")]
fn test_crossfade_to_unknown_clip_panics() {
    let (mut engine, _backend) = common::make_default_engine();
    engine.crossfade_music(jukebox_types::ClipId::new(999), 1.0);
}

#[test]
fn test_one_shot_music_and_manual_cancel() {
    let (mut engine, backend) = common::make_default_engine();
    let title = common::music(&engine, "title");
    engine.set_music_loop(false).unwrap();
    engine.fade_in_music_with(title, 4.0, 0.0, 1.0).unwrap();

    engine.update(1.0);
    assert!(engine.cancel_music_fade());
    assert!(!engine.cancel_music_fade());
    engine.update(1.0);
    assert!(approx(engine.music_volume(), 0.25));

    // Title is 30s long and no longer loops
    common::run_frames(&mut engine, &backend, 31, 1.0);
    assert!(!engine.is_music_playing());
    assert_eq!(engine.current_music(), Some(title));
}
