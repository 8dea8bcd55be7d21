mod common;

use jukebox_audio::{ChannelId, EngineSettings, TestOp};

fn tight_settings() -> EngineSettings {
    EngineSettings {
        effect_capacity: 2,
        duplicate_limit: 1,
        ..EngineSettings::default()
    }
}

#[test]
fn test_capacity_two_limit_one() {
    let (mut engine, _backend) = common::make_engine(tight_settings());
    let x = common::effect(&engine, "shot");

    assert_eq!(engine.play_effect(x, false), Some(ChannelId::Effect(0)));
    assert_eq!(engine.play_effect(x, false), None);
    assert_eq!(engine.play_effect(x, false), None);

    // No playback progress: nothing is reclaimed
    engine.update(0.0);
    assert_eq!(engine.pool().occupied(), 1);
    assert_eq!(engine.find_effect_channels(x).collect::<Vec<_>>(), vec![ChannelId::Effect(0)]);
}

#[test]
fn test_rejected_request_leaves_pool_untouched() {
    let (mut engine, backend) = common::make_engine(tight_settings());
    let x = common::effect(&engine, "shot");
    engine.play_effect(x, false);
    backend.clear();

    assert_eq!(engine.play_effect(x, false), None);
    assert!(backend.operations().is_empty());
    assert_eq!(engine.pool().occupied(), 1);
}

#[test]
fn test_pool_exhaustion_drops_new_sounds() {
    let (mut engine, _backend) = common::make_engine(tight_settings());
    let shot = common::effect(&engine, "shot");
    let coin = common::effect(&engine, "coin");
    let engine_clip = common::effect(&engine, "engine");

    assert!(engine.play_effect(shot, false).is_some());
    assert!(engine.play_effect(coin, false).is_some());
    assert_eq!(engine.play_effect(engine_clip, false), None);
    assert_eq!(engine.pool().occupied(), engine.pool().capacity());
}

#[test]
fn test_finished_channel_is_reused_next_frame() {
    let (mut engine, backend) = common::make_engine(tight_settings());
    let shot = common::effect(&engine, "shot");
    let coin = common::effect(&engine, "coin");

    engine.play_effect(shot, false);
    engine.play_effect(coin, false);

    // Shot is 0.5s long; one frame past that it has ended
    common::run_frames(&mut engine, &backend, 1, 0.6);
    assert_eq!(engine.find_effect_channel(shot), None);
    assert_eq!(engine.play_effect(shot, false), Some(ChannelId::Effect(0)));
}

#[test]
fn test_looped_effect_is_never_reclaimed() {
    let (mut engine, backend) = common::make_default_engine();
    let engine_clip = common::effect(&engine, "engine");

    let id = engine.play_effect(engine_clip, true).unwrap();
    common::run_frames(&mut engine, &backend, 10, 1.0);

    assert_eq!(engine.find_effect_channel(engine_clip), Some(id));
    let ChannelId::Effect(index) = id else {
        panic!("expected a pool channel, got {:?}", id);
    };
    assert!(engine.effect_channel(index).unwrap().is_looping());
}

#[test]
fn test_duplicate_limit_never_exceeded() {
    let (mut engine, backend) = common::make_default_engine();
    let coin = common::effect(&engine, "coin");
    let limit = engine.pool().duplicate_limit();

    for _ in 0..20 {
        engine.play_effect(coin, false);
        assert!(engine.find_effect_channels(coin).count() <= limit);
        common::run_frames(&mut engine, &backend, 1, 0.1);
    }
}

#[test]
fn test_stop_all_effects_twice_equals_once() {
    let (mut engine, backend) = common::make_default_engine();
    let shot = common::effect(&engine, "shot");
    let coin = common::effect(&engine, "coin");
    engine.play_effect(shot, true);
    engine.play_effect(coin, false);

    assert_eq!(engine.stop_all_effects(), 2);
    let after_first = engine.snapshot();
    backend.clear();

    assert_eq!(engine.stop_all_effects(), 0);
    assert!(backend.operations().is_empty());
    assert_eq!(engine.snapshot().effects.len(), after_first.effects.len());
    assert_eq!(backend.playing_count(), 0);
}

#[test]
fn test_stop_effect_targets_one_clip() {
    let (mut engine, backend) = common::make_default_engine();
    let shot = common::effect(&engine, "shot");
    let coin = common::effect(&engine, "coin");
    engine.play_effect(shot, false);
    engine.play_effect(shot, false);
    engine.play_effect(coin, false);

    assert_eq!(engine.stop_effect(shot), 2);
    assert_eq!(engine.find_effect_channels(shot).count(), 0);
    assert_eq!(engine.find_effect_channel(coin), Some(ChannelId::Effect(2)));
    assert_eq!(backend.count(|op| matches!(op, TestOp::Stop(_))), 2);
}

#[test]
fn test_acquired_effect_can_be_started_through_control() {
    let (mut engine, backend) = common::make_default_engine();
    let coin = common::effect(&engine, "coin");

    let id = engine.acquire_effect(coin).unwrap();
    let mut control = engine.channel_control(id).unwrap();
    assert_eq!(control.clip(), Some(coin));
    assert!(!control.is_playing());
    control.set_loop(true).unwrap();
    control.play().unwrap();
    assert!(control.is_playing());

    common::run_frames(&mut engine, &backend, 3, 1.0);
    assert_eq!(engine.find_effect_channel(coin), Some(id));
    assert!(engine.channel_control(id).unwrap().is_playing());
    assert_eq!(backend.count(|op| matches!(op, TestOp::Play { clip, .. } if clip == "coin")), 1);
}

#[test]
fn test_acquired_effect_left_unstarted_is_reclaimed() {
    let (mut engine, _backend) = common::make_default_engine();
    let coin = common::effect(&engine, "coin");

    engine.acquire_effect(coin).unwrap();
    engine.update(0.0);
    assert_eq!(engine.find_effect_channel(coin), None);
}

#[test]
fn test_reused_slot_starts_at_unity_volume_and_pitch() {
    let (mut engine, backend) = common::make_engine(EngineSettings {
        effect_capacity: 1,
        ..EngineSettings::default()
    });
    let shot = common::effect(&engine, "shot");
    let coin = common::effect(&engine, "coin");

    let id = engine.play_effect(shot, false).unwrap();
    let mut control = engine.channel_control(id).unwrap();
    control.set_volume(0.1).unwrap();
    control.set_pitch(3.0).unwrap();

    common::run_frames(&mut engine, &backend, 1, 0.6);
    assert_eq!(engine.play_effect(coin, false), Some(id));

    let control = engine.channel_control(id).unwrap();
    assert_eq!(control.volume(), 1.0);
    assert_eq!(control.pitch(), 1.0);
    let sim = backend.channel(control.handle()).unwrap();
    assert_eq!(sim.volume, 1.0);
    assert_eq!(sim.pitch, 1.0);
}

#[test]
fn test_acquire_resets_tuning_of_previous_sound() {
    let (mut engine, backend) = common::make_engine(EngineSettings {
        effect_capacity: 1,
        ..EngineSettings::default()
    });
    let shot = common::effect(&engine, "shot");
    let coin = common::effect(&engine, "coin");

    let id = engine.play_effect(shot, false).unwrap();
    engine.channel_control(id).unwrap().set_pitch(0.5).unwrap();
    common::run_frames(&mut engine, &backend, 1, 0.6);

    let id = engine.acquire_effect(coin).unwrap();
    let control = engine.channel_control(id).unwrap();
    assert_eq!(control.pitch(), 1.0);
    assert_eq!(backend.channel(control.handle()).unwrap().pitch, 1.0);
}

#[test]
fn test_refused_stop_keeps_effect_tracked() {
    let (mut engine, backend) = common::make_default_engine();
    let coin = common::effect(&engine, "coin");
    let id = engine.play_effect(coin, true).unwrap();

    backend.set_failing(true);
    assert_eq!(engine.stop_all_effects(), 0);
    backend.set_failing(false);

    // The looped coin is still sounding and still owns its slot
    assert_eq!(backend.playing_count(), 1);
    assert_eq!(engine.pool().occupied(), 1);
    engine.update(0.0);
    assert_eq!(engine.find_effect_channel(coin), Some(id));

    assert_eq!(engine.stop_all_effects(), 1);
    assert_eq!(backend.playing_count(), 0);
    assert_eq!(engine.pool().occupied(), 0);
}

#[test]
fn test_out_of_range_effect_channel() {
    let (engine, _backend) = common::make_default_engine();
    assert!(engine.effect_channel(15).is_none());
    assert!(engine.effect_channel(14).unwrap().is_free());
}
