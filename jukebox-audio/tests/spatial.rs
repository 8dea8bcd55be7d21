mod common;

use jukebox_audio::{ChannelId, TestOp};
use jukebox_types::{BusKind, EntityId};

const DOOR: EntityId = EntityId::new(10);
const CAR: EntityId = EntityId::new(11);

#[test]
fn test_spatial_uses_clip_default_bus() {
    let (mut engine, backend) = common::make_default_engine();
    let engine_clip = common::effect(&engine, "engine");
    let title = common::music(&engine, "title");

    let se = engine.play_spatial(CAR, engine_clip, true).unwrap();
    let bgm = engine.play_spatial(CAR, title, true).unwrap();
    assert_eq!(se, ChannelId::Spatial { entity: CAR, slot: 0 });
    assert_eq!(bgm, ChannelId::Spatial { entity: CAR, slot: 1 });

    let channels = engine.spatial_channels(CAR);
    assert_eq!(channels[0].bus(), BusKind::Effects);
    assert_eq!(channels[1].bus(), BusKind::Music);
    assert_eq!(
        backend.count(|op| matches!(op, TestOp::CreateChannel { anchor: Some(e), .. } if *e == CAR)),
        2
    );
}

#[test]
fn test_spatial_ignores_duplicate_limit_and_pool() {
    let (mut engine, _backend) = common::make_default_engine();
    let shot = common::effect(&engine, "shot");

    for _ in 0..6 {
        assert!(engine.play_spatial(DOOR, shot, false).is_some());
    }
    assert_eq!(engine.spatial_channels(DOOR).len(), 6);
    assert_eq!(engine.pool().occupied(), 0);
}

#[test]
fn test_idle_spatial_channel_is_reused() {
    let (mut engine, backend) = common::make_default_engine();
    let shot = common::effect(&engine, "shot");
    let coin = common::effect(&engine, "coin");

    engine.play_spatial(DOOR, shot, false);
    common::run_frames(&mut engine, &backend, 1, 1.0);

    let id = engine.play_spatial(DOOR, coin, false).unwrap();
    assert_eq!(id, ChannelId::Spatial { entity: DOOR, slot: 0 });
    assert_eq!(engine.spatial_channels(DOOR).len(), 1);
}

#[test]
fn test_stop_spatial_by_clip_and_bus() {
    let (mut engine, backend) = common::make_default_engine();
    let engine_clip = common::effect(&engine, "engine");
    let coin = common::effect(&engine, "coin");
    let battle = common::music(&engine, "battle");

    engine.play_spatial(CAR, engine_clip, true);
    engine.play_spatial(CAR, coin, false);
    engine.play_spatial(CAR, battle, true);
    engine.play_spatial(DOOR, coin, false);

    assert_eq!(engine.stop_spatial(CAR, coin), 1);
    assert_eq!(engine.stop_all_spatial(CAR, BusKind::Effects), 2);

    let playing: Vec<bool> = engine
        .spatial_channels(CAR)
        .iter()
        .map(|c| c.is_playing(engine.backend()))
        .collect();
    assert_eq!(playing, vec![false, false, true]);
    // Other entities are unaffected
    assert!(engine.spatial_channels(DOOR)[0].is_playing(engine.backend()));
    assert_eq!(backend.playing_count(), 2);
}

#[test]
fn test_spatial_control_and_unknown_slots() {
    let (mut engine, backend) = common::make_default_engine();
    let coin = common::effect(&engine, "coin");
    let id = engine.play_spatial_on(DOOR, coin, BusKind::Music, false).unwrap();

    let mut control = engine.channel_control(id).unwrap();
    assert_eq!(control.bus(), BusKind::Music);
    control.set_volume(0.3).unwrap();
    let handle = control.handle();
    assert!((backend.channel(handle).unwrap().volume - 0.3).abs() < 1e-6);

    assert!(engine
        .channel_control(ChannelId::Spatial { entity: DOOR, slot: 4 })
        .is_none());
    assert_eq!(engine.stop_all_spatial(CAR, BusKind::Effects), 0);
}

#[test]
fn test_forget_entity() {
    let (mut engine, _backend) = common::make_default_engine();
    let coin = common::effect(&engine, "coin");
    engine.play_spatial(DOOR, coin, false);

    assert!(engine.forget_entity(DOOR));
    assert!(engine.spatial_channels(DOOR).is_empty());
    assert!(!engine.forget_entity(DOOR));
}
