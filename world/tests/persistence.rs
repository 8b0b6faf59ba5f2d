use std::fs;

use tilequest_core::{Command, Event, Spawn, SCENE_OFFSET};
use tilequest_world::{
    self as world, query,
    state::{GameState, PersistError},
    World, WorldConfig,
};

#[test]
fn save_then_load_restores_progress() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("savegame.json");

    let mut state = GameState::new();
    state.set_current_scene_name("Zelda13");
    state.set_player_health(4, 8);
    state.set_has_sword(true);
    let _ = state.add_coins(12);
    state.save_to_file(&path).expect("save succeeds");

    let mut restored = GameState::new();
    restored.load_from_file(&path).expect("load succeeds");

    assert_eq!(restored.current_scene_name(), "Zelda13");
    assert_eq!(restored.player_health(), 4);
    assert_eq!(restored.player_max_health(), 8);
    assert!(restored.has_sword());
    assert_eq!(restored.coins(), 12);
}

#[test]
fn save_file_uses_camel_case_keys() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("savegame.json");
    GameState::new().save_to_file(&path).expect("save succeeds");

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read back")).expect("valid json");

    for key in [
        "state",
        "currentSceneName",
        "playerHealth",
        "playerMaxHealth",
        "hasSword",
        "savedAt",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["state"]["Coins"], 0);
}

#[test]
fn malformed_file_leaves_state_untouched() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("savegame.json");
    fs::write(&path, "{ not json").expect("write");

    let mut state = GameState::new();
    let _ = state.add_coins(5);
    let before = state.clone();

    let result = state.load_from_file(&path);

    assert!(matches!(result, Err(PersistError::Json(_))));
    assert_eq!(state, before);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut state = GameState::new();

    let result = state.load_from_file(dir.path().join("absent.json"));

    assert!(matches!(result, Err(PersistError::Missing(_))));
}

#[test]
fn world_round_trips_health_taken_in_play() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("savegame.json");
    let mut world = World::with_config(WorldConfig::new(11));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::OpenScene {
            level: "Zelda02".to_owned(),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::Spawn {
            spawn: Spawn::Coin {
                position: SCENE_OFFSET,
                value: 1,
            },
        },
        &mut events,
    );
    assert!(matches!(events.last(), Some(Event::EntitySpawned { .. })));

    world.save_state(&path).expect("save succeeds");

    let mut other = World::new();
    other.load_state(&path).expect("load succeeds");
    assert_eq!(query::game_state(&other).current_scene_name(), "Zelda02");

    assert!(other.load_state(dir.path().join("absent.json")).is_err());
    assert_eq!(query::game_state(&other).current_scene_name(), "Zelda02");
}
