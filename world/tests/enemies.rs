use std::time::Duration;

use glam::Vec2;
use tilequest_core::{
    Command, Direction, EnemyKind, Event, Faction, InputSnapshot, Label, Spawn, SCENE_OFFSET,
};
use tilequest_world::{self as world, query, stats::EnemyStatsCache, World, WorldConfig};

fn scene_point(x: f32, y: f32) -> Vec2 {
    SCENE_OFFSET + Vec2::new(x, y)
}

fn world_with(config: WorldConfig) -> World {
    let mut world = World::with_config(config);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::OpenScene {
            level: "Zelda12".to_owned(),
        },
        &mut events,
    );
    world
}

fn spawn(world: &mut World, spawn: Spawn) {
    let mut events = Vec::new();
    world::apply(world, Command::Spawn { spawn }, &mut events);
}

fn tick(world: &mut World, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt,
            input: InputSnapshot::default(),
        },
        &mut events,
    );
    events
}

fn player_shot(position: Vec2, damage: i32) -> Spawn {
    Spawn::Projectile {
        position,
        direction: Direction::Right,
        damage,
        speed: 350.0,
        faction: Faction::Player,
    }
}

#[test]
fn enemy_dies_once_under_simultaneous_hits() {
    let mut world = world_with(WorldConfig::new(5));
    spawn(
        &mut world,
        Spawn::Enemy {
            kind: EnemyKind::Basic,
            position: scene_point(300.0, 300.0),
            entry: None,
        },
    );
    spawn(&mut world, player_shot(scene_point(290.0, 330.0), 1));
    spawn(&mut world, player_shot(scene_point(290.0, 340.0), 1));

    let events = tick(&mut world, Duration::from_millis(16));

    let kills = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyKilled { .. }))
        .count();
    assert_eq!(kills, 1);
    assert_eq!(query::count_label(&world, Label::Animation), 1);
    assert_eq!(query::count_label(&world, Label::Projectile), 1);
}

#[test]
fn stats_file_overrides_builtin_health() {
    let stats = EnemyStatsCache::from_json_str(
        r#"{ "Chaser": { "maxHealth": 3, "attack": 2, "speed": 60.0 } }"#,
    )
    .expect("valid stats");
    let mut world = world_with(WorldConfig::new(5).with_enemy_stats(stats));
    assert_eq!(query::enemy_stats(&world, "Chaser").max_health, 3);

    spawn(
        &mut world,
        Spawn::Enemy {
            kind: EnemyKind::Chaser,
            position: scene_point(300.0, 300.0),
            entry: None,
        },
    );
    spawn(&mut world, player_shot(scene_point(290.0, 330.0), 2));

    let events = tick(&mut world, Duration::from_millis(16));

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { .. })));
    assert_eq!(query::count_label(&world, Label::Enemy), 1);
}

#[test]
fn spider_contact_is_gated_by_invulnerability() {
    let mut world = world_with(WorldConfig::new(5));
    spawn(
        &mut world,
        Spawn::Player {
            position: scene_point(300.0, 300.0),
        },
    );
    spawn(
        &mut world,
        Spawn::Enemy {
            kind: EnemyKind::Spider,
            position: scene_point(300.0, 290.0),
            entry: None,
        },
    );

    let mut damaged = 0;
    for _ in 0..10 {
        damaged += tick(&mut world, Duration::from_millis(16))
            .iter()
            .filter(|event| matches!(event, Event::PlayerDamaged { .. }))
            .count();
    }

    assert_eq!(damaged, 1);
    assert_eq!(query::hud(&world).health, 5);
}

#[test]
fn shooter_fires_bullets_over_time() {
    let mut world = world_with(WorldConfig::new(9));
    spawn(
        &mut world,
        Spawn::Enemy {
            kind: EnemyKind::Shooter,
            position: scene_point(480.0, 320.0),
            entry: None,
        },
    );

    let mut fired = 0;
    for _ in 0..180 {
        fired += tick(&mut world, Duration::from_millis(16))
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::EntitySpawned {
                        label: Label::Bullet,
                        ..
                    }
                )
            })
            .count();
    }

    assert!(fired >= 1);
}
