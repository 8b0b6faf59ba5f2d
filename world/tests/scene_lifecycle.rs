use std::time::Duration;

use glam::Vec2;
use tilequest_core::{
    Command, Direction, EnemyKind, EntityId, Event, Faction, GridCoord, InputSnapshot, Item, Label,
    SceneTarget, Spawn, Visual, SCENE_OFFSET,
};
use tilequest_world::{
    self as world, query,
    state::{GameState, SpawnEdge},
    World, WorldConfig, RETURN_SCENE_KEY,
};

const FRAME: Duration = Duration::from_millis(125);

fn scene_point(x: f32, y: f32) -> Vec2 {
    SCENE_OFFSET + Vec2::new(x, y)
}

fn open(world: &mut World, level: &str) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::OpenScene {
            level: level.to_owned(),
        },
        &mut events,
    );
    events
}

fn spawn(world: &mut World, spawn: Spawn) -> EntityId {
    let mut events = Vec::new();
    world::apply(world, Command::Spawn { spawn }, &mut events);
    match events.as_slice() {
        [Event::EntitySpawned { entity, .. }] => *entity,
        other => panic!("unexpected events {other:?}"),
    }
}

fn tick(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: FRAME,
            input: InputSnapshot::default(),
        },
        &mut events,
    );
    events
}

fn enemy(world: &mut World, kind: EnemyKind, x: f32, y: f32) -> EntityId {
    spawn(
        world,
        Spawn::Enemy {
            kind,
            position: scene_point(x, y),
            entry: None,
        },
    )
}

fn player_shot(world: &mut World, x: f32, y: f32) -> EntityId {
    spawn(
        world,
        Spawn::Projectile {
            position: scene_point(x, y),
            direction: Direction::Right,
            damage: 1,
            speed: 1.0,
            faction: Faction::Player,
        },
    )
}

fn killed(events: &[Event]) -> Vec<EntityId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyKilled { entity, .. } => Some(*entity),
            _ => None,
        })
        .collect()
}

fn position_of(events: &[Event], wanted: impl Fn(&Event) -> bool) -> usize {
    events
        .iter()
        .position(wanted)
        .unwrap_or_else(|| panic!("event missing from {events:?}"))
}

#[test]
fn shots_hit_the_first_overlapping_entity_in_scene_order() {
    let mut world = World::new();
    let _ = open(&mut world, "Zelda12");
    let earlier = enemy(&mut world, EnemyKind::Basic, 400.0, 300.0);
    let _ = player_shot(&mut world, 420.0, 330.0);
    let later = enemy(&mut world, EnemyKind::Basic, 400.0, 300.0);

    let events = tick(&mut world);

    assert_eq!(killed(&events), vec![earlier]);
    let alive: Vec<EntityId> = query::entities(&world)
        .into_iter()
        .map(|snapshot| snapshot.id)
        .filter(|id| *id == earlier || *id == later)
        .collect();
    assert_eq!(alive, vec![later]);

    let mut world = World::new();
    let _ = open(&mut world, "Zelda12");
    let _ = player_shot(&mut world, 420.0, 330.0);
    let first = enemy(&mut world, EnemyKind::Basic, 400.0, 300.0);
    let _ = enemy(&mut world, EnemyKind::Basic, 400.0, 300.0);

    let events = tick(&mut world);

    assert_eq!(killed(&events), vec![first]);
    assert_eq!(query::count_label(&world, Label::Enemy), 1);
}

#[test]
fn shots_pass_over_enemies_killed_earlier_in_the_pass() {
    let mut world = World::new();
    let _ = open(&mut world, "Zelda12");
    let _ = player_shot(&mut world, 420.0, 330.0);
    let _ = player_shot(&mut world, 420.0, 330.0);
    let first = enemy(&mut world, EnemyKind::Basic, 400.0, 300.0);
    let second = enemy(&mut world, EnemyKind::Basic, 400.0, 300.0);

    let events = tick(&mut world);

    assert_eq!(killed(&events), vec![first, second]);
    assert_eq!(query::count_label(&world, Label::Enemy), 0);
}

#[test]
fn entities_killed_mid_pass_still_update_before_the_sweep() {
    let mut world = World::new();
    let _ = open(&mut world, "Zelda12");
    let _ = spawn(
        &mut world,
        Spawn::Player {
            position: scene_point(400.0, 300.0),
        },
    );
    let _ = player_shot(&mut world, 420.0, 330.0);
    let spider = enemy(&mut world, EnemyKind::Spider, 400.0, 300.0);

    let events = tick(&mut world);

    let killed_at = position_of(&events, |event| {
        matches!(event, Event::EnemyKilled { entity, .. } if *entity == spider)
    });
    let bitten_at = position_of(&events, |event| matches!(event, Event::PlayerDamaged { .. }));
    let removed_at = position_of(&events, |event| {
        matches!(event, Event::EntityRemoved { entity, .. } if *entity == spider)
    });
    assert!(killed_at < bitten_at);
    assert!(bitten_at < removed_at);
    assert_eq!(query::count_label(&world, Label::Enemy), 0);

    let mut world = World::new();
    let _ = open(&mut world, "Zelda12");
    let spider = enemy(&mut world, EnemyKind::Spider, 400.0, 300.0);
    let _ = spawn(
        &mut world,
        Spawn::Player {
            position: scene_point(400.0, 300.0),
        },
    );
    let _ = player_shot(&mut world, 420.0, 330.0);

    let events = tick(&mut world);

    assert_eq!(killed(&events), vec![spider]);
    assert!(events.contains(&Event::EntityRemoved {
        entity: spider,
        label: Label::Enemy,
    }));
    assert_eq!(query::count_label(&world, Label::Enemy), 0);
}

#[test]
fn ui_entities_draw_after_scene_entities() {
    let mut world = World::new();
    let _ = open(&mut world, "Zelda12");
    let hud = spawn(&mut world, Spawn::Hud);
    let player = spawn(
        &mut world,
        Spawn::Player {
            position: scene_point(300.0, 300.0),
        },
    );

    let order: Vec<EntityId> = query::entities(&world)
        .into_iter()
        .map(|snapshot| snapshot.id)
        .collect();

    assert_eq!(order, vec![player, hud]);
}

#[test]
fn text_entities_can_be_rewritten_and_removed() {
    let mut world = World::new();
    let _ = open(&mut world, "Underworld");
    let text = spawn(
        &mut world,
        Spawn::Text {
            position: Vec2::new(312.0, 424.0),
            text: String::new(),
        },
    );

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetText {
            entity: text,
            text: "IT'S".to_owned(),
        },
        &mut events,
    );
    assert_eq!(
        query::texts(&world),
        vec![(text, Vec2::new(312.0, 424.0), "IT'S")]
    );

    world::apply(&mut world, Command::RemoveEntity { entity: text }, &mut events);
    assert_eq!(
        events,
        vec![Event::EntityRemoved {
            entity: text,
            label: Label::Ui
        }]
    );
    assert!(query::texts(&world).is_empty());
}

#[test]
fn coins_add_to_the_shared_counter() {
    let mut world = World::new();
    let _ = open(&mut world, "Zelda12");
    let _ = spawn(
        &mut world,
        Spawn::Player {
            position: scene_point(300.0, 300.0),
        },
    );
    let _ = spawn(
        &mut world,
        Spawn::Coin {
            position: scene_point(300.0, 300.0),
            value: 1,
        },
    );

    let events = tick(&mut world);

    assert!(events.contains(&Event::CoinsChanged { total: 1 }));
    assert_eq!(query::count_label(&world, Label::Coin), 0);
    assert_eq!(query::hud(&world).coins, 1);
}

#[test]
fn sword_pickup_equips_player_and_is_remembered() {
    let mut world = World::new();
    let _ = open(&mut world, "Underworld");
    let _ = spawn(
        &mut world,
        Spawn::Player {
            position: scene_point(300.0, 300.0),
        },
    );
    let position = scene_point(310.0, 330.0);
    let _ = spawn(
        &mut world,
        Spawn::Item {
            position,
            item: Item::Sword,
        },
    );

    let events = tick(&mut world);

    let coord = GridCoord::from_pixel(position);
    assert!(events.contains(&Event::ItemCollected {
        item: Item::Sword,
        coord
    }));
    assert!(query::game_state(&world).has_sword());
    assert!(query::is_item_collected(&world, coord));
    assert_eq!(query::player(&world).map(|player| player.attack), Some(2));
    let hud = query::hud(&world);
    assert!(hud.has_sword);
    assert_eq!(hud.attack, 2);
}

#[test]
fn door_leads_into_the_cave_and_back() {
    let mut world = World::new();
    let _ = open(&mut world, "Zelda12");
    let _ = spawn(
        &mut world,
        Spawn::Door {
            position: scene_point(256.0, 64.0),
            next_scene: "Underworld".to_owned(),
        },
    );
    let _ = spawn(
        &mut world,
        Spawn::Player {
            position: scene_point(260.0, 60.0),
        },
    );

    let events = tick(&mut world);
    let requests: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::SceneChangeRequested { .. }))
        .collect();
    assert_eq!(
        requests,
        vec![&Event::SceneChangeRequested {
            target: SceneTarget::Named("Underworld".to_owned())
        }]
    );
    let state = query::game_state(&world);
    assert_eq!(
        state.value(RETURN_SCENE_KEY).and_then(|value| value.as_str()),
        Some("Zelda12")
    );
    assert_eq!(
        state.edge_transition().map(|transition| transition.edge),
        Some(SpawnEdge::FromDoor)
    );

    let _ = open(&mut world, "Underworld");
    let _ = spawn(
        &mut world,
        Spawn::Player {
            position: scene_point(480.0, 320.0),
        },
    );
    let arrived = query::player(&world).expect("player in the cave");
    assert_eq!(arrived.position, Vec2::new(485.0, 224.0 + 704.0 - 42.0));
    assert_eq!(query::scene_change(&world), None);
}

#[test]
fn walking_off_an_edge_opens_the_neighbour() {
    let mut world = World::new();
    let _ = open(&mut world, "Zelda12");
    let _ = spawn(
        &mut world,
        Spawn::Player {
            position: scene_point(-30.0, 300.0),
        },
    );

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: FRAME,
            input: InputSnapshot::holding(
                tilequest_core::ActionSet::EMPTY.with(tilequest_core::Action::MoveLeft),
            ),
        },
        &mut events,
    );

    assert!(events.contains(&Event::SceneChangeRequested {
        target: SceneTarget::Named("Zelda11".to_owned())
    }));
    assert_eq!(
        query::game_state(&world)
            .edge_transition()
            .map(|transition| transition.edge),
        Some(SpawnEdge::Right)
    );
}

#[test]
fn player_death_requests_the_lose_scene_after_the_animation() {
    let mut state = GameState::new();
    state.set_player_health(1, 6);
    let mut world = World::with_config(WorldConfig::new(3).with_game_state(state));
    let _ = open(&mut world, "Zelda12");
    let _ = spawn(
        &mut world,
        Spawn::Player {
            position: scene_point(300.0, 300.0),
        },
    );
    let _ = spawn(
        &mut world,
        Spawn::Bullet {
            position: scene_point(300.0, 316.0),
            direction: Direction::Left,
            speed: 300.0,
        },
    );

    let events = tick(&mut world);
    assert!(events.contains(&Event::PlayerDied));
    assert!(events.contains(&Event::PlayerDamaged {
        health: 0,
        max_health: 6
    }));
    assert!(query::player(&world).is_none());
    assert_eq!(query::game_state(&world).player_health(), 0);

    let mut requests = Vec::new();
    for _ in 0..12 {
        requests.extend(
            tick(&mut world)
                .into_iter()
                .filter(|event| matches!(event, Event::SceneChangeRequested { .. })),
        );
    }

    assert_eq!(
        requests,
        vec![Event::SceneChangeRequested {
            target: SceneTarget::Lose
        }]
    );
    assert_eq!(query::scene_change(&world), Some(&SceneTarget::Lose));
    assert!(query::entities(&world)
        .iter()
        .all(|snapshot| snapshot.visual != Visual::Hidden));
}
