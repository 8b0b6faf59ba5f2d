#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative scene state for Tile Quest: the tile grid, the entity arena
//! and the progress that survives scene changes.

pub mod collision;
mod entity;
pub mod grid;
pub mod level;
pub mod state;
pub mod stats;

use std::{collections::VecDeque, path::Path, time::Duration};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilequest_core::{
    AnimationClip, AnimationFinish, Command, Direction, EntityId, Event, GridCoord, InputSnapshot,
    Item, Label, NoTileArt, SceneTarget, Spawn, TileArt, GAME_SCENE_SIZE, SCENE_OFFSET,
};

use crate::{
    entity::{Context, Effect, Entity, EntityKind},
    grid::Grid,
    level::neighbour_level,
    state::{GameState, PersistError, SpawnEdge},
    stats::EnemyStatsCache,
};

const DEFAULT_SEED: u64 = 0x7a3c_51d2_9e04_b6f1;
const PLAYER_DEATH_DELAY: Duration = Duration::from_millis(500);
const COIN_DROP_CHANCE: f64 = 0.5;
const ARRIVAL_MARGIN: f32 = 10.0;
const PLAYER_WIDTH: f32 = 54.0;
const PLAYER_HEIGHT: f32 = 32.0;

/// State key naming the scene a cave exit leads back to.
pub const RETURN_SCENE_KEY: &str = "ReturnScene";

/// Inputs required to build a [`World`].
#[derive(Debug)]
pub struct WorldConfig {
    seed: u64,
    tile_art: Box<dyn TileArt>,
    enemy_stats: EnemyStatsCache,
    game_state: GameState,
}

impl WorldConfig {
    /// Configuration with no tile art, built-in enemy stats and fresh progress.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            tile_art: Box::new(NoTileArt),
            enemy_stats: EnemyStatsCache::builtin(),
            game_state: GameState::new(),
        }
    }

    /// Artwork the collision masks are derived from.
    #[must_use]
    pub fn with_tile_art(mut self, art: impl TileArt + 'static) -> Self {
        self.tile_art = Box::new(art);
        self
    }

    /// Enemy stats used for every spawned enemy.
    #[must_use]
    pub fn with_enemy_stats(mut self, stats: EnemyStatsCache) -> Self {
        self.enemy_stats = stats;
        self
    }

    /// Progress the world starts from.
    #[must_use]
    pub fn with_game_state(mut self, state: GameState) -> Self {
        self.game_state = state;
        self
    }
}

/// Represents the authoritative Tile Quest world state.
#[derive(Debug)]
pub struct World {
    level_name: String,
    grid: Grid,
    entities: Vec<Entity>,
    next_entity: u32,
    state: GameState,
    stats: EnemyStatsCache,
    rng: ChaCha8Rng,
    finished: bool,
    next_scene: Option<SceneTarget>,
    tick_index: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world with no tile art and built-in enemy stats.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::new(DEFAULT_SEED))
    }

    /// Creates an empty world from the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            level_name: String::new(),
            grid: Grid::new(config.tile_art, SCENE_OFFSET),
            entities: Vec::new(),
            next_entity: 0,
            state: config.game_state,
            stats: config.enemy_stats,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            finished: false,
            next_scene: None,
            tick_index: 0,
        }
    }

    /// Writes the game state to `path`.
    pub fn save_state(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        self.state.save_to_file(path).map_err(|error| {
            log::warn!("could not save game to {}: {error}", path.display());
            error
        })
    }

    /// Replaces the game state with the contents of `path`.
    ///
    /// The current state is kept when loading fails. The open scene is not
    /// touched; callers reopen the saved scene themselves.
    pub fn load_state(&mut self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        self.state.load_from_file(path).map_err(|error| {
            log::warn!("could not load game from {}: {error}", path.display());
            error
        })
    }

    fn open_scene(&mut self, level: String, out_events: &mut Vec<Event>) {
        log::debug!("opening scene {level}");
        self.entities.clear();
        self.grid.clear();
        self.finished = false;
        self.next_scene = None;
        self.state.set_current_scene_name(level.clone());
        self.level_name = level.clone();
        out_events.push(Event::SceneOpened { level });
    }

    fn entity_index(&self, entity: EntityId) -> Option<usize> {
        self.entities.iter().position(|candidate| candidate.id == entity)
    }

    fn entity_mut(&mut self, entity: EntityId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|candidate| candidate.id == entity)
    }

    fn player_mut(&mut self) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|candidate| candidate.label == Label::Player && !candidate.body.is_dead())
    }

    fn spawn(&mut self, spawn: Spawn, out_events: &mut Vec<Event>) {
        let spawn = match spawn {
            Spawn::Player { position } => Spawn::Player {
                position: self.arrival_position(position),
            },
            other => other,
        };

        let id = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.wrapping_add(1);
        let entity = Entity::from_spawn(id, spawn, &self.stats, &self.state, &mut self.rng);
        log::debug!("spawned {} #{}", entity.label, id.get());
        out_events.push(Event::EntitySpawned {
            entity: id,
            label: entity.label,
        });
        self.entities.push(entity);
    }

    /// Where the player appears, honouring a transition queued by the
    /// previous scene.
    fn arrival_position(&mut self, fallback: Vec2) -> Vec2 {
        let Some(transition) = self.state.take_edge_transition() else {
            return fallback;
        };

        let far = SCENE_OFFSET + GAME_SCENE_SIZE;
        let previous = transition.position;
        match transition.edge {
            SpawnEdge::Left => Vec2::new(SCENE_OFFSET.x + ARRIVAL_MARGIN, previous.y),
            SpawnEdge::Right => Vec2::new(far.x - PLAYER_WIDTH - ARRIVAL_MARGIN, previous.y),
            SpawnEdge::Top => Vec2::new(previous.x, SCENE_OFFSET.y + ARRIVAL_MARGIN),
            SpawnEdge::Bottom => Vec2::new(previous.x, far.y - PLAYER_HEIGHT - ARRIVAL_MARGIN),
            SpawnEdge::FromDoor => Vec2::new(
                SCENE_OFFSET.x + GAME_SCENE_SIZE.x / 2.0 - PLAYER_WIDTH / 2.0,
                far.y - PLAYER_HEIGHT - ARRIVAL_MARGIN,
            ),
            SpawnEdge::Door => SCENE_OFFSET + Vec2::new(256.0, 128.0),
        }
    }

    fn request_scene_change(&mut self, target: SceneTarget, out_events: &mut Vec<Event>) {
        if self.finished {
            return;
        }

        log::info!("scene {} finished, next: {target:?}", self.level_name);
        self.finished = true;
        self.next_scene = Some(target.clone());
        out_events.push(Event::SceneChangeRequested { target });
    }

    /// Updates every entity in scene order, then sweeps the dead ones.
    ///
    /// An entity killed earlier in the pass still runs its own update in
    /// that pass. Entities spawned during the pass are updated in it too.
    fn tick(&mut self, dt: Duration, input: &InputSnapshot, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        let seconds = dt.as_secs_f32();
        let mut index = 0;
        while index < self.entities.len() {
            let effects = {
                let (before, rest) = self.entities.split_at_mut(index);
                let Some((current, after)) = rest.split_first_mut() else {
                    break;
                };

                let mut ctx = Context::new(
                    seconds,
                    input,
                    &self.grid,
                    &self.state,
                    &mut self.rng,
                    current.id,
                    &*before,
                    &*after,
                );
                current.update(&mut ctx);
                ctx.into_effects()
            };

            self.apply_effects(effects, out_events);
            index += 1;
        }

        self.sweep(out_events);
    }

    fn sweep(&mut self, out_events: &mut Vec<Event>) {
        self.entities.retain(|entity| {
            if !entity.body.is_dead() {
                return true;
            }
            log::debug!("swept {} #{}", entity.label, entity.id.get());
            out_events.push(Event::EntityRemoved {
                entity: entity.id,
                label: entity.label,
            });
            false
        });
    }

    fn apply_effects(&mut self, effects: Vec<Effect>, out_events: &mut Vec<Event>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Spawn(spawn) => self.spawn(spawn, out_events),
                Effect::Damage { target, amount } => {
                    self.damage(target, amount, &mut queue, out_events);
                }
                Effect::ChangeScene(target) => self.request_scene_change(target, out_events),
                Effect::EnterDoor {
                    next_scene,
                    position,
                } => {
                    if self.finished {
                        continue;
                    }
                    let level = self.level_name.clone();
                    self.state.set_value(RETURN_SCENE_KEY, level);
                    self.state
                        .queue_edge_transition(SpawnEdge::FromDoor, position);
                    self.request_scene_change(SceneTarget::Named(next_scene), out_events);
                }
                Effect::LeaveScene { exit, position } => {
                    if self.finished {
                        continue;
                    }
                    if let Some((scene, edge)) = self.exit_destination(exit) {
                        self.state.queue_edge_transition(edge, position);
                        self.request_scene_change(SceneTarget::Named(scene), out_events);
                    }
                }
                Effect::CollectCoins(amount) => {
                    let total = self.state.add_coins(amount);
                    out_events.push(Event::CoinsChanged { total });
                }
                Effect::CollectItem {
                    pickup,
                    item,
                    coord,
                } => self.collect_item(pickup, item, coord, out_events),
                Effect::Despawn(entity) => {
                    if let Some(entity) = self.entity_mut(entity) {
                        entity.body.die();
                    }
                }
            }
        }
    }

    /// Scene reached by leaving the current one across `exit`, and the
    /// border the player arrives at.
    fn exit_destination(&self, exit: Direction) -> Option<(String, SpawnEdge)> {
        if let Some(scene) = neighbour_level(&self.level_name, exit) {
            let edge = match exit {
                Direction::Left => SpawnEdge::Right,
                Direction::Right => SpawnEdge::Left,
                Direction::Up => SpawnEdge::Bottom,
                Direction::Down => SpawnEdge::Top,
            };
            return Some((scene, edge));
        }

        if exit != Direction::Down {
            return None;
        }
        self.state
            .value(RETURN_SCENE_KEY)
            .and_then(|value| value.as_str())
            .filter(|scene| !scene.is_empty() && *scene != self.level_name)
            .map(|scene| (scene.to_owned(), SpawnEdge::Door))
    }

    fn damage(
        &mut self,
        target: EntityId,
        amount: i32,
        queue: &mut VecDeque<Effect>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(entity) = self.entities.iter_mut().find(|entity| entity.id == target) else {
            return;
        };
        let id = entity.id;
        let Entity { body, kind, .. } = entity;

        match kind {
            EntityKind::Player(player) => {
                let Some(hit) = player.take_damage(body, amount) else {
                    return;
                };
                self.state.set_player_health(hit.health, hit.max_health);
                out_events.push(Event::PlayerDamaged {
                    health: hit.health,
                    max_health: hit.max_health,
                });
                if hit.died {
                    log::info!("player died in {}", self.level_name);
                    out_events.push(Event::PlayerDied);
                    queue.push_back(Effect::Spawn(Spawn::Animation {
                        position: hit.position,
                        clip: AnimationClip::Death,
                        looping: false,
                        finish: AnimationFinish::ChangeScene {
                            delay: PLAYER_DEATH_DELAY,
                            target: SceneTarget::Lose,
                        },
                    }));
                }
            }
            EntityKind::Enemy(enemy) => {
                if !enemy.take_damage(body, amount) {
                    return;
                }
                let position = body.position();
                out_events.push(Event::EnemyKilled {
                    entity: id,
                    kind: enemy.kind(),
                });
                queue.push_back(Effect::Spawn(Spawn::Animation {
                    position,
                    clip: AnimationClip::Death,
                    looping: false,
                    finish: AnimationFinish::Vanish,
                }));
                if self.rng.gen_bool(COIN_DROP_CHANCE) {
                    queue.push_back(Effect::Spawn(Spawn::Item {
                        position,
                        item: Item::Coin,
                    }));
                }
            }
            _ => {}
        }
    }

    fn collect_item(
        &mut self,
        pickup: EntityId,
        item: Item,
        coord: GridCoord,
        out_events: &mut Vec<Event>,
    ) {
        match self.entity_mut(pickup) {
            Some(entity) if !entity.body.is_dead() => entity.body.die(),
            _ => return,
        }

        let level = self.level_name.clone();
        self.state.mark_item_collected(&level, coord);
        match item {
            Item::Sword => {
                self.state.set_has_sword(true);
                if let Some(player) = self.player_mut() {
                    if let EntityKind::Player(player) = &mut player.kind {
                        player.equip_sword();
                    }
                }
            }
            Item::Coin => {
                let total = self.state.add_coins(1);
                out_events.push(Event::CoinsChanged { total });
            }
        }

        log::debug!("collected {item:?} at ({}, {})", coord.column(), coord.row());
        out_events.push(Event::ItemCollected { item, coord });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::OpenScene { level } => world.open_scene(level, out_events),
        Command::CloseScene => {
            world.finished = false;
            world.next_scene = None;
        }
        Command::SetTile { coord, kind } => {
            world.grid.set_tile(coord, kind);
            out_events.push(Event::TileChanged {
                coord,
                kind: Some(kind),
            });
        }
        Command::ClearTile { coord } => {
            if world.grid.remove_tile(coord) {
                out_events.push(Event::TileChanged { coord, kind: None });
            }
        }
        Command::Spawn { spawn } => world.spawn(spawn, out_events),
        Command::RemoveEntity { entity } => {
            if let Some(index) = world.entity_index(entity) {
                let removed = world.entities.remove(index);
                out_events.push(Event::EntityRemoved {
                    entity: removed.id,
                    label: removed.label,
                });
            }
        }
        Command::SetText { entity, text } => {
            if let Some(target) = world.entity_mut(entity) {
                if let EntityKind::Text(label) = &mut target.kind {
                    label.set_text(text);
                }
            }
        }
        Command::SetPlayerControl { allowed } => world.state.set_allow_player_control(allowed),
        Command::Tick { dt, input } => world.tick(dt, &input, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tilequest_core::{
        Direction, EntityId, EntitySnapshot, GridCoord, Label, PlayerState, SceneTarget,
    };

    use super::World;
    use crate::{
        entity::EntityKind,
        grid::Grid,
        state::GameState,
        stats::EnemyStats,
    };

    /// Read-only view of the player.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerView {
        /// Identifier of the player entity.
        pub id: EntityId,
        /// Current health.
        pub health: i32,
        /// Maximum health.
        pub max_health: i32,
        /// Damage dealt by sword and projectiles.
        pub attack: i32,
        /// Controller state.
        pub state: PlayerState,
        /// Facing direction.
        pub facing: Direction,
        /// Top-left position in screen pixels.
        pub position: glam::Vec2,
    }

    /// Figures shown by the HUD.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct HudView {
        /// Current health.
        pub health: i32,
        /// Maximum health.
        pub max_health: i32,
        /// Player attack.
        pub attack: i32,
        /// Whether the sword was picked up.
        pub has_sword: bool,
        /// Coins collected so far.
        pub coins: i64,
    }

    /// Level name of the open scene.
    #[must_use]
    pub fn level_name(world: &World) -> &str {
        &world.level_name
    }

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Live entities in draw order: scene entities first, ui entities last.
    #[must_use]
    pub fn entities(world: &World) -> Vec<EntitySnapshot> {
        let live = || world.entities.iter().filter(|entity| !entity.body.is_dead());
        live()
            .filter(|entity| entity.label != Label::Ui)
            .chain(live().filter(|entity| entity.label == Label::Ui))
            .map(|entity| entity.snapshot())
            .collect()
    }

    /// Number of entities in the arena, including ones awaiting the sweep.
    #[must_use]
    pub fn entity_count(world: &World) -> usize {
        world.entities.len()
    }

    /// Live entities carrying `label`.
    #[must_use]
    pub fn count_label(world: &World, label: Label) -> usize {
        world
            .entities
            .iter()
            .filter(|entity| entity.label == label && !entity.body.is_dead())
            .count()
    }

    /// The live player, if the scene has one.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerView> {
        world.entities.iter().find_map(|entity| match &entity.kind {
            EntityKind::Player(player) if !entity.body.is_dead() => Some(PlayerView {
                id: entity.id,
                health: player.health(),
                max_health: player.max_health(),
                attack: player.attack(),
                state: player.state(),
                facing: player.facing(),
                position: entity.body.position(),
            }),
            _ => None,
        })
    }

    /// HUD figures, taken from the live player when there is one.
    #[must_use]
    pub fn hud(world: &World) -> HudView {
        let state = &world.state;
        let (health, max_health, attack) = match player(world) {
            Some(view) => (view.health, view.max_health, view.attack),
            None => (
                state.player_health(),
                state.player_max_health(),
                if state.has_sword() { 2 } else { 1 },
            ),
        };

        HudView {
            health,
            max_health,
            attack,
            has_sword: state.has_sword(),
            coins: state.coins(),
        }
    }

    /// Text entities with their contents, in scene order.
    #[must_use]
    pub fn texts(world: &World) -> Vec<(EntityId, glam::Vec2, &str)> {
        world
            .entities
            .iter()
            .filter(|entity| !entity.body.is_dead())
            .filter_map(|entity| match &entity.kind {
                EntityKind::Text(text) => Some((entity.id, entity.body.position(), text.text())),
                _ => None,
            })
            .collect()
    }

    /// Progress shared across scenes.
    #[must_use]
    pub fn game_state(world: &World) -> &GameState {
        &world.state
    }

    /// Stats applied to enemies spawned under `name`.
    #[must_use]
    pub fn enemy_stats(world: &World, name: &str) -> EnemyStats {
        world.stats.get(name)
    }

    /// Scene requested by the finished scene, if it finished.
    #[must_use]
    pub fn scene_change(world: &World) -> Option<&SceneTarget> {
        if world.finished {
            world.next_scene.as_ref()
        } else {
            None
        }
    }

    /// Whether the item resting on `coord` of the open scene was collected.
    #[must_use]
    pub fn is_item_collected(world: &World, coord: GridCoord) -> bool {
        world.state.is_item_collected(&world.level_name, coord)
    }

    /// Number of update passes run so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
