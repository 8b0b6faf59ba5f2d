#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map-area spawning system responsible for populating overworld levels
//! with their resident enemies.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilequest_core::{
    Command, Direction, EnemyKind, EntrySlide, Event, GridCoord, Spawn, GAME_SCENE_SIZE,
    SCENE_OFFSET, TILE_SIZE,
};
use tilequest_world::{grid::Grid, level::OVERWORLD_PREFIX};

const RANDOM_COUNT: usize = 3;
const SIDE_COUNT: usize = 4;
const ATTEMPTS_PER_ENEMY: usize = 10;
const ENTRY_SPEED: f32 = 2.0;

/// How an area places its enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnType {
    /// Interior cells at least two tiles from every border.
    Random,
    /// Border cells of the listed sides, sliding one tile inwards.
    Side(&'static [Direction]),
}

impl SpawnType {
    /// Number of enemies placed by this spawn type.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Random => RANDOM_COUNT,
            Self::Side(_) => SIDE_COUNT,
        }
    }
}

/// Enemy population of one overworld area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapArea {
    /// Behaviour family of every spawned enemy.
    pub enemy: EnemyKind,
    /// Placement strategy.
    pub spawn: SpawnType,
}

impl MapArea {
    /// Looks up the area encoded in a level name such as `Zelda03`.
    ///
    /// Returns `None` for levels outside the overworld and for areas that
    /// have no resident enemies.
    #[must_use]
    pub fn for_level(level: &str) -> Option<Self> {
        let code = level.strip_prefix(OVERWORLD_PREFIX)?.get(..2)?;
        let (enemy, spawn) = match code {
            "01" | "11" => (EnemyKind::Spider, SpawnType::Random),
            "02" => (EnemyKind::Shooter, SpawnType::Random),
            "03" => (
                EnemyKind::Shooter,
                SpawnType::Side(&[Direction::Down, Direction::Right]),
            ),
            "13" => (
                EnemyKind::Shooter,
                SpawnType::Side(&[Direction::Up, Direction::Right]),
            ),
            _ => return None,
        };
        Some(Self { enemy, spawn })
    }
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    delay: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided arming delay and seed.
    #[must_use]
    pub const fn new(delay: Duration, rng_seed: u64) -> Self {
        Self { delay, rng_seed }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 0)
    }
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    area: MapArea,
    remaining: Duration,
}

/// System that spawns an area's enemies shortly after its scene opens.
#[derive(Debug)]
pub struct Spawning {
    delay: Duration,
    rng: ChaCha8Rng,
    pending: Option<Pending>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            delay: config.delay,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            pending: None,
        }
    }

    /// Whether a spawn is armed and waiting for its delay to elapse.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes world events and the scene grid to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], grid: &Grid, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::SceneOpened { level } => {
                    self.pending = MapArea::for_level(level).map(|area| Pending {
                        area,
                        remaining: self.delay,
                    });
                    if let Some(pending) = self.pending {
                        log::debug!("arming {:?} spawns for {level}", pending.area.enemy);
                    }
                }
                Event::TimeAdvanced { dt } => {
                    let Some(pending) = self.pending.as_mut() else {
                        continue;
                    };
                    pending.remaining = pending.remaining.saturating_sub(*dt);
                    if pending.remaining.is_zero() {
                        let area = pending.area;
                        self.pending = None;
                        self.spawn_area(area, grid, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn spawn_area(&mut self, area: MapArea, grid: &Grid, out: &mut Vec<Command>) {
        let count = area.spawn.count();
        let placements = match area.spawn {
            SpawnType::Random => self.random_cells(grid, count),
            SpawnType::Side(sides) => self.side_cells(grid, sides, count),
        };
        if placements.len() < count {
            log::warn!(
                "placed {} of {count} {:?} enemies",
                placements.len(),
                area.enemy
            );
        }

        for (position, entry) in placements {
            out.push(Command::Spawn {
                spawn: Spawn::Enemy {
                    kind: area.enemy,
                    position,
                    entry,
                },
            });
        }
    }

    fn random_cells(&mut self, grid: &Grid, count: usize) -> Vec<(Vec2, Option<EntrySlide>)> {
        let margin = (TILE_SIZE * 2) as f32;
        let min = Vec2::new(margin, SCENE_OFFSET.y + margin);
        let max = Vec2::new(
            GAME_SCENE_SIZE.x - margin,
            SCENE_OFFSET.y + GAME_SCENE_SIZE.y - margin,
        );

        let mut placements = Vec::with_capacity(count);
        let mut attempts = 0;
        while placements.len() < count && attempts < count * ATTEMPTS_PER_ENEMY {
            attempts += 1;
            let sample = Vec2::new(
                self.rng.gen_range(min.x..max.x),
                self.rng.gen_range(min.y..max.y),
            );
            let coord = grid.cell_at(sample);
            if grid.is_tile_solid(coord) {
                continue;
            }
            placements.push((grid.cell_origin(coord), None));
        }
        placements
    }

    fn side_cells(
        &mut self,
        grid: &Grid,
        sides: &[Direction],
        count: usize,
    ) -> Vec<(Vec2, Option<EntrySlide>)> {
        let first = grid.cell_at(Vec2::new(TILE_SIZE as f32, SCENE_OFFSET.y));
        let last = grid.cell_at(SCENE_OFFSET + GAME_SCENE_SIZE);

        let mut placements = Vec::with_capacity(count);
        let mut attempts = 0;
        while placements.len() < count && attempts < count * ATTEMPTS_PER_ENEMY {
            attempts += 1;
            let Some(&side) = sides.get(self.rng.gen_range(0..sides.len().max(1))) else {
                break;
            };
            let coord = match side {
                Direction::Left => {
                    GridCoord::new(first.column(), self.rng.gen_range(first.row()..=last.row()))
                }
                Direction::Right => {
                    GridCoord::new(last.column(), self.rng.gen_range(first.row()..=last.row()))
                }
                Direction::Up => GridCoord::new(
                    self.rng.gen_range(first.column()..=last.column()),
                    first.row(),
                ),
                Direction::Down => GridCoord::new(
                    self.rng.gen_range(first.column()..=last.column()),
                    last.row(),
                ),
            };
            if grid.is_tile_solid(coord) {
                continue;
            }

            let entry = EntrySlide {
                direction: side.opposite(),
                distance: TILE_SIZE as f32,
                speed: ENTRY_SPEED,
            };
            placements.push((grid.cell_origin(coord), Some(entry)));
        }
        placements
    }
}
