#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that populates a freshly opened scene.

use std::ops::{Range, RangeInclusive};

use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilequest_core::{
    Command, EnemyKind, Event, GridCoord, Spawn, GAME_SCENE_SIZE, SCENE_OFFSET, TILE_SIZE,
};
use tilequest_world::level::{LevelLayout, UNDERWORLD_LEVEL};

const ENEMY_COUNT: RangeInclusive<usize> = 3..=5;
const COIN_COUNT: RangeInclusive<usize> = 5..=10;
const ENEMY_MARGIN: f32 = 100.0;
const COIN_MARGIN: f32 = 50.0;
const ATTEMPTS_PER_PLACEMENT: usize = 10;

/// Configuration parameters required to construct the bootstrap system.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration seeding the population RNG.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Populates scenes with their layout, HUD, player, enemies and coins.
#[derive(Debug)]
pub struct Bootstrap {
    rng: ChaCha8Rng,
}

impl Bootstrap {
    /// Creates a new bootstrap system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Emits the commands building the scene announced by a `SceneOpened`
    /// event, reading its content from `layout`.
    pub fn handle(&mut self, events: &[Event], layout: &LevelLayout, out: &mut Vec<Command>) {
        for event in events {
            if let Event::SceneOpened { level } = event {
                self.populate(level, layout, out);
            }
        }
    }

    fn populate(&mut self, level: &str, layout: &LevelLayout, out: &mut Vec<Command>) {
        let before = out.len();
        for tile in layout.tiles() {
            out.push(Command::SetTile {
                coord: tile.coord(),
                kind: tile.kind(),
            });
        }
        for door in layout.doors() {
            out.push(Command::Spawn {
                spawn: Spawn::Door {
                    position: cell_origin(door.coord),
                    next_scene: door.next_scene.clone(),
                },
            });
        }

        out.push(Command::Spawn { spawn: Spawn::Hud });
        out.push(Command::Spawn {
            spawn: Spawn::Player {
                position: layout
                    .player_spawn()
                    .map_or_else(scene_centre, cell_origin),
            },
        });

        if level != UNDERWORLD_LEVEL {
            self.spawn_enemies(layout, out);
            self.spawn_coins(layout, out);
        }

        log::debug!("bootstrapped {level} with {} commands", out.len() - before);
    }

    fn spawn_enemies(&mut self, layout: &LevelLayout, out: &mut Vec<Command>) {
        let count = self.rng.gen_range(ENEMY_COUNT);
        for position in self.free_positions(layout, count, ENEMY_MARGIN) {
            let Some(&kind) = EnemyKind::SPAWNABLE.choose(&mut self.rng) else {
                continue;
            };
            out.push(Command::Spawn {
                spawn: Spawn::Enemy {
                    kind,
                    position,
                    entry: None,
                },
            });
        }
    }

    fn spawn_coins(&mut self, layout: &LevelLayout, out: &mut Vec<Command>) {
        let count = self.rng.gen_range(COIN_COUNT);
        for position in self.free_positions(layout, count, COIN_MARGIN) {
            out.push(Command::Spawn {
                spawn: Spawn::Coin { position, value: 1 },
            });
        }
    }

    /// Samples up to `count` positions inside the scene, `margin` pixels from
    /// every border, that do not fall on a solid layout cell.
    fn free_positions(&mut self, layout: &LevelLayout, count: usize, margin: f32) -> Vec<Vec2> {
        let (xs, ys) = scene_ranges(margin);
        let mut positions = Vec::with_capacity(count);
        let mut attempts = 0;
        while positions.len() < count && attempts < count * ATTEMPTS_PER_PLACEMENT {
            attempts += 1;
            let position = Vec2::new(
                self.rng.gen_range(xs.clone()),
                self.rng.gen_range(ys.clone()),
            );
            if layout.is_solid(GridCoord::from_pixel(position - SCENE_OFFSET)) {
                continue;
            }
            positions.push(position);
        }
        if positions.len() < count {
            log::warn!("placed {} of {count} random entities", positions.len());
        }
        positions
    }
}

fn scene_ranges(margin: f32) -> (Range<f32>, Range<f32>) {
    (
        margin..GAME_SCENE_SIZE.x - margin,
        SCENE_OFFSET.y + margin..SCENE_OFFSET.y + GAME_SCENE_SIZE.y - margin,
    )
}

fn cell_origin(coord: GridCoord) -> Vec2 {
    coord.to_pixel() + SCENE_OFFSET
}

fn scene_centre() -> Vec2 {
    SCENE_OFFSET + GAME_SCENE_SIZE / 2.0 - Vec2::splat(TILE_SIZE as f32 / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_centre_sits_half_a_tile_up_left() {
        assert_eq!(scene_centre(), Vec2::new(480.0, 544.0));
    }

    #[test]
    fn ranges_keep_the_margin_inside_the_scene() {
        let (xs, ys) = scene_ranges(ENEMY_MARGIN);
        assert_eq!(xs, 100.0..924.0);
        assert_eq!(ys, 324.0..828.0);
    }
}
