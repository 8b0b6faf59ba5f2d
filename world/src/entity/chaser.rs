use glam::Vec2;
use tilequest_core::{Direction, TILE_SIZE};

use super::{enemy::clamp_to_scene, Body, Context};
use crate::{collision, stats::EnemyStats};

const DETECTION_RADIUS: f32 = 300.0;
const MIN_AXIS_STEP: f32 = 0.1;

/// Walks straight at the player once it comes within range.
#[derive(Debug)]
pub(super) struct Chaser {
    facing: Direction,
}

impl Chaser {
    pub(super) fn new() -> Self {
        Self {
            facing: Direction::Down,
        }
    }

    pub(super) const fn facing(&self) -> Direction {
        self.facing
    }

    pub(super) fn update(&mut self, body: &mut Body, stats: &EnemyStats, ctx: &mut Context<'_>) {
        let Some(player) = ctx.player() else {
            return;
        };

        let half_tile = Vec2::splat((TILE_SIZE / 2) as f32);
        let towards = (player.body.position() + half_tile) - (body.position() + half_tile);
        let distance = towards.length();
        if distance <= 0.0 || distance > DETECTION_RADIUS {
            return;
        }

        if let Some(facing) = Direction::dominant(towards) {
            self.facing = facing;
        }

        let velocity = towards / distance * stats.speed * ctx.dt;
        if velocity.x.abs() > MIN_AXIS_STEP {
            let along_x =
                collision::resolve_axis_velocity(ctx.grid, &body.rect(), Vec2::new(velocity.x, 0.0));
            if along_x.x != 0.0 {
                body.translate(along_x);
            }
        }
        if velocity.y.abs() > MIN_AXIS_STEP {
            let along_y =
                collision::resolve_axis_velocity(ctx.grid, &body.rect(), Vec2::new(0.0, velocity.y));
            if along_y.y != 0.0 {
                body.translate(along_y);
            }
        }

        clamp_to_scene(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::{
            testing::{scene_point, Harness},
            Entity,
        },
        stats::EnemyStatsCache,
    };
    use tilequest_core::{EntityId, Spawn};

    fn harness_with_player(position: Vec2) -> Harness {
        let mut harness = Harness::new();
        let player = Entity::from_spawn(
            EntityId::new(1),
            Spawn::Player { position },
            &EnemyStatsCache::builtin(),
            &harness.state,
            &mut harness.rng,
        );
        harness.others.push(player);
        harness
    }

    #[test]
    fn seeks_player_inside_radius() {
        let mut harness = harness_with_player(scene_point(300.0, 300.0));
        let mut chaser = Chaser::new();
        let mut body = Body::standard(scene_point(100.0, 300.0));

        chaser.update(&mut body, &EnemyStats::new(2, 1, 80.0), &mut harness.context());

        assert!(body.position().x > scene_point(100.0, 0.0).x);
        assert_eq!(body.position().y, scene_point(0.0, 300.0).y);
        assert_eq!(chaser.facing(), Direction::Right);
    }

    #[test]
    fn ignores_player_outside_radius() {
        let mut harness = harness_with_player(scene_point(700.0, 300.0));
        let mut chaser = Chaser::new();
        let mut body = Body::standard(scene_point(100.0, 300.0));

        chaser.update(&mut body, &EnemyStats::new(2, 1, 80.0), &mut harness.context());

        assert_eq!(body.position(), scene_point(100.0, 300.0));
    }
}
