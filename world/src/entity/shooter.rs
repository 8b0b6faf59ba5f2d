use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tilequest_core::{Direction, Spawn, TILE_SIZE};

use super::{
    enemy::{clamp_to_scene, touch_player},
    Body, Context,
};
use crate::{collision, stats::EnemyStats};

const SHOOT_INTERVAL: f32 = 2.0;
const BULLET_SPEED: f32 = 300.0;
const WALK_STEP: f32 = 35.0;
const WALK_FRAMES: usize = 2;
const PAUSE_DURATION: f32 = 1.0;
const DIRECTION_HOLD_MIN: f32 = 1.0;
const DIRECTION_HOLD_MAX: f32 = 3.5;
const WANDER_DIRECTIONS: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

/// Wanders in cardinal directions, pauses now and then, and fires bullets
/// along its facing on a fixed cadence.
#[derive(Debug)]
pub(super) struct Shooter {
    heading: Option<Direction>,
    direction_timer: f32,
    paused: bool,
    pause_timer: f32,
    pause_cooldown: f32,
    shoot_timer: f32,
    walk_frame: usize,
    walk_distance: f32,
}

impl Shooter {
    pub(super) fn new(rng: &mut ChaCha8Rng) -> Self {
        Self {
            heading: None,
            direction_timer: 0.0,
            paused: false,
            pause_timer: 0.0,
            pause_cooldown: rng.gen::<f32>() * 3.0,
            shoot_timer: rng.gen::<f32>() * SHOOT_INTERVAL,
            walk_frame: 0,
            walk_distance: 0.0,
        }
    }

    pub(super) fn facing(&self) -> Direction {
        self.heading.unwrap_or(Direction::Down)
    }

    pub(super) const fn frame(&self) -> usize {
        self.walk_frame
    }

    pub(super) fn update(&mut self, body: &mut Body, stats: &EnemyStats, ctx: &mut Context<'_>) {
        self.direction_timer -= ctx.dt;
        if self.direction_timer <= 0.0 || self.heading.is_none() {
            self.pick_heading(ctx.rng);
        }

        if self.paused {
            self.pause_timer -= ctx.dt;
            if self.pause_timer <= 0.0 {
                self.paused = false;
                self.pause_cooldown = 1.5 + ctx.rng.gen::<f32>() * 3.0;
            }
        } else {
            self.pause_cooldown -= ctx.dt;
            if self.pause_cooldown <= 0.0 {
                self.paused = true;
                self.pause_timer = PAUSE_DURATION;
            }
        }

        if !self.paused {
            self.wander(body, stats, ctx);
        }

        self.shoot_timer -= ctx.dt;
        if self.shoot_timer <= 0.0 {
            let facing = self.facing();
            ctx.spawn(Spawn::Bullet {
                position: body.position() + bullet_offset(facing),
                direction: facing,
                speed: BULLET_SPEED,
            });
            self.shoot_timer = SHOOT_INTERVAL;
        }

        clamp_to_scene(body);
        touch_player(body, stats.attack, ctx);
    }

    fn pick_heading(&mut self, rng: &mut ChaCha8Rng) {
        let heading = WANDER_DIRECTIONS[rng.gen_range(0..WANDER_DIRECTIONS.len())];
        self.heading = Some(heading);
        self.direction_timer =
            DIRECTION_HOLD_MIN + rng.gen::<f32>() * (DIRECTION_HOLD_MAX - DIRECTION_HOLD_MIN);
    }

    fn wander(&mut self, body: &mut Body, stats: &EnemyStats, ctx: &Context<'_>) {
        let heading = self.facing();
        let velocity = heading.unit() * stats.speed;
        let axis = match heading {
            Direction::Left | Direction::Right => Vec2::new(velocity.x, 0.0),
            Direction::Up | Direction::Down => Vec2::new(0.0, velocity.y),
        };

        let resolved = collision::resolve_axis_velocity(ctx.grid, &body.rect(), axis);
        if resolved == Vec2::ZERO {
            self.direction_timer = 0.0;
            return;
        }
        body.translate(resolved);

        self.walk_distance += resolved.x.abs() + resolved.y.abs();
        if self.walk_distance >= WALK_STEP {
            self.walk_distance -= WALK_STEP;
            self.walk_frame = (self.walk_frame + 1) % WALK_FRAMES;
        }
    }
}

fn bullet_offset(facing: Direction) -> Vec2 {
    let half_tile = (TILE_SIZE / 2) as f32;
    match facing {
        Direction::Left => Vec2::new(-half_tile, 12.0),
        Direction::Right => Vec2::new(half_tile, 12.0),
        Direction::Up => Vec2::new(20.0, -half_tile),
        Direction::Down => Vec2::new(20.0, half_tile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{
        testing::{scene_point, Harness},
        Effect,
    };

    #[test]
    fn expired_direction_timer_rolls_a_cardinal_heading() {
        let mut harness = Harness::new();
        let mut shooter = Shooter::new(&mut harness.rng);
        let mut body = Body::standard(scene_point(400.0, 300.0));

        for _ in 0..32 {
            shooter.direction_timer = 0.0;
            shooter.update(&mut body, &EnemyStats::new(1, 1, 1.5), &mut harness.context());

            let heading = shooter.heading.expect("heading picked");
            assert!(WANDER_DIRECTIONS.contains(&heading));
            assert_eq!(heading.unit().length(), 1.0);
            assert!(shooter.direction_timer >= DIRECTION_HOLD_MIN);
            assert!(shooter.direction_timer <= DIRECTION_HOLD_MAX);
        }
    }

    #[test]
    fn blocked_move_forces_a_new_heading() {
        let mut harness = Harness::new();
        let mut shooter = Shooter::new(&mut harness.rng);
        shooter.heading = Some(Direction::Left);
        shooter.direction_timer = 10.0;
        shooter.pause_cooldown = 10.0;
        let mut body = Body::standard(scene_point(0.0, 300.0));
        harness.grid.set_tile(
            tilequest_core::GridCoord::new(-1, 4),
            tilequest_core::TileKind::Wall,
        );
        harness.grid.set_tile(
            tilequest_core::GridCoord::new(-1, 5),
            tilequest_core::TileKind::Wall,
        );

        shooter.update(&mut body, &EnemyStats::new(1, 1, 1.5), &mut harness.context());

        assert_eq!(body.position(), scene_point(0.0, 300.0));
        assert_eq!(shooter.direction_timer, 0.0);
    }

    #[test]
    fn fires_on_interval_even_while_paused() {
        let mut harness = Harness::new();
        let mut shooter = Shooter::new(&mut harness.rng);
        shooter.heading = Some(Direction::Right);
        shooter.direction_timer = 10.0;
        shooter.paused = true;
        shooter.pause_timer = 10.0;
        shooter.shoot_timer = 0.0;
        let mut body = Body::standard(scene_point(400.0, 300.0));

        let mut ctx = harness.context();
        shooter.update(&mut body, &EnemyStats::new(1, 1, 1.5), &mut ctx);
        let effects = ctx.into_effects();

        assert_eq!(body.position(), scene_point(400.0, 300.0));
        assert_eq!(
            effects,
            vec![Effect::Spawn(Spawn::Bullet {
                position: scene_point(432.0, 312.0),
                direction: Direction::Right,
                speed: BULLET_SPEED,
            })]
        );
        assert_eq!(shooter.shoot_timer, SHOOT_INTERVAL);
    }
}
