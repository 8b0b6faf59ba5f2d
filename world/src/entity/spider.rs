use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tilequest_core::{GAME_SCENE_SIZE, SCENE_OFFSET, TILE_SIZE};

use super::{
    enemy::{clamp_to_scene, touch_player},
    Body, Context,
};
use crate::stats::EnemyStats;

const MAX_JUMP_DURATION: f32 = 0.6;
const MIN_JUMP_HEIGHT: f32 = 20.0;
const JUMP_HEIGHT_SPREAD: f32 = 18.0;
const MAX_JUMP_TILES: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Jump {
    start: Vec2,
    target: Vec2,
    duration: f32,
    height: f32,
    elapsed: f32,
}

/// Hops sideways along a parabola at random intervals.
#[derive(Debug)]
pub(super) struct Spider {
    next_jump: f32,
    jump: Option<Jump>,
}

impl Spider {
    pub(super) fn new(rng: &mut ChaCha8Rng) -> Self {
        Self {
            next_jump: 0.5 + rng.gen::<f32>() * 2.0,
            jump: None,
        }
    }

    pub(super) const fn is_jumping(&self) -> bool {
        self.jump.is_some()
    }

    pub(super) fn update(&mut self, body: &mut Body, stats: &EnemyStats, ctx: &mut Context<'_>) {
        if self.jump.is_none() {
            self.next_jump -= ctx.dt;
            if self.next_jump <= 0.0 {
                self.jump = Some(plan_jump(body.position(), ctx.rng));
            } else {
                clamp_to_scene(body);
            }
        }

        if let Some(jump) = self.jump.as_mut() {
            jump.elapsed += ctx.dt;
            let t = if jump.duration <= 0.0 {
                1.0
            } else {
                (jump.elapsed / jump.duration).min(1.0)
            };

            if t >= 1.0 {
                body.set_position(jump.target);
                clamp_to_scene(body);
                self.jump = None;
                self.next_jump = 0.8 + ctx.rng.gen::<f32>() * 2.0;
            } else {
                let ground = jump.start.lerp(jump.target, t);
                body.set_position(ground - Vec2::new(0.0, arc_offset(jump.height, t)));
            }
        }

        touch_player(body, stats.attack, ctx);
    }
}

fn plan_jump(start: Vec2, rng: &mut ChaCha8Rng) -> Jump {
    let duration = rng.gen::<f32>() * MAX_JUMP_DURATION;
    let height = MIN_JUMP_HEIGHT + rng.gen::<f32>() * JUMP_HEIGHT_SPREAD;
    let shift = (rng.gen_range(-MAX_JUMP_TILES..=MAX_JUMP_TILES) * TILE_SIZE) as f32;

    let min_x = SCENE_OFFSET.x;
    let max_x = SCENE_OFFSET.x + GAME_SCENE_SIZE.x - TILE_SIZE as f32;
    let target = Vec2::new((start.x + shift).clamp(min_x, max_x), start.y);

    Jump {
        start,
        target,
        duration,
        height,
        elapsed: 0.0,
    }
}

/// Height above the ground line at progress `t` of a jump peaking at `height`.
pub(crate) fn arc_offset(height: f32, t: f32) -> f32 {
    4.0 * height * t * (1.0 - t)
}
