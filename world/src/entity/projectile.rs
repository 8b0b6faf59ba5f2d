use glam::{IVec2, Vec2};
use tilequest_core::{
    AnimationClip, AnimationFinish, Direction, Faction, Label, Spawn, Visual, GAME_SCENE_SIZE,
    SCENE_OFFSET, SCREEN_SIZE, TILE_SIZE,
};

use super::{Body, Context, Effect};
use crate::collision;

const BULLET_LIFETIME: f32 = 3.0;
const BULLET_DAMAGE: i32 = 1;
const BULLET_MARGIN: f32 = 100.0;
const PROJECTILE_LIFETIME: f32 = 3.0;
const PROJECTILE_MARGIN: f32 = 50.0;
const SWORD_LIFETIME: f32 = 0.18;
const SWORD_SPEED: f32 = 400.0;

fn outside_screen(position: Vec2, margin: f32) -> bool {
    position.x < -margin
        || position.y < -margin
        || position.x > SCREEN_SIZE.x + margin
        || position.y > SCREEN_SIZE.y + margin
}

/// Enemy shot that damages the player.
#[derive(Debug)]
pub(crate) struct Bullet {
    direction: Direction,
    speed: f32,
    age: f32,
    expired: bool,
}

impl Bullet {
    pub(crate) fn body(position: Vec2) -> Body {
        Body::new(position, IVec2::splat(16), IVec2::splat(32))
    }

    pub(crate) const fn new(direction: Direction, speed: f32) -> Self {
        Self {
            direction,
            speed,
            age: 0.0,
            expired: false,
        }
    }

    pub(crate) fn update(&mut self, body: &mut Body, ctx: &mut Context<'_>) {
        if self.expired {
            return;
        }

        self.age += ctx.dt;
        if self.age >= BULLET_LIFETIME {
            // The bullet lingers under its death animation, which removes it.
            ctx.spawn(Spawn::Animation {
                position: body.position(),
                clip: AnimationClip::Death,
                looping: false,
                finish: AnimationFinish::Despawn(ctx.self_id),
            });
            self.expired = true;
            return;
        }

        let velocity = self.direction.unit() * self.speed * ctx.dt;
        let rect = body.rect();
        let along_x = collision::resolve_axis_velocity(ctx.grid, &rect, Vec2::new(velocity.x, 0.0));
        let along_y = collision::resolve_axis_velocity(ctx.grid, &rect, Vec2::new(0.0, velocity.y));
        if along_x.x != velocity.x || along_y.y != velocity.y {
            body.die();
            return;
        }

        if let Some(player) = ctx.which_colliding(&rect, Some(Label::Player)) {
            ctx.push(Effect::Damage {
                target: player.id,
                amount: BULLET_DAMAGE,
            });
            body.die();
            return;
        }

        body.translate(velocity);
        if outside_screen(body.position(), BULLET_MARGIN) {
            body.die();
        }
    }
}

/// Straight shot owned by one faction that hits the other.
#[derive(Debug)]
pub(crate) struct Projectile {
    direction: Direction,
    damage: i32,
    speed: f32,
    faction: Faction,
    age: f32,
}

impl Projectile {
    pub(crate) fn body(position: Vec2) -> Body {
        Body::new(position, IVec2::ZERO, IVec2::splat(16))
    }

    pub(crate) const fn new(direction: Direction, damage: i32, speed: f32, faction: Faction) -> Self {
        Self {
            direction,
            damage,
            speed,
            faction,
            age: 0.0,
        }
    }

    pub(crate) fn update(&mut self, body: &mut Body, ctx: &mut Context<'_>) {
        let velocity = self.direction.unit() * self.speed * ctx.dt;
        if collision::resolve_axis_velocity(ctx.grid, &body.rect(), velocity) != velocity {
            body.die();
            return;
        }

        body.translate(velocity);
        self.age += ctx.dt;
        if self.age >= PROJECTILE_LIFETIME || outside_screen(body.position(), PROJECTILE_MARGIN) {
            body.die();
            return;
        }

        if let Some(target) = ctx.which_colliding(&body.rect(), Some(self.faction.target_label())) {
            ctx.push(Effect::Damage {
                target: target.id,
                amount: self.damage,
            });
            body.die();
        }
    }

    pub(crate) const fn visual(&self) -> Visual {
        Visual::Projectile {
            faction: self.faction,
        }
    }
}

/// Short sword thrust travelling away from the player.
#[derive(Debug)]
pub(crate) struct Sword {
    direction: Direction,
    damage: i32,
    age: f32,
}

impl Sword {
    pub(crate) fn body(position: Vec2, direction: Direction) -> Body {
        let half_tile = TILE_SIZE / 2;
        let quarter_tile = TILE_SIZE / 4;
        let offset = match direction {
            Direction::Left => IVec2::new(-half_tile, quarter_tile),
            Direction::Right => IVec2::new(half_tile, quarter_tile),
            Direction::Up => IVec2::new(quarter_tile, -half_tile),
            Direction::Down => IVec2::new(quarter_tile, half_tile),
        };
        Body::new(position, offset, IVec2::splat(TILE_SIZE))
    }

    pub(crate) const fn new(direction: Direction, damage: i32) -> Self {
        Self {
            direction,
            damage,
            age: 0.0,
        }
    }

    pub(crate) fn update(&mut self, body: &mut Body, ctx: &mut Context<'_>) {
        self.age += ctx.dt;
        if self.age >= SWORD_LIFETIME {
            body.die();
            return;
        }

        let step = self.direction.unit() * SWORD_SPEED * ctx.dt;
        if collision::resolve_axis_velocity(ctx.grid, &body.rect(), step) != step {
            body.die();
            return;
        }
        body.translate(step);

        let inset = TILE_SIZE as f32;
        let min = SCENE_OFFSET + Vec2::splat(inset);
        let max = SCENE_OFFSET + GAME_SCENE_SIZE - Vec2::splat(inset);
        let position = body.position();
        if position.x < min.x || position.y < min.y || position.x > max.x || position.y > max.y {
            ctx.spawn(Spawn::Animation {
                position,
                clip: AnimationClip::Death,
                looping: false,
                finish: AnimationFinish::Vanish,
            });
            body.die();
            return;
        }

        if let Some(enemy) = ctx.which_colliding(&body.rect(), Some(Label::Enemy)) {
            ctx.push(Effect::Damage {
                target: enemy.id,
                amount: self.damage,
            });
            body.die();
        }
    }

    pub(crate) const fn visual(&self) -> Visual {
        Visual::Sword {
            facing: self.direction,
        }
    }
}
