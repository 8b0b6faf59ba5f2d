use glam::{IVec2, Vec2};
use tilequest_core::{
    Action, Direction, Faction, GridCoord, Label, PixelRect, PlayerState, Spawn, Visual,
    GAME_SCENE_SIZE, SCENE_OFFSET, TILE_SIZE,
};

use super::{Body, Context, Effect, EntityKind};
use crate::state::GameState;

const SPEED: f32 = 5.0;
const INVULNERABILITY: f32 = 1.0;
const ATTACK_DURATION: f32 = 0.18;
const SHOOT_COOLDOWN: f32 = 0.5;
const MOUSE_STOP_DISTANCE: f32 = 5.0;
const WALK_STEP: f32 = 35.0;
const WALK_FRAMES: usize = 2;
const ATTACK_FRAMES: usize = 4;
const DAMAGE_FRAMES: usize = 4;
const DAMAGE_FRAME_TIME: f32 = 0.06;
const KNOCKBACK: i32 = 100;
const PROJECTILE_SPEED: f32 = 350.0;
const SWORD_ATTACK: i32 = 2;

const MOVE_ACTIONS: [(Action, Direction); 4] = [
    (Action::MoveLeft, Direction::Left),
    (Action::MoveRight, Direction::Right),
    (Action::MoveUp, Direction::Up),
    (Action::MoveDown, Direction::Down),
];

/// Result of a hit that got through the invulnerability window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PlayerHit {
    pub(crate) health: i32,
    pub(crate) max_health: i32,
    /// Where the player stood when the hit landed, before knockback.
    pub(crate) position: Vec2,
    pub(crate) died: bool,
}

/// Keyboard and mouse driven hero.
#[derive(Debug)]
pub(crate) struct Player {
    health: i32,
    max_health: i32,
    attack: i32,
    invulnerable: f32,
    state: PlayerState,
    facing: Direction,
    last_facing: Direction,
    last_pressed: Option<Direction>,
    desired: Vec2,
    mouse_target: Option<Vec2>,
    attack_timer: f32,
    shoot_timer: f32,
    walk_frame: usize,
    walk_distance: f32,
    damage_frame: usize,
    damage_timer: f32,
}

impl Player {
    pub(crate) fn body(position: Vec2) -> Body {
        Body::new(
            position,
            IVec2::new(5, TILE_SIZE / 2),
            IVec2::new(TILE_SIZE - 10, TILE_SIZE / 2),
        )
    }

    /// Creates the player with the health and equipment carried in `state`.
    pub(crate) fn new(state: &GameState) -> Self {
        let max_health = state.player_max_health().max(2);
        Self {
            health: state.player_health().clamp(0, max_health),
            max_health,
            attack: if state.has_sword() { SWORD_ATTACK } else { 1 },
            invulnerable: 0.0,
            state: PlayerState::Walking,
            facing: Direction::Up,
            last_facing: Direction::Down,
            last_pressed: None,
            desired: Vec2::ZERO,
            mouse_target: None,
            attack_timer: 0.0,
            shoot_timer: 0.0,
            walk_frame: 0,
            walk_distance: 0.0,
            damage_frame: 0,
            damage_timer: 0.0,
        }
    }

    pub(crate) const fn health(&self) -> i32 {
        self.health
    }

    pub(crate) const fn max_health(&self) -> i32 {
        self.max_health
    }

    pub(crate) const fn attack(&self) -> i32 {
        self.attack
    }

    pub(crate) const fn state(&self) -> PlayerState {
        self.state
    }

    pub(crate) const fn facing(&self) -> Direction {
        self.facing
    }

    pub(crate) fn equip_sword(&mut self) {
        self.attack = self.attack.max(SWORD_ATTACK);
    }

    pub(crate) fn update(&mut self, body: &mut Body, ctx: &mut Context<'_>) {
        self.handle_input(body, ctx);

        let velocity = self.desired * SPEED;
        let _ = body.slide(ctx.grid, velocity);

        let travelled = velocity.x.abs() + velocity.y.abs();
        if travelled > 0.01 {
            self.state = PlayerState::Walking;
            self.walk_distance += travelled;
            if self.walk_distance >= WALK_STEP {
                self.walk_distance -= WALK_STEP;
                self.walk_frame = (self.walk_frame + 1) % WALK_FRAMES;
            }
        }
        if self.facing != self.last_facing {
            self.walk_frame = 0;
            self.walk_distance = 0.0;
            self.last_facing = self.facing;
        }

        if self.invulnerable > 0.0 {
            self.state = PlayerState::Damaged;
            self.invulnerable -= ctx.dt;
            if self.invulnerable <= 0.0 {
                self.invulnerable = 0.0;
                self.state = PlayerState::Walking;
            }
        }

        if self.attack_timer > 0.0 {
            self.attack_timer -= ctx.dt;
            if self.attack_timer <= 0.0 {
                self.attack_timer = 0.0;
                if self.state == PlayerState::Attacking {
                    self.state = PlayerState::Walking;
                }
            }
        }

        if self.shoot_timer > 0.0 {
            self.shoot_timer = (self.shoot_timer - ctx.dt).max(0.0);
        }

        if self.state == PlayerState::Damaged {
            self.damage_timer += ctx.dt;
            if self.damage_timer >= DAMAGE_FRAME_TIME {
                self.damage_timer -= DAMAGE_FRAME_TIME;
                self.damage_frame = (self.damage_frame + 1) % DAMAGE_FRAMES;
            }
        } else {
            self.damage_timer = 0.0;
            self.damage_frame = 0;
        }

        let rect = body.rect();
        if let Some(exit) = scene_exit(&rect) {
            ctx.push(Effect::LeaveScene {
                exit,
                position: body.position(),
            });
        }

        if let Some(door) = ctx.which_colliding(&rect, Some(Label::Door)) {
            if let EntityKind::Door(target) = &door.kind {
                ctx.push(Effect::EnterDoor {
                    next_scene: target.next_scene().to_owned(),
                    position: body.position(),
                });
            }
        }

        if let Some(pickup) = ctx.which_colliding(&rect, Some(Label::Item)) {
            if let EntityKind::Item(item) = &pickup.kind {
                ctx.push(Effect::CollectItem {
                    pickup: pickup.id,
                    item: item.item(),
                    coord: GridCoord::from_pixel(pickup.body.position()),
                });
            }
        }
    }

    fn handle_input(&mut self, body: &Body, ctx: &mut Context<'_>) {
        self.desired = Vec2::ZERO;
        if !ctx.state.allow_player_control() {
            self.mouse_target = None;
            return;
        }

        let input = ctx.input;
        if input.is_left_mouse_click() {
            self.mouse_target = Some(input.mouse_position());
        }

        for (action, direction) in MOVE_ACTIONS {
            if input.is_action_pressed(action) {
                self.last_pressed = Some(direction);
            }
        }

        let held = |direction: Direction| {
            MOVE_ACTIONS
                .iter()
                .any(|(action, candidate)| *candidate == direction && input.is_action_down(*action))
        };
        let first_held = MOVE_ACTIONS
            .iter()
            .find(|(action, _)| input.is_action_down(*action))
            .map(|(_, direction)| *direction);

        if let Some(fallback) = first_held {
            self.mouse_target = None;
            let chosen = self
                .last_pressed
                .filter(|direction| held(*direction))
                .unwrap_or(fallback);
            self.desired = chosen.unit();
            self.facing = chosen;
        } else if let Some(target) = self.mouse_target {
            let rect = body.rect();
            let center = body.position() + Vec2::new((rect.width / 2) as f32, (rect.height / 2) as f32);
            let towards = target - center;
            if towards.length() > MOUSE_STOP_DISTANCE {
                self.desired = towards.normalize();
                if let Some(facing) = Direction::dominant(towards) {
                    self.facing = facing;
                }
            } else {
                self.mouse_target = None;
            }
        }

        let half_tile = (TILE_SIZE / 2) as f32;
        let hand = body.position() + Vec2::splat(half_tile);

        if input.is_action_pressed(Action::ActionA)
            && ctx.state.has_sword()
            && self.attack_timer <= 0.0
        {
            ctx.spawn(Spawn::Sword {
                position: hand + sword_offset(self.facing),
                direction: self.facing,
                damage: self.attack,
            });
            self.attack_timer = ATTACK_DURATION;
            self.state = PlayerState::Attacking;
        }

        if (input.is_right_mouse_click() || input.is_action_pressed(Action::ActionB))
            && self.shoot_timer <= 0.0
        {
            ctx.spawn(Spawn::Projectile {
                position: hand + self.facing.unit() * half_tile,
                direction: self.facing,
                damage: self.attack,
                speed: PROJECTILE_SPEED,
                faction: Faction::Player,
            });
            self.shoot_timer = SHOOT_COOLDOWN;
            self.attack_timer = self.attack_timer.max(ATTACK_DURATION);
            self.state = PlayerState::Attacking;
        }
    }

    /// Applies a hit unless the player is still invulnerable.
    ///
    /// Every hit that lands pushes the player back against its current
    /// movement intent.
    pub(crate) fn take_damage(&mut self, body: &mut Body, amount: i32) -> Option<PlayerHit> {
        if self.invulnerable > 0.0 {
            return None;
        }

        let position = body.position();
        self.health -= amount.max(1);
        self.invulnerable = INVULNERABILITY;
        self.state = PlayerState::Damaged;

        let died = self.health <= 0;
        if died {
            self.health = 0;
            body.die();
        }

        let push = IVec2::new(self.desired.x as i32, self.desired.y as i32) * KNOCKBACK;
        body.set_position(Vec2::new(
            (position.x as i32 - push.x) as f32,
            (position.y as i32 - push.y) as f32,
        ));

        Some(PlayerHit {
            health: self.health,
            max_health: self.max_health,
            position,
            died,
        })
    }

    pub(crate) fn visual(&self) -> Visual {
        let frame = match self.state {
            PlayerState::Walking => self.walk_frame,
            PlayerState::Attacking => {
                let elapsed = (ATTACK_DURATION - self.attack_timer).max(0.0);
                let progress = elapsed / ATTACK_DURATION;
                ((progress * ATTACK_FRAMES as f32).floor() as usize).min(ATTACK_FRAMES - 1)
            }
            PlayerState::Damaged => self.damage_frame,
            PlayerState::UsingItem => 0,
        };

        Visual::Player {
            facing: self.facing,
            state: self.state,
            frame,
        }
    }
}

/// Border the rectangle's centre has crossed, if it left the playable scene.
fn scene_exit(rect: &PixelRect) -> Option<Direction> {
    let center_x = (rect.left() + rect.right()) as f32 / 2.0;
    let center_y = (rect.top() + rect.bottom()) as f32 / 2.0;
    let far = SCENE_OFFSET + GAME_SCENE_SIZE;

    if center_x < SCENE_OFFSET.x {
        Some(Direction::Left)
    } else if center_x >= far.x {
        Some(Direction::Right)
    } else if center_y < SCENE_OFFSET.y {
        Some(Direction::Up)
    } else if center_y >= far.y {
        Some(Direction::Down)
    } else {
        None
    }
}

fn sword_offset(facing: Direction) -> Vec2 {
    match facing {
        Direction::Left => Vec2::new(-(TILE_SIZE as f32), 0.0),
        Direction::Right => Vec2::new(0.0, -10.0),
        Direction::Up => Vec2::new(-36.0, -(TILE_SIZE as f32) - 22.0),
        Direction::Down => Vec2::new(-10.0, TILE_SIZE as f32),
    }
}
