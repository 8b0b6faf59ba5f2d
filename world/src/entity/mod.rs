//! Entity arena members and the per-update context they run against.

mod animation;
mod chaser;
mod enemy;
mod pickup;
mod player;
mod projectile;
mod shooter;
mod spider;
mod text;

use glam::{IVec2, Vec2};
use rand_chacha::ChaCha8Rng;
use tilequest_core::{
    Direction, EntityId, EntitySnapshot, GridCoord, InputSnapshot, Item, Label, PixelRect, SceneTarget, Spawn,
    Visual,
};

use crate::{collision, grid::Grid, state::GameState, stats::EnemyStatsCache};

pub(crate) use self::{
    animation::Animation,
    enemy::Enemy,
    pickup::{Coin, Door, ItemPickup},
    player::{Player, PlayerHit},
    projectile::{Bullet, Projectile, Sword},
    text::Text,
};

/// Position and collision rectangle shared by every entity.
///
/// The rectangle is recomputed on every position change.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Body {
    position: Vec2,
    offset: IVec2,
    size: IVec2,
    rect: PixelRect,
    dead: bool,
}

impl Body {
    pub(crate) fn new(position: Vec2, offset: IVec2, size: IVec2) -> Self {
        Self {
            position,
            offset,
            size,
            rect: PixelRect::anchored(position, offset, size),
            dead: false,
        }
    }

    /// Body of a full tile sprite whose top eighth does not collide.
    pub(crate) fn standard(position: Vec2) -> Self {
        Self::new(position, IVec2::new(0, 8), IVec2::new(64, 56))
    }

    pub(crate) const fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) const fn rect(&self) -> PixelRect {
        self.rect
    }

    pub(crate) const fn is_dead(&self) -> bool {
        self.dead
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.set_position(self.position + delta);
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.rect = PixelRect::anchored(self.position, self.offset, self.size);
    }

    pub(crate) fn die(&mut self) {
        self.dead = true;
    }

    /// Moves along each axis separately so blocked motion on one axis does
    /// not cancel the other. Returns the applied displacement.
    pub(crate) fn slide(&mut self, grid: &Grid, velocity: Vec2) -> Vec2 {
        let mut moved = Vec2::ZERO;

        let along_x = collision::resolve_axis_velocity(grid, &self.rect, Vec2::new(velocity.x, 0.0));
        if along_x.x != 0.0 {
            self.translate(Vec2::new(along_x.x, 0.0));
            moved.x = along_x.x;
        }

        let along_y = collision::resolve_axis_velocity(grid, &self.rect, Vec2::new(0.0, velocity.y));
        if along_y.y != 0.0 {
            self.translate(Vec2::new(0.0, along_y.y));
            moved.y = along_y.y;
        }

        moved
    }
}

/// Consequence of an entity update that touches state outside the entity.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Effect {
    Spawn(Spawn),
    Damage { target: EntityId, amount: i32 },
    ChangeScene(SceneTarget),
    EnterDoor { next_scene: String, position: Vec2 },
    LeaveScene { exit: Direction, position: Vec2 },
    CollectCoins(i64),
    CollectItem {
        pickup: EntityId,
        item: Item,
        coord: GridCoord,
    },
    Despawn(EntityId),
}

/// Read access to the scene plus an effect queue, handed to one entity at a time.
pub(crate) struct Context<'a> {
    pub(crate) dt: f32,
    pub(crate) input: &'a InputSnapshot,
    pub(crate) grid: &'a Grid,
    pub(crate) state: &'a GameState,
    pub(crate) rng: &'a mut ChaCha8Rng,
    pub(crate) self_id: EntityId,
    before: &'a [Entity],
    after: &'a [Entity],
    effects: Vec<Effect>,
}

impl<'a> Context<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        dt: f32,
        input: &'a InputSnapshot,
        grid: &'a Grid,
        state: &'a GameState,
        rng: &'a mut ChaCha8Rng,
        self_id: EntityId,
        before: &'a [Entity],
        after: &'a [Entity],
    ) -> Self {
        Self {
            dt,
            input,
            grid,
            state,
            rng,
            self_id,
            before,
            after,
            effects: Vec::new(),
        }
    }

    fn others(&self) -> impl Iterator<Item = &'a Entity> {
        self.before.iter().chain(self.after.iter())
    }

    /// First live entity in scene order whose rectangle overlaps `rect`,
    /// optionally restricted to one label.
    ///
    /// Scene order means the entities before the caller, then those after
    /// it. Entities already marked dead earlier in the current pass are
    /// skipped even though they stay in the scene until the end-of-pass
    /// sweep, so a second shot overlapping a freshly killed enemy moves on
    /// to the next candidate instead of hitting the corpse.
    pub(crate) fn which_colliding(&self, rect: &PixelRect, label: Option<Label>) -> Option<&'a Entity> {
        self.others().find(|other| {
            !other.body.is_dead()
                && label.map_or(true, |label| other.label == label)
                && rect.intersects(&other.body.rect())
        })
    }

    /// The live player, unless the updating entity is the player itself.
    pub(crate) fn player(&self) -> Option<&'a Entity> {
        self.others()
            .find(|other| other.label == Label::Player && !other.body.is_dead())
    }

    pub(crate) fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub(crate) fn spawn(&mut self, spawn: Spawn) {
        self.push(Effect::Spawn(spawn));
    }

    pub(crate) fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}

/// Variant-specific state of an entity.
#[derive(Debug)]
pub(crate) enum EntityKind {
    Player(Player),
    Enemy(Enemy),
    Bullet(Bullet),
    Projectile(Projectile),
    Sword(Sword),
    Coin(Coin),
    Item(ItemPickup),
    Door(Door),
    Animation(Animation),
    Text(Text),
    Hud,
}

/// Member of the scene's entity arena.
#[derive(Debug)]
pub(crate) struct Entity {
    pub(crate) id: EntityId,
    pub(crate) label: Label,
    pub(crate) body: Body,
    pub(crate) kind: EntityKind,
}

impl Entity {
    /// Builds the entity described by a spawn blueprint.
    pub(crate) fn from_spawn(
        id: EntityId,
        spawn: Spawn,
        stats: &EnemyStatsCache,
        state: &GameState,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let (label, body, kind) = match spawn {
            Spawn::Player { position } => (
                Label::Player,
                Player::body(position),
                EntityKind::Player(Player::new(state)),
            ),
            Spawn::Enemy {
                kind,
                position,
                entry,
            } => (
                Label::Enemy,
                Body::standard(position),
                EntityKind::Enemy(Enemy::new(kind, stats.get(kind.name()), entry, rng)),
            ),
            Spawn::Coin { position, value } => (
                Label::Coin,
                Coin::body(position),
                EntityKind::Coin(Coin::new(position, value)),
            ),
            Spawn::Item { position, item } => (
                Label::Item,
                ItemPickup::body(position),
                EntityKind::Item(ItemPickup::new(item)),
            ),
            Spawn::Door {
                position,
                next_scene,
            } => (
                Label::Door,
                Body::standard(position),
                EntityKind::Door(Door::new(next_scene)),
            ),
            Spawn::Animation {
                position,
                clip,
                looping,
                finish,
            } => (
                Label::Animation,
                Body::new(position, IVec2::ZERO, IVec2::ZERO),
                EntityKind::Animation(Animation::new(clip, looping, finish)),
            ),
            Spawn::Text { position, text } => (
                Label::Ui,
                Body::new(position, IVec2::ZERO, IVec2::ZERO),
                EntityKind::Text(Text::new(text)),
            ),
            Spawn::Hud => (
                Label::Ui,
                Body::new(Vec2::ZERO, IVec2::ZERO, IVec2::ZERO),
                EntityKind::Hud,
            ),
            Spawn::Bullet {
                position,
                direction,
                speed,
            } => (
                Label::Bullet,
                Bullet::body(position),
                EntityKind::Bullet(Bullet::new(direction, speed)),
            ),
            Spawn::Projectile {
                position,
                direction,
                damage,
                speed,
                faction,
            } => (
                Label::Projectile,
                Projectile::body(position),
                EntityKind::Projectile(Projectile::new(direction, damage, speed, faction)),
            ),
            Spawn::Sword {
                position,
                direction,
                damage,
            } => (
                Label::Sword,
                Sword::body(position, direction),
                EntityKind::Sword(Sword::new(direction, damage)),
            ),
        };

        Self {
            id,
            label,
            body,
            kind,
        }
    }

    /// Runs one update step.
    pub(crate) fn update(&mut self, ctx: &mut Context<'_>) {
        let Self { body, kind, .. } = self;
        match kind {
            EntityKind::Player(player) => player.update(body, ctx),
            EntityKind::Enemy(enemy) => enemy.update(body, ctx),
            EntityKind::Bullet(bullet) => bullet.update(body, ctx),
            EntityKind::Projectile(projectile) => projectile.update(body, ctx),
            EntityKind::Sword(sword) => sword.update(body, ctx),
            EntityKind::Coin(coin) => coin.update(body, ctx),
            EntityKind::Animation(animation) => animation.update(body, ctx),
            EntityKind::Item(_) | EntityKind::Door(_) | EntityKind::Text(_) | EntityKind::Hud => {}
        }
    }

    /// Captures what the entity looks like right now.
    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        let visual = match &self.kind {
            EntityKind::Player(player) => player.visual(),
            EntityKind::Enemy(enemy) => enemy.visual(),
            EntityKind::Bullet(_) => Visual::Bullet,
            EntityKind::Projectile(projectile) => projectile.visual(),
            EntityKind::Sword(sword) => sword.visual(),
            EntityKind::Coin(_) => Visual::Coin,
            EntityKind::Item(pickup) => Visual::Item {
                item: pickup.item(),
            },
            EntityKind::Door(_) => Visual::Door,
            EntityKind::Animation(animation) => animation.visual(),
            EntityKind::Text(text) => Visual::Text {
                text: text.text().to_owned(),
            },
            EntityKind::Hud => Visual::Hud,
        };

        EntitySnapshot {
            id: self.id,
            label: self.label,
            position: self.body.position(),
            rect: self.body.rect(),
            visual,
        }
    }
}
