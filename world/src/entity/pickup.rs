use glam::{IVec2, Vec2};
use tilequest_core::{Item, Label};

use super::{Body, Context, Effect};

const BOB_SPEED: f32 = 2.0;
const BOB_AMPLITUDE: f32 = 4.0;

/// Collectible coin bobbing in place.
#[derive(Debug)]
pub(crate) struct Coin {
    base: Vec2,
    value: i64,
    time: f32,
}

impl Coin {
    pub(crate) fn body(position: Vec2) -> Body {
        Body::new(position, IVec2::splat(8), IVec2::splat(48))
    }

    pub(crate) const fn new(base: Vec2, value: i64) -> Self {
        Self {
            base,
            value,
            time: 0.0,
        }
    }

    pub(crate) fn update(&mut self, body: &mut Body, ctx: &mut Context<'_>) {
        self.time += ctx.dt;
        let bob = (self.time * BOB_SPEED).sin() * BOB_AMPLITUDE;
        body.set_position(self.base + Vec2::new(0.0, bob));

        if ctx.which_colliding(&body.rect(), Some(Label::Player)).is_some() {
            ctx.push(Effect::CollectCoins(self.value));
            body.die();
        }
    }
}

/// Item lying on the ground until the player walks over it.
#[derive(Debug)]
pub(crate) struct ItemPickup {
    item: Item,
}

impl ItemPickup {
    pub(crate) fn body(position: Vec2) -> Body {
        Body::new(position, IVec2::ZERO, IVec2::splat(32))
    }

    pub(crate) const fn new(item: Item) -> Self {
        Self { item }
    }

    pub(crate) const fn item(&self) -> Item {
        self.item
    }
}

#[derive(Debug)]
pub(crate) struct Door {
    next_scene: String,
}

impl Door {
    pub(crate) fn new(next_scene: String) -> Self {
        Self { next_scene }
    }

    pub(crate) fn next_scene(&self) -> &str {
        &self.next_scene
    }
}
