use glam::Vec2;
use rand_chacha::ChaCha8Rng;
use tilequest_core::{
    Direction, EnemyKind, EntrySlide, Label, Visual, GAME_SCENE_SIZE, SCENE_OFFSET,
};

use super::{
    chaser::Chaser, shooter::Shooter, spider::Spider, Body, Context, Effect,
};
use crate::stats::EnemyStats;

#[derive(Debug)]
enum Behaviour {
    Chaser(Chaser),
    Shooter(Shooter),
    Spider(Spider),
    Idle,
}

/// Hostile entity sharing health, entry slides and scene clamping.
#[derive(Debug)]
pub(crate) struct Enemy {
    kind: EnemyKind,
    stats: EnemyStats,
    health: i32,
    entry: Option<EntrySlide>,
    behaviour: Behaviour,
}

impl Enemy {
    pub(crate) fn new(
        kind: EnemyKind,
        stats: EnemyStats,
        entry: Option<EntrySlide>,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let behaviour = match kind {
            EnemyKind::Chaser => Behaviour::Chaser(Chaser::new()),
            EnemyKind::Shooter => Behaviour::Shooter(Shooter::new(rng)),
            EnemyKind::Spider => Behaviour::Spider(Spider::new(rng)),
            EnemyKind::Basic => Behaviour::Idle,
        };

        Self {
            kind,
            stats,
            health: stats.max_health,
            entry: entry.filter(|slide| slide.distance > 0.0),
            behaviour,
        }
    }

    pub(crate) const fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub(crate) fn update(&mut self, body: &mut Body, ctx: &mut Context<'_>) {
        if self.run_entry(body, ctx) {
            return;
        }

        match &mut self.behaviour {
            Behaviour::Chaser(chaser) => chaser.update(body, &self.stats, ctx),
            Behaviour::Shooter(shooter) => shooter.update(body, &self.stats, ctx),
            Behaviour::Spider(spider) => spider.update(body, &self.stats, ctx),
            Behaviour::Idle => {}
        }
    }

    /// Advances the scripted entry slide. Returns whether it was active.
    fn run_entry(&mut self, body: &mut Body, ctx: &Context<'_>) -> bool {
        let Some(slide) = self.entry.as_mut() else {
            return false;
        };

        let step = slide.speed.abs().min(slide.distance);
        let _ = body.slide(ctx.grid, slide.direction.unit() * step);
        clamp_to_scene(body);

        slide.distance -= step;
        if slide.distance <= 0.0 {
            self.entry = None;
        }
        true
    }

    /// Applies damage of at least one point. Returns whether the hit killed
    /// the enemy; hits on a dead enemy do nothing.
    pub(crate) fn take_damage(&mut self, body: &mut Body, amount: i32) -> bool {
        if body.is_dead() {
            return false;
        }

        self.health -= amount.max(1);
        if self.health > 0 {
            return false;
        }

        self.health = 0;
        body.die();
        true
    }

    pub(crate) fn visual(&self) -> Visual {
        let (facing, frame, airborne) = match &self.behaviour {
            Behaviour::Chaser(chaser) => (chaser.facing(), 0, false),
            Behaviour::Shooter(shooter) => (shooter.facing(), shooter.frame(), false),
            Behaviour::Spider(spider) => (Direction::Down, 0, spider.is_jumping()),
            Behaviour::Idle => (Direction::Down, 0, false),
        };

        Visual::Enemy {
            kind: self.kind,
            facing,
            frame,
            airborne,
        }
    }
}

/// Keeps the body inside the playable scene.
pub(super) fn clamp_to_scene(body: &mut Body) {
    let rect = body.rect();
    let min = SCENE_OFFSET;
    let max = SCENE_OFFSET + GAME_SCENE_SIZE - Vec2::new(rect.width as f32, rect.height as f32);
    let clamped = body.position().max(min).min(max);
    if clamped != body.position() {
        body.set_position(clamped);
    }
}

/// Queues contact damage when the body overlaps the player.
pub(super) fn touch_player(body: &Body, attack: i32, ctx: &mut Context<'_>) {
    if let Some(player) = ctx.which_colliding(&body.rect(), Some(Label::Player)) {
        ctx.push(Effect::Damage {
            target: player.id,
            amount: attack,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::testing::{scene_point, Harness};
    use tilequest_core::{GridCoord, TileKind};

    #[test]
    fn damage_kills_exactly_once() {
        let mut harness = Harness::new();
        let mut enemy = Enemy::new(
            EnemyKind::Chaser,
            EnemyStats::new(2, 1, 80.0),
            None,
            &mut harness.rng,
        );
        let mut body = Body::standard(scene_point(100.0, 100.0));

        assert!(!enemy.take_damage(&mut body, 1));
        assert!(enemy.take_damage(&mut body, 1));
        assert!(body.is_dead());
        assert!(!enemy.take_damage(&mut body, 5));
    }

    #[test]
    fn zero_damage_applies_one_point() {
        let mut harness = Harness::new();
        let mut enemy = Enemy::new(EnemyKind::Basic, EnemyStats::new(2, 1, 1.0), None, &mut harness.rng);
        let mut body = Body::standard(scene_point(100.0, 100.0));

        assert!(!enemy.take_damage(&mut body, 0));
        assert!(enemy.take_damage(&mut body, 0));
    }

    #[test]
    fn entry_slide_moves_then_hands_over() {
        let mut harness = Harness::new();
        let slide = EntrySlide {
            direction: Direction::Left,
            distance: 5.0,
            speed: 2.0,
        };
        let mut enemy = Enemy::new(EnemyKind::Basic, EnemyStats::DEFAULT, Some(slide), &mut harness.rng);
        let mut body = Body::standard(scene_point(500.0, 300.0));

        for _ in 0..3 {
            enemy.update(&mut body, &mut harness.context());
        }

        assert_eq!(body.position(), scene_point(495.0, 300.0));
        assert!(enemy.entry.is_none());
    }

    #[test]
    fn entry_slide_respects_walls() {
        let mut harness = Harness::new();
        harness
            .grid
            .set_tile(GridCoord::new(6, 4), TileKind::Wall);
        let slide = EntrySlide {
            direction: Direction::Left,
            distance: 64.0,
            speed: 2.0,
        };
        let mut enemy = Enemy::new(EnemyKind::Basic, EnemyStats::DEFAULT, Some(slide), &mut harness.rng);
        let mut body = Body::standard(scene_point(448.0, 256.0));

        enemy.update(&mut body, &mut harness.context());

        assert_eq!(body.position(), scene_point(448.0, 256.0));
    }

    #[test]
    fn entry_slide_starting_off_scene_is_pulled_inside() {
        let mut harness = Harness::new();
        let slide = EntrySlide {
            direction: Direction::Right,
            distance: 64.0,
            speed: 2.0,
        };
        let mut enemy = Enemy::new(EnemyKind::Basic, EnemyStats::DEFAULT, Some(slide), &mut harness.rng);
        let mut body = Body::standard(scene_point(-30.0, 300.0));

        enemy.update(&mut body, &mut harness.context());

        assert_eq!(body.position(), scene_point(0.0, 300.0));
        assert!(enemy.entry.is_some());
    }

    #[test]
    fn clamp_keeps_body_inside_scene() {
        let mut body = Body::standard(Vec2::new(-20.0, 2000.0));

        clamp_to_scene(&mut body);

        assert_eq!(body.position(), Vec2::new(0.0, 224.0 + 704.0 - 56.0));
    }
}
