use tilequest_core::{AnimationClip, AnimationFinish, SceneTarget, Visual};

use super::{Body, Context, Effect};

#[derive(Debug)]
enum Phase {
    Playing,
    /// Finished and invisible, counting down before the scene change fires.
    Waiting { remaining: f32, target: SceneTarget },
}

/// One-shot or looping effect animation.
#[derive(Debug)]
pub(crate) struct Animation {
    clip: AnimationClip,
    looping: bool,
    finish: AnimationFinish,
    frame: usize,
    timer: f32,
    phase: Phase,
}

impl Animation {
    pub(crate) const fn new(clip: AnimationClip, looping: bool, finish: AnimationFinish) -> Self {
        Self {
            clip,
            looping,
            finish,
            frame: 0,
            timer: 0.0,
            phase: Phase::Playing,
        }
    }

    pub(crate) fn update(&mut self, body: &mut Body, ctx: &mut Context<'_>) {
        if let Phase::Waiting { remaining, target } = &mut self.phase {
            *remaining -= ctx.dt;
            if *remaining <= 0.0 {
                ctx.push(Effect::ChangeScene(target.clone()));
                body.die();
            }
            return;
        }

        let frame_time = self.clip.frame_time().as_secs_f32();
        self.timer += ctx.dt;
        while frame_time > 0.0 && self.timer > frame_time {
            self.timer -= frame_time;
            self.frame += 1;
            if self.frame < self.clip.frame_count() {
                continue;
            }
            if self.looping {
                self.frame = 0;
                continue;
            }

            self.frame = self.clip.frame_count() - 1;
            self.finish(body, ctx);
            return;
        }
    }

    fn finish(&mut self, body: &mut Body, ctx: &mut Context<'_>) {
        match &self.finish {
            AnimationFinish::Vanish => body.die(),
            AnimationFinish::Despawn(entity) => {
                ctx.push(Effect::Despawn(*entity));
                body.die();
            }
            AnimationFinish::ChangeScene { delay, target } => {
                self.phase = Phase::Waiting {
                    remaining: delay.as_secs_f32(),
                    target: target.clone(),
                };
            }
        }
    }

    pub(crate) fn visual(&self) -> Visual {
        match self.phase {
            Phase::Playing => Visual::Animation {
                clip: self.clip,
                frame: self.frame,
            },
            Phase::Waiting { .. } => Visual::Hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::entity::testing::{scene_point, Harness};
    use glam::IVec2;
    use tilequest_core::EntityId;

    fn run(animation: &mut Animation, body: &mut Body, harness: &mut Harness, steps: usize) -> Vec<Effect> {
        let mut effects = Vec::new();
        for _ in 0..steps {
            let mut ctx = harness.context();
            animation.update(body, &mut ctx);
            effects.extend(ctx.into_effects());
        }
        effects
    }

    fn body() -> Body {
        Body::new(scene_point(100.0, 100.0), IVec2::ZERO, IVec2::ZERO)
    }

    #[test]
    fn death_clip_vanishes_after_last_frame() {
        let mut harness = Harness::new();
        harness.dt = 0.125;
        let mut animation = Animation::new(AnimationClip::Death, false, AnimationFinish::Vanish);
        let mut body = body();

        let _ = run(&mut animation, &mut body, &mut harness, 2);
        assert_eq!(
            animation.visual(),
            Visual::Animation {
                clip: AnimationClip::Death,
                frame: 2
            }
        );
        assert!(!body.is_dead());

        let effects = run(&mut animation, &mut body, &mut harness, 1);
        assert!(effects.is_empty());
        assert!(body.is_dead());
    }

    #[test]
    fn long_steps_advance_several_frames() {
        let mut harness = Harness::new();
        harness.dt = 0.3;
        let mut animation = Animation::new(AnimationClip::Death, false, AnimationFinish::Vanish);
        let mut body = body();

        let _ = run(&mut animation, &mut body, &mut harness, 1);
        assert_eq!(
            animation.visual(),
            Visual::Animation {
                clip: AnimationClip::Death,
                frame: 2
            }
        );
        assert!(!body.is_dead());

        harness.dt = 0.1;
        let _ = run(&mut animation, &mut body, &mut harness, 1);
        assert!(body.is_dead());
    }

    #[test]
    fn looping_clip_wraps_around() {
        let mut harness = Harness::new();
        harness.dt = 0.16;
        let mut animation = Animation::new(AnimationClip::Fire, true, AnimationFinish::Vanish);
        let mut body = body();

        let _ = run(&mut animation, &mut body, &mut harness, 2);

        assert!(!body.is_dead());
        assert_eq!(
            animation.visual(),
            Visual::Animation {
                clip: AnimationClip::Fire,
                frame: 0
            }
        );
    }

    #[test]
    fn despawn_finish_removes_owner() {
        let mut harness = Harness::new();
        harness.dt = 0.125;
        let owner = EntityId::new(9);
        let mut animation =
            Animation::new(AnimationClip::Death, false, AnimationFinish::Despawn(owner));
        let mut body = body();

        let effects = run(&mut animation, &mut body, &mut harness, 3);

        assert_eq!(effects, vec![Effect::Despawn(owner)]);
        assert!(body.is_dead());
    }

    #[test]
    fn scene_change_waits_hidden_for_delay() {
        let mut harness = Harness::new();
        harness.dt = 0.125;
        let mut animation = Animation::new(
            AnimationClip::Death,
            false,
            AnimationFinish::ChangeScene {
                delay: Duration::from_millis(500),
                target: SceneTarget::Lose,
            },
        );
        let mut body = body();

        let effects = run(&mut animation, &mut body, &mut harness, 3);
        assert!(effects.is_empty());
        assert_eq!(animation.visual(), Visual::Hidden);

        let effects = run(&mut animation, &mut body, &mut harness, 3);
        assert!(effects.is_empty());
        let effects = run(&mut animation, &mut body, &mut harness, 1);
        assert_eq!(effects, vec![Effect::ChangeScene(SceneTarget::Lose)]);
        assert!(body.is_dead());
    }
}
