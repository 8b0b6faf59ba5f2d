#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cave intro: the old man's typewriter line followed by the sword gift.

use std::time::Duration;

use glam::Vec2;
use tilequest_core::{
    AnimationClip, AnimationFinish, Command, EntityId, Event, GridCoord, Item, Spawn,
};
use tilequest_world::{level::UNDERWORLD_LEVEL, query, World};

/// Line revealed one character at a time.
pub const MESSAGE: &str = "IT'S DANGEROUS TO GO ALONE! TAKE THIS.";
/// Top-left corner of the message.
pub const TEXT_POSITION: Vec2 = Vec2::new(312.0, 424.0);
/// Where the sword pickup appears once the message is complete.
pub const SWORD_POSITION: Vec2 = Vec2::new(480.0, 576.0);
/// Positions of the two fires flanking the old man.
pub const FIRE_POSITIONS: [Vec2; 2] = [Vec2::new(300.0, 480.0), Vec2::new(660.0, 480.0)];

/// Configuration parameters required to construct the intro system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    character_interval: Duration,
    gift_delay: Duration,
}

impl Config {
    /// Creates a configuration revealing one character per
    /// `character_interval` and handing out the sword `gift_delay` after the
    /// last character.
    #[must_use]
    pub const fn new(character_interval: Duration, gift_delay: Duration) -> Self {
        Self {
            character_interval,
            gift_delay,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(40), Duration::from_millis(600))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Typing {
        text: Option<EntityId>,
        elapsed: Duration,
        revealed: usize,
    },
    Gifting {
        text: Option<EntityId>,
        remaining: Duration,
    },
}

/// System scripting the cave intro.
#[derive(Debug)]
pub struct Intro {
    config: Config,
    phase: Phase,
}

impl Intro {
    /// Creates a new intro system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: Phase::Idle,
        }
    }

    /// Whether the intro is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Consumes world events and emits the commands driving the intro.
    pub fn handle(&mut self, events: &[Event], world: &World, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::SceneOpened { level } => self.scene_opened(level, world, out),
                Event::TimeAdvanced { dt } => self.advance(*dt, world, out),
                _ => {}
            }
        }
    }

    fn scene_opened(&mut self, level: &str, world: &World, out: &mut Vec<Command>) {
        self.phase = Phase::Idle;
        if level != UNDERWORLD_LEVEL {
            return;
        }

        for position in FIRE_POSITIONS {
            out.push(Command::Spawn {
                spawn: Spawn::Animation {
                    position,
                    clip: AnimationClip::Fire,
                    looping: true,
                    finish: AnimationFinish::Vanish,
                },
            });
        }

        if query::is_item_collected(world, GridCoord::from_pixel(SWORD_POSITION)) {
            log::debug!("sword already taken, skipping intro");
            return;
        }

        out.push(Command::SetPlayerControl { allowed: false });
        out.push(Command::Spawn {
            spawn: Spawn::Text {
                position: TEXT_POSITION,
                text: String::new(),
            },
        });
        self.phase = Phase::Typing {
            text: None,
            elapsed: Duration::ZERO,
            revealed: 0,
        };
    }

    fn advance(&mut self, dt: Duration, world: &World, out: &mut Vec<Command>) {
        match self.phase {
            Phase::Idle => {}
            Phase::Typing {
                text,
                elapsed,
                revealed,
            } => {
                let text = text.or_else(|| find_text(world));
                let elapsed = elapsed + dt;
                let target = self.revealed_at(elapsed);
                if target > revealed {
                    if let Some(entity) = text {
                        out.push(Command::SetText {
                            entity,
                            text: MESSAGE[..target].to_owned(),
                        });
                    }
                }

                self.phase = if target == MESSAGE.len() {
                    Phase::Gifting {
                        text,
                        remaining: self.config.gift_delay,
                    }
                } else {
                    Phase::Typing {
                        text,
                        elapsed,
                        revealed: target,
                    }
                };
            }
            Phase::Gifting { text, remaining } => {
                let remaining = remaining.saturating_sub(dt);
                if !remaining.is_zero() {
                    self.phase = Phase::Gifting { text, remaining };
                    return;
                }

                out.push(Command::Spawn {
                    spawn: Spawn::Item {
                        position: SWORD_POSITION,
                        item: Item::Sword,
                    },
                });
                out.push(Command::SetPlayerControl { allowed: true });
                if let Some(entity) = text {
                    out.push(Command::RemoveEntity { entity });
                }
                self.phase = Phase::Idle;
                log::debug!("intro finished");
            }
        }
    }

    fn revealed_at(&self, elapsed: Duration) -> usize {
        let interval = self.config.character_interval.as_nanos();
        if interval == 0 {
            return MESSAGE.len();
        }
        let characters = elapsed.as_nanos() / interval;
        usize::try_from(characters).map_or(MESSAGE.len(), |count| count.min(MESSAGE.len()))
    }
}

fn find_text(world: &World) -> Option<EntityId> {
    query::texts(world)
        .into_iter()
        .find(|(_, position, _)| *position == TEXT_POSITION)
        .map(|(entity, _, _)| entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_count_follows_elapsed_time() {
        let intro = Intro::new(Config::default());
        assert_eq!(intro.revealed_at(Duration::from_millis(39)), 0);
        assert_eq!(intro.revealed_at(Duration::from_millis(40)), 1);
        assert_eq!(intro.revealed_at(Duration::from_millis(205)), 5);
        assert_eq!(intro.revealed_at(Duration::from_secs(10)), MESSAGE.len());
    }

    #[test]
    fn zero_interval_reveals_everything_at_once() {
        let intro = Intro::new(Config::new(Duration::ZERO, Duration::ZERO));
        assert_eq!(intro.revealed_at(Duration::ZERO), MESSAGE.len());
    }
}
