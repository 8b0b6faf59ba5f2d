//! Frame loop gluing the world to the gameplay systems.

use std::{path::PathBuf, time::Duration};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilequest_core::{Command, Event, SceneTarget, Spawn};
use tilequest_rendering::{FrameInput, HudPresentation, InputTracker, Scene, TileSprite};
use tilequest_system_bootstrap::{self as bootstrap, Bootstrap};
use tilequest_system_intro::{self as intro, Intro};
use tilequest_system_spawning::{self as spawning, Spawning};
use tilequest_world::{self as world, query, World};

use crate::levels::LevelLibrary;

/// Level shown after the player dies.
const LOSE_LEVEL: &str = "Lose";
const LOSE_MESSAGE: &str = "You Lose!";
const LOSE_TEXT_POSITION: Vec2 = Vec2::new(100.0, 100.0);

/// Longest step simulated in one frame. Longer stalls are slowed down.
const MAX_FRAME_STEP: Duration = Duration::from_millis(50);
/// Bound on command/event rounds handled per submitted command.
const MAX_REACTION_ROUNDS: usize = 8;

const SPAWN_DELAY: Duration = Duration::from_secs(1);

/// Paths and seed the game runs with.
#[derive(Clone, Debug)]
pub(crate) struct GameSettings {
    pub(crate) levels_dir: PathBuf,
    pub(crate) save_path: PathBuf,
    pub(crate) seed: u64,
}

/// Owns the world and every system reacting to it.
#[derive(Debug)]
pub(crate) struct Game {
    world: World,
    bootstrap: Bootstrap,
    spawning: Spawning,
    intro: Intro,
    input: InputTracker,
    levels: LevelLibrary,
    save_path: PathBuf,
}

impl Game {
    pub(crate) fn new(world: World, settings: GameSettings) -> Self {
        let mut seeds = ChaCha8Rng::seed_from_u64(settings.seed);
        Self {
            world,
            bootstrap: Bootstrap::new(bootstrap::Config::new(seeds.gen())),
            spawning: Spawning::new(spawning::Config::new(SPAWN_DELAY, seeds.gen())),
            intro: Intro::new(intro::Config::default()),
            input: InputTracker::new(),
            levels: LevelLibrary::new(settings.levels_dir),
            save_path: settings.save_path,
        }
    }

    /// Opens the first scene.
    pub(crate) fn start(&mut self, level: &str) {
        log::info!("starting at {level}");
        self.enter(level);
    }

    /// Runs one frame and returns what to draw.
    pub(crate) fn frame(&mut self, dt: Duration, input: &FrameInput) -> Scene {
        if input.save_requested && self.world.save_state(&self.save_path).is_ok() {
            log::info!("saved to {}", self.save_path.display());
        }
        if input.load_requested {
            self.load();
        }

        let input = self.input.snapshot(input);
        self.submit(Command::Tick {
            dt: dt.min(MAX_FRAME_STEP),
            input,
        });
        self.scene()
    }

    fn load(&mut self) {
        if self.world.load_state(&self.save_path).is_err() {
            return;
        }
        let level = query::game_state(&self.world).current_scene_name().to_owned();
        if level.is_empty() {
            log::warn!("save file names no scene, staying here");
            return;
        }
        log::info!("loaded save, reopening {level}");
        self.enter(&level);
    }

    fn enter(&mut self, level: &str) {
        self.submit(Command::OpenScene {
            level: level.to_owned(),
        });
        if level == LOSE_LEVEL {
            self.submit(Command::Spawn {
                spawn: Spawn::Text {
                    position: LOSE_TEXT_POSITION,
                    text: LOSE_MESSAGE.to_owned(),
                },
            });
        }
    }

    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.react(events);
    }

    fn react(&mut self, mut events: Vec<Event>) {
        let mut scene_change = None;
        for _ in 0..MAX_REACTION_ROUNDS {
            if events.is_empty() {
                break;
            }

            let mut commands = Vec::new();
            for event in &events {
                match event {
                    Event::SceneOpened { level } if level != LOSE_LEVEL => {
                        let layout = self.levels.layout(level);
                        self.bootstrap
                            .handle(std::slice::from_ref(event), layout, &mut commands);
                    }
                    Event::SceneChangeRequested { target } => {
                        scene_change = Some(target.clone());
                    }
                    _ => {}
                }
            }
            self.spawning
                .handle(&events, query::grid(&self.world), &mut commands);
            self.intro.handle(&events, &self.world, &mut commands);

            let mut next = Vec::new();
            for command in commands {
                world::apply(&mut self.world, command, &mut next);
            }
            events = next;
        }
        if !events.is_empty() {
            log::warn!("dropping {} events after {MAX_REACTION_ROUNDS} rounds", events.len());
        }

        if let Some(target) = scene_change {
            match target {
                SceneTarget::Named(level) => self.enter(&level),
                SceneTarget::Lose => {
                    log::info!("player died");
                    self.enter(LOSE_LEVEL);
                }
            }
        }
    }

    /// Draw list of the open scene.
    pub(crate) fn scene(&self) -> Scene {
        let grid = query::grid(&self.world);
        let tiles = grid
            .tiles()
            .map(|tile| TileSprite {
                kind: tile.kind(),
                position: grid.cell_origin(tile.coord()),
            })
            .collect();
        let hud = query::hud(&self.world);
        Scene::from_snapshots(
            tiles,
            &query::entities(&self.world),
            HudPresentation {
                health: hud.health,
                max_health: hud.max_health,
                attack: hud.attack,
                has_sword: hud.has_sword,
                coins: hud.coins,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tilequest_core::{Label, TileKind};
    use tilequest_world::WorldConfig;

    const OVERWORLD: &str = "\
#_@,#_@,#_@\n\
,player,\n\
,cave_Underworld,\n";

    struct Fixture {
        dir: tempfile::TempDir,
        game: Game,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("Zelda12.csv"), OVERWORLD).expect("level written");
        fs::write(dir.path().join("Underworld.csv"), "#_@\n,player\n").expect("level written");
        let game = Game::new(
            World::with_config(WorldConfig::new(3)),
            GameSettings {
                levels_dir: dir.path().to_path_buf(),
                save_path: dir.path().join("save.json"),
                seed: 3,
            },
        );
        Fixture { dir, game }
    }

    fn idle(game: &mut Game, frames: usize) -> Scene {
        let mut scene = game.scene();
        for _ in 0..frames {
            scene = game.frame(Duration::from_millis(16), &FrameInput::default());
        }
        scene
    }

    #[test]
    fn start_populates_the_level() {
        let mut fixture = fixture();
        fixture.game.start("Zelda12");

        let world = &fixture.game.world;
        assert_eq!(query::level_name(world), "Zelda12");
        assert_eq!(query::count_label(world, Label::Player), 1);
        assert!(query::count_label(world, Label::Enemy) >= 3);
        assert!(query::grid(world)
            .tiles()
            .any(|tile| tile.kind() == TileKind::Wall));

        let scene = fixture.game.scene();
        assert_eq!(scene.tiles.len(), 3);
        assert!(scene.hud.is_some());
        assert!(!scene.sprites.is_empty());
    }

    #[test]
    fn death_opens_the_lose_screen() {
        let mut fixture = fixture();
        fixture.game.start("Zelda12");

        fixture.game.react(vec![Event::SceneChangeRequested {
            target: SceneTarget::Lose,
        }]);

        let world = &fixture.game.world;
        assert_eq!(query::level_name(world), LOSE_LEVEL);
        assert_eq!(query::count_label(world, Label::Player), 0);
        let texts = query::texts(world);
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].2, LOSE_MESSAGE);

        let scene = idle(&mut fixture.game, 10);
        assert!(scene.hud.is_none());
        assert!(scene.tiles.is_empty());
    }

    #[test]
    fn named_scene_changes_open_the_target() {
        let mut fixture = fixture();
        fixture.game.start("Zelda12");

        fixture.game.react(vec![Event::SceneChangeRequested {
            target: SceneTarget::Named("Underworld".into()),
        }]);

        let world = &fixture.game.world;
        assert_eq!(query::level_name(world), "Underworld");
        assert_eq!(query::count_label(world, Label::Enemy), 0);
        assert!(fixture.game.intro.is_running());
    }

    #[test]
    fn hotkeys_save_and_reload_the_scene() {
        let mut fixture = fixture();
        fixture.game.start("Zelda12");
        let save = FrameInput {
            save_requested: true,
            ..FrameInput::default()
        };
        let _ = fixture.game.frame(Duration::from_millis(16), &save);
        assert!(fixture.dir.path().join("save.json").exists());

        fixture.game.enter("Underworld");
        let load = FrameInput {
            load_requested: true,
            ..FrameInput::default()
        };
        let _ = fixture.game.frame(Duration::from_millis(16), &load);

        assert_eq!(query::level_name(&fixture.game.world), "Zelda12");
        assert!(!fixture.game.intro.is_running());
    }

    #[test]
    fn loading_without_a_save_keeps_playing() {
        let mut fixture = fixture();
        fixture.game.start("Zelda12");
        let load = FrameInput {
            load_requested: true,
            ..FrameInput::default()
        };

        let _ = fixture.game.frame(Duration::from_millis(16), &load);

        assert_eq!(query::level_name(&fixture.game.world), "Zelda12");
        assert_eq!(query::count_label(&fixture.game.world, Label::Player), 1);
    }
}
