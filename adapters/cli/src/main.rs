#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Tile Quest.

mod game;
mod levels;
mod tileset;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tilequest_core::{BACKGROUND_COLOR, SCREEN_SIZE};
use tilequest_rendering::{Color, Presentation, RenderingBackend};
use tilequest_rendering_macroquad::MacroquadBackend;
use tilequest_world::{stats::EnemyStatsCache, World, WorldConfig};

use crate::{
    game::{Game, GameSettings},
    tileset::SheetTileArt,
};

/// Whether frames wait for the display refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum VsyncMode {
    /// Synchronise presentation with the display.
    On,
    /// Present frames as soon as they are ready.
    Off,
}

/// Command-line arguments for launching the game.
#[derive(Debug, Parser)]
#[command(name = "tilequest", about = "A small tile-based action adventure.")]
struct CliArgs {
    /// Level opened on start.
    #[arg(long, default_value = "Zelda12")]
    level: String,
    /// Directory holding `<level>.csv` layouts.
    #[arg(long, value_name = "DIR", default_value = "assets/levels")]
    levels_dir: PathBuf,
    /// Enemy stats JSON file.
    #[arg(long, value_name = "PATH", default_value = "assets/enemy.json")]
    stats: PathBuf,
    /// Tileset image, one 64 pixel column per tile kind.
    #[arg(long, value_name = "PATH", default_value = "assets/tiles.png")]
    tileset: PathBuf,
    /// Sprite manifest.
    #[arg(long, value_name = "PATH", default_value = "assets/manifest.toml")]
    manifest: PathBuf,
    /// File written by the save hotkey and read by the load hotkey.
    #[arg(long, value_name = "PATH", default_value = "savegame.json")]
    save_file: PathBuf,
    /// Seed for every random source. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Controls vertical sync.
    #[arg(long, value_enum, default_value_t = VsyncMode::On)]
    vsync: VsyncMode,
    /// Prints frame timing once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Tile Quest command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("seed {seed}");

    let mut game = Game::new(
        build_world(&args, seed),
        GameSettings {
            levels_dir: args.levels_dir.clone(),
            save_path: args.save_file.clone(),
            seed,
        },
    );
    game.start(&args.level);

    let presentation = Presentation::new(
        "Tile Quest",
        SCREEN_SIZE,
        Color::from(BACKGROUND_COLOR),
        game.scene(),
    );
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync == VsyncMode::On)
        .with_show_fps(args.show_fps)
        .with_manifest_path(args.manifest);

    backend.run(presentation, move |dt, input, scene| {
        *scene = game.frame(dt, &input);
    })
}

fn build_world(args: &CliArgs, seed: u64) -> World {
    let stats = EnemyStatsCache::load(&args.stats).unwrap_or_else(|error| {
        log::warn!("using built-in enemy stats: {error}");
        EnemyStatsCache::builtin()
    });

    let config = WorldConfig::new(seed).with_enemy_stats(stats);
    let config = match SheetTileArt::load(&args.tileset) {
        Ok(art) => config.with_tile_art(art),
        Err(error) => {
            log::warn!("tiles will not collide pixel-perfectly: {error:#}");
            config
        }
    };
    World::with_config(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn defaults_point_at_the_bundled_assets() {
        let args = CliArgs::parse_from(["tilequest"]);

        assert_eq!(args.level, "Zelda12");
        assert_eq!(args.levels_dir, PathBuf::from("assets/levels"));
        assert_eq!(args.stats, PathBuf::from("assets/enemy.json"));
        assert_eq!(args.save_file, PathBuf::from("savegame.json"));
        assert_eq!(args.vsync, VsyncMode::On);
        assert_eq!(args.seed, None);
        assert!(!args.show_fps);
    }

    #[test]
    fn flags_override_defaults() {
        let args = CliArgs::parse_from([
            "tilequest",
            "--level",
            "Underworld",
            "--seed",
            "42",
            "--vsync",
            "off",
            "--show-fps",
        ]);

        assert_eq!(args.level, "Underworld");
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.vsync, VsyncMode::Off);
        assert!(args.show_fps);
    }

    #[test]
    fn missing_assets_fall_back_to_builtins() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args = CliArgs::parse_from([
            "tilequest".into(),
            "--stats".into(),
            dir.path().join("absent.json").into_os_string(),
            "--tileset".into(),
            dir.path().join("absent.png").into_os_string(),
        ]);

        let world = build_world(&args, 1);

        assert_eq!(
            tilequest_world::query::enemy_stats(&world, "Chaser"),
            EnemyStatsCache::builtin().get("Chaser")
        );
    }
}
