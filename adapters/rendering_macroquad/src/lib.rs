#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tile Quest.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the crate depends on macroquad without its default `audio`
//! feature.
//!
//! The HUD is drawn with Macroquad's immediate-mode UI module. All UI-specific
//! calls live inside the local `ui` module.

mod sprites;
mod ui;

use self::ui::{draw_hud_ui, HudUiContext};
use anyhow::Result;
use glam::Vec2;
use macroquad::math::Vec2 as MacroquadVec2;
use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};
use tilequest_core::{Action, ActionSet, SCENE_OFFSET, TILE_SIZE};
use tilequest_rendering::{
    Color, FrameInput, HudPresentation, Presentation, RenderingBackend, Scene, SpriteInstance,
    SpriteKey, TextLabel, TileSprite,
};

use self::sprites::{DrawParams, SpriteAtlas};

const KEY_BINDINGS: [(KeyCode, Action); 15] = [
    (KeyCode::Left, Action::MoveLeft),
    (KeyCode::A, Action::MoveLeft),
    (KeyCode::Right, Action::MoveRight),
    (KeyCode::D, Action::MoveRight),
    (KeyCode::Up, Action::MoveUp),
    (KeyCode::W, Action::MoveUp),
    (KeyCode::Down, Action::MoveDown),
    (KeyCode::S, Action::MoveDown),
    (KeyCode::Z, Action::ActionA),
    (KeyCode::J, Action::ActionA),
    (KeyCode::X, Action::ActionB),
    (KeyCode::K, Action::ActionB),
    (KeyCode::Enter, Action::Start),
    (KeyCode::Space, Action::Talk),
    (KeyCode::Tab, Action::Select),
];

const TEXT_SIZE: f32 = 32.0;
const HUD_BACKGROUND: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Collects the actions bound to `pressed` keys.
fn actions_for(pressed: impl Fn(KeyCode) -> bool) -> ActionSet {
    KEY_BINDINGS
        .iter()
        .filter(|(key, _)| pressed(*key))
        .fold(ActionSet::EMPTY, |set, (_, action)| set.with(*action))
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// `1` saves the game.
    save: bool,
    /// `2` loads the saved game.
    load: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            save: is_key_pressed(KeyCode::Key1),
            load: is_key_pressed(KeyCode::Key2),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    load_sprites: bool,
    manifest_path: PathBuf,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            load_sprites: true,
            manifest_path: PathBuf::from("assets/manifest.toml"),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the backend should attempt to load sprite assets.
    #[must_use]
    pub fn with_sprite_loading(mut self, enabled: bool) -> Self {
        self.load_sprites = enabled;
        self
    }

    /// Overrides the location of the sprite manifest.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }
}

/// Averages frames per second over one-second windows.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the averages once one second has
    /// elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let metrics = FpsMetrics {
            per_second: self.frames as f32 / self.elapsed.as_secs_f32(),
            avg_render: self.render_accum / self.frames,
        };
        *self = Self::default();
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            load_sprites,
            manifest_path,
        } = self;

        let Presentation {
            window_title,
            screen_size,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: screen_size.x as i32,
            window_height: screen_size.y as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let sprite_atlas = if load_sprites {
                match SpriteAtlas::from_manifest_path(&manifest_path) {
                    Ok(atlas) => {
                        log::debug!("loaded {} sprite sheets", atlas.texture_count());
                        Some(atlas)
                    }
                    Err(error) => {
                        log::warn!("drawing placeholder shapes: {error:#}");
                        None
                    }
                }
            } else {
                None
            };

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let metrics = ScreenMetrics::new(
                    screen_size,
                    Vec2::new(
                        macroquad::window::screen_width(),
                        macroquad::window::screen_height(),
                    ),
                );
                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                let frame_input = gather_frame_input(&metrics, keyboard);

                update_scene(frame_dt, frame_input, &mut scene);

                let render_start = Instant::now();
                draw_tiles(&scene.tiles, &metrics, sprite_atlas.as_ref());
                draw_sprites(&scene.sprites, &metrics, sprite_atlas.as_ref());
                draw_texts(&scene.texts, &metrics);
                if let Some(hud) = scene.hud {
                    draw_hud(hud, &metrics);
                }
                let render_duration = render_start.elapsed();

                if let Some(FpsMetrics {
                    per_second,
                    avg_render,
                }) = fps_counter.record_frame(frame_dt, render_duration)
                {
                    if show_fps {
                        log::info!(
                            "FPS: {:.2} | render: {:>6.2}ms",
                            per_second,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Uniform scale and letterbox offset mapping game pixels onto the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScreenMetrics {
    logical: Vec2,
    scale: f32,
    offset: Vec2,
}

impl ScreenMetrics {
    fn new(logical: Vec2, window: Vec2) -> Self {
        let scale = if logical.x <= f32::EPSILON || logical.y <= f32::EPSILON {
            1.0
        } else {
            (window.x / logical.x).min(window.y / logical.y)
        };
        let offset = ((window - logical * scale) * 0.5).max(Vec2::ZERO);
        Self {
            logical,
            scale,
            offset,
        }
    }

    fn to_screen(&self, game: Vec2) -> Vec2 {
        self.offset + game * self.scale
    }

    fn to_game(&self, screen: Vec2) -> Vec2 {
        if self.scale <= f32::EPSILON {
            return screen;
        }
        (screen - self.offset) / self.scale
    }
}

fn gather_frame_input(metrics: &ScreenMetrics, keyboard: KeyboardShortcuts) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    FrameInput {
        held: actions_for(is_key_down),
        cursor: metrics.to_game(Vec2::new(cursor_x, cursor_y)),
        left_click: is_mouse_button_pressed(MouseButton::Left),
        right_click: is_mouse_button_pressed(MouseButton::Right),
        save_requested: keyboard.save,
        load_requested: keyboard.load,
    }
}

fn draw_tiles(tiles: &[TileSprite], metrics: &ScreenMetrics, atlas: Option<&SpriteAtlas>) {
    let size = Vec2::splat(TILE_SIZE as f32);
    for tile in tiles {
        let Some(column) = tile.kind.sheet_column() else {
            continue;
        };
        let params = DrawParams::new(metrics.to_screen(tile.position), size * metrics.scale)
            .with_cell(column, 0);
        draw_cell(SpriteKey::Tiles, params, atlas);
    }
}

fn draw_sprites(
    sprites: &[SpriteInstance],
    metrics: &ScreenMetrics,
    atlas: Option<&SpriteAtlas>,
) {
    for instance in sprites {
        let params = DrawParams::new(
            metrics.to_screen(instance.position),
            instance.size * metrics.scale,
        )
        .with_cell(instance.column, instance.row)
        .with_tint(instance.tint);
        draw_cell(instance.sprite, params, atlas);
    }
}

/// Draws a sheet cell, or a placeholder rectangle when no atlas is loaded.
fn draw_cell(key: SpriteKey, params: DrawParams, atlas: Option<&SpriteAtlas>) {
    if let Some(atlas) = atlas {
        if let Err(error) = atlas.draw(key, params) {
            log::debug!("{error:#}");
        }
        return;
    }

    macroquad::shapes::draw_rectangle(
        params.position.x,
        params.position.y,
        params.size.x,
        params.size.y,
        to_macroquad_color(placeholder_color(key)),
    );
}

fn placeholder_color(key: SpriteKey) -> Color {
    match key {
        SpriteKey::Tiles => Color::from_rgb_u8(0x88, 0x50, 0x18),
        SpriteKey::Player | SpriteKey::Sword | SpriteKey::SwordItem => {
            Color::from_rgb_u8(0x20, 0xa0, 0x30)
        }
        SpriteKey::Chaser | SpriteKey::Shooter | SpriteKey::Spider => {
            Color::from_rgb_u8(0xc8, 0x2a, 0x36)
        }
        SpriteKey::Bullet | SpriteKey::Projectile => Color::from_rgb_u8(0xf0, 0xf0, 0xf0),
        SpriteKey::Coin => Color::from_rgb_u8(0xff, 0xc1, 0x07),
        SpriteKey::Death | SpriteKey::Fire => Color::from_rgb_u8(0xff, 0x70, 0x20),
    }
}

fn draw_texts(texts: &[TextLabel], metrics: &ScreenMetrics) {
    let font_size = TEXT_SIZE * metrics.scale;
    for label in texts {
        let anchor = metrics.to_screen(label.position);
        let _ = macroquad::text::draw_text(
            &label.text,
            anchor.x,
            anchor.y + font_size,
            font_size,
            to_macroquad_color(Color::WHITE),
        );
    }
}

fn draw_hud(hud: HudPresentation, metrics: &ScreenMetrics) {
    let origin = metrics.to_screen(Vec2::ZERO);
    let size = Vec2::new(metrics.logical.x, SCENE_OFFSET.y) * metrics.scale;
    let mut root = macroquad::ui::root_ui();
    draw_hud_ui(
        &mut root,
        HudUiContext {
            origin: MacroquadVec2::new(origin.x, origin.y),
            size: MacroquadVec2::new(size.x, size.y),
            background: to_macroquad_color(HUD_BACKGROUND),
            hud,
        },
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
