#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tile Quest adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::time::Duration;
use tilequest_core::{
    ActionSet, AnimationClip, Direction, EnemyKind, EntitySnapshot, Faction, InputSnapshot, Item,
    PlayerState, Rgba, TileKind, Visual, TILE_SIZE,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white, the neutral sprite tint.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

impl From<Rgba> for Color {
    fn from(rgba: Rgba) -> Self {
        Self::new(
            f32::from(rgba.red) / 255.0,
            f32::from(rgba.green) / 255.0,
            f32::from(rgba.blue) / 255.0,
            f32::from(rgba.alpha) / 255.0,
        )
    }
}

/// Input gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Actions held down on this frame.
    pub held: ActionSet,
    /// Cursor position in game pixels.
    pub cursor: Vec2,
    /// Whether the left mouse button went down this frame.
    pub left_click: bool,
    /// Whether the right mouse button went down this frame.
    pub right_click: bool,
    /// Whether the save hotkey went down this frame.
    pub save_requested: bool,
    /// Whether the load hotkey went down this frame.
    pub load_requested: bool,
}

/// Remembers the previous frame's held actions so presses become rising edges.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputTracker {
    previous: ActionSet,
}

impl InputTracker {
    /// Creates a tracker that treats every action as released.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: ActionSet::EMPTY,
        }
    }

    /// Converts the frame input into a world input snapshot and remembers the
    /// held set for the next frame.
    pub fn snapshot(&mut self, input: &FrameInput) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            input.held,
            self.previous,
            input.cursor,
            input.left_click,
            input.right_click,
        );
        self.previous = input.held;
        snapshot
    }
}

/// Sprite sheets listed in the asset manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpriteKey {
    /// Tileset, one column per tile kind.
    Tiles,
    /// Player strips, one row per facing.
    Player,
    /// Sword swing, one column per facing.
    Sword,
    /// Chaser walk strips, one row per facing.
    Chaser,
    /// Shooter walk strips, one row per facing.
    Shooter,
    /// Spider resting and airborne frames.
    Spider,
    /// Enemy bullet.
    Bullet,
    /// Projectiles, one column per faction.
    Projectile,
    /// Coin.
    Coin,
    /// Sword lying on the ground.
    SwordItem,
    /// Death puff frames.
    Death,
    /// Fire frames.
    Fire,
}

impl SpriteKey {
    /// Every key, in manifest order.
    pub const ALL: [SpriteKey; 12] = [
        Self::Tiles,
        Self::Player,
        Self::Sword,
        Self::Chaser,
        Self::Shooter,
        Self::Spider,
        Self::Bullet,
        Self::Projectile,
        Self::Coin,
        Self::SwordItem,
        Self::Death,
        Self::Fire,
    ];

    /// Name of the key in the asset manifest.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tiles => "Tiles",
            Self::Player => "Player",
            Self::Sword => "Sword",
            Self::Chaser => "Chaser",
            Self::Shooter => "Shooter",
            Self::Spider => "Spider",
            Self::Bullet => "Bullet",
            Self::Projectile => "Projectile",
            Self::Coin => "Coin",
            Self::SwordItem => "SwordItem",
            Self::Death => "Death",
            Self::Fire => "Fire",
        }
    }

    /// Looks a key up by its manifest name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Columns and rows the sheet is cut into.
    #[must_use]
    pub const fn layout(self) -> (u32, u32) {
        match self {
            Self::Tiles => (12, 1),
            Self::Player => (PLAYER_COLUMNS, 4),
            Self::Chaser | Self::Shooter => (2, 4),
            Self::Sword => (4, 1),
            Self::Spider | Self::Projectile | Self::Fire => (2, 1),
            Self::Death => (3, 1),
            Self::Bullet | Self::Coin | Self::SwordItem => (1, 1),
        }
    }
}

const PLAYER_COLUMNS: u32 = 7;
const PLAYER_ATTACK_COLUMN: u32 = 2;
const PLAYER_ITEM_COLUMN: u32 = 6;
const DAMAGE_TINT: Color = Color::new(1.0, 0.35, 0.35, 1.0);

/// One cell of a sprite sheet placed on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteInstance {
    /// Sheet to draw from.
    pub sprite: SpriteKey,
    /// Column of the cell within the sheet.
    pub column: u32,
    /// Row of the cell within the sheet.
    pub row: u32,
    /// Top-left corner in game pixels.
    pub position: Vec2,
    /// Size on screen in game pixels.
    pub size: Vec2,
    /// Multiplicative tint.
    pub tint: Color,
}

impl SpriteInstance {
    fn cell(sprite: SpriteKey, column: u32, row: u32, position: Vec2, size: f32) -> Self {
        Self {
            sprite,
            column,
            row,
            position,
            size: Vec2::splat(size),
            tint: Color::WHITE,
        }
    }

    /// Sprite drawn for an entity snapshot, or `None` when nothing is drawn
    /// through the sprite layer.
    #[must_use]
    pub fn for_snapshot(snapshot: &EntitySnapshot) -> Option<Self> {
        let position = snapshot.position;
        let tile = TILE_SIZE as f32;
        let instance = match &snapshot.visual {
            Visual::Player {
                facing,
                state,
                frame,
            } => {
                let frame = *frame as u32;
                let column = match state {
                    PlayerState::Walking | PlayerState::Damaged => frame % 2,
                    PlayerState::Attacking => PLAYER_ATTACK_COLUMN + frame % 4,
                    PlayerState::UsingItem => PLAYER_ITEM_COLUMN,
                };
                let mut instance =
                    Self::cell(SpriteKey::Player, column, facing_row(*facing), position, tile);
                if *state == PlayerState::Damaged && frame % 2 == 0 {
                    instance.tint = DAMAGE_TINT;
                }
                instance
            }
            Visual::Enemy {
                kind,
                facing,
                frame,
                airborne,
            } => match kind {
                EnemyKind::Spider => {
                    Self::cell(SpriteKey::Spider, u32::from(*airborne), 0, position, tile)
                }
                EnemyKind::Shooter => Self::cell(
                    SpriteKey::Shooter,
                    *frame as u32 % 2,
                    facing_row(*facing),
                    position,
                    tile,
                ),
                EnemyKind::Chaser | EnemyKind::Basic => Self::cell(
                    SpriteKey::Chaser,
                    *frame as u32 % 2,
                    facing_row(*facing),
                    position,
                    tile,
                ),
            },
            Visual::Bullet => Self::cell(SpriteKey::Bullet, 0, 0, position, tile),
            Visual::Projectile { faction } => {
                let column = match faction {
                    Faction::Player => 0,
                    Faction::Enemy => 1,
                };
                Self::cell(SpriteKey::Projectile, column, 0, position, 16.0)
            }
            Visual::Sword { facing } => {
                Self::cell(SpriteKey::Sword, facing_row(*facing), 0, position, tile)
            }
            Visual::Coin => Self::cell(SpriteKey::Coin, 0, 0, position, tile),
            Visual::Item { item } => match item {
                Item::Sword => Self::cell(SpriteKey::SwordItem, 0, 0, position, 32.0),
                Item::Coin => Self::cell(SpriteKey::Coin, 0, 0, position, 32.0),
            },
            Visual::Animation { clip, frame } => {
                let sprite = match clip {
                    AnimationClip::Death => SpriteKey::Death,
                    AnimationClip::Fire => SpriteKey::Fire,
                };
                let (columns, _) = sprite.layout();
                Self::cell(sprite, *frame as u32 % columns, 0, position, tile)
            }
            Visual::Door => {
                let column = TileKind::Cave.sheet_column().unwrap_or_default();
                Self::cell(SpriteKey::Tiles, column, 0, position, tile)
            }
            Visual::Text { .. } | Visual::Hud | Visual::Hidden => return None,
        };
        Some(instance)
    }
}

const fn facing_row(facing: Direction) -> u32 {
    match facing {
        Direction::Down => 0,
        Direction::Up => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

/// Tile placed on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSprite {
    /// Kind of tile, selecting the tileset column.
    pub kind: TileKind,
    /// Top-left corner in game pixels.
    pub position: Vec2,
}

/// Line of text drawn in the UI layer.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    /// Top-left corner in game pixels.
    pub position: Vec2,
    /// Contents.
    pub text: String,
}

/// Values shown by the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudPresentation {
    /// Current health.
    pub health: i32,
    /// Maximum health.
    pub max_health: i32,
    /// Player attack.
    pub attack: i32,
    /// Whether the sword is owned.
    pub has_sword: bool,
    /// Coin counter.
    pub coins: i64,
}

impl HudPresentation {
    /// Control reminder shown below the stats.
    pub const HINT: &'static str = "Arrows/WASD: move  Z: sword  X: shoot  1: save  2: load";

    /// Lines of text, top to bottom.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Health: {}/{}", self.health, self.max_health),
            format!("Attack: {}", self.attack),
        ];
        if self.has_sword {
            lines.push("Sword: Yes (Z)".to_owned());
        }
        lines.push(format!("Coins: {}", self.coins));
        lines.push(Self::HINT.to_owned());
        lines
    }
}

/// Everything drawn on one frame, in draw order.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// Tiles, drawn first.
    pub tiles: Vec<TileSprite>,
    /// Entity sprites in world draw order.
    pub sprites: Vec<SpriteInstance>,
    /// UI text entities.
    pub texts: Vec<TextLabel>,
    /// Heads-up display, when the scene has one.
    pub hud: Option<HudPresentation>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        tiles: Vec<TileSprite>,
        sprites: Vec<SpriteInstance>,
        texts: Vec<TextLabel>,
        hud: Option<HudPresentation>,
    ) -> Self {
        Self {
            tiles,
            sprites,
            texts,
            hud,
        }
    }

    /// Builds a scene from world snapshots in draw order.
    ///
    /// The HUD is only shown when a HUD entity is present; `hud` supplies its
    /// values.
    #[must_use]
    pub fn from_snapshots(
        tiles: Vec<TileSprite>,
        snapshots: &[EntitySnapshot],
        hud: HudPresentation,
    ) -> Self {
        let sprites = snapshots
            .iter()
            .filter_map(SpriteInstance::for_snapshot)
            .collect();
        let texts = snapshots
            .iter()
            .filter_map(|snapshot| match &snapshot.visual {
                Visual::Text { text } => Some(TextLabel {
                    position: snapshot.position,
                    text: text.clone(),
                }),
                _ => None,
            })
            .collect();
        let shows_hud = snapshots
            .iter()
            .any(|snapshot| snapshot.visual == Visual::Hud);

        Self::new(tiles, sprites, texts, shows_hud.then_some(hud))
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Logical screen size in game pixels.
    pub screen_size: Vec2,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, screen_size: Vec2, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            screen_size,
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Tile Quest scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rewrites the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilequest_core::{Action, EntityId, Label, PixelRect};

    fn snapshot(visual: Visual) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(1),
            label: Label::Player,
            position: Vec2::new(100.0, 300.0),
            rect: PixelRect::new(105, 332, 54, 32),
            visual,
        }
    }

    #[test]
    fn tracker_reports_rising_edges_only() {
        let mut tracker = InputTracker::new();
        let held = FrameInput {
            held: ActionSet::EMPTY.with(Action::ActionA),
            ..FrameInput::default()
        };

        let first = tracker.snapshot(&held);
        let second = tracker.snapshot(&held);
        let released = tracker.snapshot(&FrameInput::default());
        let again = tracker.snapshot(&held);

        assert!(first.is_action_pressed(Action::ActionA));
        assert!(!second.is_action_pressed(Action::ActionA));
        assert!(second.is_action_down(Action::ActionA));
        assert!(!released.is_action_down(Action::ActionA));
        assert!(again.is_action_pressed(Action::ActionA));
    }

    #[test]
    fn manifest_names_round_trip() {
        for key in SpriteKey::ALL {
            assert_eq!(SpriteKey::from_name(key.name()), Some(key));
        }
        assert_eq!(SpriteKey::from_name("Tower"), None);
    }

    #[test]
    fn attacking_player_uses_the_attack_columns() {
        let instance = SpriteInstance::for_snapshot(&snapshot(Visual::Player {
            facing: Direction::Left,
            state: PlayerState::Attacking,
            frame: 3,
        }))
        .expect("player is drawn");

        assert_eq!(instance.sprite, SpriteKey::Player);
        assert_eq!((instance.column, instance.row), (5, 2));
        assert_eq!(instance.tint, Color::WHITE);
    }

    #[test]
    fn damaged_player_flashes() {
        let tints: Vec<Color> = (0..4)
            .filter_map(|frame| {
                SpriteInstance::for_snapshot(&snapshot(Visual::Player {
                    facing: Direction::Down,
                    state: PlayerState::Damaged,
                    frame,
                }))
            })
            .map(|instance| instance.tint)
            .collect();

        assert_eq!(tints, vec![DAMAGE_TINT, Color::WHITE, DAMAGE_TINT, Color::WHITE]);
    }

    #[test]
    fn doors_borrow_the_cave_tile() {
        let door = SpriteInstance::for_snapshot(&snapshot(Visual::Door)).expect("door is drawn");

        assert_eq!(door.sprite, SpriteKey::Tiles);
        assert_eq!(Some(door.column), TileKind::Cave.sheet_column());
        assert_eq!(SpriteInstance::for_snapshot(&snapshot(Visual::Hidden)), None);
    }

    #[test]
    fn hud_lines_list_the_sword_only_when_owned() {
        let mut hud = HudPresentation {
            health: 4,
            max_health: 6,
            attack: 1,
            has_sword: false,
            coins: 12,
        };
        assert_eq!(
            hud.lines(),
            vec![
                "Health: 4/6".to_owned(),
                "Attack: 1".to_owned(),
                "Coins: 12".to_owned(),
                HudPresentation::HINT.to_owned(),
            ]
        );

        hud.has_sword = true;
        assert!(hud.lines().contains(&"Sword: Yes (Z)".to_owned()));
    }

    #[test]
    fn scene_shows_the_hud_only_with_a_hud_entity() {
        let hud = HudPresentation {
            health: 6,
            max_health: 6,
            attack: 1,
            has_sword: false,
            coins: 0,
        };
        let text = EntitySnapshot {
            label: Label::Ui,
            visual: Visual::Text {
                text: "HELLO".to_owned(),
            },
            ..snapshot(Visual::Hidden)
        };

        let without = Scene::from_snapshots(Vec::new(), &[text.clone()], hud);
        assert_eq!(without.hud, None);
        assert_eq!(without.texts.len(), 1);
        assert!(without.sprites.is_empty());

        let with = Scene::from_snapshots(Vec::new(), &[text, snapshot(Visual::Hud)], hud);
        assert_eq!(with.hud, Some(hud));
    }

    #[test]
    fn rgba_converts_to_normalised_channels() {
        let color = Color::from(Rgba::new(255, 0, 51, 255));
        assert_eq!(color, Color::new(1.0, 0.0, 0.2, 1.0));
        assert_eq!(Color::from_rgb_u8(0, 0, 0).lighten(1.0), Color::WHITE);
    }
}
