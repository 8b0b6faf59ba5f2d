#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Quest engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative scene, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable snapshots, and
//! respond exclusively with new command batches.
//!
//! Everything positional is expressed in screen pixels. The playable scene
//! sits below the HUD band, shifted by [`SCENE_OFFSET`].

use std::{fmt, time::Duration};

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Side length of a square tile in pixels.
pub const TILE_SIZE: i32 = 64;

/// Pixel translation from the screen origin to the top-left corner of the scene.
pub const SCENE_OFFSET: Vec2 = Vec2::new(0.0, 224.0);

/// Size of the playable scene in pixels.
pub const GAME_SCENE_SIZE: Vec2 = Vec2::new(1024.0, 704.0);

/// Size of the whole window, HUD band included.
pub const SCREEN_SIZE: Vec2 = Vec2::new(1024.0, 928.0);

/// Colour painted behind walkable parts of the tile art.
pub const BACKGROUND_COLOR: Rgba = Rgba::new(252, 216, 168, 255);

/// Alpha value a pixel must exceed to count as opaque.
pub const SOLID_ALPHA_THRESHOLD: u8 = 10;

/// Key of the persisted coin counter.
pub const COINS_KEY: &str = "Coins";

/// 8-bit RGBA colour sampled from tile art.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Alpha channel.
    pub alpha: u8,
}

impl Rgba {
    /// Creates a colour from its four channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Location of a tile within the grid, measured in whole tiles.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCoord {
    column: i32,
    row: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Maps a grid-local pixel position onto the tile containing it.
    ///
    /// Each axis is floored, so negative pixels land in negative tiles.
    #[must_use]
    pub fn from_pixel(pixel: Vec2) -> Self {
        let size = TILE_SIZE as f32;
        Self::new(
            (pixel.x / size).floor() as i32,
            (pixel.y / size).floor() as i32,
        )
    }

    /// Returns the grid-local pixel position of the tile's top-left corner.
    ///
    /// Computed in floating point so no coordinate overflows.
    #[must_use]
    pub fn to_pixel(self) -> Vec2 {
        let size = TILE_SIZE as f32;
        Vec2::new(self.column as f32 * size, self.row as f32 * size)
    }
}

/// Integer axis-aligned rectangle in screen pixels.
///
/// `right` and `bottom` are exclusive, so the last covered pixel column is
/// `right() - 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Horizontal extent.
    pub width: i32,
    /// Vertical extent.
    pub height: i32,
}

impl PixelRect {
    /// Creates a rectangle from its origin and extent.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the rectangle of a body anchored at `position`.
    ///
    /// The position is truncated toward zero before the offset is added.
    #[must_use]
    pub fn anchored(position: Vec2, offset: IVec2, size: IVec2) -> Self {
        Self::new(
            position.x as i32 + offset.x,
            position.y as i32 + offset.y,
            size.x,
            size.y,
        )
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Reports whether the two rectangles share at least one pixel.
    #[must_use]
    pub const fn intersects(&self, other: &PixelRect) -> bool {
        other.left() < self.right()
            && self.left() < other.right()
            && other.top() < self.bottom()
            && self.top() < other.bottom()
    }
}

/// Kind of art painted into a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKind {
    /// Explicitly empty cell.
    Empty,
    /// Rock wall.
    Wall,
    /// Alternate rock wall.
    WallTwo,
    /// Tree.
    Tree,
    /// Top edge of a cliff.
    TopMid,
    /// Top-left cliff corner.
    TopLeft,
    /// Top-right cliff corner.
    TopRight,
    /// Bottom edge of a cliff.
    BottomMid,
    /// Bottom-left cliff corner.
    BottomLeft,
    /// Bottom-right cliff corner.
    BottomRight,
    /// Cave mouth.
    Cave,
    /// Underworld floor border.
    Underworld,
    /// Underworld ceiling border.
    UnderworldTop,
}

impl TileKind {
    /// Every tile kind, in declaration order.
    pub const ALL: [TileKind; 13] = [
        Self::Empty,
        Self::Wall,
        Self::WallTwo,
        Self::Tree,
        Self::TopMid,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomMid,
        Self::BottomLeft,
        Self::BottomRight,
        Self::Cave,
        Self::Underworld,
        Self::UnderworldTop,
    ];

    /// Dense index of the kind, suitable for per-kind tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether the tile participates in collision at all.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !matches!(self, Self::Empty)
    }

    /// Column of the kind's artwork inside the tileset sheet.
    #[must_use]
    pub const fn sheet_column(self) -> Option<u32> {
        match self {
            Self::Empty => None,
            Self::Wall => Some(0),
            Self::WallTwo => Some(1),
            Self::Tree => Some(2),
            Self::TopLeft => Some(3),
            Self::TopMid => Some(4),
            Self::TopRight => Some(5),
            Self::BottomLeft => Some(6),
            Self::BottomMid => Some(7),
            Self::BottomRight => Some(8),
            Self::Cave => Some(9),
            Self::Underworld => Some(10),
            Self::UnderworldTop => Some(11),
        }
    }

    /// Resolves a level-file symbol into a tile kind.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let kind = match symbol {
            "#_@" => Self::Wall,
            "#_@/" => Self::WallTwo,
            "#_tree" => Self::Tree,
            "#_#+" => Self::TopMid,
            "#_<+" => Self::TopLeft,
            "#_>+" => Self::TopRight,
            "#_#-" => Self::BottomMid,
            "#_<-" => Self::BottomLeft,
            "#_>-" => Self::BottomRight,
            "#_cave" => Self::Cave,
            "#_underworld" => Self::Underworld,
            "#_underworld+" => Self::UnderworldTop,
            _ => return None,
        };
        Some(kind)
    }
}

/// Decoded artwork of a single tile type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TilePixels {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl TilePixels {
    /// Wraps row-major pixel data.
    ///
    /// Returns `None` when the buffer does not match the dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }

        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates artwork painted in a single colour.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Samples a pixel, or `None` outside the artwork.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Overwrites a single pixel. Out-of-range writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y as usize * self.width as usize + x as usize;
        if let Some(slot) = self.pixels.get_mut(index) {
            *slot = color;
        }
    }
}

/// Source of tile artwork used to derive collision masks.
///
/// Implementations are queried at most once per tile kind by the world's
/// mask cache.
pub trait TileArt: fmt::Debug {
    /// Returns the artwork for `kind`, or `None` when it is unavailable.
    fn tile_pixels(&self, kind: TileKind) -> Option<TilePixels>;
}

/// Art source that never provides pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTileArt;

impl TileArt for NoTileArt {
    fn tile_pixels(&self, _kind: TileKind) -> Option<TilePixels> {
        None
    }
}

/// Cardinal facing shared by the player, enemies and attacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward negative y.
    Up,
    /// Toward positive y.
    Down,
    /// Toward negative x.
    Left,
    /// Toward positive x.
    Right,
}

impl Direction {
    /// Unit vector pointing along the direction.
    #[must_use]
    pub const fn unit(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Facing that best matches `vector`, preferring the vertical axis on ties.
    ///
    /// Returns `None` for the zero vector.
    #[must_use]
    pub fn dominant(vector: Vec2) -> Option<Self> {
        if vector == Vec2::ZERO {
            return None;
        }
        if vector.x.abs() > vector.y.abs() {
            Some(if vector.x > 0.0 { Self::Right } else { Self::Left })
        } else {
            Some(if vector.y > 0.0 { Self::Down } else { Self::Up })
        }
    }
}

/// Tag used by entity overlap queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    /// The player character.
    Player,
    /// Any enemy.
    Enemy,
    /// Collectible item on the floor.
    Item,
    /// Door leading to another scene.
    Door,
    /// Enemy bullet.
    Bullet,
    /// Player or enemy projectile.
    Projectile,
    /// Sword swing.
    Sword,
    /// Bobbing coin.
    Coin,
    /// One-shot or looping animation.
    Animation,
    /// HUD overlay and text drawn above the scene.
    Ui,
}

impl Label {
    /// Lower-case name of the label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
            Self::Item => "item",
            Self::Door => "door",
            Self::Bullet => "bullet",
            Self::Projectile => "projectile",
            Self::Sword => "sword",
            Self::Coin => "coin",
            Self::Animation => "animation",
            Self::Ui => "ui",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier assigned to an entity by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behaviour family of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Seeks the player inside a detection radius.
    Chaser,
    /// Wanders, pauses, and fires bullets.
    Shooter,
    /// Hops sideways in parabolic arcs.
    Spider,
    /// Stands still. Used for unknown names.
    Basic,
}

impl EnemyKind {
    /// Kinds picked by random scene population.
    pub const SPAWNABLE: [EnemyKind; 3] = [Self::Spider, Self::Shooter, Self::Chaser];

    /// Name used for stats lookup.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Chaser => "Chaser",
            Self::Shooter => "Shooter",
            Self::Spider => "Spider",
            Self::Basic => "Enemy",
        }
    }

    /// Resolves an enemy name. Unknown names produce [`EnemyKind::Basic`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Chaser" => Self::Chaser,
            "Shooter" => Self::Shooter,
            "Spider" => Self::Spider,
            _ => Self::Basic,
        }
    }
}

/// Items the player can pick up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    /// Unlocks melee attacks.
    Sword,
    /// Adds one coin.
    Coin,
}

/// Owner side of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Faction {
    /// Fired by the player; hurts enemies.
    Player,
    /// Fired by an enemy; hurts the player.
    Enemy,
}

impl Faction {
    /// Label of the entities this faction damages.
    #[must_use]
    pub const fn target_label(self) -> Label {
        match self {
            Self::Player => Label::Enemy,
            Self::Enemy => Label::Player,
        }
    }
}

/// Player controller state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// Idle or moving.
    Walking,
    /// Swinging the sword or shooting.
    Attacking,
    /// Using an item.
    UsingItem,
    /// Recovering from a hit.
    Damaged,
}

/// Logical input actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move left.
    MoveLeft,
    /// Move right.
    MoveRight,
    /// Move up.
    MoveUp,
    /// Move down.
    MoveDown,
    /// Talk to characters.
    Talk,
    /// Start button.
    Start,
    /// Select button.
    Select,
    /// Primary action (sword).
    ActionA,
    /// Secondary action (shoot).
    ActionB,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 9] = [
        Self::MoveLeft,
        Self::MoveRight,
        Self::MoveUp,
        Self::MoveDown,
        Self::Talk,
        Self::Start,
        Self::Select,
        Self::ActionA,
        Self::ActionB,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Compact set of actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActionSet {
    bits: u16,
}

impl ActionSet {
    /// Set without any action.
    pub const EMPTY: ActionSet = ActionSet { bits: 0 };

    /// Returns a copy of the set with `action` added.
    #[must_use]
    pub const fn with(self, action: Action) -> Self {
        Self {
            bits: self.bits | action.bit(),
        }
    }

    /// Adds `action` to the set.
    pub fn insert(&mut self, action: Action) {
        self.bits |= action.bit();
    }

    /// Reports whether `action` is present.
    #[must_use]
    pub const fn contains(self, action: Action) -> bool {
        self.bits & action.bit() != 0
    }

    /// Reports whether the set holds no action.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for action in iter {
            set.insert(action);
        }
        set
    }
}

/// Point-in-time input state captured by an adapter before a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    held: ActionSet,
    previously_held: ActionSet,
    mouse_position: Vec2,
    left_click: bool,
    right_click: bool,
}

impl InputSnapshot {
    /// Creates a snapshot from the current and previous held sets.
    #[must_use]
    pub const fn new(
        held: ActionSet,
        previously_held: ActionSet,
        mouse_position: Vec2,
        left_click: bool,
        right_click: bool,
    ) -> Self {
        Self {
            held,
            previously_held,
            mouse_position,
            left_click,
            right_click,
        }
    }

    /// Snapshot with only held actions, none of which were held before.
    #[must_use]
    pub const fn pressing(held: ActionSet) -> Self {
        Self::new(held, ActionSet::EMPTY, Vec2::ZERO, false, false)
    }

    /// Snapshot with actions held both this frame and the previous one.
    #[must_use]
    pub const fn holding(held: ActionSet) -> Self {
        Self::new(held, held, Vec2::ZERO, false, false)
    }

    /// Whether `action` is currently held.
    #[must_use]
    pub const fn is_action_down(&self, action: Action) -> bool {
        self.held.contains(action)
    }

    /// Whether `action` went down this frame.
    #[must_use]
    pub const fn is_action_pressed(&self, action: Action) -> bool {
        self.held.contains(action) && !self.previously_held.contains(action)
    }

    /// Cursor position in screen pixels.
    #[must_use]
    pub const fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Whether the left mouse button went down this frame.
    #[must_use]
    pub const fn is_left_mouse_click(&self) -> bool {
        self.left_click
    }

    /// Whether the right mouse button went down this frame.
    #[must_use]
    pub const fn is_right_mouse_click(&self) -> bool {
        self.right_click
    }
}

/// Scene requested by a transition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SceneTarget {
    /// Level identified by name.
    Named(String),
    /// Game-over screen.
    Lose,
}

/// Frame sequence played by an animation entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationClip {
    /// Puff of smoke left behind by dying entities.
    Death,
    /// Flickering fire.
    Fire,
}

impl AnimationClip {
    /// Number of frames in the clip.
    #[must_use]
    pub const fn frame_count(self) -> usize {
        match self {
            Self::Death => 3,
            Self::Fire => 2,
        }
    }

    /// Time each frame stays on screen.
    #[must_use]
    pub const fn frame_time(self) -> Duration {
        match self {
            Self::Death => Duration::from_millis(120),
            Self::Fire => Duration::from_millis(150),
        }
    }
}

/// Action run once a non-looping animation has shown its last frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnimationFinish {
    /// Remove the animation.
    Vanish,
    /// Remove the animation and the referenced entity.
    Despawn(EntityId),
    /// Wait for `delay`, then request a scene change.
    ChangeScene {
        /// Time to wait after the last frame.
        delay: Duration,
        /// Scene to switch to.
        target: SceneTarget,
    },
}

/// Scripted slide performed by an enemy right after spawning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntrySlide {
    /// Direction of travel.
    pub direction: Direction,
    /// Distance to cover, in pixels.
    pub distance: f32,
    /// Pixels covered per update.
    pub speed: f32,
}

/// Blueprint describing an entity to add to the scene.
#[derive(Clone, Debug, PartialEq)]
pub enum Spawn {
    /// The player character.
    Player {
        /// Top-left position.
        position: Vec2,
    },
    /// An enemy whose stats are looked up by kind.
    Enemy {
        /// Behaviour family.
        kind: EnemyKind,
        /// Top-left position.
        position: Vec2,
        /// Optional scripted slide run before the behaviour starts.
        entry: Option<EntrySlide>,
    },
    /// A bobbing coin.
    Coin {
        /// Resting top-left position.
        position: Vec2,
        /// Coins granted on pickup.
        value: i64,
    },
    /// An item pickup.
    Item {
        /// Top-left position.
        position: Vec2,
        /// Item granted on pickup.
        item: Item,
    },
    /// A door into another scene.
    Door {
        /// Top-left position.
        position: Vec2,
        /// Scene entered through the door.
        next_scene: String,
    },
    /// An animation.
    Animation {
        /// Top-left position.
        position: Vec2,
        /// Frames to play.
        clip: AnimationClip,
        /// Whether the clip restarts after its last frame.
        looping: bool,
        /// Action run when a non-looping clip ends.
        finish: AnimationFinish,
    },
    /// A line of text drawn in the UI layer.
    Text {
        /// Top-left position.
        position: Vec2,
        /// Initial contents.
        text: String,
    },
    /// The heads-up display.
    Hud,
    /// A bullet fired by an enemy.
    Bullet {
        /// Top-left position.
        position: Vec2,
        /// Direction of flight.
        direction: Direction,
        /// Pixels per second.
        speed: f32,
    },
    /// A projectile owned by either faction.
    Projectile {
        /// Top-left position.
        position: Vec2,
        /// Direction of flight.
        direction: Direction,
        /// Damage dealt on hit.
        damage: i32,
        /// Pixels per second.
        speed: f32,
        /// Side that fired the projectile.
        faction: Faction,
    },
    /// A sword swing.
    Sword {
        /// Top-left position.
        position: Vec2,
        /// Direction of the swing.
        direction: Direction,
        /// Damage dealt on hit.
        damage: i32,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Opens an empty scene for the named level, discarding the previous one.
    OpenScene {
        /// Level name, e.g. `Zelda12`.
        level: String,
    },
    /// Clears the finished flag and the requested scene.
    CloseScene,
    /// Places a tile, replacing whatever occupied the cell.
    SetTile {
        /// Target cell.
        coord: GridCoord,
        /// Tile to place.
        kind: TileKind,
    },
    /// Empties a cell.
    ClearTile {
        /// Target cell.
        coord: GridCoord,
    },
    /// Appends an entity to the scene.
    Spawn {
        /// Blueprint of the entity.
        spawn: Spawn,
    },
    /// Removes an entity immediately.
    RemoveEntity {
        /// Entity to remove.
        entity: EntityId,
    },
    /// Replaces the contents of a text entity.
    SetText {
        /// Target text entity.
        entity: EntityId,
        /// New contents.
        text: String,
    },
    /// Enables or disables player input.
    SetPlayerControl {
        /// Whether the player may act.
        allowed: bool,
    },
    /// Runs one update pass.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
        /// Input captured for this frame.
        input: InputSnapshot,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A scene was opened.
    SceneOpened {
        /// Level name of the scene.
        level: String,
    },
    /// An update pass finished.
    TimeAdvanced {
        /// Duration of simulated time covered by the pass.
        dt: Duration,
    },
    /// A tile was placed or cleared.
    TileChanged {
        /// Affected cell.
        coord: GridCoord,
        /// New tile, or `None` when cleared.
        kind: Option<TileKind>,
    },
    /// An entity joined the scene.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Tag of the entity.
        label: Label,
    },
    /// An entity left the scene.
    EntityRemoved {
        /// Identifier of the entity.
        entity: EntityId,
        /// Tag of the entity.
        label: Label,
    },
    /// The player lost health.
    PlayerDamaged {
        /// Remaining health.
        health: i32,
        /// Maximum health.
        max_health: i32,
    },
    /// The player's health reached zero.
    PlayerDied,
    /// An enemy's health reached zero.
    EnemyKilled {
        /// Identifier of the enemy.
        entity: EntityId,
        /// Behaviour family of the enemy.
        kind: EnemyKind,
    },
    /// The coin counter changed.
    CoinsChanged {
        /// New total.
        total: i64,
    },
    /// The player picked up an item.
    ItemCollected {
        /// Item that was collected.
        item: Item,
        /// Cell the item rested on.
        coord: GridCoord,
    },
    /// The scene finished and asked for another one.
    SceneChangeRequested {
        /// Scene to switch to.
        target: SceneTarget,
    },
}

/// Render-facing description of what an entity looks like this frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Visual {
    /// The player.
    Player {
        /// Facing direction.
        facing: Direction,
        /// Controller state.
        state: PlayerState,
        /// Frame index within the state's strip.
        frame: usize,
    },
    /// An enemy.
    Enemy {
        /// Behaviour family.
        kind: EnemyKind,
        /// Facing direction.
        facing: Direction,
        /// Frame index within the walk strip.
        frame: usize,
        /// Whether the enemy is mid-jump.
        airborne: bool,
    },
    /// Enemy bullet.
    Bullet,
    /// Projectile.
    Projectile {
        /// Side that fired it.
        faction: Faction,
    },
    /// Sword swing.
    Sword {
        /// Direction of the swing.
        facing: Direction,
    },
    /// Coin.
    Coin,
    /// Item pickup.
    Item {
        /// Item shown.
        item: Item,
    },
    /// Door, drawn with the cave tile.
    Door,
    /// Animation frame.
    Animation {
        /// Clip being played.
        clip: AnimationClip,
        /// Frame index.
        frame: usize,
    },
    /// UI text.
    Text {
        /// Contents.
        text: String,
    },
    /// Heads-up display.
    Hud,
    /// Nothing to draw.
    Hidden,
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Identifier allocated to the entity by the world.
    pub id: EntityId,
    /// Tag of the entity.
    pub label: Label,
    /// Top-left position in screen pixels.
    pub position: Vec2,
    /// Collision rectangle.
    pub rect: PixelRect,
    /// What to draw.
    pub visual: Visual,
}
