//! Comma-separated level layouts.

use tilequest_core::{Direction, GridCoord, TileKind};

use crate::grid::Tile;

/// Door placed by a `cave_<Scene>` symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoorPlacement {
    /// Cell holding the door.
    pub coord: GridCoord,
    /// Scene entered through the door.
    pub next_scene: String,
}

/// Parsed content of a level file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelLayout {
    tiles: Vec<Tile>,
    player_spawn: Option<GridCoord>,
    doors: Vec<DoorPlacement>,
}

impl LevelLayout {
    /// Parses level text: one row per line, cells separated by commas.
    ///
    /// Blank cells are skipped. `player` marks the player spawn and
    /// `cave_<Scene>` places a door; every other symbol must name a tile
    /// kind and is skipped with a warning otherwise.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut layout = Self::default();

        for (row, line) in text.lines().enumerate() {
            for (column, cell) in line.split(',').enumerate() {
                let symbol = cell.trim();
                if symbol.is_empty() {
                    continue;
                }

                let coord = GridCoord::new(column as i32, row as i32);
                if layout.place_entity(coord, symbol) {
                    continue;
                }

                match TileKind::from_symbol(symbol) {
                    Some(kind) => layout.tiles.push(Tile::new(coord, kind)),
                    None => log::warn!(
                        "unknown level symbol {symbol:?} at ({}, {})",
                        coord.column(),
                        coord.row()
                    ),
                }
            }
        }

        layout
    }

    fn place_entity(&mut self, coord: GridCoord, symbol: &str) -> bool {
        let mut parts = symbol.split('_');
        match parts.next() {
            Some("player") => {
                self.player_spawn = Some(coord);
                true
            }
            Some("cave") => {
                self.doors.push(DoorPlacement {
                    coord,
                    next_scene: parts.next().unwrap_or_default().to_owned(),
                });
                true
            }
            _ => false,
        }
    }

    /// Tiles in file order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Cell marked as the player spawn, if any.
    #[must_use]
    pub const fn player_spawn(&self) -> Option<GridCoord> {
        self.player_spawn
    }

    /// Doors in file order.
    #[must_use]
    pub fn doors(&self) -> &[DoorPlacement] {
        &self.doors
    }

    /// Whether the layout places a solid tile on the cell.
    #[must_use]
    pub fn is_solid(&self, coord: GridCoord) -> bool {
        self.tiles
            .iter()
            .rev()
            .find(|tile| tile.coord() == coord)
            .map_or(false, |tile| tile.kind().is_solid())
    }
}

/// Prefix shared by the overworld levels, followed by a row and a column digit.
pub const OVERWORLD_PREFIX: &str = "Zelda";

/// The cave reached through the overworld doors.
pub const UNDERWORLD_LEVEL: &str = "Underworld";

/// Name of the overworld level adjacent to `level` across its `exit` border.
///
/// Returns `None` for levels outside the overworld grid and for exits that
/// would leave it.
#[must_use]
pub fn neighbour_level(level: &str, exit: Direction) -> Option<String> {
    let area = level.strip_prefix(OVERWORLD_PREFIX)?;
    let mut digits = area.chars().map(|digit| digit.to_digit(10));
    let (Some(Some(row)), Some(Some(column)), None) = (digits.next(), digits.next(), digits.next())
    else {
        return None;
    };

    let (row, column) = match exit {
        Direction::Left => (Some(row), column.checked_sub(1)),
        Direction::Right => (Some(row), (column < 9).then_some(column + 1)),
        Direction::Up => (row.checked_sub(1), Some(column)),
        Direction::Down => ((row < 9).then_some(row + 1), Some(column)),
    };

    Some(format!("{OVERWORLD_PREFIX}{}{}", row?, column?))
}
