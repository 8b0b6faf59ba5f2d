//! Sparse tile storage and per-pixel solidity queries.

use std::{cell::OnceCell, collections::HashMap, fmt};

use glam::Vec2;
use tilequest_core::{
    GridCoord, TileArt, TileKind, TilePixels, BACKGROUND_COLOR, SOLID_ALPHA_THRESHOLD, TILE_SIZE,
};

/// Immutable tile occupying a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    coord: GridCoord,
    kind: TileKind,
}

impl Tile {
    /// Creates a tile at the provided cell.
    #[must_use]
    pub const fn new(coord: GridCoord, kind: TileKind) -> Self {
        Self { coord, kind }
    }

    /// Cell occupied by the tile.
    #[must_use]
    pub const fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Kind of art painted into the cell.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }
}

/// Per-pixel masks derived from a tile kind's artwork.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMask {
    width: u32,
    height: u32,
    solid: Vec<bool>,
    background: Vec<bool>,
}

impl TileMask {
    /// Derives both masks from decoded artwork.
    #[must_use]
    pub fn from_pixels(pixels: &TilePixels) -> Self {
        let width = pixels.width();
        let height = pixels.height();
        let capacity = width as usize * height as usize;
        let mut solid = Vec::with_capacity(capacity);
        let mut background = Vec::with_capacity(capacity);

        for y in 0..height {
            for x in 0..width {
                let color = pixels.pixel(x, y).unwrap_or(BACKGROUND_COLOR);
                solid.push(color.alpha > SOLID_ALPHA_THRESHOLD);
                background.push(color == BACKGROUND_COLOR);
            }
        }

        Self {
            width,
            height,
            solid,
            background,
        }
    }

    /// Width of the mask in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the mask in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Whether the pixel is opaque. Out-of-range samples are not solid.
    #[must_use]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .and_then(|index| self.solid.get(index).copied())
            .unwrap_or(false)
    }

    /// Whether the pixel equals the background colour. Out-of-range samples are not.
    #[must_use]
    pub fn is_background(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .and_then(|index| self.background.get(index).copied())
            .unwrap_or(false)
    }
}

/// Lazily built mask cache keyed by tile kind.
///
/// Each kind's artwork is fetched at most once for the lifetime of the
/// cache, whether or not the fetch produced pixels.
pub struct TileMasks {
    art: Box<dyn TileArt>,
    cache: [OnceCell<Option<TileMask>>; TileKind::ALL.len()],
}

impl TileMasks {
    /// Creates an empty cache backed by the provided art source.
    #[must_use]
    pub fn new(art: Box<dyn TileArt>) -> Self {
        Self {
            art,
            cache: std::array::from_fn(|_| OnceCell::new()),
        }
    }

    /// Returns the mask of `kind`, building it on first use.
    #[must_use]
    pub fn mask(&self, kind: TileKind) -> Option<&TileMask> {
        self.cache[kind.index()]
            .get_or_init(|| match self.art.tile_pixels(kind) {
                Some(pixels) => {
                    log::debug!(
                        "built {kind:?} mask ({}x{})",
                        pixels.width(),
                        pixels.height()
                    );
                    Some(TileMask::from_pixels(&pixels))
                }
                None => {
                    log::warn!("no artwork for {kind:?}; its pixels count as blocked");
                    None
                }
            })
            .as_ref()
    }

    /// Whether the pixel of `kind` at local `(x, y)` is opaque.
    #[must_use]
    pub fn is_pixel_solid(&self, kind: TileKind, x: i32, y: i32) -> bool {
        self.mask(kind).map_or(false, |mask| mask.is_solid(x, y))
    }

    /// Whether the pixel of `kind` at local `(x, y)` is painted in the background colour.
    #[must_use]
    pub fn is_pixel_background(&self, kind: TileKind, x: i32, y: i32) -> bool {
        self.mask(kind).map_or(false, |mask| mask.is_background(x, y))
    }
}

impl fmt::Debug for TileMasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let built = self.cache.iter().filter(|cell| cell.get().is_some()).count();
        f.debug_struct("TileMasks")
            .field("art", &self.art)
            .field("built", &built)
            .finish()
    }
}

/// Sparse mapping from grid cells to tiles.
///
/// Absent cells are empty. The offset translates screen pixels into
/// grid-local pixels before every pixel query.
#[derive(Debug)]
pub struct Grid {
    tiles: HashMap<GridCoord, Tile>,
    offset: Vec2,
    masks: TileMasks,
}

impl Grid {
    /// Creates an empty grid placed at `offset`.
    #[must_use]
    pub fn new(art: Box<dyn TileArt>, offset: Vec2) -> Self {
        Self {
            tiles: HashMap::new(),
            offset,
            masks: TileMasks::new(art),
        }
    }

    /// Translation applied to every pixel query.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Mask cache shared by every tile of the grid.
    #[must_use]
    pub fn masks(&self) -> &TileMasks {
        &self.masks
    }

    /// Places a tile, replacing any tile in the same cell.
    pub fn set_tile(&mut self, coord: GridCoord, kind: TileKind) {
        let _ = self.tiles.insert(coord, Tile::new(coord, kind));
    }

    /// Empties a cell. Returns whether a tile was removed.
    pub fn remove_tile(&mut self, coord: GridCoord) -> bool {
        self.tiles.remove(&coord).is_some()
    }

    /// Empties every cell. Built masks survive.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Tile at the provided cell.
    #[must_use]
    pub fn tile(&self, coord: GridCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    /// Tile under a screen pixel.
    #[must_use]
    pub fn tile_at(&self, pixel: Vec2) -> Option<&Tile> {
        self.tile(self.cell_at(pixel))
    }

    /// Iterates over every placed tile in unspecified order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Number of placed tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tile is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Cell containing a screen pixel.
    #[must_use]
    pub fn cell_at(&self, pixel: Vec2) -> GridCoord {
        GridCoord::from_pixel(pixel - self.offset)
    }

    /// Screen position of a cell's top-left corner.
    #[must_use]
    pub fn cell_origin(&self, coord: GridCoord) -> Vec2 {
        coord.to_pixel() + self.offset
    }

    /// Whether the cell holds a solid tile. Empty cells are walkable.
    #[must_use]
    pub fn is_tile_solid(&self, coord: GridCoord) -> bool {
        self.tile(coord).map_or(false, |tile| tile.kind().is_solid())
    }

    /// Whether the cell under a screen pixel holds a solid tile.
    #[must_use]
    pub fn is_tile_solid_at(&self, pixel: Vec2) -> bool {
        self.is_tile_solid(self.cell_at(pixel))
    }

    /// Whether the screen pixel lands on an opaque pixel of a solid tile.
    #[must_use]
    pub fn is_pixel_solid(&self, pixel: Vec2) -> bool {
        self.solid_sample(pixel)
            .map_or(false, |(kind, x, y)| self.masks.is_pixel_solid(kind, x, y))
    }

    /// Whether the screen pixel blocks movement.
    ///
    /// A pixel blocks when it lies inside a solid tile and is not painted in
    /// the background colour. Tiles without artwork block everywhere.
    #[must_use]
    pub fn is_pixel_blocked(&self, pixel: Vec2) -> bool {
        self.solid_sample(pixel)
            .map_or(false, |(kind, x, y)| !self.masks.is_pixel_background(kind, x, y))
    }

    fn solid_sample(&self, pixel: Vec2) -> Option<(TileKind, i32, i32)> {
        let local = pixel - self.offset;
        let coord = GridCoord::from_pixel(local);
        let tile = self.tile(coord)?;
        if !tile.kind().is_solid() {
            return None;
        }

        let origin = coord.to_pixel();
        let x = (local.x - origin.x) as i32;
        let y = (local.y - origin.y) as i32;
        if !(0..TILE_SIZE).contains(&x) || !(0..TILE_SIZE).contains(&y) {
            return None;
        }

        Some((tile.kind(), x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilequest_core::{NoTileArt, Rgba};

    #[derive(Debug)]
    struct HalfWall;

    impl TileArt for HalfWall {
        fn tile_pixels(&self, _kind: TileKind) -> Option<TilePixels> {
            let mut pixels = TilePixels::filled(64, 64, BACKGROUND_COLOR);
            for y in 0..64 {
                for x in 32..64 {
                    pixels.set_pixel(x, y, Rgba::new(90, 60, 30, 255));
                }
            }
            Some(pixels)
        }
    }

    #[test]
    fn background_pixels_do_not_block() {
        let mut grid = Grid::new(Box::new(HalfWall), Vec2::ZERO);
        grid.set_tile(GridCoord::new(1, 1), TileKind::Wall);

        assert!(!grid.is_pixel_blocked(Vec2::new(64.0 + 10.0, 64.0 + 10.0)));
        assert!(grid.is_pixel_blocked(Vec2::new(64.0 + 40.0, 64.0 + 10.0)));
        assert!(!grid.is_pixel_blocked(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn offset_is_subtracted_before_lookup() {
        let mut grid = Grid::new(Box::new(NoTileArt), Vec2::new(0.0, 224.0));
        grid.set_tile(GridCoord::new(0, 0), TileKind::Tree);

        assert!(grid.is_tile_solid_at(Vec2::new(5.0, 230.0)));
        assert!(!grid.is_tile_solid_at(Vec2::new(5.0, 5.0)));
        assert_eq!(grid.cell_at(Vec2::new(70.0, 224.0 + 130.0)), GridCoord::new(1, 2));
        assert_eq!(grid.cell_origin(GridCoord::new(1, 2)), Vec2::new(64.0, 352.0));
    }

    #[test]
    fn missing_art_blocks_whole_solid_tile() {
        let mut grid = Grid::new(Box::new(NoTileArt), Vec2::ZERO);
        grid.set_tile(GridCoord::new(0, 0), TileKind::Wall);
        grid.set_tile(GridCoord::new(1, 0), TileKind::Empty);

        assert!(grid.is_pixel_blocked(Vec2::new(0.0, 0.0)));
        assert!(grid.is_pixel_blocked(Vec2::new(63.0, 63.0)));
        assert!(!grid.is_pixel_blocked(Vec2::new(64.0, 0.0)));
        assert!(!grid.is_pixel_solid(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn solid_mask_uses_alpha_threshold() {
        let mut pixels = TilePixels::filled(2, 1, Rgba::new(0, 0, 0, 10));
        pixels.set_pixel(1, 0, Rgba::new(0, 0, 0, 11));
        let mask = TileMask::from_pixels(&pixels);

        assert!(!mask.is_solid(0, 0));
        assert!(mask.is_solid(1, 0));
        assert!(!mask.is_solid(2, 0));
        assert!(!mask.is_background(-1, 0));
    }

    #[test]
    fn setting_a_cell_twice_keeps_one_tile() {
        let mut grid = Grid::new(Box::new(NoTileArt), Vec2::ZERO);
        grid.set_tile(GridCoord::new(3, 3), TileKind::Wall);
        grid.set_tile(GridCoord::new(3, 3), TileKind::Cave);

        assert_eq!(grid.len(), 1);
        assert_eq!(
            grid.tile(GridCoord::new(3, 3)).map(Tile::kind),
            Some(TileKind::Cave)
        );
        assert!(grid.remove_tile(GridCoord::new(3, 3)));
        assert!(grid.is_empty());
    }
}
