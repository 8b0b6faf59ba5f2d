//! Tile artwork cut from the tileset sheet.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use image::RgbaImage;
use tilequest_core::{Rgba, TileArt, TileKind, TilePixels, TILE_SIZE};

/// Tile art backed by a sheet holding one `TILE_SIZE` square per kind, laid
/// out left to right in sheet-column order.
#[derive(Debug)]
pub(crate) struct SheetTileArt {
    tiles: HashMap<TileKind, TilePixels>,
}

impl SheetTileArt {
    /// Decodes the sheet at `path`.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("failed to decode tileset {}", path.display()))?
            .to_rgba8();
        Ok(Self::from_image(&image))
    }

    /// Cuts every kind whose column lies inside `sheet`.
    pub(crate) fn from_image(sheet: &RgbaImage) -> Self {
        let size = TILE_SIZE as u32;
        let mut tiles = HashMap::new();
        for kind in TileKind::ALL {
            let Some(column) = kind.sheet_column() else {
                continue;
            };
            let left = column * size;
            if left + size > sheet.width() || size > sheet.height() {
                log::warn!("tileset has no artwork for {kind:?}");
                continue;
            }

            let mut pixels = Vec::with_capacity((size * size) as usize);
            for y in 0..size {
                for x in left..left + size {
                    let [red, green, blue, alpha] = sheet.get_pixel(x, y).0;
                    pixels.push(Rgba::new(red, green, blue, alpha));
                }
            }
            if let Some(tile) = TilePixels::new(size, size, pixels) {
                let _ = tiles.insert(kind, tile);
            }
        }
        Self { tiles }
    }
}

impl TileArt for SheetTileArt {
    fn tile_pixels(&self, kind: TileKind) -> Option<TilePixels> {
        self.tiles.get(&kind).cloned()
    }
}
