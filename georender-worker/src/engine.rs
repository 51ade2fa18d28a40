//! Interface of the tile-based rendering engine driven by a render session.

use crate::{EngineError, OffscreenSurface, RenderConfig};
use georender_core::{GeoreferencedMap, Viewport};
use std::collections::HashMap;
use std::sync::Arc;

/// Address of a tile within one map's resource image
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub map_id: Arc<str>,
    pub column: u32,
    pub row: u32,
}

/// RGBA pixels of one resource tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    /// Resource pixel of the tile's top-left corner
    pub origin: (u32, u32),
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Tile {
    /// Pixel at resource coordinates (x, y). None outside the tile.
    pub fn sample(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let local_x = x.checked_sub(self.origin.0)?;
        let local_y = y.checked_sub(self.origin.1)?;
        if local_x >= self.width || local_y >= self.height {
            return None;
        }
        let i = ((local_y * self.width + local_x) * 4) as usize;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Tiles fetched while rendering, kept until explicitly cleared.
#[derive(Debug, Default)]
pub struct TileCache {
    tiles: HashMap<TileKey, Tile>,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TileKey) -> Option<&Tile> {
        self.tiles.get(key)
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains_key(key)
    }

    pub fn insert(&mut self, key: TileKey, tile: Tile) {
        self.tiles.insert(key, tile);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Drop every tile belonging to `map_id`.
    pub fn remove_map(&mut self, map_id: &str) {
        self.tiles.retain(|key, _| &*key.map_id != map_id);
    }
}

/// A renderer that owns a drawable surface.
///
/// Sessions call the methods strictly one at a time; implementations need
/// no internal synchronization.
#[allow(async_fn_in_trait)]
pub trait RenderEngine {
    fn with_surface(surface: OffscreenSurface, config: &RenderConfig) -> Self
    where
        Self: Sized;

    /// Completes once the engine has accepted the map.
    async fn add_georeferenced_map(&mut self, map: GeoreferencedMap) -> Result<(), EngineError>;

    fn tile_cache(&self) -> &TileCache;

    fn tile_cache_mut(&mut self) -> &mut TileCache;

    /// Draw everything visible in `viewport` onto the surface.
    async fn render(&mut self, viewport: &Viewport) -> Result<(), EngineError>;

    fn surface_mut(&mut self) -> &mut OffscreenSurface;
}
