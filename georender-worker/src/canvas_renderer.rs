//! Reference tile-based engine that warps georeferenced maps onto the surface.
//!
//! Each map is placed with an affine transform fitted to its ground control
//! points. Rendering walks the canvas pixels covered by a map, maps them back
//! to resource pixels and samples the resource tile holding that pixel,
//! loading the tile into the cache on first use.

use crate::engine::{RenderEngine, Tile, TileCache, TileKey};
use crate::{ContextSettings, EngineError, ImageData, OffscreenSurface, RenderConfig};
use georender_core::{point_in_polygon, Affine, Bbox, GeoreferencedMap, Point, Viewport};
use std::sync::Arc;

/// A registered map with its precomputed placement
struct WarpedMap {
    id: Arc<str>,
    map: GeoreferencedMap,
    mask: Vec<Point>,
    projected_geo_to_resource: Affine,
    projected_geo_bbox: Bbox,
}

impl WarpedMap {
    fn new(map: GeoreferencedMap) -> Result<Self, EngineError> {
        let invalid = |reason: &str| EngineError::InvalidMap {
            id: map.id.clone(),
            reason: reason.to_string(),
        };

        if map.resource.width == 0 || map.resource.height == 0 {
            return Err(invalid("resource image is empty"));
        }
        if map.resource.pixels.len() != map.resource.expected_len() {
            return Err(invalid(&format!(
                "expected {} bytes of RGBA pixels, got {}",
                map.resource.expected_len(),
                map.resource.pixels.len()
            )));
        }

        let resource_to_projected_geo = map
            .resource_to_projected_geo()
            .ok_or_else(|| invalid("needs at least 3 non-collinear GCPs"))?;
        let projected_geo_to_resource = resource_to_projected_geo
            .inverse()
            .ok_or_else(|| invalid("GCP transform is not invertible"))?;

        let mask = map.mask_or_full();
        let projected_mask: Vec<Point> = mask
            .iter()
            .map(|p| resource_to_projected_geo.apply(*p))
            .collect();
        let projected_geo_bbox =
            Bbox::from_points(&projected_mask).ok_or_else(|| invalid("mask is empty"))?;

        Ok(Self {
            id: Arc::from(map.id.as_str()),
            map,
            mask,
            projected_geo_to_resource,
            projected_geo_bbox,
        })
    }

    fn load_tile(&self, column: u32, row: u32, tile_size: u32) -> Tile {
        let resource = &self.map.resource;
        let origin = (column * tile_size, row * tile_size);
        let width = tile_size.min(resource.width - origin.0);
        let height = tile_size.min(resource.height - origin.1);

        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in origin.1..origin.1 + height {
            let start = ((y * resource.width + origin.0) * 4) as usize;
            pixels.extend_from_slice(&resource.pixels[start..start + (width * 4) as usize]);
        }

        Tile {
            origin,
            width,
            height,
            pixels,
        }
    }
}

pub struct CanvasRenderer {
    surface: OffscreenSurface,
    tile_cache: TileCache,
    maps: Vec<WarpedMap>,
    tile_size: u32,
    context_settings: ContextSettings,
}

impl CanvasRenderer {
    pub fn map_ids(&self) -> Vec<&str> {
        self.maps.iter().map(|m| &*m.id).collect()
    }

    /// Draw one map into `frame`.
    fn draw_map(
        warped: &WarpedMap,
        viewport: &Viewport,
        tile_cache: &mut TileCache,
        tile_size: u32,
        frame: &mut ImageData,
    ) {
        let visible = viewport.projected_geo_bbox();
        let bbox = &warped.projected_geo_bbox;
        if bbox.max_x < visible.min_x
            || bbox.min_x > visible.max_x
            || bbox.max_y < visible.min_y
            || bbox.min_y > visible.max_y
        {
            return;
        }

        // Canvas pixel range covered by the map
        let top_left = viewport.projected_geo_to_canvas(Point::new(bbox.min_x, bbox.max_y));
        let bottom_right = viewport.projected_geo_to_canvas(Point::new(bbox.max_x, bbox.min_y));
        let x_start = top_left.x().floor().max(0.0) as u32;
        let y_start = top_left.y().floor().max(0.0) as u32;
        let x_end = (bottom_right.x().ceil().max(0.0) as u32).min(frame.width());
        let y_end = (bottom_right.y().ceil().max(0.0) as u32).min(frame.height());

        let resource = &warped.map.resource;
        for py in y_start..y_end {
            for px in x_start..x_end {
                let projected =
                    viewport.canvas_to_projected_geo(Point::new(px as f64 + 0.5, py as f64 + 0.5));
                let r = warped.projected_geo_to_resource.apply(projected);
                if r.x() < 0.0
                    || r.y() < 0.0
                    || r.x() >= resource.width as f64
                    || r.y() >= resource.height as f64
                    || !point_in_polygon(r, &warped.mask)
                {
                    continue;
                }

                let (rx, ry) = (r.x() as u32, r.y() as u32);
                let key = TileKey {
                    map_id: Arc::clone(&warped.id),
                    column: rx / tile_size,
                    row: ry / tile_size,
                };
                if !tile_cache.contains(&key) {
                    let tile = warped.load_tile(key.column, key.row, tile_size);
                    tile_cache.insert(key.clone(), tile);
                }

                if let Some(src) = tile_cache.get(&key).and_then(|t| t.sample(rx, ry)) {
                    blend_pixel(frame, px, py, src);
                }
            }
        }
    }
}

/// Source-over compositing with straight alpha
fn blend_pixel(frame: &mut ImageData, x: u32, y: u32, src: [u8; 4]) {
    let i = ((y * frame.width() + x) * 4) as usize;
    let dst = &mut frame.data_mut()[i..i + 4];

    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        dst.copy_from_slice(&src);
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let value = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

impl RenderEngine for CanvasRenderer {
    fn with_surface(surface: OffscreenSurface, config: &RenderConfig) -> Self {
        Self {
            surface,
            tile_cache: TileCache::new(),
            maps: Vec::new(),
            tile_size: config.tile_size.max(1),
            context_settings: ContextSettings {
                will_read_frequently: config.will_read_frequently,
            },
        }
    }

    async fn add_georeferenced_map(&mut self, map: GeoreferencedMap) -> Result<(), EngineError> {
        let warped = WarpedMap::new(map)?;

        if let Some(existing) = self.maps.iter_mut().find(|m| m.id == warped.id) {
            log::warn!("Replacing georeferenced map {}", warped.id);
            self.tile_cache.remove_map(&warped.id);
            *existing = warped;
        } else {
            log::debug!(
                "Added georeferenced map {} ({}x{}, {} GCPs)",
                warped.id,
                warped.map.resource.width,
                warped.map.resource.height,
                warped.map.gcps.len()
            );
            self.maps.push(warped);
        }
        Ok(())
    }

    fn tile_cache(&self) -> &TileCache {
        &self.tile_cache
    }

    fn tile_cache_mut(&mut self) -> &mut TileCache {
        &mut self.tile_cache
    }

    async fn render(&mut self, viewport: &Viewport) -> Result<(), EngineError> {
        let (width, height) = viewport.canvas_size();
        if (self.surface.width(), self.surface.height()) != (width, height) {
            log::debug!(
                "Resizing surface from {}x{} to {}x{}",
                self.surface.width(),
                self.surface.height(),
                width,
                height
            );
            self.surface = OffscreenSurface::new(width, height);
        }

        let mut frame = ImageData::new(width, height);
        for warped in &self.maps {
            Self::draw_map(
                warped,
                viewport,
                &mut self.tile_cache,
                self.tile_size,
                &mut frame,
            );
        }

        let mut ctx = self
            .surface
            .get_context_2d(self.context_settings)
            .ok_or(EngineError::ContextUnavailable)?;
        ctx.clear();
        ctx.put_image_data(&frame, 0, 0);

        log::debug!(
            "Rendered {} maps at {}x{}, {} tiles cached",
            self.maps.len(),
            width,
            height,
            self.tile_cache.len()
        );
        Ok(())
    }

    fn surface_mut(&mut self) -> &mut OffscreenSurface {
        &mut self.surface
    }
}
