use crate::{Bbox, GeometryError, Point};
use serde::{Deserialize, Serialize};

/// Display options applied when building a viewport
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportOptions {
    pub device_pixel_ratio: f64,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
        }
    }
}

/// What to render and at which resolution.
///
/// Defines a region of projected geo space:
/// - `projected_geo_center`: center of the visible region
/// - `projected_geo_per_viewport_scale`: projected units per viewport pixel
/// - `viewport_size`: size in CSS-like viewport pixels
///
/// Canvas pixels are viewport pixels multiplied by `device_pixel_ratio`.
/// The y axis points up in projected space and down in canvas space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub viewport_size: (u32, u32),
    pub projected_geo_center: Point,
    pub projected_geo_per_viewport_scale: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Fit the union of `polygons` into a viewport of `size` pixels.
    ///
    /// The scale is chosen so that the whole bbox is visible; the shorter
    /// axis receives extra margin.
    pub fn from_size_and_projected_geo_polygon(
        size: (u32, u32),
        polygons: &[Vec<Point>],
        options: ViewportOptions,
    ) -> Result<Self, GeometryError> {
        let (width, height) = size;
        if width == 0 || height == 0 {
            return Err(GeometryError::EmptyViewport { width, height });
        }

        let points: Vec<Point> = polygons.iter().flatten().copied().collect();
        let bbox = Bbox::from_points(&points).ok_or(GeometryError::EmptyPolygon)?;

        let scale = (bbox.width() / width as f64).max(bbox.height() / height as f64);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GeometryError::DegenerateExtent(format!(
                "{:?} has no area",
                <[f64; 4]>::from(bbox)
            )));
        }

        if !options.device_pixel_ratio.is_finite() || options.device_pixel_ratio <= 0.0 {
            return Err(GeometryError::DegenerateExtent(format!(
                "device pixel ratio {}",
                options.device_pixel_ratio
            )));
        }

        Ok(Self {
            viewport_size: size,
            projected_geo_center: bbox.center(),
            projected_geo_per_viewport_scale: scale,
            device_pixel_ratio: options.device_pixel_ratio,
        })
    }

    /// Canvas size in device pixels
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            (self.viewport_size.0 as f64 * self.device_pixel_ratio).round() as u32,
            (self.viewport_size.1 as f64 * self.device_pixel_ratio).round() as u32,
        )
    }

    /// Projected units per canvas pixel
    pub fn projected_geo_per_canvas_scale(&self) -> f64 {
        self.projected_geo_per_viewport_scale / self.device_pixel_ratio
    }

    pub fn projected_geo_to_canvas(&self, p: Point) -> Point {
        let (cw, ch) = self.canvas_size();
        let scale = self.projected_geo_per_canvas_scale();
        Point::new(
            (p.x() - self.projected_geo_center.x()) / scale + cw as f64 / 2.0,
            (self.projected_geo_center.y() - p.y()) / scale + ch as f64 / 2.0,
        )
    }

    pub fn canvas_to_projected_geo(&self, p: Point) -> Point {
        let (cw, ch) = self.canvas_size();
        let scale = self.projected_geo_per_canvas_scale();
        Point::new(
            self.projected_geo_center.x() + (p.x() - cw as f64 / 2.0) * scale,
            self.projected_geo_center.y() - (p.y() - ch as f64 / 2.0) * scale,
        )
    }

    /// Projected bbox covered by the full canvas.
    pub fn projected_geo_bbox(&self) -> Bbox {
        let half_w = self.viewport_size.0 as f64 * self.projected_geo_per_viewport_scale / 2.0;
        let half_h = self.viewport_size.1 as f64 * self.projected_geo_per_viewport_scale / 2.0;
        let c = self.projected_geo_center;
        Bbox::new(c.x() - half_w, c.y() - half_h, c.x() + half_w, c.y() + half_h)
    }
}
