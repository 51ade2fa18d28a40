//! Turns a circular geographic query into a viewport for the engine.

use crate::RenderConfig;
use georender_core::{
    bbox_to_rectangle, circle, lon_lat_to_web_mercator, Bbox, GeometryError, Point, Viewport,
    ViewportOptions,
};

/// Region of interest: everything within `radius` meters of `center` (lon, lat).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoQuery {
    pub center: Point,
    pub radius: f64,
}

impl GeoQuery {
    /// Geographic bbox of the query circle.
    pub fn lon_lat_bbox(&self, steps: u32) -> Result<Bbox, GeometryError> {
        Bbox::from_points(&circle(self.center, self.radius, steps)).ok_or(GeometryError::EmptyPolygon)
    }

    /// Web Mercator bbox of the query.
    ///
    /// Only the south-west and north-east corners are projected, not all four.
    pub fn projected_geo_bbox(&self, steps: u32) -> Result<Bbox, GeometryError> {
        let lon_lat = self.lon_lat_bbox(steps)?;
        let min = lon_lat_to_web_mercator(lon_lat.min());
        let max = lon_lat_to_web_mercator(lon_lat.max());
        Ok(Bbox::new(min.x(), min.y(), max.x(), max.y()))
    }

    /// Viewport showing the query at `size` pixels.
    ///
    /// Always built at a device pixel ratio of 1 so canvas and viewport
    /// pixels coincide.
    pub fn to_viewport(
        &self,
        size: (u32, u32),
        config: &RenderConfig,
    ) -> Result<Viewport, GeometryError> {
        let projected = self.projected_geo_bbox(config.circle_steps)?;
        let rectangle = bbox_to_rectangle(&projected);

        Viewport::from_size_and_projected_geo_polygon(
            size,
            &[rectangle.to_vec()],
            ViewportOptions::default(),
        )
    }
}
