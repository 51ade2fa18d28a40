use crate::{lon_lat_to_web_mercator, Affine, Point};
use serde::{Deserialize, Serialize};

/// Ground control point linking a resource pixel to a geographic location.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gcp {
    /// Pixel coordinates in the resource image (origin top-left)
    pub resource: Point,
    /// (longitude, latitude) in degrees
    pub geo: Point,
}

/// Decoded RGBA pixels of the scanned map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ResourceImage {
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// A map image together with the metadata that places it on the earth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoreferencedMap {
    pub id: String,
    pub resource: ResourceImage,
    pub gcps: Vec<Gcp>,
    /// Visible part of the resource in pixel coordinates. Empty means the whole image.
    #[serde(default)]
    pub resource_mask: Vec<Point>,
}

impl GeoreferencedMap {
    /// Mask ring in resource coordinates, defaulting to the image bounds
    pub fn mask_or_full(&self) -> Vec<Point> {
        if self.resource_mask.len() >= 3 {
            return self.resource_mask.clone();
        }
        let w = self.resource.width as f64;
        let h = self.resource.height as f64;
        vec![
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ]
    }

    /// Affine transform from resource pixels to Web Mercator meters.
    pub fn resource_to_projected_geo(&self) -> Option<Affine> {
        let pairs: Vec<(Point, Point)> = self
            .gcps
            .iter()
            .map(|gcp| (gcp.resource, lon_lat_to_web_mercator(gcp.geo)))
            .collect();
        Affine::fit(&pairs)
    }
}
