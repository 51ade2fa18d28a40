//! Geometry error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Polygon list is empty")]
    EmptyPolygon,

    #[error("Viewport size must be positive, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    #[error("Projected extent is degenerate: {0}")]
    DegenerateExtent(String),
}
