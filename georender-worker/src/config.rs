//! Render settings shared by every request a worker handles.

use serde::{Deserialize, Serialize};

/// Vertices used to approximate the query circle.
pub const DEFAULT_CIRCLE_STEPS: u32 = 64;

/// Edge length of engine tiles in resource pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub circle_steps: u32,
    /// Request a 2D context optimized for frequent pixel reads
    pub will_read_frequently: bool,
    pub tile_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            circle_steps: DEFAULT_CIRCLE_STEPS,
            will_read_frequently: true,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl RenderConfig {
    /// Parse a config, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
