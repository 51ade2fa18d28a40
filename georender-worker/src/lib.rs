pub mod canvas_renderer;
pub mod config;
pub mod engine;
pub mod error;
pub mod query;
pub mod session;
pub mod surface;
pub mod worker;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use canvas_renderer::CanvasRenderer;
pub use config::RenderConfig;
pub use engine::{RenderEngine, Tile, TileCache, TileKey};
pub use error::{EngineError, SessionError};
pub use query::GeoQuery;
pub use session::{RenderSession, Reply, SessionState};
pub use surface::{Context2d, ContextSettings, ImageData, OffscreenSurface};
pub use worker::RenderWorker;

// Re-export core types for convenience
pub use georender_core::*;
