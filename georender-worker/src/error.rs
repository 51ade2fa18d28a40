//! Render worker error types.

use georender_core::GeometryError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Map {id} is invalid: {reason}")]
    InvalidMap { id: String, reason: String },

    #[error("Could not get 2d context from canvas")]
    ContextUnavailable,

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("Renderer not initialized")]
    NotInitialized,

    #[error("Could not get 2d context from canvas")]
    ContextUnavailable,

    #[error("Size must be positive, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Invalid render query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Render worker is no longer running")]
    WorkerDisconnected,

    #[error("Render worker sent {0} reply to a different request")]
    UnexpectedReply(&'static str),
}
