//! The single render surface owned by a worker.
//!
//! A session is either uninitialized or holds exactly one engine with its
//! surface. Callers reach it through a queue that delivers one request at a
//! time, so the session itself is plain `&mut self` state with no locking.

use crate::query::GeoQuery;
use crate::{
    ContextSettings, ImageData, OffscreenSurface, RenderConfig, RenderEngine, SessionError,
};
use georender_core::{GeoreferencedMap, MainToWorker, Point};

pub enum SessionState<E> {
    Uninitialized,
    Ready(E),
}

/// Successful outcome of a handled request
#[derive(Debug, PartialEq)]
pub enum Reply {
    Initialized,
    MapAdded,
    Rendered(ImageData),
}

pub struct RenderSession<E> {
    state: SessionState<E>,
    config: RenderConfig,
}

impl<E: RenderEngine> RenderSession<E> {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            state: SessionState::Uninitialized,
            config,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    /// Borrow the engine. None before `initialize`.
    pub fn engine(&self) -> Option<&E> {
        match &self.state {
            SessionState::Ready(engine) => Some(engine),
            SessionState::Uninitialized => None,
        }
    }

    fn engine_mut(&mut self) -> Result<&mut E, SessionError> {
        match &mut self.state {
            SessionState::Ready(engine) => Ok(engine),
            SessionState::Uninitialized => Err(SessionError::NotInitialized),
        }
    }

    /// Create a `width` x `height` surface and an engine drawing onto it.
    ///
    /// Calling this again discards the previous surface, engine and maps.
    pub fn initialize(&mut self, width: u32, height: u32) -> Result<(), SessionError> {
        if width == 0 || height == 0 {
            return Err(SessionError::InvalidSize { width, height });
        }

        if self.is_ready() {
            log::warn!(
                "Render session re-initialized at {}x{}, previous surface and maps discarded",
                width,
                height
            );
        } else {
            log::debug!("Render session initialized at {}x{}", width, height);
        }

        let surface = OffscreenSurface::new(width, height);
        self.state = SessionState::Ready(E::with_surface(surface, &self.config));
        Ok(())
    }

    pub async fn add_georeferenced_map(&mut self, map: GeoreferencedMap) -> Result<(), SessionError> {
        let engine = self.engine_mut()?;
        engine.add_georeferenced_map(map).await?;
        Ok(())
    }

    /// Render the `radius` meter circle around `center` into a fresh buffer.
    ///
    /// The tile cache is cleared first, so every call is a full render. The
    /// returned pixels are `width * height * 4` bytes owned by the caller.
    pub async fn render(
        &mut self,
        center: Point,
        width: u32,
        height: u32,
        radius: f64,
    ) -> Result<ImageData, SessionError> {
        let config = self.config.clone();
        let engine = self.engine_mut()?;

        if width == 0 || height == 0 {
            return Err(SessionError::InvalidSize { width, height });
        }
        if !center.is_finite() {
            return Err(SessionError::InvalidQuery(format!(
                "center {:?} is not finite",
                center
            )));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SessionError::InvalidQuery(format!(
                "radius must be a positive number of meters, got {}",
                radius
            )));
        }

        engine.tile_cache_mut().clear();

        let viewport = GeoQuery { center, radius }.to_viewport((width, height), &config)?;
        engine.render(&viewport).await?;

        let ctx = engine
            .surface_mut()
            .get_context_2d(ContextSettings {
                will_read_frequently: config.will_read_frequently,
            })
            .ok_or(SessionError::ContextUnavailable)?;
        let image = ctx.get_image_data(0, 0, width, height);

        log::debug!(
            "Rendered {}x{} around ({}, {}) with radius {} m",
            width,
            height,
            center.x(),
            center.y(),
            radius
        );
        Ok(image)
    }

    /// Dispatch a decoded request.
    pub async fn handle(&mut self, message: MainToWorker) -> Result<Reply, SessionError> {
        match message {
            MainToWorker::Initialize { width, height } => {
                self.initialize(width, height)?;
                Ok(Reply::Initialized)
            }
            MainToWorker::AddGeoreferencedMap { map } => {
                self.add_georeferenced_map(map).await?;
                Ok(Reply::MapAdded)
            }
            MainToWorker::Render {
                center,
                width,
                height,
                radius,
            } => {
                let image = self.render(center, width, height, radius).await?;
                Ok(Reply::Rendered(image))
            }
        }
    }
}
