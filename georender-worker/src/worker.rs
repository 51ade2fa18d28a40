//! Render session running on its own thread.
//!
//! The thread owns the session; handles talk to it only through a channel.
//! Requests run to completion one at a time in the order they were sent and
//! each reply travels back on a one-shot channel. Rendered pixels are moved
//! through that channel, never copied.

use crate::{CanvasRenderer, ImageData, RenderConfig, RenderEngine, RenderSession, Reply, SessionError};
use futures::channel::oneshot;
use futures::executor::block_on;
use georender_core::{GeoreferencedMap, MainToWorker, Point};
use std::sync::mpsc;
use std::thread;

struct Envelope {
    message: MainToWorker,
    reply: oneshot::Sender<Result<Reply, SessionError>>,
}

/// Cloneable handle to a render worker thread.
///
/// The thread exits once every handle has been dropped and the queued
/// requests are done.
#[derive(Clone)]
pub struct RenderWorker {
    sender: mpsc::Sender<Envelope>,
}

impl RenderWorker {
    /// Start a worker backed by [`CanvasRenderer`].
    pub fn spawn(config: RenderConfig) -> std::io::Result<Self> {
        Self::spawn_with_engine::<CanvasRenderer>(config)
    }

    pub fn spawn_with_engine<E: RenderEngine + 'static>(
        config: RenderConfig,
    ) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Envelope>();
        thread::Builder::new()
            .name("georender-worker".to_string())
            .spawn(move || run::<E>(receiver, config))?;
        Ok(Self { sender })
    }

    async fn request(&self, message: MainToWorker) -> Result<Reply, SessionError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Envelope { message, reply })
            .map_err(|_| SessionError::WorkerDisconnected)?;
        response.await.map_err(|_| SessionError::WorkerDisconnected)?
    }

    pub async fn initialize(&self, width: u32, height: u32) -> Result<(), SessionError> {
        match self.request(MainToWorker::Initialize { width, height }).await? {
            Reply::Initialized => Ok(()),
            _ => Err(SessionError::UnexpectedReply("Initialize")),
        }
    }

    pub async fn add_georeferenced_map(&self, map: GeoreferencedMap) -> Result<(), SessionError> {
        match self.request(MainToWorker::AddGeoreferencedMap { map }).await? {
            Reply::MapAdded => Ok(()),
            _ => Err(SessionError::UnexpectedReply("AddGeoreferencedMap")),
        }
    }

    pub async fn render(
        &self,
        center: Point,
        width: u32,
        height: u32,
        radius: f64,
    ) -> Result<ImageData, SessionError> {
        let message = MainToWorker::Render {
            center,
            width,
            height,
            radius,
        };
        match self.request(message).await? {
            Reply::Rendered(image) => Ok(image),
            _ => Err(SessionError::UnexpectedReply("Render")),
        }
    }
}

fn run<E: RenderEngine>(receiver: mpsc::Receiver<Envelope>, config: RenderConfig) {
    let mut session = RenderSession::<E>::new(config);
    log::debug!("Render worker started");

    while let Ok(Envelope { message, reply }) = receiver.recv() {
        let result = block_on(session.handle(message));
        if let Err(err) = &result {
            log::debug!("Render worker request failed: {}", err);
        }
        if reply.send(result).is_err() {
            log::debug!("Render worker reply dropped, caller went away");
        }
    }

    log::debug!("Render worker stopped");
}
