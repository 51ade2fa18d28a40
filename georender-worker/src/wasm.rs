//! Web Worker entry point.
//!
//! Requests arrive as JSON strings ([`WorkerRequest`]). They are queued and
//! drained one at a time by a single task that owns the session while it
//! runs, so overlapping renders wait behind each other. Rendered pixels are
//! posted as an `ImageData` whose buffer is in the transfer list.

use crate::{CanvasRenderer, ImageData, RenderConfig, RenderSession, Reply};
use georender_core::{WorkerRequest, WorkerToMain};
use gloo_utils::format::JsValueSerdeExt;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{DedicatedWorkerGlobalScope, MessageEvent};

thread_local! {
    /// None while the drain task holds the session.
    static SESSION: RefCell<Option<RenderSession<CanvasRenderer>>> = const { RefCell::new(None) };
    static QUEUE: RefCell<VecDeque<WorkerRequest>> = const { RefCell::new(VecDeque::new()) };
    /// At most one drain task exists at a time.
    static DRAINING: Cell<bool> = const { Cell::new(false) };
}

fn global() -> DedicatedWorkerGlobalScope {
    js_sys::global().unchecked_into::<DedicatedWorkerGlobalScope>()
}

/// Worker initialization - called when worker starts.
///
/// `config` is an optional [`RenderConfig`] object; `undefined` uses defaults.
/// A worker is initialized once; later calls fail.
#[wasm_bindgen]
pub fn init_worker(config: JsValue) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    let config: RenderConfig = if config.is_undefined() || config.is_null() {
        RenderConfig::default()
    } else {
        config
            .into_serde()
            .map_err(|e| JsValue::from_str(&format!("Parse config: {}", e)))?
    };
    install_session(config)?;

    let global = js_sys::global().dyn_into::<DedicatedWorkerGlobalScope>()?;
    let onmessage = Closure::wrap(Box::new(move |e: MessageEvent| {
        if let Err(err) = handle_message(e.data()) {
            web_sys::console::error_1(&err);
        }
    }) as Box<dyn FnMut(_)>);
    global.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    post(&WorkerToMain::Ready, None)
}

fn install_session(config: RenderConfig) -> Result<(), JsValue> {
    let installed = DRAINING.with(Cell::get) || SESSION.with(|s| s.borrow().is_some());
    if installed {
        return Err(JsValue::from_str("Worker already initialized"));
    }
    SESSION.with(|s| *s.borrow_mut() = Some(RenderSession::new(config)));
    Ok(())
}

/// Queue a request and start draining if nobody is.
#[wasm_bindgen]
pub fn handle_message(event_data: JsValue) -> Result<(), JsValue> {
    let json = event_data
        .as_string()
        .ok_or_else(|| JsValue::from_str("Request must be a JSON string"))?;

    let request: WorkerRequest = match serde_json::from_str(&json) {
        Ok(request) => request,
        Err(e) => {
            let message = format!("Parse error: {}", e);
            log::error!("{}", message);
            return post(&WorkerToMain::Error { id: None, message }, None);
        }
    };

    QUEUE.with(|q| q.borrow_mut().push_back(request));
    if DRAINING.with(Cell::get) {
        return Ok(());
    }
    match SESSION.with(|s| s.borrow_mut().take()) {
        Some(session) => {
            DRAINING.with(|d| d.set(true));
            wasm_bindgen_futures::spawn_local(drain(session));
        }
        None => log::warn!("Request queued before init_worker"),
    }
    Ok(())
}

async fn drain(mut session: RenderSession<CanvasRenderer>) {
    while let Some(request) = QUEUE.with(|q| q.borrow_mut().pop_front()) {
        let id = request.id;
        let posted = match session.handle(request.message).await {
            Ok(Reply::Initialized) => post(&WorkerToMain::Initialized { id }, None),
            Ok(Reply::MapAdded) => post(&WorkerToMain::MapAdded { id }, None),
            Ok(Reply::Rendered(image)) => {
                let reply = WorkerToMain::Rendered {
                    id,
                    width: image.width(),
                    height: image.height(),
                };
                post(&reply, Some(image))
            }
            Err(err) => {
                log::warn!("Request {} failed: {}", id, err);
                post(
                    &WorkerToMain::Error {
                        id: Some(id),
                        message: err.to_string(),
                    },
                    None,
                )
            }
        };
        if let Err(err) = posted {
            web_sys::console::error_1(&err);
        }
    }

    // No await between the last pop and here, so no request can slip in
    SESSION.with(|s| *s.borrow_mut() = Some(session));
    DRAINING.with(|d| d.set(false));
}

/// Post a reply, transferring the image buffer when there is one.
fn post(reply: &WorkerToMain, image: Option<ImageData>) -> Result<(), JsValue> {
    match reply_message(reply, image)? {
        (message, Some(transfer)) => global().post_message_with_transfer(&message, &transfer),
        (message, None) => global().post_message(&message),
    }
}

/// Message to post for `reply`, plus its transfer list.
///
/// Plain replies are JSON strings. A reply with an image becomes
/// `{ reply, image }` and the image's pixel buffer is the only transferable.
fn reply_message(
    reply: &WorkerToMain,
    image: Option<ImageData>,
) -> Result<(JsValue, Option<js_sys::Array>), JsValue> {
    let json = serde_json::to_string(reply)
        .map_err(|e| JsValue::from_str(&format!("Serialize reply: {}", e)))?;

    let Some(image) = image else {
        return Ok((JsValue::from_str(&json), None));
    };

    let (width, height) = (image.width(), image.height());
    let pixels = image.into_vec();
    let js_image =
        web_sys::ImageData::new_with_u8_clamped_array_and_sh(Clamped(&pixels), width, height)?;
    let buffer = js_sys::Reflect::get(&js_image, &JsValue::from_str("data"))?
        .dyn_into::<js_sys::Uint8ClampedArray>()?
        .buffer();

    let message = js_sys::Object::new();
    js_sys::Reflect::set(&message, &JsValue::from_str("reply"), &JsValue::from_str(&json))?;
    js_sys::Reflect::set(&message, &JsValue::from_str("image"), &js_image)?;
    Ok((message.into(), Some(js_sys::Array::of1(&buffer))))
}
