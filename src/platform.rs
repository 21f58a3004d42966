//! Browser platform plumbing
//!
//! Window/canvas lookup, the wall clock, async image loading and rAF
//! scheduling. JS-side failures become `JsValue` errors at this boundary;
//! nothing above it talks to `web_sys` lookups directly.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::channel::oneshot::channel;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, Window};

pub type LoopClosure = Closure<dyn FnMut(f64)>;

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn canvas(id: &str) -> Result<HtmlCanvasElement, JsValue> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str("canvas element not found"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|el| JsValue::from_str(&format!("element #{id} is not a canvas: {el:?}")))
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("context is not CanvasRenderingContext2d"))
}

/// Current window inner size, clamped to the viewport floor
pub fn window_size() -> Result<(f32, f32), JsValue> {
    let window = window()?;
    let w = window.inner_width()?.as_f64().unwrap_or(0.0) as f32;
    let h = window.inner_height()?.as_f64().unwrap_or(0.0) as f32;
    Ok((
        w.max(crate::consts::MIN_VIEW_W),
        h.max(crate::consts::MIN_VIEW_H),
    ))
}

/// Monotonic wall clock in milliseconds
pub fn now_ms() -> f64 {
    window()
        .ok()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32, JsValue> {
    window()?.request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Asynchronously load an image; resolves once the pixels are decoded,
/// rejects on network or format errors
pub async fn load_image(source: &str) -> Result<HtmlImageElement, JsValue> {
    let image = HtmlImageElement::new()?;
    let (tx, rx) = channel::<Result<(), JsValue>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let source_owned = source.to_string();
    let success_callback = Closure::once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });
    let error_callback = Closure::once(move |err: JsValue| {
        log::error!("failed to load image {source_owned}: {err:?}");
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(err));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // Keep the callbacks alive until the image settles
    success_callback.forget();
    error_callback.forget();

    rx.await
        .map_err(|_| JsValue::from_str("image load channel cancelled"))??;

    Ok(image)
}
