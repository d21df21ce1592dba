//! [`FrameHost`] backed by `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use oscillator::{FrameHost, FrameRequest};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

/// The animation-frame callback shared between the host and its owner.
///
/// The slot is filled once the closure (which itself needs the host) has
/// been built.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Requests and cancels browser animation frames.
pub struct BrowserFrameHost {
    window: Window,
    callback: FrameCallback,
}

impl BrowserFrameHost {
    /// Creates a host that schedules `callback` on `window`.
    pub fn new(window: Window, callback: FrameCallback) -> Self {
        Self { window, callback }
    }
}

impl FrameHost for BrowserFrameHost {
    type Error = JsValue;

    fn request_frame(&mut self) -> Result<FrameRequest, Self::Error> {
        let slot = self.callback.borrow();
        let callback = slot
            .as_ref()
            .ok_or_else(|| JsValue::from_str("animation frame callback not installed"))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map(FrameRequest)
    }

    fn cancel_frame(&mut self, request: FrameRequest) -> Result<(), Self::Error> {
        self.window.cancel_animation_frame(request.0)
    }
}
