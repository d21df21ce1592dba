//! # oscillator-wasm
//!
//! Spring oscillator widget for the web, compiled to WebAssembly.
//!
//! This crate binds the [`oscillator`] controller to a page: it draws on a
//! `<canvas>`, drives frames with `requestAnimationFrame`, reads the three
//! parameter inputs and writes the four output displays.
//!
//! ## Quick Start (JavaScript)
//!
//! ```javascript
//! import init, { mount } from 'oscillator-wasm';
//!
//! async function main() {
//!     await init();
//!
//!     const widget = mount(JSON.stringify({ log_level: "debug" }));
//!     console.log(widget.readouts());
//! }
//!
//! main();
//! ```
//!
//! The page needs a canvas `#spring-pendulum`, inputs `#m`, `#k` and `#x0`,
//! outputs `#w0`, `#x`, `#t` and `#q`, and a button `#btn-toggle-animation`.
//! Every id can be changed through the `dom` section of the config.
//!
//! ## Available APIs
//!
//! - `mount(configJson?)` - Bind the widget to the page
//! - `OscillatorWidget.toggle()` - Same as pressing Play/Stop
//! - `OscillatorWidget.isRunning()` - Whether the animation runs
//! - `OscillatorWidget.readouts()` - Current output texts as an object
//! - `version()` / `isReady()` - Module information

#![forbid(unsafe_code)]

// Use wee_alloc for smaller binaries (optional)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

pub mod app;
pub mod canvas;
pub mod dom;
pub mod error;
pub mod frame;
pub mod logging;

use std::cell::RefCell;
use std::rc::Rc;

use oscillator::Controller;
use tracing::info;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlInputElement};

pub use app::App;
pub use canvas::CanvasSurface;
pub use dom::{DomBindings, DomIds, WidgetConfig};
pub use error::MountError;
pub use frame::{BrowserFrameHost, FrameCallback};

/// Installs the panic hook when the module loads.
#[wasm_bindgen(start)]
#[allow(clippy::missing_const_for_fn)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Module version information.
#[must_use]
#[wasm_bindgen(js_name = "version")]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Check if the module is properly initialized.
#[must_use]
#[wasm_bindgen(js_name = "isReady")]
#[allow(clippy::missing_const_for_fn)] // wasm_bindgen doesn't support const fn
pub fn is_ready() -> bool {
    true
}

/// Handle to a mounted widget.
#[wasm_bindgen]
pub struct OscillatorWidget {
    app: Rc<RefCell<App>>,
}

#[wasm_bindgen]
impl OscillatorWidget {
    /// Starts or stops the animation, like pressing the toggle control.
    ///
    /// # Errors
    ///
    /// Throws if the browser refuses the animation frame request.
    pub fn toggle(&self) -> Result<bool, JsValue> {
        let mode = self.app.borrow_mut().toggle()?;
        Ok(mode == oscillator::Mode::Running)
    }

    /// Whether the animation is running.
    #[must_use]
    #[wasm_bindgen(js_name = "isRunning")]
    pub fn is_running(&self) -> bool {
        self.app.borrow().controller().is_running()
    }

    /// The four output texts as `{ angularFrequency, displacement,
    /// elapsedTime, oscillationCount }`.
    ///
    /// # Errors
    ///
    /// Throws if the object cannot be populated.
    pub fn readouts(&self) -> Result<js_sys::Object, JsValue> {
        let readouts = self.app.borrow().controller().readouts();
        let object = js_sys::Object::new();
        for (key, value) in [
            ("angularFrequency", readouts.angular_frequency),
            ("displacement", readouts.displacement),
            ("elapsedTime", readouts.elapsed_time),
            ("oscillationCount", readouts.oscillation_count),
        ] {
            js_sys::Reflect::set(&object, &JsValue::from_str(key), &JsValue::from_str(&value))?;
        }
        Ok(object)
    }
}

/// Binds the widget to the current page.
///
/// `config_json` is an optional JSON [`WidgetConfig`]; omitted settings take
/// their defaults.
///
/// # Errors
///
/// Throws if the config is invalid, an element is missing or of the wrong
/// kind, the canvas has no 2D context, or an input holds an invalid value.
#[wasm_bindgen]
#[allow(clippy::needless_pass_by_value)] // wasm_bindgen passes strings by value
pub fn mount(config_json: Option<String>) -> Result<OscillatorWidget, JsValue> {
    mount_widget(config_json.as_deref()).map_err(JsValue::from)
}

fn mount_widget(config_json: Option<&str>) -> Result<OscillatorWidget, MountError> {
    let config = WidgetConfig::from_json(config_json)?;
    logging::init(config.core.max_level()?);

    let window = web_sys::window().ok_or(MountError::NoWindow)?;
    let document = window.document().ok_or(MountError::NoDocument)?;

    let canvas = dom::find_canvas(&document, &config.dom)?;
    let surface = CanvasSurface::new(canvas, config.core.canvas_width, config.core.canvas_height)?;
    let dom = DomBindings::find(&document, &config.dom)?;
    let params = dom.initial_parameters(config.core.defaults)?;
    let controller = Controller::with_parameters(&config.core, params);

    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let host = BrowserFrameHost::new(window, Rc::clone(&callback));
    let app = Rc::new(RefCell::new(App::new(controller, surface, dom, host)));

    let frame_app = Rc::clone(&app);
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp_ms: f64| {
        frame_app.borrow_mut().on_frame(timestamp_ms);
    }) as Box<dyn FnMut(f64)>));

    register_listeners(&app)?;
    info!(canvas = %config.dom.canvas, fps = config.core.fps, "oscillator mounted");
    Ok(OscillatorWidget { app })
}

/// Hooks the inputs' `change` events and the toggle's `click`.
///
/// The closures live as long as the page.
fn register_listeners(app: &Rc<RefCell<App>>) -> Result<(), MountError> {
    let (inputs, toggle) = {
        let app = app.borrow();
        let dom = app.dom_bindings();
        (dom.inputs().to_vec(), dom.toggle().clone())
    };

    for input in inputs {
        let input_app = Rc::clone(app);
        let element: HtmlInputElement = input.element.clone();
        let field = input.field;
        let on_change = Closure::wrap(Box::new(move |_event: Event| {
            input_app.borrow_mut().on_input(field, &element);
        }) as Box<dyn FnMut(Event)>);
        input
            .element
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
            .map_err(|err| MountError::js(&err))?;
        on_change.forget();
    }

    let toggle_app = Rc::clone(app);
    let on_click = Closure::wrap(Box::new(move |_event: Event| {
        if let Err(err) = toggle_app.borrow_mut().toggle() {
            tracing::warn!(error = %error::describe(&err), "toggle failed");
        }
    }) as Box<dyn FnMut(Event)>);
    toggle
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .map_err(|err| MountError::js(&err))?;
    on_click.forget();

    Ok(())
}
