//! The mounted widget: controller, canvas, controls and frame host together.

use oscillator::{Controller, Field, Mode};
use tracing::warn;
use wasm_bindgen::JsValue;
use web_sys::HtmlInputElement;

use crate::canvas::CanvasSurface;
use crate::dom::DomBindings;
use crate::error::describe;
use crate::frame::BrowserFrameHost;

/// Everything the browser callbacks act on.
pub struct App {
    controller: Controller,
    surface: CanvasSurface,
    dom: DomBindings,
    host: BrowserFrameHost,
}

impl App {
    /// Draws the static pose and fills in the controls.
    pub fn new(
        controller: Controller,
        mut surface: CanvasSurface,
        dom: DomBindings,
        host: BrowserFrameHost,
    ) -> Self {
        controller.load(&mut surface);
        let app = Self {
            controller,
            surface,
            dom,
            host,
        };
        app.sync_controls();
        app
    }

    /// The controller.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// The page controls.
    pub fn dom_bindings(&self) -> &DomBindings {
        &self.dom
    }

    /// Handles a `change` event on one of the inputs.
    pub fn on_input(&mut self, field: Field, input: &HtmlInputElement) {
        let raw = input.value();
        match self.controller.change_field(field, &raw, &mut self.surface) {
            Ok(()) => self.dom.write_readouts(&self.controller.readouts()),
            Err(_) => self.dom.revert(field, self.controller.parameters()),
        }
    }

    /// Handles a press of the Play/Stop control.
    ///
    /// # Errors
    ///
    /// Returns the browser's error if a frame could not be requested or
    /// cancelled. The controls reflect the resulting mode either way.
    pub fn toggle(&mut self) -> Result<Mode, JsValue> {
        let result = self.controller.toggle(&mut self.host);
        self.sync_controls();
        result
    }

    /// Handles one `requestAnimationFrame` callback.
    pub fn on_frame(&mut self, timestamp_ms: f64) {
        match self
            .controller
            .on_animation_frame(timestamp_ms, &mut self.host, &mut self.surface)
        {
            Ok(true) => self.dom.write_readouts(&self.controller.readouts()),
            Ok(false) => {}
            Err(err) => {
                warn!(error = %describe(&err), "animation stopped: frame request failed");
                self.sync_controls();
            }
        }
    }

    fn sync_controls(&self) {
        self.dom.set_toggle_label(self.controller.toggle_label());
        self.dom.set_inputs_locked(self.controller.inputs_locked());
        self.dom.write_readouts(&self.controller.readouts());
    }
}
