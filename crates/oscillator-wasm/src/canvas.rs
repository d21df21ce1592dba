//! [`Surface`] over a canvas 2D context.

use oscillator::{Point, Rect, Surface};
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{MountError, describe};

/// Draws onto an `HtmlCanvasElement` through its 2D context.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Sizes the canvas and acquires its 2D context.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::NoContext`] if the canvas refuses a 2D context.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(canvas: HtmlCanvasElement, width: f64, height: f64) -> Result<Self, MountError> {
        canvas.set_width(width.round() as u32);
        canvas.set_height(height.round() as u32);

        let ctx = canvas
            .get_context("2d")
            .map_err(|err| MountError::js(&err))?
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| MountError::NoContext(canvas.id()))?;

        Ok(Self { canvas, ctx })
    }

    /// The underlying canvas element.
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, area: Rect) {
        self.ctx.clear_rect(area.x, area.y, area.width, area.height);
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64) {
        self.ctx.begin_path();
        self.ctx.set_line_width(width);
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        self.ctx.begin_path();
        // arc() only throws for a negative radius, which a valid mass never yields
        if let Err(err) = self
            .ctx
            .arc(center.x, center.y, radius, start_angle, end_angle)
        {
            warn!(radius, error = %describe(&err), "canvas arc failed");
            return;
        }
        self.ctx.fill();
    }
}
