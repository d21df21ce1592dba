//! Spring-and-mass scene drawn onto an abstract [`Surface`].
//!
//! The scene has a fixed part (a support bar with hatch columns and a short
//! stem) and a moving part (the coil and the mass). The coil geometry is a
//! function of the current displacement only: a positive displacement makes
//! the steps taller and narrower, a negative one shorter and wider.

use std::f64::consts::TAU;

use crate::config::Config;

/// Stroke width used when none is given.
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

const HATCH_COLUMNS: u32 = 20;
const HATCH_HEIGHT: f64 = 10.0;
const HATCH_INCLINE: f64 = 4.0;
const HATCH_LINE_WIDTH: f64 = 1.0;
const STEM_HEIGHT: f64 = 10.0;

const COIL_STEPS: u32 = 6;
const COIL_REST_HEIGHT: f64 = 23.0;
const COIL_STEP_DIVISOR: f64 = 1.3;
const COIL_SPAN: f64 = 42.0;

const MASS_RADIUS_SCALE: f64 = 12.0;

/// A point in surface coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate, downward.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// A 2D drawing target.
///
/// Implemented over a browser canvas by `oscillator-wasm` and by
/// [`RecordingSurface`] for tests.
pub trait Surface {
    /// Clears a rectangular region.
    fn clear(&mut self, area: Rect);

    /// Strokes a straight segment.
    fn stroke_line(&mut self, from: Point, to: Point, width: f64);

    /// Fills a circular sector from `start_angle` to `end_angle` (radians).
    fn fill_circle(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64);

    /// Strokes a segment at [`DEFAULT_LINE_WIDTH`].
    fn line(&mut self, from: Point, to: Point) {
        self.stroke_line(from, to, DEFAULT_LINE_WIDTH);
    }
}

/// Placement of the scene on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLayout {
    /// Surface width.
    pub width: f64,
    /// Surface height.
    pub height: f64,
    /// Width of the support bar.
    pub draw_width: f64,
    /// Distance from the top edge to the support bar.
    pub margin_top: f64,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            width: 240.0,
            height: 320.0,
            draw_width: 100.0,
            margin_top: 15.0,
        }
    }
}

impl SceneLayout {
    /// Layout described by a config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.canvas_width,
            height: config.canvas_height,
            draw_width: config.draw_width,
            margin_top: config.margin_top,
        }
    }

    /// Horizontal center of the surface.
    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }

    /// The whole surface.
    pub fn bounds(&self) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Step sizes of the zig-zag coil at a given displacement.
///
/// ```rust
/// use oscillator::CoilShape;
///
/// let rest = CoilShape::for_displacement(0.0);
/// let stretched = CoilShape::for_displacement(10.0);
/// assert!(stretched.step_height > rest.step_height);
/// assert!(stretched.step_width < rest.step_width);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoilShape {
    /// Horizontal travel of each coil segment.
    pub step_width: f64,
    /// Vertical travel of each coil segment.
    pub step_height: f64,
}

impl CoilShape {
    /// `step_height = (23 + x) / 1.3`, `step_width = 42 - step_height`.
    pub fn for_displacement(displacement: f64) -> Self {
        let step_height = (COIL_REST_HEIGHT + displacement) / COIL_STEP_DIVISOR;
        Self {
            step_width: COIL_SPAN - step_height,
            step_height,
        }
    }

    /// Vertices of the coil polyline, from the stem end to the mass center.
    ///
    /// The first segment leads in diagonally to the left of center, then six
    /// segments alternate right and left, then a lead-out returns to center
    /// and a vertical connector drops to the mass.
    pub fn vertices(&self, stem_end: Point) -> Vec<Point> {
        let center_x = stem_end.x;
        let mut points = Vec::with_capacity(COIL_STEPS as usize + 4);
        points.push(stem_end);

        let mut cursor = Point::new(
            center_x - self.step_width / 2.0,
            stem_end.y + self.step_height / 2.0,
        );
        points.push(cursor);

        let mut direction = 1.0;
        for _ in 0..COIL_STEPS {
            cursor = Point::new(
                cursor.x + direction * self.step_width,
                cursor.y + self.step_height,
            );
            points.push(cursor);
            direction = -direction;
        }

        cursor = Point::new(center_x, cursor.y + self.step_height / 2.0);
        points.push(cursor);
        points.push(Point::new(center_x, cursor.y + self.step_height));
        points
    }
}

/// Radius of the drawn mass: `cbrt(mass) * 12`.
///
/// The cube root keeps the circle a sensible size across a wide mass range.
pub fn mass_radius(mass: f64) -> f64 {
    mass.cbrt() * MASS_RADIUS_SCALE
}

/// Clears the surface and draws the full scene. Returns the mass center.
pub fn draw_scene<S: Surface + ?Sized>(
    surface: &mut S,
    layout: &SceneLayout,
    displacement: f64,
    mass: f64,
) -> Point {
    surface.clear(layout.bounds());
    let stem_end = draw_mount(surface, layout);

    let vertices = CoilShape::for_displacement(displacement).vertices(stem_end);
    for pair in vertices.windows(2) {
        surface.line(pair[0], pair[1]);
    }

    let center = vertices.last().copied().unwrap_or(stem_end);
    surface.fill_circle(center, mass_radius(mass), 0.0, TAU);
    center
}

/// Support bar, hatch columns and stem. Returns the lower end of the stem.
fn draw_mount<S: Surface + ?Sized>(surface: &mut S, layout: &SceneLayout) -> Point {
    let center_x = layout.center_x();
    let top = layout.margin_top;
    let left = center_x - layout.draw_width / 2.0;
    let right = center_x + layout.draw_width / 2.0;

    surface.line(Point::new(left, top), Point::new(right, top));
    let stem_end = Point::new(center_x, top + STEM_HEIGHT);
    surface.line(Point::new(center_x, top), stem_end);

    let spacing = layout.draw_width / HATCH_COLUMNS as f64;
    for i in 0..HATCH_COLUMNS {
        let x = left + i as f64 * spacing;
        surface.stroke_line(
            Point::new(x, top),
            Point::new(x + HATCH_INCLINE, top - HATCH_HEIGHT),
            HATCH_LINE_WIDTH,
        );
    }

    stem_end
}

/// One recorded drawing call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// [`Surface::clear`].
    Clear(Rect),
    /// [`Surface::stroke_line`].
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke width.
        width: f64,
    },
    /// [`Surface::fill_circle`].
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
        /// Start angle in radians.
        start_angle: f64,
        /// End angle in radians.
        end_angle: f64,
    },
}

/// A [`Surface`] that records every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Creates an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands, in call order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands since the most recent full clear.
    pub fn last_scene(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|cmd| matches!(cmd, DrawCommand::Clear(_)))
            .unwrap_or(0);
        &self.commands[start..]
    }

    /// Number of clears recorded, which is the number of scenes drawn.
    pub fn scene_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Clear(_)))
            .count()
    }

    /// Line segments recorded, in order.
    pub fn lines(&self) -> impl Iterator<Item = (Point, Point, f64)> + '_ {
        self.commands.iter().filter_map(|cmd| match *cmd {
            DrawCommand::Line { from, to, width } => Some((from, to, width)),
            _ => None,
        })
    }

    /// Forgets everything recorded so far.
    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, area: Rect) {
        self.commands.push(DrawCommand::Clear(area));
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64) {
        self.commands.push(DrawCommand::Line { from, to, width });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            start_angle,
            end_angle,
        });
    }
}
