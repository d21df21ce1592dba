//! Play/Stop state machine and parameter bindings of the widget.
//!
//! The [`Controller`] owns the [`Simulation`] and the [`FrameScheduler`] and
//! is the only thing a host talks to. The host forwards three kinds of
//! events (parameter edits, toggle presses, animation frames) and then reads
//! back [`Readouts`], [`Controller::toggle_label`] and
//! [`Controller::inputs_locked`] to update its controls.

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::InvalidParameterError;
use crate::physics::round_to;
use crate::render::{SceneLayout, Surface, draw_scene};
use crate::scheduler::{FrameHost, FrameScheduler};
use crate::state::{Characteristics, Field, Parameters, Simulation};

/// Decimal places shown for displacement and elapsed time.
const READOUT_PLACES: u32 = 2;

/// Unit appended to the elapsed time readout.
const TIME_UNIT: &str = "s";

/// Whether the animation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Idle; inputs editable, toggle reads "Play".
    #[default]
    Stopped,
    /// Animating; inputs locked, toggle reads "Stop".
    Running,
}

impl Mode {
    /// Label for the toggle control in this mode.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Mode::Stopped => "Play",
            Mode::Running => "Stop",
        }
    }
}

/// Text for the four output displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readouts {
    /// `ω0`, three decimals.
    pub angular_frequency: String,
    /// Current displacement, two decimals.
    pub displacement: String,
    /// Elapsed time, two decimals, with unit.
    pub elapsed_time: String,
    /// Completed oscillations.
    pub oscillation_count: String,
}

impl Readouts {
    /// Formats a set of characteristics.
    pub fn from_characteristics(c: &Characteristics) -> Self {
        Self {
            angular_frequency: format_number(c.angular_frequency),
            displacement: format_number(round_to(c.displacement, READOUT_PLACES)),
            elapsed_time: format!(
                "{}{TIME_UNIT}",
                format_number(round_to(c.elapsed_time, READOUT_PLACES))
            ),
            oscillation_count: c.oscillation_count.to_string(),
        }
    }
}

/// Shortest decimal form of a number, without a trailing `.0` and with
/// negative zero shown as `0`.
///
/// ```rust
/// use oscillator::format_number;
///
/// assert_eq!(format_number(1.0), "1");
/// assert_eq!(format_number(-0.0), "0");
/// assert_eq!(format_number(1.414), "1.414");
/// ```
pub fn format_number(value: f64) -> String {
    format!("{}", value + 0.0)
}

/// Drives the widget: parameters in, frames and readouts out.
#[derive(Debug, Clone)]
pub struct Controller {
    layout: SceneLayout,
    simulation: Simulation,
    scheduler: FrameScheduler,
    mode: Mode,
}

impl Controller {
    /// Creates a stopped controller using the config's default parameters.
    pub fn new(config: &Config) -> Self {
        Self::with_parameters(config, config.defaults)
    }

    /// Creates a stopped controller with explicit starting parameters.
    ///
    /// Hosts use this when the initial values come from their input
    /// controls rather than from the config.
    pub fn with_parameters(config: &Config, params: Parameters) -> Self {
        debug!(
            mass = params.mass(),
            stiffness = params.stiffness(),
            initial_displacement = params.initial_displacement(),
            fps = config.fps,
            "controller created"
        );
        Self {
            layout: config.layout(),
            simulation: Simulation::new(params),
            scheduler: FrameScheduler::new(config.fps),
            mode: Mode::Stopped,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the animation is running.
    pub fn is_running(&self) -> bool {
        self.mode == Mode::Running
    }

    /// Inputs are locked while the animation runs.
    pub fn inputs_locked(&self) -> bool {
        self.is_running()
    }

    /// Label for the toggle control.
    pub fn toggle_label(&self) -> &'static str {
        self.mode.toggle_label()
    }

    /// Current parameters.
    pub fn parameters(&self) -> &Parameters {
        self.simulation.params()
    }

    /// Current characteristics.
    pub fn characteristics(&self) -> &Characteristics {
        self.simulation.characteristics()
    }

    /// The simulation state.
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Scene placement.
    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    /// Text for the output displays.
    pub fn readouts(&self) -> Readouts {
        Readouts::from_characteristics(self.simulation.characteristics())
    }

    /// Draws the initial static pose.
    pub fn load<S: Surface + ?Sized>(&self, surface: &mut S) {
        self.draw_static(surface);
    }

    /// Handles an edit of one input control.
    ///
    /// On success the run is reset (time, displacement, count), `ω0` is
    /// recomputed and the static pose is redrawn at the initial displacement.
    /// If the animation is running its clock restarts at zero.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameterError`] for unparseable or out-of-range
    /// input. Nothing changes in that case; the host should write
    /// [`Parameters::get`] back into its control.
    pub fn change_field<S: Surface + ?Sized>(
        &mut self,
        field: Field,
        raw: &str,
        surface: &mut S,
    ) -> Result<(), InvalidParameterError> {
        let value = field
            .parse_value(raw)
            .inspect_err(|err| warn!(%field, input = raw, %err, "rejected parameter input"))?;
        self.set_parameter(field, value, surface)
    }

    /// Like [`change_field`](Self::change_field), with the field named by a
    /// control's field id. Returns the field that changed.
    ///
    /// # Errors
    ///
    /// Also fails with [`InvalidParameterError::UnknownField`] when `id`
    /// names no parameter.
    pub fn change_field_by_id<S: Surface + ?Sized>(
        &mut self,
        id: &str,
        raw: &str,
        surface: &mut S,
    ) -> Result<Field, InvalidParameterError> {
        let field: Field = id.parse()?;
        self.change_field(field, raw, surface)?;
        Ok(field)
    }

    /// Sets a parameter to an already numeric value.
    ///
    /// # Errors
    ///
    /// See [`change_field`](Self::change_field).
    pub fn set_parameter<S: Surface + ?Sized>(
        &mut self,
        field: Field,
        value: f64,
        surface: &mut S,
    ) -> Result<(), InvalidParameterError> {
        self.simulation
            .set_parameter(field, value)
            .inspect_err(|err| warn!(%field, value, %err, "rejected parameter value"))?;
        self.scheduler.restart_clock();
        debug!(
            %field,
            value,
            angular_frequency = self.simulation.characteristics().angular_frequency,
            "parameter changed"
        );
        self.draw_static(surface);
        Ok(())
    }

    /// Starts or stops the animation, depending on the current mode.
    ///
    /// Starting resets time, displacement and count before the first frame.
    /// Stopping cancels the pending frame and leaves the last frame's
    /// readouts in place.
    ///
    /// # Errors
    ///
    /// Propagates the host's error. A failed start leaves the controller
    /// stopped; a failed stop still stops it.
    pub fn toggle<H: FrameHost>(&mut self, host: &mut H) -> Result<Mode, H::Error> {
        match self.mode {
            Mode::Stopped => {
                self.simulation.reset();
                self.scheduler.start(host)?;
                self.mode = Mode::Running;
            }
            Mode::Running => {
                self.mode = Mode::Stopped;
                self.scheduler.stop(host)?;
            }
        }
        debug!(mode = ?self.mode, "animation toggled");
        Ok(self.mode)
    }

    /// Handles one host animation frame.
    ///
    /// Returns `true` if a new logical frame was drawn, in which case the
    /// host should refresh its readouts.
    ///
    /// # Errors
    ///
    /// Propagates the host's error from requesting the next frame; the
    /// controller is stopped in that case.
    pub fn on_animation_frame<H: FrameHost, S: Surface + ?Sized>(
        &mut self,
        timestamp_ms: f64,
        host: &mut H,
        surface: &mut S,
    ) -> Result<bool, H::Error> {
        if self.mode != Mode::Running {
            return Ok(false);
        }

        let frame = self.scheduler.tick(timestamp_ms, host).inspect_err(|_| {
            self.mode = Mode::Stopped;
        })?;
        self.simulation.set_elapsed(self.scheduler.elapsed());

        let Some(frame) = frame else {
            return Ok(false);
        };

        let count_before = self.simulation.characteristics().oscillation_count;
        let x = self.simulation.advance();
        let count = self.simulation.characteristics().oscillation_count;
        if count != count_before {
            debug!(count, elapsed = frame.elapsed, "oscillation completed");
        }
        trace!(
            index = frame.index,
            elapsed = frame.elapsed,
            displacement = x,
            "frame"
        );

        draw_scene(surface, &self.layout, x, self.simulation.params().mass());
        Ok(true)
    }

    fn draw_static<S: Surface + ?Sized>(&self, surface: &mut S) {
        let params = self.simulation.params();
        draw_scene(
            surface,
            &self.layout,
            params.initial_displacement(),
            params.mass(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;
    use crate::scheduler::ManualFrameHost;

    struct Harness {
        controller: Controller,
        host: ManualFrameHost,
        surface: RecordingSurface,
    }

    impl Harness {
        fn new() -> Self {
            let controller = Controller::new(&Config::default());
            let mut surface = RecordingSurface::new();
            controller.load(&mut surface);
            Self {
                controller,
                host: ManualFrameHost::new(),
                surface,
            }
        }

        fn toggle(&mut self) -> Mode {
            self.controller.toggle(&mut self.host).unwrap()
        }

        fn frame(&mut self, timestamp_ms: f64) -> bool {
            self.host.fire();
            self.controller
                .on_animation_frame(timestamp_ms, &mut self.host, &mut self.surface)
                .unwrap()
        }
    }

    #[test]
    fn test_initial_state() {
        let h = Harness::new();
        assert_eq!(h.controller.mode(), Mode::Stopped);
        assert_eq!(h.controller.toggle_label(), "Play");
        assert!(!h.controller.inputs_locked());
        assert_eq!(h.surface.scene_count(), 1);

        let readouts = h.controller.readouts();
        assert_eq!(readouts.angular_frequency, "1");
        assert_eq!(readouts.displacement, "0");
        assert_eq!(readouts.elapsed_time, "0s");
        assert_eq!(readouts.oscillation_count, "0");
    }

    #[test]
    fn test_toggle_switches_label_and_lock() {
        let mut h = Harness::new();
        assert_eq!(h.toggle(), Mode::Running);
        assert_eq!(h.controller.toggle_label(), "Stop");
        assert!(h.controller.inputs_locked());
        assert_eq!(h.host.pending().len(), 1);

        assert_eq!(h.toggle(), Mode::Stopped);
        assert_eq!(h.controller.toggle_label(), "Play");
        assert!(!h.controller.inputs_locked());
        assert!(h.host.pending().is_empty());
        assert_eq!(h.host.cancelled().len(), 1);
    }

    #[test]
    fn test_first_frame_draws_initial_pose() {
        let mut h = Harness::new();
        h.toggle();
        assert!(h.frame(100.0));
        assert_eq!(h.controller.readouts().displacement, "10");
        assert_eq!(h.surface.scene_count(), 2);
    }

    #[test]
    fn test_frame_ignored_when_stopped() {
        let mut h = Harness::new();
        assert!(
            !h.controller
                .on_animation_frame(5.0, &mut h.host, &mut h.surface)
                .unwrap()
        );
        assert_eq!(h.host.requested_count(), 0);
        assert_eq!(h.surface.scene_count(), 1);
    }

    #[test]
    fn test_half_period_readout() {
        let mut h = Harness::new();
        h.toggle();
        h.frame(0.0);
        assert!(h.frame(std::f64::consts::PI * 1000.0));
        let readouts = h.controller.readouts();
        assert_eq!(readouts.displacement, "-10");
        assert_eq!(readouts.elapsed_time, "3.14s");
    }

    #[test]
    fn test_suppressed_tick_updates_time_only() {
        let mut h = Harness::new();
        h.toggle();
        h.frame(0.0);
        let scenes = h.surface.scene_count();
        assert!(!h.frame(8.0));
        assert_eq!(h.surface.scene_count(), scenes);
        assert!((h.controller.characteristics().elapsed_time - 0.008).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_input_keeps_previous_value() {
        let mut h = Harness::new();
        let scenes = h.surface.scene_count();
        let err = h
            .controller
            .change_field(Field::Mass, "-2", &mut h.surface)
            .unwrap_err();
        assert!(matches!(err, InvalidParameterError::NonPositive { .. }));
        assert_eq!(h.controller.parameters().mass(), 1.0);
        assert_eq!(h.surface.scene_count(), scenes);

        assert!(
            h.controller
                .change_field(Field::Stiffness, "stiff", &mut h.surface)
                .is_err()
        );
        assert_eq!(h.controller.readouts().angular_frequency, "1");
    }

    #[test]
    fn test_change_by_id() {
        let mut h = Harness::new();
        let field = h
            .controller
            .change_field_by_id("k", "2", &mut h.surface)
            .unwrap();
        assert_eq!(field, Field::Stiffness);
        assert_eq!(h.controller.readouts().angular_frequency, "1.414");

        assert!(matches!(
            h.controller.change_field_by_id("q", "2", &mut h.surface),
            Err(InvalidParameterError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_stop_keeps_last_readouts() {
        let mut h = Harness::new();
        h.toggle();
        h.frame(0.0);
        h.frame(1500.0);
        let before = h.controller.readouts();
        h.toggle();
        assert_eq!(h.controller.readouts(), before);
        assert_eq!(h.controller.scheduler().start_timestamp(), None);
    }
}
