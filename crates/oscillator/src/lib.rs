#![forbid(unsafe_code)]
// Allow these clippy lints for physics/math code readability
#![allow(clippy::must_use_candidate)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::module_name_repetitions)]

//! # Oscillator
//!
//! An undamped mass-on-a-spring, animated at a fixed logical frame rate.
//!
//! Oscillator provides:
//! - **Physics**: angular frequency and the closed-form displacement `x0·cos(ω·t)`
//! - **FrameScheduler**: throttles a variable-rate host frame pump to a logical fps
//! - **Renderer**: draws the wall mount, spring coil and mass onto any [`Surface`]
//! - **Controller**: the Play/Stop state machine and parameter bindings of the widget
//!
//! Nothing here talks to a browser. Hosts implement [`Surface`] and
//! [`FrameHost`]; the `oscillator-wasm` crate does so for a canvas.
//!
//! ## Physics Example
//!
//! ```rust
//! use oscillator::{angular_frequency, displacement};
//!
//! let w0 = angular_frequency(4.0, 1.0).unwrap();
//! assert_eq!(w0, 2.0);
//!
//! // Half a period later the mass sits at the opposite extremum
//! let x = displacement(10.0, w0, std::f64::consts::PI / w0);
//! assert!((x + 10.0).abs() < 1e-9);
//! ```
//!
//! ## Controller Example
//!
//! ```rust
//! use oscillator::{Config, Controller, ManualFrameHost, Mode, RecordingSurface};
//!
//! let mut controller = Controller::new(&Config::default());
//! let mut surface = RecordingSurface::new();
//! let mut host = ManualFrameHost::new();
//!
//! controller.load(&mut surface);
//! assert_eq!(controller.toggle(&mut host).unwrap(), Mode::Running);
//!
//! // The host fires the pending frame request with its own timestamp
//! host.fire();
//! assert!(controller.on_animation_frame(1000.0, &mut host, &mut surface).unwrap());
//! assert_eq!(controller.readouts().displacement, "10");
//! ```

mod config;
mod controller;
mod error;
mod physics;
mod render;
mod scheduler;
mod state;

pub use config::Config;
pub use controller::{Controller, Mode, Readouts, format_number};
pub use error::{ConfigError, InvalidParameterError};
pub use physics::{angular_frequency, displacement, period, round_half_up, round_to};
pub use render::{
    CoilShape, DEFAULT_LINE_WIDTH, DrawCommand, Point, Rect, RecordingSurface, SceneLayout,
    Surface, draw_scene, mass_radius,
};
pub use scheduler::{Frame, FrameHost, FrameRequest, FrameScheduler, ManualFrameHost, fps};
pub use state::{Characteristics, Field, OscillationCounter, Parameters, Simulation};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::controller::{Controller, Mode, Readouts};
    pub use crate::error::{ConfigError, InvalidParameterError};
    pub use crate::physics::{angular_frequency, displacement};
    pub use crate::render::{Point, Surface, draw_scene};
    pub use crate::scheduler::{Frame, FrameHost, FrameRequest, FrameScheduler};
    pub use crate::state::{Field, Parameters, Simulation};
}
