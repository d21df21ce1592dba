//! Widget configuration.
//!
//! [`Config`] is the single source of truth for the canvas geometry, the
//! logical frame rate, the parameters shown at load and the log level. Every
//! field has a default, so a config file only needs the settings it changes.
//!
//! # Examples
//!
//! ```rust
//! use oscillator::Config;
//!
//! let config = Config::from_json(r#"{ "fps": 30, "defaults": { "mass": 8, "stiffness": 2, "initial_displacement": 5 } }"#).unwrap();
//! assert_eq!(config.fps, 30);
//! assert_eq!(config.canvas_width, 240.0);
//! assert_eq!(config.defaults.angular_frequency(), 0.5);
//! ```

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::ConfigError;
use crate::render::SceneLayout;
use crate::state::Parameters;

/// Runtime configuration for the oscillator widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========================================================================
    // Animation
    // ========================================================================
    /// Logical frames per second (clamped to 1..=120 by the scheduler).
    pub fps: u32,

    // ========================================================================
    // Canvas
    // ========================================================================
    /// Canvas width in logical units.
    pub canvas_width: f64,

    /// Canvas height in logical units.
    pub canvas_height: f64,

    /// Width of the support bar.
    pub draw_width: f64,

    /// Distance from the top edge to the support bar.
    pub margin_top: f64,

    // ========================================================================
    // Parameters
    // ========================================================================
    /// Parameters used at load.
    pub defaults: Parameters,

    // ========================================================================
    // Diagnostics
    // ========================================================================
    /// Maximum log level: trace, debug, info, warn or error.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let layout = SceneLayout::default();
        Self {
            fps: 60,
            canvas_width: layout.width,
            canvas_height: layout.height,
            draw_width: layout.draw_width,
            margin_top: layout.margin_top,
            defaults: Parameters::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the JSON is malformed, the default
    /// parameters are invalid, or a setting is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that the type system does not.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("draw_width", self.draw_width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidLayout { field, value });
            }
        }
        if !self.margin_top.is_finite() || self.margin_top < 0.0 {
            return Err(ConfigError::InvalidLayout {
                field: "margin_top",
                value: self.margin_top,
            });
        }
        self.max_level()?;
        Ok(())
    }

    /// Parsed [`log_level`](Self::log_level).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLogLevel`] for an unknown level.
    pub fn max_level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// Scene placement described by this config.
    pub fn layout(&self) -> SceneLayout {
        SceneLayout::from_config(self)
    }
}
