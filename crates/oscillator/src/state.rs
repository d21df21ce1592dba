//! Oscillator parameters and the observed state of a run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidParameterError;
use crate::physics::{self, check_finite, check_positive, check_ratio};

/// One of the three user-editable parameters.
///
/// Input controls identify the parameter they edit with a short field id
/// (`"m"`, `"k"`, `"x0"`); the long names are accepted as well.
///
/// ```rust
/// use oscillator::Field;
///
/// assert_eq!("k".parse::<Field>().unwrap(), Field::Stiffness);
/// assert_eq!(Field::InitialDisplacement.id(), "x0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Mass of the bob.
    Mass,
    /// Spring stiffness.
    Stiffness,
    /// Displacement the mass is released from.
    InitialDisplacement,
}

impl Field {
    /// All fields, in display order.
    pub const ALL: [Field; 3] = [Field::Mass, Field::Stiffness, Field::InitialDisplacement];

    /// Short identifier used on input controls.
    pub fn id(self) -> &'static str {
        match self {
            Field::Mass => "m",
            Field::Stiffness => "k",
            Field::InitialDisplacement => "x0",
        }
    }

    /// Parses raw input text into a value valid for this field.
    ///
    /// Surrounding whitespace is ignored; an empty string is not a number.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameterError`] when the text is not a number, is
    /// not finite, or (for mass and stiffness) is not strictly positive.
    pub fn parse_value(self, raw: &str) -> Result<f64, InvalidParameterError> {
        let value: f64 =
            raw.trim()
                .parse()
                .map_err(|_| InvalidParameterError::NonNumeric {
                    field: self,
                    input: raw.to_string(),
                })?;
        self.validate(value)?;
        Ok(value)
    }

    /// Checks a numeric value against this field's constraints.
    ///
    /// # Errors
    ///
    /// See [`Field::parse_value`].
    pub fn validate(self, value: f64) -> Result<(), InvalidParameterError> {
        match self {
            Field::Mass | Field::Stiffness => check_positive(self, value),
            Field::InitialDisplacement => check_finite(self, value),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Mass => "mass",
            Field::Stiffness => "stiffness",
            Field::InitialDisplacement => "initial displacement",
        })
    }
}

impl FromStr for Field {
    type Err = InvalidParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m" | "mass" => Ok(Field::Mass),
            "k" | "stiffness" => Ok(Field::Stiffness),
            "x0" | "initial_displacement" => Ok(Field::InitialDisplacement),
            other => Err(InvalidParameterError::UnknownField {
                id: other.to_string(),
            }),
        }
    }
}

/// A validated oscillator configuration.
///
/// Mass and stiffness are always strictly positive and the initial
/// displacement is always finite; every constructor (including
/// deserialization) goes through validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters", into = "RawParameters")]
pub struct Parameters {
    mass: f64,
    stiffness: f64,
    initial_displacement: f64,
}

#[derive(Serialize, Deserialize)]
struct RawParameters {
    mass: f64,
    stiffness: f64,
    initial_displacement: f64,
}

impl TryFrom<RawParameters> for Parameters {
    type Error = InvalidParameterError;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        Parameters::new(raw.mass, raw.stiffness, raw.initial_displacement)
    }
}

impl From<Parameters> for RawParameters {
    fn from(params: Parameters) -> Self {
        Self {
            mass: params.mass,
            stiffness: params.stiffness,
            initial_displacement: params.initial_displacement,
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 1.0,
            initial_displacement: 10.0,
        }
    }
}

impl Parameters {
    /// Creates validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameterError`] for the first field that fails
    /// validation, or when `stiffness / mass` overflows.
    pub fn new(
        mass: f64,
        stiffness: f64,
        initial_displacement: f64,
    ) -> Result<Self, InvalidParameterError> {
        Field::Mass.validate(mass)?;
        Field::Stiffness.validate(stiffness)?;
        Field::InitialDisplacement.validate(initial_displacement)?;
        check_ratio(Field::Stiffness, stiffness, mass)?;
        Ok(Self {
            mass,
            stiffness,
            initial_displacement,
        })
    }

    /// Mass of the bob.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Spring stiffness.
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Displacement the mass is released from.
    pub fn initial_displacement(&self) -> f64 {
        self.initial_displacement
    }

    /// Value of a single field.
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Mass => self.mass,
            Field::Stiffness => self.stiffness,
            Field::InitialDisplacement => self.initial_displacement,
        }
    }

    /// Returns a copy with one field replaced, or an error leaving `self`
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameterError`] if `value` is not valid for `field`,
    /// or if it would make `stiffness / mass` overflow.
    pub fn with(&self, field: Field, value: f64) -> Result<Self, InvalidParameterError> {
        field.validate(value)?;
        let mut next = *self;
        match field {
            Field::Mass => next.mass = value,
            Field::Stiffness => next.stiffness = value,
            Field::InitialDisplacement => next.initial_displacement = value,
        }
        check_ratio(field, next.stiffness, next.mass)?;
        Ok(next)
    }

    /// `sqrt(stiffness / mass)`, rounded to three decimal places.
    pub fn angular_frequency(&self) -> f64 {
        physics::angular_frequency_unchecked(self.stiffness, self.mass)
    }
}

/// Derived and observed values of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Characteristics {
    /// `ω0` of the current parameters.
    pub angular_frequency: f64,
    /// Seconds since the run started (continuous, not frame-quantized).
    pub elapsed_time: f64,
    /// Displacement at the last drawn frame.
    pub displacement: f64,
    /// Completed oscillations detected so far.
    pub oscillation_count: u32,
}

/// Counts full cycles by watching the rounded displacement.
///
/// The counter arms once the rounded displacement goes negative and fires
/// when it next rounds back to the rounded initial displacement. Amplitudes
/// that are not whole numbers can make this miss or double-count a cycle;
/// the behavior is kept as-is because the displayed count is defined by it.
///
/// ```rust
/// use oscillator::OscillationCounter;
///
/// let mut counter = OscillationCounter::new();
/// let fired: Vec<bool> = [5.0, -1.0, -3.0, 2.0, 5.0]
///     .into_iter()
///     .map(|x| counter.observe(x, 5.0))
///     .collect();
/// assert_eq!(fired, [false, false, false, false, true]);
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OscillationCounter {
    armed: bool,
    count: u32,
}

impl OscillationCounter {
    /// Creates a disarmed counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one frame's displacement. Returns `true` if a cycle completed.
    pub fn observe(&mut self, displacement: f64, initial_displacement: f64) -> bool {
        let rounded = physics::round_half_up(displacement);
        let mut completed = false;

        if self.armed && rounded == physics::round_half_up(initial_displacement) {
            self.count = self.count.saturating_add(1);
            self.armed = false;
            completed = true;
        }

        if rounded < 0.0 {
            self.armed = true;
        }

        completed
    }

    /// Completed cycles.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether a negative excursion has been seen since the last count.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Back to zero, disarmed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Parameters plus everything derived from them during a run.
///
/// This replaces ambient shared variables: whoever drives the animation owns
/// a `Simulation` and passes it where it is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    params: Parameters,
    characteristics: Characteristics,
    counter: OscillationCounter,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

impl Simulation {
    /// Creates a simulation at rest with the given parameters.
    pub fn new(params: Parameters) -> Self {
        Self {
            params,
            characteristics: Characteristics {
                angular_frequency: params.angular_frequency(),
                ..Characteristics::default()
            },
            counter: OscillationCounter::new(),
        }
    }

    /// Current parameters.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Current characteristics.
    pub fn characteristics(&self) -> &Characteristics {
        &self.characteristics
    }

    /// The cycle counter, including its armed flag.
    pub fn counter(&self) -> &OscillationCounter {
        &self.counter
    }

    /// Clears time, displacement and count. Angular frequency is kept.
    pub fn reset(&mut self) {
        self.characteristics.elapsed_time = 0.0;
        self.characteristics.displacement = 0.0;
        self.characteristics.oscillation_count = 0;
        self.counter.reset();
    }

    /// Replaces one parameter, recomputes `ω0` and resets the run.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameterError`] and leaves the simulation unchanged
    /// if `value` is not valid for `field`.
    pub fn set_parameter(&mut self, field: Field, value: f64) -> Result<(), InvalidParameterError> {
        self.params = self.params.with(field, value)?;
        self.characteristics.angular_frequency = self.params.angular_frequency();
        self.reset();
        Ok(())
    }

    /// Records continuous elapsed time in seconds.
    pub fn set_elapsed(&mut self, seconds: f64) {
        self.characteristics.elapsed_time = seconds;
    }

    /// Computes the displacement at the recorded elapsed time and feeds the
    /// cycle counter. Returns the new displacement.
    pub fn advance(&mut self) -> f64 {
        let x = physics::displacement(
            self.params.initial_displacement,
            self.characteristics.angular_frequency,
            self.characteristics.elapsed_time,
        );
        self.characteristics.displacement = x;
        if self.counter.observe(x, self.params.initial_displacement) {
            self.characteristics.oscillation_count = self.counter.count();
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_ids_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.id().parse::<Field>().unwrap(), field);
        }
        assert_eq!("mass".parse::<Field>().unwrap(), Field::Mass);
        assert!(matches!(
            "w0".parse::<Field>(),
            Err(InvalidParameterError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(Field::Mass.parse_value(" 2.5 ").unwrap(), 2.5);
        assert_eq!(Field::InitialDisplacement.parse_value("-4").unwrap(), -4.0);
        assert!(matches!(
            Field::Mass.parse_value(""),
            Err(InvalidParameterError::NonNumeric { .. })
        ));
        assert!(matches!(
            Field::Stiffness.parse_value("abc"),
            Err(InvalidParameterError::NonNumeric { .. })
        ));
        assert!(matches!(
            Field::InitialDisplacement.parse_value("inf"),
            Err(InvalidParameterError::NonFinite { .. })
        ));
        assert!(Field::Mass.parse_value("0").is_err());
        assert_eq!(Field::InitialDisplacement.parse_value("0").unwrap(), 0.0);
    }

    #[test]
    fn test_parameters_with_keeps_original_on_error() {
        let params = Parameters::default();
        assert!(params.with(Field::Stiffness, -1.0).is_err());
        assert_eq!(params.stiffness(), 1.0);

        let heavier = params.with(Field::Mass, 4.0).unwrap();
        assert_eq!(heavier.mass(), 4.0);
        assert_eq!(heavier.angular_frequency(), 0.5);
    }

    #[test]
    fn test_parameters_reject_overflowing_ratio() {
        let light = Parameters::default().with(Field::Mass, 1e-200).unwrap();
        assert_eq!(
            light.with(Field::Stiffness, 1e200),
            Err(InvalidParameterError::NonFinite {
                field: Field::Stiffness
            })
        );

        let stiff = Parameters::default().with(Field::Stiffness, 1e200).unwrap();
        assert_eq!(
            stiff.with(Field::Mass, 1e-200),
            Err(InvalidParameterError::NonFinite { field: Field::Mass })
        );

        assert!(Parameters::new(1e-200, 1e200, 10.0).is_err());
    }

    #[test]
    fn test_parameters_deserialize_validates() {
        let ok: Parameters =
            serde_json::from_str(r#"{"mass": 2, "stiffness": 8, "initial_displacement": 3}"#)
                .unwrap();
        assert_eq!(ok.angular_frequency(), 2.0);

        let bad = serde_json::from_str::<Parameters>(
            r#"{"mass": 0, "stiffness": 8, "initial_displacement": 3}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_counter_arms_only_below_zero() {
        let mut counter = OscillationCounter::new();
        assert!(!counter.observe(-0.4, 5.0)); // rounds to 0
        assert!(!counter.is_armed());
        assert!(!counter.observe(-0.6, 5.0));
        assert!(counter.is_armed());
    }

    #[test]
    fn test_counter_compares_rounded_initial() {
        let mut counter = OscillationCounter::new();
        counter.observe(-3.0, 4.6);
        assert!(counter.observe(4.7, 4.6));
        assert_eq!(counter.count(), 1);
        assert!(!counter.is_armed());
    }

    #[test]
    fn test_counter_reset() {
        let mut counter = OscillationCounter::new();
        counter.observe(-3.0, 2.0);
        counter.observe(2.0, 2.0);
        counter.observe(-3.0, 2.0);
        counter.reset();
        assert_eq!(counter, OscillationCounter::new());
    }

    #[test]
    fn test_simulation_advance_and_reset() {
        let mut sim = Simulation::default();
        sim.set_elapsed(std::f64::consts::PI);
        let x = sim.advance();
        assert!((x + 10.0).abs() < 1e-9);
        assert!(sim.counter().is_armed());

        sim.reset();
        assert_eq!(sim.characteristics().elapsed_time, 0.0);
        assert_eq!(sim.characteristics().displacement, 0.0);
        assert!(!sim.counter().is_armed());
        assert_eq!(sim.characteristics().angular_frequency, 1.0);
    }

    #[test]
    fn test_set_parameter_rejects_and_keeps_state() {
        let mut sim = Simulation::default();
        sim.set_elapsed(1.0);
        let before = sim.clone();
        assert!(sim.set_parameter(Field::Mass, -1.0).is_err());
        assert_eq!(sim, before);

        sim.set_parameter(Field::Stiffness, 9.0).unwrap();
        assert_eq!(sim.characteristics().angular_frequency, 3.0);
        assert_eq!(sim.characteristics().elapsed_time, 0.0);
    }
}
