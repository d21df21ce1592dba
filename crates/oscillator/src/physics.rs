//! Closed-form undamped harmonic oscillator.
//!
//! A mass `m` on a spring of stiffness `k`, released from rest at `x0`,
//! follows `x(t) = x0 · cos(ω·t)` with `ω = sqrt(k / m)`. No integration
//! step is involved, so the position at any time is exact and independent
//! of how often it is sampled.

use std::f64::consts::TAU;

use crate::error::InvalidParameterError;
use crate::state::Field;

/// Decimal places kept for the angular frequency.
pub(crate) const FREQUENCY_PLACES: u32 = 3;

/// Rounds to the nearest integer, with ties going toward positive infinity.
///
/// This is the rounding browsers apply in `Math.round`, which differs from
/// [`f64::round`] on negative ties: `-2.5` becomes `-2.0` here.
///
/// # Example
///
/// ```rust
/// use oscillator::round_half_up;
///
/// assert_eq!(round_half_up(2.5), 3.0);
/// assert_eq!(round_half_up(-2.5), -2.0);
/// assert_eq!(round_half_up(-0.4), 0.0);
/// ```
#[inline]
pub fn round_half_up(value: f64) -> f64 {
    // `+ 0.0` folds a negative-zero result into positive zero
    (value + 0.5).floor() + 0.0
}

/// Rounds `value` to `places` decimal places using [`round_half_up`].
///
/// ```rust
/// use oscillator::round_to;
///
/// assert_eq!(round_to(1.41421, 3), 1.414);
/// assert_eq!(round_to(-9.999, 2), -10.0);
/// assert_eq!(round_to(1e307, 2), 1e307);
/// ```
#[inline]
pub fn round_to(value: f64, places: u32) -> f64 {
    #[allow(clippy::cast_possible_wrap)]
    let scale = 10_f64.powi(places.min(15) as i32);
    let scaled = value * scale;
    // beyond ~1.8e306 the scaled value overflows; such magnitudes carry no
    // fractional digits anyway
    if !scaled.is_finite() {
        return value;
    }
    round_half_up(scaled) / scale
}

/// Computes the angular frequency `sqrt(stiffness / mass)`, rounded to
/// three decimal places.
///
/// # Errors
///
/// Returns [`InvalidParameterError`] when either argument is not finite or
/// not strictly positive, or when `stiffness / mass` overflows.
///
/// # Example
///
/// ```rust
/// use oscillator::angular_frequency;
///
/// assert_eq!(angular_frequency(2.0, 1.0).unwrap(), 1.414);
/// assert!(angular_frequency(1.0, 0.0).is_err());
/// assert!(angular_frequency(1e200, 1e-200).is_err());
/// ```
pub fn angular_frequency(stiffness: f64, mass: f64) -> Result<f64, InvalidParameterError> {
    check_positive(Field::Stiffness, stiffness)?;
    check_positive(Field::Mass, mass)?;
    check_ratio(Field::Stiffness, stiffness, mass)?;
    Ok(angular_frequency_unchecked(stiffness, mass))
}

/// Angular frequency for values already known to be valid.
#[inline]
pub(crate) fn angular_frequency_unchecked(stiffness: f64, mass: f64) -> f64 {
    round_to((stiffness / mass).sqrt(), FREQUENCY_PLACES)
}

/// Position of the mass `elapsed` seconds after release from `initial_displacement`.
///
/// At `elapsed == 0.0` this returns `initial_displacement` exactly.
#[inline]
pub fn displacement(initial_displacement: f64, angular_frequency: f64, elapsed: f64) -> f64 {
    initial_displacement * (angular_frequency * elapsed).cos()
}

/// Duration of one full oscillation, `2π / ω`. `None` when `ω` is zero.
pub fn period(angular_frequency: f64) -> Option<f64> {
    (angular_frequency > 0.0).then(|| TAU / angular_frequency)
}

pub(crate) fn check_positive(field: Field, value: f64) -> Result<(), InvalidParameterError> {
    check_finite(field, value)?;
    if value <= 0.0 {
        return Err(InvalidParameterError::NonPositive { field, value });
    }
    Ok(())
}

/// Rejects a `stiffness / mass` pair whose ratio overflows, reporting it
/// against `field`.
pub(crate) fn check_ratio(
    field: Field,
    stiffness: f64,
    mass: f64,
) -> Result<(), InvalidParameterError> {
    if (stiffness / mass).is_finite() {
        Ok(())
    } else {
        Err(InvalidParameterError::NonFinite { field })
    }
}

pub(crate) fn check_finite(field: Field, value: f64) -> Result<(), InvalidParameterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidParameterError::NonFinite { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-10;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn test_unit_oscillator() {
        assert!(approx_eq(angular_frequency(1.0, 1.0).unwrap(), 1.0));
    }

    #[test]
    fn test_frequency_is_rounded() {
        assert_eq!(angular_frequency(1.0, 3.0).unwrap(), 0.577);
        assert_eq!(angular_frequency(10.0, 1.0).unwrap(), 3.162);
    }

    #[test]
    fn test_rejects_non_positive_mass() {
        let err = angular_frequency(1.0, 0.0).unwrap_err();
        assert_eq!(
            err,
            InvalidParameterError::NonPositive {
                field: Field::Mass,
                value: 0.0
            }
        );
        assert!(angular_frequency(1.0, -2.0).is_err());
    }

    #[test]
    fn test_rejects_non_positive_stiffness() {
        assert!(matches!(
            angular_frequency(-1.0, 1.0),
            Err(InvalidParameterError::NonPositive {
                field: Field::Stiffness,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_nan() {
        assert_eq!(
            angular_frequency(f64::NAN, 1.0),
            Err(InvalidParameterError::NonFinite {
                field: Field::Stiffness
            })
        );
        assert!(angular_frequency(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_overflowing_ratio() {
        assert_eq!(
            angular_frequency(1e200, 1e-200),
            Err(InvalidParameterError::NonFinite {
                field: Field::Stiffness
            })
        );
        assert_eq!(angular_frequency(f64::MAX, 1.0).unwrap(), round_to(f64::MAX.sqrt(), 3));
    }

    #[test]
    fn test_round_to_keeps_huge_values() {
        assert_eq!(round_to(1e307, 2), 1e307);
        assert_eq!(round_to(-f64::MAX, 3), -f64::MAX);
    }

    #[test]
    fn test_displacement_at_zero_is_exact() {
        for x0 in [0.0, 1.0, -7.25, 10.0, 1e9] {
            assert_eq!(displacement(x0, 3.7, 0.0), x0);
        }
    }

    #[test]
    fn test_half_period() {
        let x = displacement(10.0, 1.0, PI);
        assert!(approx_eq(x, -10.0));
        assert_eq!(round_to(x, 2), -10.0);
    }

    #[test]
    fn test_round_half_up_ties() {
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert!(round_half_up(-0.2).is_sign_positive());
    }

    #[test]
    fn test_round_to_places() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(2.675, 0), 3.0);
        assert_eq!(round_to(-0.001, 2), 0.0);
    }

    #[test]
    fn test_period() {
        assert!(approx_eq(period(1.0).unwrap(), 2.0 * PI));
        assert_eq!(period(0.0), None);
    }
}
