//! Deviation measures between two y-sequences.
//!
//! Both functions are pure, symmetric in their arguments, and insist on
//! equal-length inputs; comparing sequences of different lengths is always a
//! caller bug, never something to paper over by truncation.

use crate::error::AppError;

/// Sum of squared deviations: Σ(aᵢ − bᵢ)².
pub fn sum_squared_deviation(
    a_name: &str,
    a: &[f64],
    b_name: &str,
    b: &[f64],
) -> Result<f64, AppError> {
    check_lengths(a_name, a, b_name, b)?;
    Ok(a.iter().zip(b).map(|(av, bv)| (av - bv) * (av - bv)).sum())
}

/// Maximum absolute deviation: max |aᵢ − bᵢ|.
///
/// Returns `0.0` for empty (equal-length) inputs.
pub fn max_absolute_deviation(
    a_name: &str,
    a: &[f64],
    b_name: &str,
    b: &[f64],
) -> Result<f64, AppError> {
    check_lengths(a_name, a, b_name, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(av, bv)| (av - bv).abs())
        .fold(0.0, f64::max))
}

fn check_lengths(a_name: &str, a: &[f64], b_name: &str, b: &[f64]) -> Result<(), AppError> {
    if a.len() != b.len() {
        return Err(AppError::LengthMismatch {
            left_name: a_name.to_string(),
            left_len: a.len(),
            right_name: b_name.to_string(),
            right_len: b.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_series_have_zero_deviation() {
        let a = [0.0, 0.5, 1.0, 2.0];
        assert_eq!(sum_squared_deviation("a", &a, "a", &a).unwrap(), 0.0);
        assert_eq!(max_absolute_deviation("a", &a, "a", &a).unwrap(), 0.0);
    }

    #[test]
    fn both_measures_are_symmetric() {
        let a = [-2.0, -1.5, -1.0, 0.0];
        let b = [-2.0, -1.0, -0.5, 0.0];
        assert_eq!(
            sum_squared_deviation("a", &a, "b", &b).unwrap(),
            sum_squared_deviation("b", &b, "a", &a).unwrap()
        );
        assert_eq!(
            max_absolute_deviation("a", &a, "b", &b).unwrap(),
            max_absolute_deviation("b", &b, "a", &a).unwrap()
        );
    }

    #[test]
    fn known_values() {
        let a = [-2.0, -1.5, -1.0, 0.0];
        let b = [-2.0, -1.0, -0.5, 0.0];
        assert_eq!(sum_squared_deviation("a", &a, "b", &b).unwrap(), 0.5);
        assert_eq!(max_absolute_deviation("a", &a, "b", &b).unwrap(), 0.5);

        let c = [0.0, 0.01, -0.01];
        let d = [0.0, 0.02, -0.02];
        let sum = sum_squared_deviation("c", &c, "d", &d).unwrap();
        assert!((sum - 2e-4).abs() < 1e-15);
        assert_eq!(max_absolute_deviation("c", &c, "d", &d).unwrap(), 0.01);
    }

    #[test]
    fn constant_unit_shift() {
        // y1 shifted by a constant 1 against y11.
        let y1 = [1.0, 2.0, 3.0, 4.0];
        let y11 = [2.0, 3.0, 4.0, 5.0];
        assert_eq!(sum_squared_deviation("y1", &y1, "y11", &y11).unwrap(), 4.0);
        assert_eq!(max_absolute_deviation("y1", &y1, "y11", &y11).unwrap(), 1.0);
    }

    #[test]
    fn mismatched_lengths_are_an_error() {
        let a = [1.0, 2.0];
        let b = [1.0];
        let err = sum_squared_deviation("a", &a, "b", &b).unwrap_err();
        assert!(matches!(err, AppError::LengthMismatch { .. }));
        let err = max_absolute_deviation("a", &a, "b", &b).unwrap_err();
        assert!(matches!(err, AppError::LengthMismatch { .. }));
    }
}
