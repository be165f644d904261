//! Small float helpers shared by the calculators.

/// Round to `places` decimal places, mapping non-finite input to `0.0`.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Clamp into `[lo, hi]`, mapping non-finite input to `lo`.
pub(crate) fn clamp_finite(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        lo
    }
}

/// `numerator / denominator` with zero for an empty denominator.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn as_f64(n: u64) -> f64 {
    n as f64
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn len_f64(n: usize) -> f64 {
    n as f64
}

/// Round a non-negative float to the nearest integer count.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn round_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_handles_nan() {
        assert_eq!(round_to(f64::NAN, 2), 0.0);
        assert_eq!(round_to(1.234_56, 2), 1.23);
    }

    #[test]
    fn ratio_of_zero_denominator_is_zero() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
    }

    #[test]
    fn round_count_rejects_negative_and_nan() {
        assert_eq!(round_count(-3.0), 0);
        assert_eq!(round_count(f64::INFINITY), 0);
        assert_eq!(round_count(2.5), 3);
    }
}
