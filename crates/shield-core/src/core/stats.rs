//! Elementary statistics over repeated stochastic trials.
//!
//! The standard error deliberately uses the population (biased) standard
//! deviation divided by `sqrt(n)`, matching the convention of the published
//! study data; downstream comparisons depend on this exact formula.

/// Arithmetic mean. Returns `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor `n`, not `n - 1`).
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Standard error of the mean: population standard deviation over `sqrt(n)`.
pub fn standard_error(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    population_std_dev(values) / (values.len() as f64).sqrt()
}

/// Minimum and maximum of a non-empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    let mut lo = first;
    let mut hi = first;
    for &v in &values[1..] {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    Some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn mean_of_reference_fractions_is_exact() {
        assert!(f64_approx_equal(mean(&[0.95, 0.97, 0.96]), 0.96));
    }

    #[test]
    fn population_std_dev_uses_biased_divisor() {
        // sqrt(((0.01)^2 + (0.01)^2 + 0) / 3), not / 2.
        assert!(f64_approx_equal(
            population_std_dev(&[0.95, 0.97, 0.96]),
            0.008165
        ));
    }

    #[test]
    fn standard_error_divides_by_sqrt_n() {
        assert!(f64_approx_equal(
            standard_error(&[0.95, 0.97, 0.96]),
            0.004714
        ));
    }

    #[test]
    fn standard_error_of_single_value_is_zero() {
        assert!(standard_error(&[0.42]) == 0.0);
    }

    #[test]
    fn min_max_finds_both_extremes() {
        assert_eq!(min_max(&[0.96, 0.95, 0.97]), Some((0.95, 0.97)));
        assert_eq!(min_max(&[]), None);
    }

    #[test]
    fn empty_slices_reduce_to_zero() {
        assert!(mean(&[]) == 0.0);
        assert!(population_std_dev(&[]) == 0.0);
    }
}
