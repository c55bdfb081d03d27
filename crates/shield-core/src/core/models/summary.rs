//! Study summaries derived from a completed trial sequence.

use super::trial::TrialResult;
use crate::core::stats;

/// A mean together with its standard error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanErr {
    pub mean: f64,
    pub err: f64,
}

impl MeanErr {
    fn of(values: &[f64]) -> Self {
        Self {
            mean: stats::mean(values),
            err: stats::standard_error(values),
        }
    }
}

/// The reduced statistics of one shielding study.
///
/// Derived entirely from the trial sequence and recomputable at any time; it
/// is never persisted independently of its source trials. All reductions are
/// order-independent aggregates, so the summary is invariant under
/// permutation of the trials.
#[derive(Debug, Clone, PartialEq)]
pub struct StudySummary {
    pub fraction_absorbed: MeanErr,
    /// `(min, max)` of the per-trial absorbed fractions.
    pub fraction_range: (f64, f64),
    pub total_photons: MeanErr,
    pub electron_aperture_photons: MeanErr,
    pub proton_aperture_photons: MeanErr,
    pub zp_positive_photons: MeanErr,
}

impl StudySummary {
    /// Reduce a completed, non-empty trial sequence. Returns `None` when
    /// there are no trials to summarize.
    pub fn from_trials(trials: &[TrialResult]) -> Option<Self> {
        if trials.is_empty() {
            return None;
        }

        let fractions: Vec<f64> = trials.iter().map(|t| t.fraction_absorbed).collect();
        let totals: Vec<f64> = trials.iter().map(|t| t.total_photons as f64).collect();
        let e_aper: Vec<f64> = trials
            .iter()
            .map(|t| t.electron_aperture_photons as f64)
            .collect();
        let p_aper: Vec<f64> = trials
            .iter()
            .map(|t| t.proton_aperture_photons as f64)
            .collect();
        let zp: Vec<f64> = trials.iter().map(|t| t.zp_positive_photons as f64).collect();

        Some(Self {
            fraction_absorbed: MeanErr::of(&fractions),
            fraction_range: stats::min_max(&fractions)?,
            total_photons: MeanErr::of(&totals),
            electron_aperture_photons: MeanErr::of(&e_aper),
            proton_aperture_photons: MeanErr::of(&p_aper),
            zp_positive_photons: MeanErr::of(&zp),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn trial(fraction: f64, total: u64) -> TrialResult {
        TrialResult {
            total_photons: total,
            electron_aperture_photons: total / 10,
            proton_aperture_photons: total / 20,
            zp_positive_photons: total / 2,
            fraction_absorbed: fraction,
        }
    }

    #[test]
    fn reference_fractions_reduce_to_known_summary() {
        let trials = [trial(0.95, 1000), trial(0.97, 1010), trial(0.96, 990)];
        let summary = StudySummary::from_trials(&trials).unwrap();

        assert!(f64_approx_equal(summary.fraction_absorbed.mean, 0.96));
        assert!(f64_approx_equal(summary.fraction_absorbed.err, 0.004714));
        assert_eq!(summary.fraction_range, (0.95, 0.97));
        assert!(f64_approx_equal(summary.total_photons.mean, 1000.0));
    }

    #[test]
    fn mean_fraction_lies_within_range() {
        let trials = [trial(0.91, 800), trial(0.99, 820), trial(0.95, 810)];
        let summary = StudySummary::from_trials(&trials).unwrap();
        let (lo, hi) = summary.fraction_range;
        assert!(summary.fraction_absorbed.mean >= lo);
        assert!(summary.fraction_absorbed.mean <= hi);
    }

    #[test]
    fn single_trial_has_zero_standard_error() {
        let summary = StudySummary::from_trials(&[trial(0.5, 100)]).unwrap();
        assert!(summary.fraction_absorbed.err == 0.0);
        assert!(summary.total_photons.err == 0.0);
        assert_eq!(summary.fraction_range, (0.5, 0.5));
    }

    #[test]
    fn summary_is_invariant_under_trial_permutation() {
        let a = [trial(0.95, 1000), trial(0.97, 1010), trial(0.96, 990)];
        let b = [a[2], a[0], a[1]];
        assert_eq!(
            StudySummary::from_trials(&a).unwrap(),
            StudySummary::from_trials(&b).unwrap()
        );
    }

    #[test]
    fn empty_trial_sequence_yields_no_summary() {
        assert!(StudySummary::from_trials(&[]).is_none());
    }
}
