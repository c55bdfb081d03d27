//! Per-trial results.

/// The outcome of one complete stochastic simulation trial.
///
/// Appended to the study's trial sequence in strict run order and never
/// mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialResult {
    /// All photons recorded on the before-barrier plane.
    pub total_photons: u64,
    /// Forward-going photons inside the electron aperture window.
    pub electron_aperture_photons: u64,
    /// Forward-going photons inside the proton aperture window.
    pub proton_aperture_photons: u64,
    /// Photons surviving the forward-angle cut alone.
    pub zp_positive_photons: u64,
    /// `1 - after/before` over the barrier windows, in `[0, 1]` for any
    /// physical barrier.
    pub fraction_absorbed: f64,
}
