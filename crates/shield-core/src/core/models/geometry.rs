//! Transverse aperture geometry of the interaction region.
//!
//! All dimensions are metres. Apertures are half x-y sizes; the separation is
//! the distance between the electron and proton beam centroids on the
//! instrumented planes.

use serde::{Deserialize, Serialize};

/// Aperture half-sizes and beam-centroid separation for one lattice variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApertureGeometry {
    /// Half x-y size of the electron beam aperture.
    pub electron_aperture: f64,
    /// Half x-y size of the proton beam aperture.
    pub proton_aperture: f64,
    /// Horizontal separation of the two beam centroids.
    pub beam_separation: f64,
}

impl ApertureGeometry {
    /// Horizontal width of the shielding block such that the proton aperture
    /// lands in the correct place relative to the electron aperture.
    pub fn shield_width(&self) -> f64 {
        (self.beam_separation - self.electron_aperture) * 2.0
    }

    /// Horizontal offset of the shielding block centre from the beamline.
    pub fn shield_offset(&self) -> f64 {
        self.shield_width() / 2.0 + self.electron_aperture
    }
}

/// The instrumented planes immediately before and after the shielding
/// barrier, named as the lattice variant names its sampler elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanePair {
    pub before: String,
    pub after: String,
}

impl PlanePair {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}
