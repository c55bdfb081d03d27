//! Raw per-particle sample records.
//!
//! The simulation engine records one row per particle crossing each
//! instrumented plane. Only the fields the study selections cut on are
//! modelled here.

/// PDG particle id for a photon.
pub const PHOTON_PDG: i32 = 22;

/// One particle crossing one sampler plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRecord {
    /// PDG particle-type id.
    pub particle_id: i32,
    /// Transverse horizontal position, metres.
    pub x: f64,
    /// Longitudinal direction cosine; `zp >= 0` means forward-going.
    pub zp: f64,
    /// Particle energy, GeV.
    pub energy: f64,
}
