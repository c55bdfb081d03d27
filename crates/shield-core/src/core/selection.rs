//! Declarative photon-count selections.
//!
//! A study needs the same small family of windowed counts on the planes
//! before and after the shielding barrier: photons between the two
//! apertures, photons beyond the proton aperture, photons inside each
//! aperture, the total photon count, and the forward-angle count. These are
//! configuration, not code; each selection is a [`CountSpec`] built from the
//! aperture geometry, and the full set renders to the analysis-spec file the
//! histogram reducer consumes.

use crate::core::io::counts::{CountsError, NamedCounts};
use crate::core::models::geometry::{ApertureGeometry, PlanePair};
use crate::core::models::record::{PHOTON_PDG, ParticleRecord};
use std::io::{self, Write};

/// An optionally half-open interval over transverse x.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Window {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Window {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// The unbounded window.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn contains(&self, x: f64) -> bool {
        self.min.is_none_or(|lo| x >= lo) && self.max.is_none_or(|hi| x <= hi)
    }
}

/// Which role a count plays in the study reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    /// Before-barrier plane, between the two apertures.
    BeforeBetween,
    /// Before-barrier plane, beyond the proton aperture.
    BeforeBeyond,
    /// After-barrier plane, between the two apertures.
    AfterBetween,
    /// After-barrier plane, beyond the proton aperture.
    AfterBeyond,
    /// Inside the electron aperture window.
    ElectronAperture,
    /// Inside the proton aperture window.
    ProtonAperture,
    /// All photons on the before-barrier plane, no cuts.
    Total,
    /// Forward-going photons on the before-barrier plane.
    Forward,
}

/// One named, windowed particle count on one sampler plane.
#[derive(Debug, Clone, PartialEq)]
pub struct CountSpec {
    pub kind: CountKind,
    pub name: String,
    pub plane: String,
    pub particle_id: i32,
    /// Gate on `zp >= 0`.
    pub forward_only: bool,
    pub x_window: Window,
}

impl CountSpec {
    /// Whether a raw sample record satisfies this selection.
    pub fn matches(&self, record: &ParticleRecord) -> bool {
        record.particle_id == self.particle_id
            && (!self.forward_only || record.zp >= 0.0)
            && self.x_window.contains(record.x)
    }

    /// Render the reducer's histogram declaration for this selection.
    pub fn analysis_line(&self) -> String {
        let mut cuts = format!("{}.partID=={}", self.plane, self.particle_id);
        if self.forward_only {
            cuts.push_str(&format!("&{}.zp>=0", self.plane));
        }
        if let Some(lo) = self.x_window.min {
            cuts.push_str(&format!("&{}.x>={}", self.plane, lo));
        }
        if let Some(hi) = self.x_window.max {
            cuts.push_str(&format!("&{}.x<={}", self.plane, hi));
        }
        format!(
            "SimpleHistogram1D Event. {} {{100}} {{0:0.8}} {}.x {}",
            self.name, self.plane, cuts
        )
    }
}

/// The extracted scalar counts of one trial, keyed by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudyCounts {
    pub before_between: u64,
    pub before_beyond: u64,
    pub after_between: u64,
    pub after_beyond: u64,
    pub electron_aperture: u64,
    pub proton_aperture: u64,
    pub total: u64,
    pub forward: u64,
}

/// The full set of selections declared once per scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSet {
    counts: Vec<CountSpec>,
}

impl SelectionSet {
    /// Declare the study selections for one aperture geometry and plane pair.
    pub fn for_study(geometry: &ApertureGeometry, planes: &PlanePair) -> Self {
        let e = geometry.electron_aperture;
        let p = geometry.proton_aperture;
        let sep = geometry.beam_separation;

        let between = Window::between(e, sep - p);
        let beyond = Window::at_least(sep + p);

        let barrier = |kind, plane: &str, suffix: &str, window| CountSpec {
            kind,
            name: format!("NPhotons_{plane}_{suffix}"),
            plane: plane.to_string(),
            particle_id: PHOTON_PDG,
            forward_only: true,
            x_window: window,
        };

        let counts = vec![
            barrier(CountKind::BeforeBetween, &planes.before, "between", between),
            barrier(CountKind::BeforeBeyond, &planes.before, "beyond", beyond),
            barrier(CountKind::AfterBetween, &planes.after, "between", between),
            barrier(CountKind::AfterBeyond, &planes.after, "beyond", beyond),
            CountSpec {
                kind: CountKind::ElectronAperture,
                name: "NPhotons_eAper".to_string(),
                plane: planes.before.clone(),
                particle_id: PHOTON_PDG,
                forward_only: true,
                x_window: Window::between(-e, e),
            },
            CountSpec {
                kind: CountKind::ProtonAperture,
                name: "NPhotons_pAper".to_string(),
                plane: planes.before.clone(),
                particle_id: PHOTON_PDG,
                forward_only: true,
                x_window: Window::between(sep - p, sep + p),
            },
            CountSpec {
                kind: CountKind::Total,
                name: format!("NPhotons_{}_total", planes.before),
                plane: planes.before.clone(),
                particle_id: PHOTON_PDG,
                forward_only: false,
                x_window: Window::open(),
            },
            CountSpec {
                kind: CountKind::Forward,
                name: format!("NPhotons_{}_zp", planes.before),
                plane: planes.before.clone(),
                particle_id: PHOTON_PDG,
                forward_only: true,
                x_window: Window::open(),
            },
        ];

        Self { counts }
    }

    pub fn counts(&self) -> &[CountSpec] {
        &self.counts
    }

    fn spec(&self, kind: CountKind) -> &CountSpec {
        // for_study declares every kind exactly once.
        self.counts
            .iter()
            .find(|c| c.kind == kind)
            .unwrap_or(&self.counts[0])
    }

    /// Write the analysis-spec file consumed by the histogram reducer, one
    /// histogram declaration per line.
    pub fn write_analysis_spec(&self, writer: &mut impl Write) -> io::Result<()> {
        for count in &self.counts {
            writeln!(writer, "{}", count.analysis_line())?;
        }
        Ok(())
    }

    /// Pull this set's counts out of a reduced artifact, reporting any
    /// missing histogram by name.
    pub fn extract(&self, counts: &NamedCounts) -> Result<StudyCounts, CountsError> {
        let get = |kind| counts.get(&self.spec(kind).name);
        Ok(StudyCounts {
            before_between: get(CountKind::BeforeBetween)?,
            before_beyond: get(CountKind::BeforeBeyond)?,
            after_between: get(CountKind::AfterBetween)?,
            after_beyond: get(CountKind::AfterBeyond)?,
            electron_aperture: get(CountKind::ElectronAperture)?,
            proton_aperture: get(CountKind::ProtonAperture)?,
            total: get(CountKind::Total)?,
            forward: get(CountKind::Forward)?,
        })
    }

    /// Evaluate every selection over in-memory sample records, producing the
    /// same named counts the external reducer would.
    pub fn tally<'a>(
        &self,
        records: impl IntoIterator<Item = (&'a str, ParticleRecord)>,
    ) -> NamedCounts {
        let mut tallied = NamedCounts::new();
        for count in &self.counts {
            tallied.insert(count.name.clone(), 0);
        }
        for (plane, record) in records {
            for count in &self.counts {
                if count.plane == plane && count.matches(&record) {
                    let current = tallied.get(&count.name).unwrap_or(0);
                    tallied.insert(count.name.clone(), current + 1);
                }
            }
        }
        tallied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dipole_geometry() -> ApertureGeometry {
        ApertureGeometry {
            electron_aperture: 0.005,
            proton_aperture: 0.02,
            beam_separation: 0.121896,
        }
    }

    fn planes() -> PlanePair {
        PlanePair::new("DRIFT_1", "COL_0")
    }

    fn photon(x: f64, zp: f64) -> ParticleRecord {
        ParticleRecord {
            particle_id: PHOTON_PDG,
            x,
            zp,
            energy: 0.001,
        }
    }

    #[test]
    fn study_set_declares_eight_counts_with_expected_windows() {
        let set = SelectionSet::for_study(&dipole_geometry(), &planes());
        assert_eq!(set.counts().len(), 8);

        let between = set.spec(CountKind::BeforeBetween);
        assert_eq!(between.plane, "DRIFT_1");
        assert_eq!(between.x_window, Window::between(0.005, 0.121896 - 0.02));

        let beyond = set.spec(CountKind::AfterBeyond);
        assert_eq!(beyond.plane, "COL_0");
        assert_eq!(beyond.x_window, Window::at_least(0.121896 + 0.02));

        // Bounded on both sides, so the count is the aperture band itself
        // rather than everything past its lower edge.
        let p_aper = set.spec(CountKind::ProtonAperture);
        assert_eq!(
            p_aper.x_window,
            Window::between(0.121896 - 0.02, 0.121896 + 0.02)
        );
        let line = p_aper.analysis_line();
        assert!(line.contains("DRIFT_1.x>=0.101896"));
        assert!(line.contains("DRIFT_1.x<=0.141896"));
    }

    #[test]
    fn barrier_selections_reject_backward_and_aperture_photons() {
        let set = SelectionSet::for_study(&dipole_geometry(), &planes());
        let between = set.spec(CountKind::BeforeBetween);

        assert!(between.matches(&photon(0.05, 0.9)));
        // Backward-going.
        assert!(!between.matches(&photon(0.05, -0.1)));
        // Inside the electron aperture.
        assert!(!between.matches(&photon(0.001, 0.9)));
        // Not a photon.
        assert!(!between.matches(&ParticleRecord {
            particle_id: 11,
            x: 0.05,
            zp: 0.9,
            energy: 50.0
        }));
    }

    #[test]
    fn total_count_takes_every_photon_regardless_of_angle() {
        let set = SelectionSet::for_study(&dipole_geometry(), &planes());
        let total = set.spec(CountKind::Total);
        assert!(total.matches(&photon(-0.3, -1.0)));
        assert!(total.matches(&photon(0.5, 1.0)));
    }

    #[test]
    fn analysis_line_renders_plane_and_cuts() {
        let set = SelectionSet::for_study(&dipole_geometry(), &planes());
        let line = set.spec(CountKind::BeforeBetween).analysis_line();
        assert!(line.starts_with("SimpleHistogram1D Event. NPhotons_DRIFT_1_between"));
        assert!(line.contains("DRIFT_1.partID==22"));
        assert!(line.contains("DRIFT_1.zp>=0"));
        assert!(line.contains("DRIFT_1.x>=0.005"));

        let total_line = set.spec(CountKind::Total).analysis_line();
        assert!(!total_line.contains("zp"));
        assert!(!total_line.contains(".x>="));
    }

    #[test]
    fn tally_matches_extract_roundtrip() {
        let set = SelectionSet::for_study(&dipole_geometry(), &planes());
        let records = [
            ("DRIFT_1", photon(0.05, 0.9)),  // between, forward, total
            ("DRIFT_1", photon(0.05, -0.1)), // total only
            ("DRIFT_1", photon(0.0, 0.9)),   // electron aperture, forward, total
            ("DRIFT_1", photon(0.15, 0.9)),  // beyond, forward, total
            ("COL_0", photon(0.05, 0.9)),    // after between
        ];
        let counts = set.tally(records);
        let study = set.extract(&counts).unwrap();

        assert_eq!(study.before_between, 1);
        assert_eq!(study.before_beyond, 1);
        assert_eq!(study.after_between, 1);
        assert_eq!(study.after_beyond, 0);
        assert_eq!(study.electron_aperture, 1);
        assert_eq!(study.total, 4);
        assert_eq!(study.forward, 3);
    }

    #[test]
    fn extract_reports_the_missing_histogram() {
        let set = SelectionSet::for_study(&dipole_geometry(), &planes());
        let empty = NamedCounts::new();
        let err = set.extract(&empty).unwrap_err();
        assert!(matches!(err, CountsError::MissingHistogram { .. }));
    }
}
