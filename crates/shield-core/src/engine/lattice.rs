//! Interaction-region lattice strategies.
//!
//! Each variant of the interaction region knows its default aperture
//! geometry, which sampler planes sit immediately before and after the
//! shielding barrier, and how to serialize its beamline for the simulation
//! engine. The study runner is parameterized by this trait, so the same
//! orchestration serves every variant.
//!
//! Both variants write a main `input-<runKey>.gmad` file plus a companion
//! `extra-<runKey>.gmad` defining the externally placed collimator blocks
//! that catch the rest of the synchrotron fan.

use crate::core::gmad::{Beam, Machine, Options};
use crate::core::models::geometry::{ApertureGeometry, PlanePair};
use crate::engine::config::ScenarioConfig;
use crate::engine::error::EngineError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The serialized lattice artifact consumed by the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeDescription {
    pub main_file: PathBuf,
    pub companion_files: Vec<PathBuf>,
}

/// A swappable geometry-construction strategy.
pub trait LatticeBuilder: Sync {
    /// Short identifier for logs and file naming.
    fn key(&self) -> &'static str;

    /// The variant's nominal aperture geometry, used when the scenario does
    /// not override it.
    fn default_geometry(&self) -> ApertureGeometry;

    /// The sampler planes immediately before and after the barrier.
    fn planes(&self) -> PlanePair;

    /// Serialize the lattice for one scenario into `dir`.
    fn build(&self, scenario: &ScenarioConfig, dir: &Path)
    -> Result<LatticeDescription, EngineError>;
}

fn write_machine(machine: &Machine, path: &Path) -> Result<(), EngineError> {
    let mut writer = BufWriter::new(File::create(path)?);
    machine.write_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the companion file defining the externally placed catch-all blocks.
fn write_extra_blocks(
    path: &Path,
    names: &[String],
    width: f64,
    thickness: f64,
    material: &str,
) -> Result<(), EngineError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for name in names {
        writeln!(
            writer,
            "{name}: rcol, horizontalWidth={width}, l={thickness}, material=\"{material}\", \
             xsize=0.0, ysize=0.0;"
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// The simple interaction region: one long dipole bending the electron beam
/// onto the barrier, with a single catch-all block beyond it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DipoleIr;

impl LatticeBuilder for DipoleIr {
    fn key(&self) -> &'static str {
        "dipole"
    }

    fn default_geometry(&self) -> ApertureGeometry {
        ApertureGeometry {
            electron_aperture: 0.005,
            proton_aperture: 0.02,
            beam_separation: 0.121896,
        }
    }

    fn planes(&self) -> PlanePair {
        PlanePair::new("DRIFT_1", "COL_0")
    }

    fn build(
        &self,
        scenario: &ScenarioConfig,
        dir: &Path,
    ) -> Result<LatticeDescription, EngineError> {
        let geometry = &scenario.geometry;
        let width = geometry.shield_width();
        let e = geometry.electron_aperture;
        let p = geometry.proton_aperture;

        let mut machine = Machine::new();
        machine
            .add_include("material_Concretes.gmad")
            .add_include(format!("extra-{}.gmad", scenario.run_key))
            .add_drift("DRIFT_0", 5.0)
            .add_dipole("BEND_0", 20.0, 0.0244)
            // The barrier sits at the end of the drift, so the drift shortens
            // with the barrier thickness to keep the plane positions fixed.
            .add_drift("DRIFT_1", 5.0 - scenario.thickness)
            .add_rcol(
                "COL_0",
                scenario.thickness,
                &scenario.material,
                p,
                p,
                width,
                geometry.shield_offset(),
            )
            .add_placement("COL_1_p", "COL_1", "COL_0", width / 2.0 + width + e)
            .sample_all()
            .set_beam(Beam::default())
            .set_options(Options::default());

        let main_file = dir.join(format!("input-{}.gmad", scenario.run_key));
        write_machine(&machine, &main_file)?;

        let extra_file = dir.join(format!("extra-{}.gmad", scenario.run_key));
        write_extra_blocks(
            &extra_file,
            &["COL_1".to_string()],
            width,
            scenario.thickness,
            &scenario.material,
        )?;

        debug!(lattice = self.key(), file = %main_file.display(), "Lattice written.");
        Ok(LatticeDescription {
            main_file,
            companion_files: vec![extra_file],
        })
    }
}

/// The optimised interaction region: half-quadrupole doublets on either side
/// of the long central dipole, with two catch-all blocks and optional extra
/// shielding upstream of the dipole to narrow the synchrotron fan.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuadsHalfQuadsIr {
    /// Thickness of the optional upstream shielding block, metres.
    pub extra_shielding: Option<f64>,
}

// Combined-function magnet constants of the optimised IR.
const QUAD_LENGTH: f64 = 2.1771258;
const QUAD_ANGLE: f64 = 0.002072436;
const RIGIDITY: f64 = 166.7778;
const K1_QY: f64 = -18.36839 / RIGIDITY;
const K1_QX: f64 = 30.13370 / RIGIDITY;

impl LatticeBuilder for QuadsHalfQuadsIr {
    fn key(&self) -> &'static str {
        "quads-half-quads"
    }

    fn default_geometry(&self) -> ApertureGeometry {
        ApertureGeometry {
            electron_aperture: 0.00015,
            proton_aperture: 0.02,
            beam_separation: 0.106105,
        }
    }

    fn planes(&self) -> PlanePair {
        PlanePair::new("dDRIFT50", "COL_END_0")
    }

    fn build(
        &self,
        scenario: &ScenarioConfig,
        dir: &Path,
    ) -> Result<LatticeDescription, EngineError> {
        let geometry = &scenario.geometry;
        let width = geometry.shield_width();
        let e = geometry.electron_aperture;
        let p = geometry.proton_aperture;
        let extra_t = self.extra_shielding.unwrap_or(0.0);
        if extra_t < 0.0 || extra_t > 0.3 {
            return Err(EngineError::Lattice(format!(
                "extra shielding thickness {extra_t} does not fit the upstream drift"
            )));
        }

        let mut machine = Machine::new();
        machine
            .add_include("material_Concretes.gmad")
            .add_include(format!("extra-{}.gmad", scenario.run_key))
            .add_drift("uDRIFT50", 0.5)
            .add_drift("uDRIFT_Q0", 1.871978)
            .add_drift("uDRIFT30_0", 0.3)
            .add_combined_dipole("uBEND_QY", QUAD_LENGTH, QUAD_ANGLE, K1_QY)
            .add_drift("uDRIFT20", 0.2)
            .add_combined_dipole("uBEND_QX", QUAD_LENGTH, QUAD_ANGLE, K1_QX)
            .add_drift("uDRIFT30_1", 0.3 - extra_t);

        if let Some(extra_t) = self.extra_shielding {
            // Upstream geometry is fixed by the quadrupole apertures, not the
            // scenario geometry.
            let sep = 0.029;
            let e_ap = 0.0025;
            let p_ap = 0.010_35 / 2.0;
            let extra_width = (sep - e_ap) * 2.0;
            machine.add_rcol(
                "COL_BEND_0",
                extra_t,
                &scenario.material,
                p_ap,
                p_ap,
                extra_width,
                extra_width / 2.0 + e_ap,
            );
        }

        machine
            // Long central dipole; its centre is the interaction point.
            .add_dipole("BEND_0", 7.85153 * 2.0, 0.007473978 * 2.0)
            .add_drift("dDRIFT30_0", 0.3)
            .add_combined_dipole("dBEND_QX", QUAD_LENGTH, QUAD_ANGLE, K1_QX)
            .add_drift("dDRIFT20", 0.2)
            .add_combined_dipole("dBEND_QY", QUAD_LENGTH, QUAD_ANGLE, K1_QY)
            .add_drift("dDRIFT30_1", 0.3)
            .add_drift("dDRIFT_Q0", 1.871978)
            .add_drift("dDRIFT50", 0.5 - scenario.thickness)
            .add_rcol(
                "COL_END_0",
                scenario.thickness,
                &scenario.material,
                p,
                p,
                width,
                geometry.shield_offset(),
            )
            .add_placement("COL_END_1_p", "COL_END_1", "COL_END_0", width / 2.0 + width + e)
            .add_placement(
                "COL_END_2_p",
                "COL_END_2",
                "COL_END_0",
                width / 2.0 + width * 2.0 + e,
            )
            .sample_all()
            // The optimised region has its own twiss match and tracks its
            // combined-function magnets with the geant4 integrator set.
            .set_beam(Beam::quads_ir())
            .set_options(Options::quads_ir());

        let main_file = dir.join(format!("input-{}.gmad", scenario.run_key));
        write_machine(&machine, &main_file)?;

        let extra_file = dir.join(format!("extra-{}.gmad", scenario.run_key));
        write_extra_blocks(
            &extra_file,
            &["COL_END_1".to_string(), "COL_END_2".to_string()],
            width,
            scenario.thickness,
            &scenario.material,
        )?;

        debug!(lattice = self.key(), file = %main_file.display(), "Lattice written.");
        Ok(LatticeDescription {
            main_file,
            companion_files: vec![extra_file],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::ScenarioConfigBuilder;

    fn scenario(variant: &dyn LatticeBuilder, thickness: f64) -> ScenarioConfig {
        ScenarioConfigBuilder::new()
            .material("Pb")
            .events_per_run(1000)
            .run_count(3)
            .thickness(thickness)
            .run_key("test_key")
            .geometry(variant.default_geometry())
            .build()
            .unwrap()
    }

    #[test]
    fn dipole_lattice_writes_main_and_extra_files() {
        let dir = tempfile::tempdir().unwrap();
        let variant = DipoleIr;
        let lattice = variant.build(&scenario(&variant, 0.05), dir.path()).unwrap();

        let main = std::fs::read_to_string(&lattice.main_file).unwrap();
        assert!(main.contains("include extra-test_key.gmad;"));
        assert!(main.contains("DRIFT_1: drift, l=4.95;"));
        assert!(main.contains("COL_0: rcol, l=0.05, material=\"Pb\""));
        assert!(main.contains("sample, all;"));
        assert!(main.contains("physicsList=\"synch_rad em\""));
        assert!(main.contains("alfx=150, alfy=150, betx=2250, bety=2250"));
        assert!(!main.contains("integratorSet"));

        let extra = std::fs::read_to_string(&lattice.companion_files[0]).unwrap();
        assert!(extra.contains("COL_1: rcol, horizontalWidth="));
        assert!(extra.contains("material=\"Pb\", xsize=0.0, ysize=0.0;"));
    }

    #[test]
    fn dipole_planes_straddle_the_barrier() {
        let planes = DipoleIr.planes();
        assert_eq!(planes.before, "DRIFT_1");
        assert_eq!(planes.after, "COL_0");
    }

    #[test]
    fn quads_lattice_defines_both_catch_all_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let variant = QuadsHalfQuadsIr::default();
        let lattice = variant.build(&scenario(&variant, 0.04), dir.path()).unwrap();

        let main = std::fs::read_to_string(&lattice.main_file).unwrap();
        assert!(main.contains("uBEND_QY: sbend"));
        assert!(main.contains("dDRIFT50: drift, l=0.4"));
        assert!(main.contains("COL_END_0: rcol, l=0.04"));
        assert!(main.contains("COL_END_1_p: placement"));
        assert!(main.contains("COL_END_2_p: placement"));
        assert!(!main.contains("COL_BEND_0"));
        // The optimised region's own twiss match and integrator set, not the
        // dipole region's.
        assert!(main.contains("alfx=-0.035622, alfy=99.948526"));
        assert!(main.contains("betx=0.09051, bety=4881.193917"));
        assert!(main.contains("integratorSet=\"geant4\";"));

        let extra = std::fs::read_to_string(&lattice.companion_files[0]).unwrap();
        assert!(extra.contains("COL_END_1: rcol"));
        assert!(extra.contains("COL_END_2: rcol"));
    }

    #[test]
    fn quads_extra_shielding_shortens_the_upstream_drift() {
        let dir = tempfile::tempdir().unwrap();
        let variant = QuadsHalfQuadsIr {
            extra_shielding: Some(0.1),
        };
        let lattice = variant.build(&scenario(&variant, 0.04), dir.path()).unwrap();

        let main = std::fs::read_to_string(&lattice.main_file).unwrap();
        assert!(main.contains("uDRIFT30_1: drift, l=0.19999999999999998;") ||
            main.contains("uDRIFT30_1: drift, l=0.2;"));
        assert!(main.contains("COL_BEND_0: rcol, l=0.1"));
    }

    #[test]
    fn oversized_extra_shielding_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let variant = QuadsHalfQuadsIr {
            extra_shielding: Some(0.5),
        };
        let result = variant.build(&scenario(&variant, 0.04), dir.path());
        assert!(matches!(result, Err(EngineError::Lattice(_))));
    }
}
