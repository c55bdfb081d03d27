//! Study configuration: TOML file loading and CLI-override merging.
//!
//! The file supplies the durable parts of a study (material, run key,
//! thicknesses, toolchain paths); CLI flags override individual values for
//! one invocation. Everything funnels into the validated core configs.

use crate::cli::{LatticeArgs, ScanArgs, VariantName};
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use synchshield::core::models::geometry::ApertureGeometry;
use synchshield::engine::lattice::{DipoleIr, LatticeBuilder, QuadsHalfQuadsIr};
use synchshield::workflows::scan::ScanConfig;
use tracing::debug;

const DEFAULT_EVENTS_PER_RUN: u32 = 10_000;
const DEFAULT_RUN_COUNT: usize = 30;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct GeometrySection {
    pub electron_aperture: f64,
    pub proton_aperture: f64,
    pub beam_separation: f64,
}

impl From<GeometrySection> for ApertureGeometry {
    fn from(section: GeometrySection) -> Self {
        Self {
            electron_aperture: section.electron_aperture,
            proton_aperture: section.proton_aperture,
            beam_separation: section.beam_separation,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PathsSection {
    pub data_dir: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct EngineSection {
    pub executable: Option<PathBuf>,
    pub reducer_executable: Option<PathBuf>,
    pub max_retries: Option<u32>,
}

/// The study file as written by the user; everything optional so CLI flags
/// can fill the gaps.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct StudyFile {
    pub material: Option<String>,
    pub run_key: Option<String>,
    pub variant: Option<VariantName>,
    pub thicknesses: Option<Vec<f64>>,
    pub events_per_run: Option<u32>,
    pub run_count: Option<usize>,
    /// Extra upstream shielding thickness for the quads variant, metres.
    pub extra_shielding: Option<f64>,
    pub geometry: Option<GeometrySection>,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub engine: EngineSection,
}

impl StudyFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let file = toml::from_str(&text).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        debug!(path = %path.display(), "Study file loaded.");
        Ok(file)
    }

    fn variant_builder(&self, override_name: Option<VariantName>) -> Box<dyn LatticeBuilder> {
        match override_name.or(self.variant).unwrap_or(VariantName::Dipole) {
            VariantName::Dipole => Box::new(DipoleIr),
            VariantName::QuadsHalfQuads => Box::new(QuadsHalfQuadsIr {
                extra_shielding: self.extra_shielding,
            }),
        }
    }
}

/// A fully merged scan ready to execute.
pub struct ResolvedScan {
    pub scan: ScanConfig,
    pub variant: Box<dyn LatticeBuilder>,
    pub engine_executable: PathBuf,
    pub reducer_executable: PathBuf,
}

fn require<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| {
        CliError::Config(format!(
            "'{name}' must be set in the study file or overridden on the command line"
        ))
    })
}

pub fn resolve_scan(file: StudyFile, args: &ScanArgs) -> Result<ResolvedScan> {
    let material = require(args.material.clone().or_else(|| file.material.clone()), "material")?;
    let run_key = require(args.run_key.clone().or_else(|| file.run_key.clone()), "run-key")?;
    let thicknesses = if args.thicknesses.is_empty() {
        require(file.thicknesses.clone(), "thicknesses")?
    } else {
        args.thicknesses.clone()
    };

    let scan = ScanConfig {
        material,
        run_key,
        thicknesses,
        events_per_run: args
            .events_per_run
            .or(file.events_per_run)
            .unwrap_or(DEFAULT_EVENTS_PER_RUN),
        run_count: args.run_count.or(file.run_count).unwrap_or(DEFAULT_RUN_COUNT),
        geometry: file.geometry.clone().map(ApertureGeometry::from),
        data_dir: file.paths.data_dir.clone().unwrap_or_else(|| "DATA".into()),
        scratch_dir: file.paths.scratch_dir.clone().unwrap_or_else(|| "tmp".into()),
        output_dir: args
            .output_dir
            .clone()
            .or_else(|| file.paths.output_dir.clone())
            .unwrap_or_else(|| "results".into()),
        max_retries: args.max_retries.or(file.engine.max_retries).unwrap_or(0),
    };

    let engine_executable = args
        .engine_exe
        .clone()
        .or_else(|| file.engine.executable.clone())
        .unwrap_or_else(|| "bdsim".into());
    let reducer_executable = args
        .reducer_exe
        .clone()
        .or_else(|| file.engine.reducer_executable.clone())
        .unwrap_or_else(|| "rebdsim".into());

    let variant = file.variant_builder(args.variant);
    Ok(ResolvedScan {
        scan,
        variant,
        engine_executable,
        reducer_executable,
    })
}

/// A merged single-scenario lattice request.
pub struct ResolvedLattice {
    pub material: String,
    pub run_key: String,
    pub thickness: f64,
    pub events_per_run: u32,
    pub run_count: usize,
    pub geometry: Option<ApertureGeometry>,
    pub variant: Box<dyn LatticeBuilder>,
}

pub fn resolve_lattice(file: StudyFile, args: &LatticeArgs) -> Result<ResolvedLattice> {
    let material = require(args.material.clone().or_else(|| file.material.clone()), "material")?;
    let run_key = require(file.run_key.clone(), "run-key")?;
    let thickness = require(
        args.thickness
            .or_else(|| file.thicknesses.as_ref().and_then(|t| t.first().copied())),
        "thickness",
    )?;

    let variant = file.variant_builder(args.variant);
    Ok(ResolvedLattice {
        material,
        run_key,
        thickness,
        events_per_run: file.events_per_run.unwrap_or(DEFAULT_EVENTS_PER_RUN),
        run_count: file.run_count.unwrap_or(DEFAULT_RUN_COUNT),
        geometry: file.geometry.map(ApertureGeometry::from),
        variant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct ScanHarness {
        #[command(flatten)]
        args: ScanArgs,
    }

    fn scan_args(extra: &[&str]) -> ScanArgs {
        let mut argv = vec!["harness", "--config", "study.toml"];
        argv.extend_from_slice(extra);
        ScanHarness::parse_from(argv).args
    }

    const STUDY_TOML: &str = r#"
        material = "Pb"
        run-key = "dipole_full"
        variant = "dipole"
        thicknesses = [0.021, 0.022, 0.025]
        events-per-run = 10000
        run-count = 30

        [geometry]
        electron-aperture = 0.005
        proton-aperture = 0.02
        beam-separation = 0.121896

        [engine]
        executable = "/opt/bdsim/bin/bdsim"
        max-retries = 2
    "#;

    #[test]
    fn file_values_flow_into_the_scan_config() {
        let file: StudyFile = toml::from_str(STUDY_TOML).unwrap();
        let resolved = resolve_scan(file, &scan_args(&[])).unwrap();

        assert_eq!(resolved.scan.material, "Pb");
        assert_eq!(resolved.scan.thicknesses, vec![0.021, 0.022, 0.025]);
        assert_eq!(resolved.scan.run_count, 30);
        assert_eq!(resolved.scan.max_retries, 2);
        assert_eq!(resolved.engine_executable, PathBuf::from("/opt/bdsim/bin/bdsim"));
        assert_eq!(resolved.reducer_executable, PathBuf::from("rebdsim"));
        assert_eq!(resolved.variant.key(), "dipole");
        let geometry = resolved.scan.geometry.unwrap();
        assert_eq!(geometry.beam_separation, 0.121896);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let file: StudyFile = toml::from_str(STUDY_TOML).unwrap();
        let args = scan_args(&[
            "--material",
            "Cu",
            "--thickness",
            "0.04",
            "--thickness",
            "0.08",
            "--run-count",
            "5",
            "--variant",
            "quads-half-quads",
        ]);
        let resolved = resolve_scan(file, &args).unwrap();

        assert_eq!(resolved.scan.material, "Cu");
        assert_eq!(resolved.scan.thicknesses, vec![0.04, 0.08]);
        assert_eq!(resolved.scan.run_count, 5);
        assert_eq!(resolved.variant.key(), "quads-half-quads");
    }

    #[test]
    fn missing_material_everywhere_is_a_config_error() {
        let file: StudyFile = toml::from_str("run-key = \"k\"\nthicknesses = [0.1]").unwrap();
        let result = resolve_scan(file, &scan_args(&[]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn unknown_keys_in_the_study_file_are_rejected() {
        let result: std::result::Result<StudyFile, _> = toml::from_str("materail = \"Pb\"");
        assert!(result.is_err());
    }
}
