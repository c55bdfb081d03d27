//! External simulation toolchain contracts.
//!
//! The physics engine and the histogram reducer are separate processes with
//! fixed input/output contracts; this module owns the trait seams and the
//! process-backed implementations.
//!
//! - The engine consumes (lattice file, output prefix, event count, seed) and
//!   produces a results artifact at `<prefix>.root`; it reports nothing but
//!   process success or failure.
//! - The reducer consumes (analysis spec, results artifact, reduced-output
//!   path) and produces a reduced artifact: a `name,entries` table with one
//!   row per declared histogram.

use crate::core::io::counts::NamedCounts;
use crate::core::selection::SelectionSet;
use crate::engine::error::EngineError;
use crate::engine::lattice::LatticeDescription;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Runs one stochastic trial and yields the results artifact path.
pub trait SimulationEngine: Sync {
    fn run_trial(
        &self,
        lattice: &LatticeDescription,
        output_prefix: &Path,
        events: u32,
        seed: u64,
    ) -> Result<PathBuf, EngineError>;
}

/// Reduces a results artifact into named scalar counts.
pub trait HistogramReducer: Sync {
    fn reduce(
        &self,
        selection: &SelectionSet,
        results: &Path,
        reduced_out: &Path,
    ) -> Result<NamedCounts, EngineError>;
}

fn describe_process_failure(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let tail: String = stderr
        .lines()
        .rev()
        .take(5)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("; ");
    format!("exit status {}: {}", output.status, tail.trim())
}

/// A `bdsim`-compatible simulation engine invoked as a child process.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    executable: PathBuf,
}

impl ProcessEngine {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl SimulationEngine for ProcessEngine {
    fn run_trial(
        &self,
        lattice: &LatticeDescription,
        output_prefix: &Path,
        events: u32,
        seed: u64,
    ) -> Result<PathBuf, EngineError> {
        debug!(seed, events, prefix = %output_prefix.display(), "Spawning simulation engine.");
        let output = Command::new(&self.executable)
            .arg(format!("--file={}", lattice.main_file.display()))
            .arg(format!("--outfile={}", output_prefix.display()))
            .arg(format!("--ngenerate={events}"))
            .arg(format!("--seed={seed}"))
            .arg("--batch")
            .output()
            .map_err(|e| EngineError::EngineFailure {
                message: format!("failed to spawn '{}': {e}", self.executable.display()),
            })?;

        if !output.status.success() {
            return Err(EngineError::EngineFailure {
                message: describe_process_failure(&output),
            });
        }

        let results = output_prefix.with_extension("root");
        if !results.is_file() {
            return Err(EngineError::EngineFailure {
                message: format!(
                    "engine exited successfully but produced no output at '{}'",
                    results.display()
                ),
            });
        }
        Ok(results)
    }
}

/// A `rebdsim`-compatible histogram reducer invoked as a child process.
///
/// The analysis spec is written next to the reduced output, the reducer is
/// invoked as `<exe> <spec> <results> <reduced_out>`, and the reduced
/// artifact is parsed as a named-count table.
#[derive(Debug, Clone)]
pub struct ProcessReducer {
    executable: PathBuf,
}

impl ProcessReducer {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl HistogramReducer for ProcessReducer {
    fn reduce(
        &self,
        selection: &SelectionSet,
        results: &Path,
        reduced_out: &Path,
    ) -> Result<NamedCounts, EngineError> {
        let spec_path = reduced_out.with_extension("spec.txt");
        let mut spec_writer = BufWriter::new(File::create(&spec_path)?);
        selection.write_analysis_spec(&mut spec_writer)?;
        drop(spec_writer);

        debug!(results = %results.display(), out = %reduced_out.display(), "Spawning reducer.");
        let output = Command::new(&self.executable)
            .arg(&spec_path)
            .arg(results)
            .arg(reduced_out)
            .output()
            .map_err(|e| EngineError::ReducerFailure {
                message: format!("failed to spawn '{}': {e}", self.executable.display()),
            })?;

        if !output.status.success() {
            return Err(EngineError::ReducerFailure {
                message: describe_process_failure(&output),
            });
        }

        let reduced = File::open(reduced_out).map_err(|e| EngineError::ReducerFailure {
            message: format!(
                "reducer exited successfully but '{}' is unreadable: {e}",
                reduced_out.display()
            ),
        })?;
        Ok(NamedCounts::from_reader(reduced)?)
    }
}
