//! The thickness-scan workflow.
//!
//! One scan studies one shielding material at a sequence of barrier
//! thicknesses, producing a summary row per thickness plus the raw per-trial
//! fraction buffer. Output tables are flushed after every completed study,
//! so a crash mid-scan loses at most the study in flight.

use crate::core::io::table::{BufferTable, SummaryTable};
use crate::core::models::geometry::ApertureGeometry;
use crate::core::models::summary::StudySummary;
use crate::core::selection::SelectionSet;
use crate::engine::config::{ConfigError, ScenarioConfigBuilder};
use crate::engine::error::EngineError;
use crate::engine::lattice::LatticeBuilder;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::runner::{StudyPaths, StudyRunner};
use crate::engine::sim::{HistogramReducer, SimulationEngine};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Parameters of one full thickness scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub material: String,
    pub run_key: String,
    /// Barrier thicknesses to study, metres, in scan order.
    pub thicknesses: Vec<f64>,
    pub events_per_run: u32,
    pub run_count: usize,
    /// Overrides the lattice variant's nominal geometry when set.
    pub geometry: Option<ApertureGeometry>,
    /// Root for lattice files and per-trial engine output.
    pub data_dir: PathBuf,
    /// Root for reduced artifacts and analysis specs.
    pub scratch_dir: PathBuf,
    /// Destination of the summary and buffer tables.
    pub output_dir: PathBuf,
    /// Engine re-invocations allowed per trial.
    pub max_retries: u32,
}

impl ScanConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.thicknesses.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "thicknesses",
                message: "scan needs at least one thickness".to_string(),
            });
        }
        Ok(())
    }
}

/// One completed study within a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow {
    pub thickness: f64,
    pub summary: StudySummary,
    /// Per-trial absorbed fractions, in run order.
    pub fractions: Vec<f64>,
}

/// All rows of a completed scan, in scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub rows: Vec<ScanRow>,
}

/// Run a complete thickness scan.
///
/// For each thickness: generate the lattice via the variant strategy, run
/// the study, append the results to the output tables, and flush. The first
/// failed study aborts the scan; rows already written stay on disk.
#[instrument(
    skip_all,
    name = "scan_workflow",
    fields(material = %config.material, run_key = %config.run_key)
)]
pub fn run(
    config: &ScanConfig,
    variant: &dyn LatticeBuilder,
    engine: &dyn SimulationEngine,
    reducer: &dyn HistogramReducer,
    reporter: &ProgressReporter,
) -> Result<ScanResult, EngineError> {
    config.validate()?;

    let geometry = config.geometry.unwrap_or_else(|| variant.default_geometry());
    let planes = variant.planes();
    let lattice_dir = config.data_dir.join("GMAD");
    std::fs::create_dir_all(&lattice_dir)?;
    std::fs::create_dir_all(&config.output_dir)?;

    let mut summary_table = SummaryTable::create(
        &config
            .output_dir
            .join(format!("{}_run_data.csv", config.material)),
    )?;
    let mut buffer_table = BufferTable::create(
        &config
            .output_dir
            .join(format!("{}_run_buffer.csv", config.material)),
        config.run_count,
    )?;

    reporter.report(Progress::ScanStart {
        studies: config.thicknesses.len() as u64,
    });
    info!(
        variant = variant.key(),
        thicknesses = config.thicknesses.len(),
        "Starting thickness scan."
    );

    let mut rows = Vec::with_capacity(config.thicknesses.len());
    for &thickness in &config.thicknesses {
        let scenario = ScenarioConfigBuilder::new()
            .material(&config.material)
            .events_per_run(config.events_per_run)
            .run_count(config.run_count)
            .thickness(thickness)
            .run_key(&config.run_key)
            .geometry(geometry)
            .build()?;

        let lattice = variant.build(&scenario, &lattice_dir)?;
        let selection = SelectionSet::for_study(&scenario.geometry, &planes);
        let runner = StudyRunner::new(
            &scenario,
            selection,
            engine,
            reducer,
            StudyPaths {
                data_dir: config.data_dir.clone(),
                scratch_dir: config.scratch_dir.clone(),
            },
        )
        .with_max_retries(config.max_retries);

        let outcome = runner.run_study(&lattice, reporter)?;
        let fractions: Vec<f64> = outcome
            .trials
            .iter()
            .map(|t| t.fraction_absorbed)
            .collect();

        // Checkpoint: both tables land on disk before the next study starts.
        summary_table.append(thickness, &outcome.summary)?;
        buffer_table.append(thickness, &fractions)?;

        rows.push(ScanRow {
            thickness,
            summary: outcome.summary,
            fractions,
        });
    }

    info!(rows = rows.len(), "Scan complete.");
    reporter.report(Progress::ScanFinish);
    Ok(ScanResult { rows })
}
