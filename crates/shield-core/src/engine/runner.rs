//! Study execution.
//!
//! A study is `run_count` independent stochastic trials of one scenario
//! against one generated lattice, reduced into a [`StudySummary`]. Trials
//! are logically independent (same lattice, different seeds) and execute on
//! the rayon pool; collection preserves run order and the first failure
//! cancels the study, since a partial trial sequence cannot be summarized
//! against a fixed `run_count` denominator.

use crate::core::models::summary::StudySummary;
use crate::core::models::trial::TrialResult;
use crate::core::selection::SelectionSet;
use crate::engine::config::ScenarioConfig;
use crate::engine::error::EngineError;
use crate::engine::lattice::LatticeDescription;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::sim::{HistogramReducer, SimulationEngine};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Deterministic per-run seed schedule: `seed(i) = 42 * i + 23`.
///
/// A fixed affine formula so re-running the same run index reproduces the
/// trial exactly; it makes no statistical-independence promise beyond the
/// engine's own seeding.
pub fn trial_seed(run_index: usize) -> u64 {
    run_index as u64 * 42 + 23
}

/// Filesystem locations a study writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyPaths {
    /// Per-trial engine output lands here, keyed by scenario and run index.
    pub data_dir: PathBuf,
    /// Reduced artifacts and analysis specs land here.
    pub scratch_dir: PathBuf,
}

/// The completed trial sequence and its reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyOutcome {
    /// One entry per trial, in strict run order.
    pub trials: Vec<TrialResult>,
    pub summary: StudySummary,
}

/// Executes the trials of one scenario and reduces them.
pub struct StudyRunner<'a> {
    scenario: &'a ScenarioConfig,
    selection: SelectionSet,
    engine: &'a dyn SimulationEngine,
    reducer: &'a dyn HistogramReducer,
    paths: StudyPaths,
    max_retries: u32,
}

impl<'a> StudyRunner<'a> {
    pub fn new(
        scenario: &'a ScenarioConfig,
        selection: SelectionSet,
        engine: &'a dyn SimulationEngine,
        reducer: &'a dyn HistogramReducer,
        paths: StudyPaths,
    ) -> Self {
        Self {
            scenario,
            selection,
            engine,
            reducer,
            paths,
            max_retries: 0,
        }
    }

    /// Allow up to `retries` re-invocations of a failed engine process per
    /// trial before giving up on the study.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Run every trial of the study and reduce the results.
    ///
    /// The lattice must already have been generated for this scenario; trial
    /// ordering in the returned sequence matches run order regardless of
    /// execution interleaving.
    #[instrument(
        skip_all,
        name = "shielding_study",
        fields(
            material = %self.scenario.material,
            thickness = self.scenario.thickness,
            runs = self.scenario.run_count,
        )
    )]
    pub fn run_study(
        &self,
        lattice: &LatticeDescription,
        reporter: &ProgressReporter,
    ) -> Result<StudyOutcome, EngineError> {
        let run_dir = self.paths.data_dir.join(&self.scenario.run_key);
        std::fs::create_dir_all(&run_dir)?;
        std::fs::create_dir_all(&self.paths.scratch_dir)?;

        reporter.report(Progress::StudyStart {
            thickness: self.scenario.thickness,
            runs: self.scenario.run_count as u64,
        });
        info!("Starting study.");

        let trials: Vec<TrialResult> = (0..self.scenario.run_count)
            .into_par_iter()
            .map(|run_index| {
                let result = self.run_trial(lattice, &run_dir, run_index)?;
                reporter.report(Progress::TrialFinish { result });
                Ok(result)
            })
            .collect::<Result<_, EngineError>>()?;

        let summary = StudySummary::from_trials(&trials).ok_or_else(|| {
            EngineError::Internal("completed study produced no trials".to_string())
        })?;

        info!(
            fraction = summary.fraction_absorbed.mean,
            err = summary.fraction_absorbed.err,
            "Study complete."
        );
        reporter.report(Progress::StudyFinish);
        Ok(StudyOutcome { trials, summary })
    }

    fn run_trial(
        &self,
        lattice: &LatticeDescription,
        run_dir: &Path,
        run_index: usize,
    ) -> Result<TrialResult, EngineError> {
        let seed = trial_seed(run_index);
        // Run index in the prefix keeps parallel trials from colliding.
        let prefix = run_dir.join(format!(
            "{}-{}m-run{}",
            self.scenario.material, self.scenario.thickness, run_index
        ));
        let results = self.invoke_engine(lattice, &prefix, seed)?;

        let reduced_out = self.paths.scratch_dir.join(format!(
            "reduced-{}-run{}.csv",
            self.scenario.run_key, run_index
        ));
        let counts = self.reducer.reduce(&self.selection, &results, &reduced_out)?;
        let counts = self.selection.extract(&counts)?;

        let before = counts.before_between + counts.before_beyond;
        let after = counts.after_between + counts.after_beyond;
        if before == 0 {
            return Err(EngineError::EmptyBeforeWindow { run_index });
        }

        Ok(TrialResult {
            total_photons: counts.total,
            electron_aperture_photons: counts.electron_aperture,
            proton_aperture_photons: counts.proton_aperture,
            zp_positive_photons: counts.forward,
            fraction_absorbed: 1.0 - after as f64 / before as f64,
        })
    }

    fn invoke_engine(
        &self,
        lattice: &LatticeDescription,
        prefix: &Path,
        seed: u64,
    ) -> Result<PathBuf, EngineError> {
        let mut attempt = 0;
        loop {
            match self
                .engine
                .run_trial(lattice, prefix, self.scenario.events_per_run, seed)
            {
                Ok(results) => return Ok(results),
                Err(EngineError::EngineFailure { message }) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        seed,
                        attempt,
                        max_retries = self.max_retries,
                        "Engine failed, retrying: {message}"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
