use thiserror::Error;

use crate::core::io::counts::CountsError;
use crate::engine::config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The before-barrier windows counted zero forward photons, so the
    /// attenuation fraction is undefined for this trial.
    #[error(
        "no forward photons in the before-barrier windows on run {run_index}; \
         attenuation fraction is undefined"
    )]
    EmptyBeforeWindow { run_index: usize },

    /// The external simulation process failed or produced no readable output.
    #[error("simulation engine failed: {message}")]
    EngineFailure { message: String },

    /// The histogram reducer process failed.
    #[error("histogram reducer failed: {message}")]
    ReducerFailure { message: String },

    /// The reduced output lacked an expected named count, or was malformed.
    #[error(transparent)]
    Counts {
        #[from]
        source: CountsError,
    },

    #[error("lattice generation failed: {0}")]
    Lattice(String),

    #[error("invalid study configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("table write failed: {source}")]
    Table {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal logic error: {0}")]
    Internal(String),
}
