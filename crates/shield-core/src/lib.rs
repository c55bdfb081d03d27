//! # synchshield Core Library
//!
//! A driver library for synchrotron-radiation shielding studies in an
//! accelerator interaction region: it generates beamline lattice descriptions,
//! drives repeated stochastic trials of an external Monte Carlo engine, and
//! reduces the per-trial photon counts into attenuation statistics.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   ([`core::models`]), elementary statistics over repeated trials
//!   ([`core::stats`]), declarative photon-count selections
//!   ([`core::selection`]), lattice description serialization
//!   ([`core::gmad`]), and delimited-table I/O ([`core::io`]).
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates a study.
//!   It owns the external-collaborator seams (the lattice builder strategies,
//!   the simulation engine, and the histogram reducer) and the
//!   [`engine::runner::StudyRunner`] that executes trials and reduces them.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It ties the `engine` and `core` together to execute a complete thickness
//!   scan of one shielding material, persisting results as it goes.

pub mod core;
pub mod engine;
pub mod workflows;
