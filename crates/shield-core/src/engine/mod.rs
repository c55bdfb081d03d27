//! # Engine Module
//!
//! This module orchestrates shielding studies: it owns the configuration of a
//! scenario, the seams to the external simulation toolchain, and the runner
//! that executes repeated stochastic trials and reduces them.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated, immutable scenario parameters
//! - **Lattice Strategies** ([`lattice`]) - The interaction-region variants
//!   that generate machine descriptions for the engine
//! - **External Processes** ([`sim`]) - The simulation-engine and
//!   histogram-reducer process contracts
//! - **Study Execution** ([`runner`]) - Deterministically seeded trials on a
//!   worker pool, reduced into a study summary
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-specific failure kinds
//!
//! ## Key Capabilities
//!
//! - **Reproducible trials** through a fixed affine per-run seed schedule
//! - **Parallel trial execution** with run-order-preserving collection and
//!   whole-study fail-fast semantics
//! - **Swappable lattice geometry** so one runner serves every
//!   interaction-region variant
//! - **Reportable degenerate cases** instead of silent NaN propagation

pub mod config;
pub mod error;
pub mod lattice;
pub mod progress;
pub mod runner;
pub mod sim;
