//! # Core Module
//!
//! Fundamental building blocks for shielding studies: the stateless data
//! models, the statistics used to reduce repeated stochastic trials, and the
//! serialization formats exchanged with the external simulation toolchain.
//!
//! ## Architecture
//!
//! - **Study Data** ([`models`]) - Trial results, study summaries, aperture
//!   geometry, and raw particle sample records
//! - **Trial Statistics** ([`stats`]) - Mean, population standard deviation,
//!   and standard error over repeated trials
//! - **Photon Selections** ([`selection`]) - Declarative windowed-count
//!   specifications evaluated by the histogram reducer
//! - **Lattice Serialization** ([`gmad`]) - Writing machine descriptions in
//!   the GMAD format consumed by the simulation engine
//! - **Tabular I/O** ([`io`]) - Named-count tables and delimited study output
//!   files

pub mod gmad;
pub mod io;
pub mod models;
pub mod selection;
pub mod stats;
