//! # Workflows Module
//!
//! High-level procedures tying the engine and core together. Workflows are
//! the top-level entry points for users of the library: they validate
//! configuration, generate lattices, drive studies, report progress, and
//! persist results incrementally.
//!
//! - **Thickness Scan** ([`scan`]) - Run one material through a sequence of
//!   barrier thicknesses and tabulate the attenuation statistics.

pub mod scan;
