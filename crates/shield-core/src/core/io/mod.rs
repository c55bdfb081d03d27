//! Tabular input/output for the study pipeline.
//!
//! Two concerns live here: parsing the named entry counts produced by the
//! histogram reducer ([`counts`]), and writing the per-scenario study output
//! tables with explicit named columns ([`table`]).

pub mod counts;
pub mod table;
