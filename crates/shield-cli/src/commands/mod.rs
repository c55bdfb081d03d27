pub mod lattice;
pub mod scan;
