//! Stateless data models shared across the study pipeline.

pub mod geometry;
pub mod record;
pub mod summary;
pub mod trial;
