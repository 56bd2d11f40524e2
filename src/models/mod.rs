//! Core data models for the enrichment pipeline.

pub mod coordinate;
pub mod lookup;
pub mod row;

pub use coordinate::{Axis, Coordinate};
pub use lookup::{LookupResult, Placeholders};
pub use row::Row;
