//! Bairro - repairs street-record coordinates and enriches them with
//! street and neighborhood names from Nominatim reverse geocoding.
//!
//! This library provides the pipeline stages used by the `enrich` binary.

pub mod config;
pub mod dataset;
pub mod diagnostics;
pub mod enrichment;
pub mod error;
pub mod geocode;
pub mod models;
pub mod normalize;
pub mod pipeline;

pub use error::{PipelineError, Result};
pub use models::{Axis, Coordinate, LookupResult, Placeholders, Row};
pub use pipeline::{Pipeline, RunSummary};
