//! Tabular row as it moves through the pipeline.

use super::{Coordinate, LookupResult};

/// One record from the source dataset.
///
/// `fields` holds every cell in source column order, including the raw
/// latitude/longitude text. The normalized halves live alongside so the raw
/// input is never lost.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub fields: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub lookup: Option<LookupResult>,
}

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Raw cell text at `idx`, empty when the record is short
    pub fn raw(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }

    /// The normalized coordinate, if both halves survived normalization
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }

    pub fn is_locatable(&self) -> bool {
        self.coordinate().is_some()
    }
}
