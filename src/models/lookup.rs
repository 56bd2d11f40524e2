//! Reverse geocoding results.

use serde::{Deserialize, Serialize};

pub const DEFAULT_STREET_PLACEHOLDER: &str = "Street not found";
pub const DEFAULT_NEIGHBORHOOD_PLACEHOLDER: &str = "Neighborhood not found";

/// Text written in place of a street or neighborhood that could not be determined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholders {
    pub street: String,
    pub neighborhood: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            street: DEFAULT_STREET_PLACEHOLDER.to_string(),
            neighborhood: DEFAULT_NEIGHBORHOOD_PLACEHOLDER.to_string(),
        }
    }
}

/// Street and neighborhood recovered for one row. Always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub street: String,
    pub neighborhood: String,
}

impl LookupResult {
    pub fn new(street: impl Into<String>, neighborhood: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            neighborhood: neighborhood.into(),
        }
    }

    /// The sentinel pair used when a lookup fails or cannot be attempted
    pub fn not_found(placeholders: &Placeholders) -> Self {
        Self::new(&placeholders.street, &placeholders.neighborhood)
    }

    /// True when both halves are placeholders
    pub fn is_not_found(&self, placeholders: &Placeholders) -> bool {
        self.street == placeholders.street && self.neighborhood == placeholders.neighborhood
    }
}
