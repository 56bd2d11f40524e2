//! Run configuration loaded from an optional TOML file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::models::lookup::{DEFAULT_NEIGHBORHOOD_PLACEHOLDER, DEFAULT_STREET_PLACEHOLDER};
use crate::models::Placeholders;
use crate::normalize::{NormalizePolicy, UnresolvedRows};

pub const NOMINATIM_REVERSE_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_USER_AGENT: &str = "bairro/0.1 (street enrichment; contact: maintainer@example.com)";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub geocoder: GeocoderConfig,
    pub dataset: DatasetConfig,
    pub normalize: NormalizeConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    /// Nominatim rejects requests without an identifying agent
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Upper bound on lookups in flight at once; 0 lets every row go at once
    pub max_in_flight: usize,
    pub street_placeholder: String,
    pub neighborhood_placeholder: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: NOMINATIM_REVERSE_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_in_flight: 8,
            street_placeholder: DEFAULT_STREET_PLACEHOLDER.to_string(),
            neighborhood_placeholder: DEFAULT_NEIGHBORHOOD_PLACEHOLDER.to_string(),
        }
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid geocoder endpoint '{}'", self.endpoint))
    }

    pub fn placeholders(&self) -> Placeholders {
        Placeholders {
            street: self.street_placeholder.clone(),
            neighborhood: self.neighborhood_placeholder.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetConfig {
    pub latitude_column: String,
    pub longitude_column: String,
    pub delimiter: char,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            latitude_column: "latitude".to_string(),
            longitude_column: "longitude".to_string(),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct NormalizeConfig {
    pub policy: NormalizePolicy,
    pub unresolved: UnresolvedRows,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later, mid-run
    pub fn validate(&self) -> Result<()> {
        self.geocoder.endpoint_url()?;
        if self.geocoder.user_agent.trim().is_empty() {
            anyhow::bail!("geocoder.user_agent must not be empty");
        }
        if self.geocoder.timeout_secs == 0 {
            anyhow::bail!("geocoder.timeout_secs must be at least 1");
        }
        if !self.dataset.delimiter.is_ascii() {
            anyhow::bail!(
                "dataset.delimiter must be a single ASCII character, got '{}'",
                self.dataset.delimiter
            );
        }
        Ok(())
    }
}
