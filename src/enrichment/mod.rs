//! Concurrent enrichment of a row set.
//!
//! One lookup future per row is driven on the calling task through an
//! order-preserving buffered stream, so `results[i]` always belongs to
//! `rows[i]` no matter which request finishes first.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use tracing::debug;

use crate::geocode::ReverseGeocoder;
use crate::models::{LookupResult, Placeholders, Row};

/// Produces one lookup result per row, in row order
#[async_trait]
pub trait RowEnricher: Send + Sync {
    async fn enrich(&self, rows: &[Row]) -> Vec<LookupResult>;
}

pub struct Enricher<G> {
    geocoder: G,
    placeholders: Placeholders,
    max_in_flight: usize,
    progress: Option<ProgressBar>,
}

impl<G: ReverseGeocoder> Enricher<G> {
    /// `max_in_flight` of 0 issues every eligible lookup at once
    pub fn new(geocoder: G, placeholders: Placeholders, max_in_flight: usize) -> Self {
        Self {
            geocoder,
            placeholders,
            max_in_flight,
            progress: None,
        }
    }

    /// Tick `progress` once per finished row
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    async fn lookup_row(&self, row: &Row) -> LookupResult {
        let result = match row.coordinate() {
            Some(coordinate) => self.geocoder.lookup(coordinate).await,
            None => LookupResult::not_found(&self.placeholders),
        };
        if let Some(ref pb) = self.progress {
            pb.inc(1);
        }
        result
    }
}

#[async_trait]
impl<G: ReverseGeocoder> RowEnricher for Enricher<G> {
    async fn enrich(&self, rows: &[Row]) -> Vec<LookupResult> {
        if let Some(ref pb) = self.progress {
            pb.set_length(rows.len() as u64);
        }

        let limit = match self.max_in_flight {
            0 => rows.len().max(1),
            n => n,
        };
        debug!(
            "Enriching {} rows ({} eligible) with up to {} lookups in flight",
            rows.len(),
            rows.iter().filter(|r| r.is_locatable()).count(),
            limit
        );

        let lookups: Vec<_> = rows.iter().map(|row| self.lookup_row(row)).collect();
        let results: Vec<LookupResult> = stream::iter(lookups).buffered(limit).collect().await;

        if let Some(ref pb) = self.progress {
            pb.finish_with_message("Lookups complete");
        }
        results
    }
}
