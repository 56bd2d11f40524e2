//! Load → normalize → enrich → merge → write.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::dataset::{Dataset, DatasetLayout};
use crate::diagnostics::{Diagnostics, Event};
use crate::enrichment::RowEnricher;
use crate::error::{PipelineError, Result};
use crate::models::{LookupResult, Placeholders};
use crate::normalize::{Normalizer, UnresolvedRows};

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub loaded: usize,
    pub dropped: usize,
    /// Rows with a usable coordinate
    pub eligible: usize,
    /// Rows where at least one of street/neighborhood was found
    pub resolved: usize,
    pub not_found: usize,
    pub merged: bool,
    pub written: bool,
}

pub struct Pipeline {
    layout: DatasetLayout,
    normalizer: Normalizer,
    unresolved: UnresolvedRows,
    placeholders: Placeholders,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Pipeline {
    pub fn new(
        layout: DatasetLayout,
        normalizer: Normalizer,
        unresolved: UnresolvedRows,
        placeholders: Placeholders,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            layout,
            normalizer,
            unresolved,
            placeholders,
            diagnostics,
        }
    }

    /// Full run. Only a missing or unreadable input is an error; lookup,
    /// merge and write problems are reported and reflected in the summary.
    pub async fn run<E: RowEnricher>(
        &self,
        input: &Path,
        output: &Path,
        enricher: &E,
    ) -> Result<RunSummary> {
        let (mut dataset, mut summary) = self.load_normalized(input)?;

        info!("Looking up {} rows", dataset.rows.len());
        let results = enricher.enrich(&dataset.rows).await;
        summary.merged = self.merge(&mut dataset, results);

        if summary.merged {
            for row in &dataset.rows {
                match &row.lookup {
                    Some(lookup) if !lookup.is_not_found(&self.placeholders) => {
                        summary.resolved += 1
                    }
                    _ => summary.not_found += 1,
                }
            }
        }

        summary.written = self.persist(&dataset, output);
        Ok(summary)
    }

    /// Repair coordinates and write them back out without any lookups
    pub fn normalize_only(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        let (dataset, mut summary) = self.load_normalized(input)?;
        summary.written = self.persist(&dataset, output);
        Ok(summary)
    }

    fn load_normalized(&self, input: &Path) -> Result<(Dataset, RunSummary)> {
        let mut dataset = match Dataset::load(input, &self.layout) {
            Ok(dataset) => dataset,
            Err(PipelineError::InputNotFound { path }) => {
                self.diagnostics.record(Event::InputNotFound { path: path.clone() });
                return Err(PipelineError::InputNotFound { path });
            }
            Err(e) => return Err(e),
        };

        let mut summary = RunSummary {
            loaded: dataset.rows.len(),
            ..RunSummary::default()
        };

        let (latitude_idx, longitude_idx) = (dataset.latitude_idx, dataset.longitude_idx);
        for row in &mut dataset.rows {
            self.normalizer.normalize_row(row, latitude_idx, longitude_idx);
        }

        if self.unresolved == UnresolvedRows::Drop {
            dataset.rows.retain(|row| row.is_locatable());
            summary.dropped = summary.loaded - dataset.rows.len();
            if summary.dropped > 0 {
                info!("Dropped {} rows without a usable coordinate", summary.dropped);
            }
        }

        summary.eligible = dataset.rows.iter().filter(|r| r.is_locatable()).count();
        Ok((dataset, summary))
    }

    /// Attach results positionally. Refuses to merge when counts differ.
    fn merge(&self, dataset: &mut Dataset, results: Vec<LookupResult>) -> bool {
        if results.len() != dataset.rows.len() {
            self.diagnostics.record(Event::CountMismatch {
                rows: dataset.rows.len(),
                results: results.len(),
            });
            return false;
        }

        for (row, result) in dataset.rows.iter_mut().zip(results) {
            row.lookup = Some(result);
        }
        dataset.enriched = true;
        true
    }

    fn persist(&self, dataset: &Dataset, output: &Path) -> bool {
        match dataset.write(output, self.layout.delimiter) {
            Ok(()) => true,
            Err(e) => {
                self.diagnostics.record(Event::WriteFailed {
                    path: output.to_path_buf(),
                    message: e.to_string(),
                });
                false
            }
        }
    }
}
