//! Diagnostic events raised while normalizing, geocoding and persisting.
//!
//! Core logic never logs directly; it reports to a [`Diagnostics`] sink so
//! it can be exercised without a subscriber installed.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, error, warn};

use crate::models::{Axis, Coordinate};

/// Something noteworthy that did not stop the run
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Cell held a missing-value marker
    MissingValue { axis: Axis, raw: String },
    /// Fewer digits than the fixed degree width
    TooShort { axis: Axis, raw: String },
    /// Could not be read as a number after repair
    Unparseable { axis: Axis, raw: String },
    /// Parsed, but outside the valid range
    OutOfRange { axis: Axis, value: f64 },
    LookupTimeout { coordinate: Coordinate },
    LookupStatus { coordinate: Coordinate, status: u16 },
    LookupTransport { coordinate: Coordinate, message: String },
    LookupBody { coordinate: Coordinate, message: String },
    /// Response was well formed but carried no `address` object
    NoAddress { coordinate: Coordinate },
    /// Enrichment produced a different number of results than rows
    CountMismatch { rows: usize, results: usize },
    InputNotFound { path: PathBuf },
    WriteFailed { path: PathBuf, message: String },
}

impl Event {
    /// Whether the event points at lost output rather than a bad input cell
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Event::CountMismatch { .. } | Event::InputNotFound { .. } | Event::WriteFailed { .. }
        )
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::MissingValue { axis, raw } => write!(f, "missing {} value {:?}", axis, raw),
            Event::TooShort { axis, raw } => {
                write!(f, "{} {:?} is too short to repair", axis, raw)
            }
            Event::Unparseable { axis, raw } => write!(f, "{} {:?} is not a number", axis, raw),
            Event::OutOfRange { axis, value } => {
                let (min, max) = axis.bounds();
                write!(f, "{} {} outside [{}, {}]", axis, value, min, max)
            }
            Event::LookupTimeout { coordinate } => {
                write!(f, "timeout looking up {}", coordinate)
            }
            Event::LookupStatus { coordinate, status } => {
                write!(f, "geocoder returned status {} for {}", status, coordinate)
            }
            Event::LookupTransport {
                coordinate,
                message,
            } => write!(f, "connection error for {}: {}", coordinate, message),
            Event::LookupBody {
                coordinate,
                message,
            } => write!(f, "unreadable geocoder response for {}: {}", coordinate, message),
            Event::NoAddress { coordinate } => write!(f, "no address found for {}", coordinate),
            Event::CountMismatch { rows, results } => write!(
                f,
                "result count ({}) does not match row count ({}); skipping merge",
                results, rows
            ),
            Event::InputNotFound { path } => {
                write!(f, "input file not found: {}", path.display())
            }
            Event::WriteFailed { path, message } => {
                write!(f, "failed to write {}: {}", path.display(), message)
            }
        }
    }
}

/// Sink for diagnostic events
pub trait Diagnostics: Send + Sync {
    fn record(&self, event: Event);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: Event) {
        match &event {
            e if e.is_error() => error!("{}", e),
            // Blank cells are routine in the source sheets
            Event::MissingValue { .. } => debug!("{}", event),
            _ => warn!("{}", event),
        }
    }
}

/// Keeps every event in memory, in arrival order.
///
/// Test helper: the crate's own tests inject it to assert on what was reported.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<Event>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn record(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
