//! Coordinate repair.
//!
//! Source sheets store coordinates as concatenated digits with the decimal
//! point missing, e.g. `2334567` for 23.34567. The repair assumes a fixed-width
//! degrees convention (two integer digits for latitude, three for longitude)
//! and is therefore lossy for values such as `-5.1`.
//!
//! A misplaced point is only corrected under [`NormalizePolicy::DigitShift`], or
//! under the default [`NormalizePolicy::PreserveDecimal`] when the value as
//! written is out of range. An in-range `2.334567` is kept as 2.334567 by the
//! default policy.

mod policy;

pub use policy::{NormalizePolicy, UnresolvedRows};

use std::sync::Arc;

use crate::diagnostics::{Diagnostics, Event};
use crate::models::{Axis, Row};

/// Cell contents treated as "no value", compared case-insensitively
const MISSING_MARKERS: &[&str] = &["", "nan", "na.n", "none", "null"];

pub fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    MISSING_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Repairs raw latitude/longitude cells into validated decimal degrees
#[derive(Clone)]
pub struct Normalizer {
    policy: NormalizePolicy,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Normalizer {
    pub fn new(policy: NormalizePolicy, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            policy,
            diagnostics,
        }
    }

    pub fn policy(&self) -> NormalizePolicy {
        self.policy
    }

    pub fn normalize_latitude(&self, raw: &str) -> Option<f64> {
        self.normalize(Axis::Latitude, raw)
    }

    pub fn normalize_longitude(&self, raw: &str) -> Option<f64> {
        self.normalize(Axis::Longitude, raw)
    }

    /// Repair one cell. Every rejection is reported and yields `None`.
    pub fn normalize(&self, axis: Axis, raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if is_missing(trimmed) {
            self.diagnostics.record(Event::MissingValue {
                axis,
                raw: raw.to_string(),
            });
            return None;
        }

        let value = match self.policy {
            NormalizePolicy::DigitShift => self.shift_digits(axis, trimmed)?,
            NormalizePolicy::PreserveDecimal => match parse_punctuated(trimmed) {
                Some(v) if axis.contains(v) => v,
                _ => self.shift_digits(axis, trimmed)?,
            },
            NormalizePolicy::DecimalComma => match trimmed.replace(',', ".").parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    self.diagnostics.record(Event::Unparseable {
                        axis,
                        raw: raw.to_string(),
                    });
                    return None;
                }
            },
        };

        if axis.contains(value) {
            Some(value)
        } else {
            self.diagnostics.record(Event::OutOfRange { axis, value });
            None
        }
    }

    /// Fill in both normalized halves of a row from its raw cells
    pub fn normalize_row(&self, row: &mut Row, latitude_idx: usize, longitude_idx: usize) {
        row.latitude = self.normalize_latitude(row.raw(latitude_idx));
        row.longitude = self.normalize_longitude(row.raw(longitude_idx));
    }

    fn shift_digits(&self, axis: Axis, raw: &str) -> Option<f64> {
        let (negative, body) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };

        let digits: String = body
            .chars()
            .filter(|c| !matches!(c, '.' | ',') && !c.is_whitespace())
            .collect();

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            self.diagnostics.record(Event::Unparseable {
                axis,
                raw: raw.to_string(),
            });
            return None;
        }

        let width = axis.degree_digits();
        if digits.len() < width {
            self.diagnostics.record(Event::TooShort {
                axis,
                raw: raw.to_string(),
            });
            return None;
        }

        let (degrees, fraction) = digits.split_at(width);
        let repaired = if fraction.is_empty() {
            degrees.to_string()
        } else {
            format!("{}.{}", degrees, fraction)
        };

        match repaired.parse::<f64>() {
            Ok(v) if negative => Some(-v),
            Ok(v) => Some(v),
            Err(_) => {
                self.diagnostics.record(Event::Unparseable {
                    axis,
                    raw: raw.to_string(),
                });
                None
            }
        }
    }
}

/// Parse a value that already carries exactly one decimal separator
fn parse_punctuated(raw: &str) -> Option<f64> {
    let separators = raw.chars().filter(|c| matches!(c, '.' | ',')).count();
    if separators != 1 {
        return None;
    }
    raw.replace(',', ".").parse::<f64>().ok()
}
