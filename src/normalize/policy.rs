//! How raw coordinate text is repaired.

use serde::{Deserialize, Serialize};

/// Repair strategy for raw coordinate cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizePolicy {
    /// Strip every separator and reinsert the point after the degree digits
    DigitShift,
    /// Keep values that already carry a single in-range decimal point; shift the rest
    #[default]
    PreserveDecimal,
    /// Only swap a decimal comma for a point
    DecimalComma,
}

impl std::str::FromStr for NormalizePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digit-shift" => Ok(NormalizePolicy::DigitShift),
            "preserve-decimal" => Ok(NormalizePolicy::PreserveDecimal),
            "decimal-comma" => Ok(NormalizePolicy::DecimalComma),
            other => Err(format!(
                "unknown normalize policy '{}' (expected digit-shift, preserve-decimal or decimal-comma)",
                other
            )),
        }
    }
}

/// What happens to rows whose coordinates cannot be recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedRows {
    /// Leave them out of the output
    #[default]
    Drop,
    /// Write them with the not-found placeholders
    Keep,
}

impl std::str::FromStr for UnresolvedRows {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(UnresolvedRows::Drop),
            "keep" => Ok(UnresolvedRows::Keep),
            other => Err(format!(
                "unknown unresolved-row policy '{}' (expected drop or keep)",
                other
            )),
        }
    }
}
