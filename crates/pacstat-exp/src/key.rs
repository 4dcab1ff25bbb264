use std::fmt::{self, Display};

use pacstat_core::{Cell, ErrorInfo, PacError, Record};
use serde::{Deserialize, Serialize};

/// Join key shared by every algorithm source: `(epsilon, instance)`.
///
/// Epsilon is compared by exact value after normalization; the merge step
/// already rounds weight-derived epsilons so they line up with the values
/// parsed from the other sources.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExperimentKey {
    epsilon_bits: u64,
    instance: String,
}

impl ExperimentKey {
    /// Builds a key, folding `-0.0` into `0.0`.
    pub fn new(epsilon: f64, instance: impl Into<String>) -> Self {
        let epsilon = if epsilon == 0.0 { 0.0 } else { epsilon };
        Self {
            epsilon_bits: epsilon.to_bits(),
            instance: instance.into(),
        }
    }

    /// Reads the key columns of a record.
    pub fn from_record(
        record: &Record,
        epsilon_column: &str,
        instance_column: &str,
    ) -> Result<Self, PacError> {
        let epsilon = record
            .get(epsilon_column)
            .and_then(Cell::as_f64)
            .ok_or_else(|| key_error(record, epsilon_column))?;
        let instance = match record.get(instance_column) {
            Some(Cell::Missing) | None => return Err(key_error(record, instance_column)),
            Some(cell) => cell.to_string(),
        };
        Ok(Self::new(epsilon, instance))
    }

    /// Epsilon value of the key.
    pub fn epsilon(&self) -> f64 {
        f64::from_bits(self.epsilon_bits)
    }

    /// Instance identifier as written in the source table.
    pub fn instance(&self) -> &str {
        &self.instance
    }
}

impl Display for ExperimentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(epsilon={:?}, instance={})", self.epsilon(), self.instance)
    }
}

fn key_error(record: &Record, column: &str) -> PacError {
    let value = record
        .get(column)
        .map(ToString::to_string)
        .unwrap_or_else(|| "<absent>".to_string());
    PacError::Schema(
        ErrorInfo::new("key-column", "record cannot supply a join key column")
            .with_context("column", column)
            .with_context("value", value),
    )
}
