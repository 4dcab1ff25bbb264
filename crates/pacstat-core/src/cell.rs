//! Cell values stored in a [`crate::Table`].

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Textual form of [`Cell::Missing`].
pub const NOT_APPLICABLE: &str = "N/A";

/// A single table value.
///
/// Loaded data starts out as [`Cell::Text`]; the merge step promotes the
/// join and ratio columns to numbers and the gain step adds floats and
/// booleans. Absent columns are filled with [`Cell::Missing`] so every
/// record always covers the full header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Cell {
    /// Raw field as read from disk.
    Text(String),
    /// Integer column such as `Expanded`.
    Int(i64),
    /// Floating point column such as `epsilon` or a gain ratio.
    Float(f64),
    /// Boolean flag such as `HasGainFMin`.
    Bool(bool),
    /// Column not applicable to this record.
    Missing,
}

impl Cell {
    /// Builds a cell from a raw field, mapping the sentinel back to [`Cell::Missing`].
    pub fn from_field(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == NOT_APPLICABLE {
            Cell::Missing
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// Whether the cell is the "not applicable" sentinel.
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric view of the cell. Text is parsed, the sentinel and booleans are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Text(text) => text.trim().parse::<f64>().ok(),
            Cell::Int(value) => Some(*value as f64),
            Cell::Float(value) => Some(*value),
            Cell::Bool(_) | Cell::Missing => None,
        }
    }

    /// Integer view of the cell. Text must be a plain integer literal.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Text(text) => text.trim().parse::<i64>().ok(),
            Cell::Int(value) => Some(*value),
            Cell::Float(_) | Cell::Bool(_) | Cell::Missing => None,
        }
    }

    /// Borrowed text when the cell still holds a raw field.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Int(value) => write!(f, "{value}"),
            // Debug keeps the trailing ".0" on integral floats.
            Cell::Float(value) => write!(f, "{value:?}"),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Missing => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_keep_decimal_point() {
        assert_eq!(Cell::Float(1.0).to_string(), "1.0");
        assert_eq!(Cell::Float(0.25).to_string(), "0.25");
        assert_eq!(Cell::Float(1.6).to_string(), "1.6");
    }

    #[test]
    fn sentinel_roundtrips_through_field() {
        assert_eq!(Cell::from_field(" N/A "), Cell::Missing);
        assert_eq!(Cell::Missing.to_string(), NOT_APPLICABLE);
        assert_eq!(Cell::from_field(" 42 "), Cell::Text("42".into()));
    }

    #[test]
    fn numeric_views() {
        assert_eq!(Cell::from("17").as_i64(), Some(17));
        assert_eq!(Cell::from("17.5").as_i64(), None);
        assert_eq!(Cell::from("0.1").as_f64(), Some(0.1));
        assert_eq!(Cell::Missing.as_f64(), None);
        assert_eq!(Cell::Bool(true).to_string(), "True");
    }
}
