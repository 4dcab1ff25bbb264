//! Structured error types shared across pacstat crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`PacError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, line numbers, column names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Records the filesystem path involved in the failure.
    pub fn with_path(self, path: &Path) -> Self {
        self.with_context("path", path.display().to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for table loading, merging and gain computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PacError {
    /// Malformed delimited input (field count, missing header, bad number).
    #[error("format error: {0}")]
    Format(ErrorInfo),
    /// A column the merge needs is absent or not numeric.
    #[error("schema error: {0}")]
    Schema(ErrorInfo),
    /// A gain ratio would divide by a zero expansion count.
    #[error("division error: {0}")]
    Division(ErrorInfo),
    /// Source unreadable or destination unwritable.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Pipeline configuration could not be read or is inconsistent.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl PacError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            PacError::Format(info)
            | PacError::Schema(info)
            | PacError::Division(info)
            | PacError::Io(info)
            | PacError::Config(info) => info,
        }
    }

    /// Short family label, matching the serialized `family` tag.
    pub fn family(&self) -> &'static str {
        match self {
            PacError::Format(_) => "Format",
            PacError::Schema(_) => "Schema",
            PacError::Division(_) => "Division",
            PacError::Io(_) => "Io",
            PacError::Config(_) => "Config",
        }
    }

    /// Wraps an IO failure on `path` under the given code.
    pub fn io(code: &str, path: &Path, err: &std::io::Error) -> Self {
        PacError::Io(
            ErrorInfo::new(code, "filesystem operation failed")
                .with_path(path)
                .with_hint(err.to_string()),
        )
    }
}
