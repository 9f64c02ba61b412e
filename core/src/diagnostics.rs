//! Non-fatal conditions recorded during a lookup
//!
//! Missing data never aborts a call. Each condition is logged when recorded
//! and returned to the caller with the result.

use std::fmt;

use serde::Serialize;

/// A recovered, non-fatal condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// No usable numeric-category contract was supplied; storage was not touched
    ContractMissingOrEmpty,
    /// A contract column is absent from the noun table
    ColumnNotFound { column: String },
    /// The query matched no rows
    EmptyResult,
    /// A noun lookup matched more than one row; the first one was used
    AmbiguousNoun { noun: String, rows: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ContractMissingOrEmpty => {
                write!(f, "Numeric category contract is missing or empty")
            }
            Diagnostic::ColumnNotFound { column } => {
                write!(f, "Column '{}' not found in the noun table", column)
            }
            Diagnostic::EmptyResult => write!(f, "Query matched no rows"),
            Diagnostic::AmbiguousNoun { noun, rows } => {
                write!(f, "Noun '{}' matched {} rows, using the first", noun, rows)
            }
        }
    }
}

/// Collects diagnostics for a single call
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    recorded: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::ContractMissingOrEmpty | Diagnostic::ColumnNotFound { .. } => {
                log::error!("{}", diagnostic)
            }
            Diagnostic::EmptyResult | Diagnostic::AmbiguousNoun { .. } => {
                log::warn!("{}", diagnostic)
            }
        }
        self.recorded.push(diagnostic);
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.recorded
    }
}
