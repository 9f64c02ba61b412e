//! Data models for resolved plural forms
//!
//! This module defines the values handed back to callers: the per-noun form
//! mapping and the wrapper pairing a result with the diagnostics recorded
//! while producing it.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::diagnostics::Diagnostic;

/// A noun's value in one category column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryForm {
    /// Category column name from the contract
    pub column: String,
    /// Stored word form, `None` if the column held NULL
    pub value: Option<String>,
}

/// Mapping from category column to a noun's form, in contract order
///
/// Columns the contract names but the table lacks have no entry. A column
/// that exists but is NULL for the noun has an entry with `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NounForms {
    forms: Vec<CategoryForm>,
}

impl NounForms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `column`; an existing entry is overwritten in place
    pub fn insert(&mut self, column: &str, value: Option<String>) {
        match self.forms.iter_mut().find(|f| f.column == column) {
            Some(form) => form.value = value,
            None => self.forms.push(CategoryForm {
                column: column.to_string(),
                value,
            }),
        }
    }

    /// Look up a category column
    ///
    /// `None` if the column has no entry, `Some(None)` if it held NULL.
    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.forms
            .iter()
            .find(|f| f.column == column)
            .map(|f| f.value.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryForm> {
        self.forms.iter()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl Serialize for NounForms {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.forms.len()))?;
        for form in &self.forms {
            map.serialize_entry(&form.column, &form.value)?;
        }
        map.end()
    }
}

/// A result together with the non-fatal conditions met while producing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Resolution<T> {
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    /// Whether a diagnostic matching `predicate` was recorded
    pub fn has_diagnostic(&self, predicate: impl Fn(&Diagnostic) -> bool) -> bool {
        self.diagnostics.iter().any(predicate)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
