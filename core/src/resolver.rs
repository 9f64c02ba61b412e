//! Plural form resolution
//!
//! Each operation is one read-only transaction: validate the contract, open
//! the language's noun table, bind the contract's columns against the
//! table's columns, scan, and release the handle.
//!
//! Binding happens once per call. The resulting projection lists the
//! category columns that exist, in contract order, and that order is used
//! both to read row values and to assemble the result.

use crate::contract::NumericCategoryContract;
use crate::db::{NounRow, NounStore, NounTable, SINGULAR_COLUMN};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::models::{NounForms, Resolution};
use crate::query::NounQuery;
use crate::{Error, Result};

/// Resolves plural forms against a [`NounStore`]
#[derive(Debug, Clone)]
pub struct PluralFormResolver<S> {
    store: S,
}

impl<S: NounStore> PluralFormResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// List every category value of every noun in `language`'s table
    ///
    /// Values are flattened in row order, then contract order. NULL values
    /// are skipped, so a table of R rows and a contract of N entries yields
    /// at most N*R values.
    ///
    /// # Errors
    ///
    /// - [`Error::ContractMissingOrEmpty`] before any storage access
    /// - [`Error::StorageUnavailable`] if the database cannot be opened
    /// - [`Error::QueryConstructionFailed`] if the scan cannot be built or run
    pub fn enumerate_category_values(
        &self,
        language: &str,
        contract: Option<&NumericCategoryContract>,
    ) -> Result<Resolution<Vec<String>>> {
        let mut diagnostics = Diagnostics::new();
        let contract = match usable(contract) {
            Some(c) => c,
            None => {
                diagnostics.record(Diagnostic::ContractMissingOrEmpty);
                return Err(Error::ContractMissingOrEmpty);
            }
        };

        let table = self.store.open(language)?;
        let columns = table.columns()?;
        let projection = bind_columns(contract.category_columns(), &columns, &mut diagnostics);

        let mut values = Vec::new();
        if !projection.is_empty() {
            let query = NounQuery::all(projection);
            let width = query.projection.len();
            let rows = table.scan(&query, &mut |row| {
                for index in 0..width {
                    if let Some(value) = row.text(index)? {
                        values.push(value);
                    }
                }
                Ok(())
            })?;
            if rows == 0 {
                diagnostics.record(Diagnostic::EmptyResult);
            }
        }

        log::debug!(
            "Enumerated {} category values for '{}'",
            values.len(),
            language
        );
        Ok(Resolution::new(values, diagnostics.into_vec()))
    }

    /// Look up `noun` and return its value in every category column
    ///
    /// The noun is matched against every singular-form column the contract
    /// names (and the table has). When the table has none of them, the
    /// `singular` column is matched instead. If several rows match, the first
    /// wins.
    ///
    /// An absent or empty contract is not an error here: the result is an
    /// empty mapping with a [`Diagnostic::ContractMissingOrEmpty`], and
    /// storage is never touched. A noun that matches nothing also yields an
    /// empty mapping.
    ///
    /// # Errors
    ///
    /// - [`Error::StorageUnavailable`] if the database cannot be opened
    /// - [`Error::QueryConstructionFailed`] if neither a singular-form column
    ///   of the contract nor `singular` exists, or the lookup cannot be run
    pub fn resolve_noun_forms(
        &self,
        language: &str,
        contract: Option<&NumericCategoryContract>,
        noun: &str,
    ) -> Result<Resolution<NounForms>> {
        let mut diagnostics = Diagnostics::new();
        let contract = match usable(contract) {
            Some(c) => c,
            None => {
                diagnostics.record(Diagnostic::ContractMissingOrEmpty);
                return Ok(Resolution::new(NounForms::new(), diagnostics.into_vec()));
            }
        };

        let table = self.store.open(language)?;
        let columns = table.columns()?;
        let mut candidates = bind_columns(contract.singular_columns(), &columns, &mut diagnostics);
        if candidates.is_empty() {
            if !columns.iter().any(|c| c == SINGULAR_COLUMN) {
                return Err(Error::QueryConstructionFailed(format!(
                    "none of the singular-form columns {:?} nor '{}' exist",
                    contract.singular_columns().collect::<Vec<_>>(),
                    SINGULAR_COLUMN
                )));
            }
            log::debug!("Matching '{}' against '{}'", noun, SINGULAR_COLUMN);
            candidates.push(SINGULAR_COLUMN.to_string());
        }
        let projection = bind_columns(contract.category_columns(), &columns, &mut diagnostics);

        let forms = if projection.is_empty() {
            NounForms::new()
        } else {
            let query = NounQuery::by_singular(projection, candidates, noun);
            lookup(&*table, &query, &mut diagnostics)?
        };

        Ok(Resolution::new(forms, diagnostics.into_vec()))
    }
}

/// Run a noun lookup and pair the first row's values with the projection
fn lookup(
    table: &dyn NounTable,
    query: &NounQuery,
    diagnostics: &mut Diagnostics,
) -> Result<NounForms> {
    let mut forms: Option<NounForms> = None;
    let rows = table.scan(query, &mut |row| {
        if forms.is_none() {
            forms = Some(read_forms(row, &query.projection)?);
        }
        Ok(())
    })?;

    match rows {
        0 => diagnostics.record(Diagnostic::EmptyResult),
        1 => {}
        n => diagnostics.record(Diagnostic::AmbiguousNoun {
            noun: query.filter.as_ref().map(|f| f.noun.clone()).unwrap_or_default(),
            rows: n,
        }),
    }

    Ok(forms.unwrap_or_default())
}

fn read_forms(row: &dyn NounRow, projection: &[String]) -> Result<NounForms> {
    let mut forms = NounForms::new();
    for (index, column) in projection.iter().enumerate() {
        forms.insert(column, row.text(index)?);
    }
    Ok(forms)
}

fn usable(contract: Option<&NumericCategoryContract>) -> Option<&NumericCategoryContract> {
    contract.filter(|c| !c.is_empty())
}

/// Keep the `wanted` columns that exist in `available`, in `wanted` order
///
/// Each missing column is recorded once, however often it is wanted.
fn bind_columns<'a>(
    wanted: impl Iterator<Item = &'a str>,
    available: &[String],
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    let mut missing: Vec<&str> = Vec::new();
    let mut bound = Vec::new();
    for column in wanted {
        if available.iter().any(|c| c == column) {
            bound.push(column.to_string());
        } else if !missing.contains(&column) {
            missing.push(column);
            diagnostics.record(Diagnostic::ColumnNotFound {
                column: column.to_string(),
            });
        }
    }
    bound
}
