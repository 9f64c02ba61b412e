//! # plural-core
//!
//! Resolves the plural (numerically indexed) forms of nouns from per-language
//! SQLite data.
//!
//! This crate provides:
//! - Numeric-category contracts naming a language's singular and category columns
//! - Read-only access to `{language}LanguageData.sqlite` noun tables
//! - Enumeration of every category value and per-noun form lookup
//! - C FFI exports for cross-platform integration (Android, iOS)
//!
//! ## Usage
//!
//! ```ignore
//! use plural_core::{DataContract, open};
//!
//! let contract = DataContract::load("/path/to/contracts/en.json")?;
//! let resolver = open("/path/to/databases");
//! let forms = resolver.resolve_noun_forms("English", contract.numbers(), "cat")?;
//! if let Some(Some(plural)) = forms.value.get("plural") {
//!     println!("cat -> {}", plural);
//! }
//! ```

pub mod contract;
pub mod db;
pub mod diagnostics;
pub mod ffi;
pub mod models;
pub mod query;
pub mod resolver;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use contract::{DataContract, NumericCategoryContract};
pub use db::{NounRow, NounStore, NounTable, SqliteNounStore, StoreConfig};
pub use diagnostics::Diagnostic;
pub use models::{CategoryForm, NounForms, Resolution};
pub use resolver::PluralFormResolver;

/// Errors that can occur in plural-core operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Numeric category contract is missing or empty")]
    ContractMissingOrEmpty,

    #[error("Storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query construction failed: {0}")]
    QueryConstructionFailed(String),

    #[error("Invalid language identifier: {0:?}")]
    InvalidLanguage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for plural-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Create a resolver over the language databases in `data_dir`
///
/// No file is opened here; every lookup opens its own read-only connection.
///
/// # Example
///
/// ```ignore
/// let resolver = plural_core::open("/data/databases");
/// ```
pub fn open(data_dir: impl AsRef<Path>) -> PluralFormResolver<SqliteNounStore> {
    PluralFormResolver::new(SqliteNounStore::new(data_dir.as_ref()))
}

/// List every category value in `language`'s noun table
///
/// Diagnostics are logged and dropped; use
/// [`PluralFormResolver::enumerate_category_values`] to inspect them.
///
/// # Arguments
///
/// * `data_dir` - Directory holding the language databases
/// * `language` - Language identifier, e.g. `"English"`
/// * `contract` - The language's numeric-category contract
pub fn enumerate_category_values(
    data_dir: impl AsRef<Path>,
    language: &str,
    contract: Option<&NumericCategoryContract>,
) -> Result<Vec<String>> {
    open(data_dir)
        .enumerate_category_values(language, contract)
        .map(Resolution::into_value)
}

/// Look up a noun's form in every category column
///
/// Returns an empty mapping when the contract is missing or the noun is
/// unknown.
///
/// # Example
///
/// ```ignore
/// let forms = plural_core::resolve_noun_forms(dir, "English", contract.numbers(), "cat")?;
/// ```
pub fn resolve_noun_forms(
    data_dir: impl AsRef<Path>,
    language: &str,
    contract: Option<&NumericCategoryContract>,
    noun: &str,
) -> Result<NounForms> {
    open(data_dir)
        .resolve_noun_forms(language, contract, noun)
        .map(Resolution::into_value)
}
