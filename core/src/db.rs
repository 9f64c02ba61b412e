//! SQLite storage for per-language noun tables
//!
//! This module handles all database interactions:
//! - Locating a language's database file
//! - Opening it read-only, one connection per call
//! - Column discovery and row scans over the `nouns` table
//!
//! The [`NounStore`] / [`NounTable`] traits are the seam the resolver is
//! written against, so lookups can run over any row source.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, ErrorCode, OpenFlags};
use serde::Deserialize;

use crate::query::{quote_identifier, NounQuery};
use crate::{Error, Result};

/// Default database file suffix appended to the language identifier
pub const DEFAULT_FILE_SUFFIX: &str = "LanguageData.sqlite";

/// Default noun table name
pub const DEFAULT_TABLE: &str = "nouns";

/// Identifying column matched when none of a contract's keys is a column
pub const SINGULAR_COLUMN: &str = "singular";

/// A source of per-language noun tables
pub trait NounStore {
    /// Acquire a read-only handle on `language`'s noun table
    ///
    /// The handle is released when the returned table is dropped.
    fn open(&self, language: &str) -> Result<Box<dyn NounTable + '_>>;
}

/// An open, read-only noun table
pub trait NounTable {
    /// Names of the columns the table has
    fn columns(&self) -> Result<Vec<String>>;

    /// Run `query`, handing each matching row to `visit`
    ///
    /// Row values are positionally aligned with `query.projection`.
    /// Returns the number of rows visited.
    fn scan(
        &self,
        query: &NounQuery,
        visit: &mut dyn FnMut(&dyn NounRow) -> Result<()>,
    ) -> Result<usize>;
}

/// One result row
pub trait NounRow {
    /// Text of the value at `index`, `None` for NULL
    fn text(&self, index: usize) -> Result<Option<String>>;
}

/// Where language databases live and how they are laid out
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the `{language}{file_suffix}` files
    pub data_dir: PathBuf,
    /// Suffix appended to the language identifier to form the file name
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
    /// Table holding one row per noun
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_file_suffix() -> String {
    DEFAULT_FILE_SUFFIX.to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_suffix: default_file_suffix(),
            table: default_table(),
        }
    }

    /// Path of `language`'s database file
    pub fn database_path(&self, language: &str) -> Result<PathBuf> {
        validate_language(language)?;
        Ok(self
            .data_dir
            .join(format!("{}{}", language, self.file_suffix)))
    }
}

/// Reject identifiers that are empty or could escape the data directory
fn validate_language(language: &str) -> Result<()> {
    if language.is_empty()
        || language.contains(['/', '\\', '\0'])
        || language.contains("..")
    {
        return Err(Error::InvalidLanguage(language.to_string()));
    }
    Ok(())
}

/// Noun store backed by one SQLite file per language
#[derive(Debug, Clone)]
pub struct SqliteNounStore {
    config: StoreConfig,
}

impl SqliteNounStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(StoreConfig::new(data_dir))
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl NounStore for SqliteNounStore {
    fn open(&self, language: &str) -> Result<Box<dyn NounTable + '_>> {
        let path = self.config.database_path(language)?;
        let conn = open_readonly(&path)?;
        log::debug!("Opened {:?} read-only", path);

        Ok(Box::new(SqliteNounTable {
            conn,
            path,
            table: &self.config.table,
        }))
    }
}

/// Open an existing database in read-only mode
///
/// Reads the schema header immediately so a missing, unreadable or corrupt
/// file fails here rather than on the first query.
pub fn open_readonly(path: &Path) -> Result<Connection> {
    let unavailable = |source: rusqlite::Error| Error::StorageUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(unavailable)?;

    conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
        .map_err(unavailable)?;

    Ok(conn)
}

struct SqliteNounTable<'a> {
    conn: Connection,
    path: PathBuf,
    table: &'a str,
}

impl SqliteNounTable<'_> {
    /// Classify a failure to prepare or execute a statement
    fn query_error(&self, err: rusqlite::Error) -> Error {
        match err.sqlite_error_code() {
            Some(
                ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::CannotOpen
                | ErrorCode::PermissionDenied
                | ErrorCode::SystemIoFailure,
            ) => Error::StorageUnavailable {
                path: self.path.clone(),
                source: err,
            },
            _ => Error::QueryConstructionFailed(err.to_string()),
        }
    }
}

impl NounTable for SqliteNounTable<'_> {
    fn columns(&self) -> Result<Vec<String>> {
        let sql = format!("SELECT * FROM {}", quote_identifier(self.table)?);
        let stmt = self.conn.prepare(&sql).map_err(|e| self.query_error(e))?;
        let columns = stmt.column_names().into_iter().map(String::from).collect();

        Ok(columns)
    }

    fn scan(
        &self,
        query: &NounQuery,
        visit: &mut dyn FnMut(&dyn NounRow) -> Result<()>,
    ) -> Result<usize> {
        let sql = query.to_sql(self.table)?;
        log::debug!("Executing: {}", sql);

        let mut stmt = self.conn.prepare(&sql).map_err(|e| self.query_error(e))?;
        let mut rows = stmt
            .query(params_from_iter(query.params()))
            .map_err(|e| self.query_error(e))?;

        let mut visited = 0;
        while let Some(row) = rows.next().map_err(|e| self.query_error(e))? {
            visit(row)?;
            visited += 1;
        }
        Ok(visited)
    }
}

impl NounRow for rusqlite::Row<'_> {
    fn text(&self, index: usize) -> Result<Option<String>> {
        let value = match self
            .get_ref(index)
            .map_err(|e| Error::QueryConstructionFailed(e.to_string()))?
        {
            ValueRef::Null => None,
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Some(String::from_utf8_lossy(bytes).into_owned())
            }
            ValueRef::Integer(i) => Some(i.to_string()),
            ValueRef::Real(f) => Some(f.to_string()),
        };
        Ok(value)
    }
}
