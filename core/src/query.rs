//! Query construction for noun tables
//!
//! Column names come from the contract, so they are never spliced into SQL
//! raw: every identifier is double-quoted with embedded quotes doubled, and
//! the noun itself is always a bound parameter.

use crate::{Error, Result};

/// Singular-form predicate: matches a row where any candidate column equals `noun`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingularFilter {
    pub columns: Vec<String>,
    pub noun: String,
}

/// A selection over a noun table
///
/// `projection` lists the category columns to read, in contract order. Row
/// values handed back by a [`NounTable`](crate::db::NounTable) scan are
/// positionally aligned with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NounQuery {
    pub projection: Vec<String>,
    pub filter: Option<SingularFilter>,
}

impl NounQuery {
    /// Full-table scan reading `projection` from every row
    pub fn all(projection: Vec<String>) -> Self {
        Self {
            projection,
            filter: None,
        }
    }

    /// Rows whose singular-form columns match `noun`
    pub fn by_singular(projection: Vec<String>, columns: Vec<String>, noun: &str) -> Self {
        Self {
            projection,
            filter: Some(SingularFilter {
                columns,
                noun: noun.to_string(),
            }),
        }
    }

    /// Render the query as SQL against `table`
    ///
    /// The noun, if any, is parameter `?1`; see [`NounQuery::params`].
    pub fn to_sql(&self, table: &str) -> Result<String> {
        if self.projection.is_empty() {
            return Err(Error::QueryConstructionFailed(
                "no category columns to select".to_string(),
            ));
        }

        let columns = self
            .projection
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let mut sql = format!("SELECT {} FROM {}", columns, quote_identifier(table)?);

        if let Some(filter) = &self.filter {
            if filter.columns.is_empty() {
                return Err(Error::QueryConstructionFailed(
                    "no singular-form columns to match against".to_string(),
                ));
            }
            let predicate = filter
                .columns
                .iter()
                .map(|c| quote_identifier(c).map(|q| format!("{} = ?1", q)))
                .collect::<Result<Vec<_>>>()?
                .join(" OR ");
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }

        Ok(sql)
    }

    /// Bound parameters for the SQL produced by [`NounQuery::to_sql`]
    pub fn params(&self) -> Vec<&str> {
        self.filter
            .iter()
            .map(|f| f.noun.as_str())
            .collect()
    }
}

/// Quote an SQL identifier
///
/// Rejects empty names and names containing NUL, which SQLite cannot represent.
pub fn quote_identifier(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::QueryConstructionFailed(
            "empty identifier".to_string(),
        ));
    }
    if name.contains('\0') {
        return Err(Error::QueryConstructionFailed(format!(
            "identifier contains NUL: {:?}",
            name
        )));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("plural").unwrap(), "\"plural\"");
        assert_eq!(
            quote_identifier("we\"ird").unwrap(),
            "\"we\"\"ird\""
        );
        assert!(quote_identifier("").is_err());
        assert!(quote_identifier("a\0b").is_err());
    }

    #[test]
    fn test_full_scan_sql() {
        let query = NounQuery::all(strings(&["form_one", "form_many"]));
        assert_eq!(
            query.to_sql("nouns").unwrap(),
            "SELECT \"form_one\", \"form_many\" FROM \"nouns\""
        );
        assert!(query.params().is_empty());
    }

    #[test]
    fn test_lookup_sql_reuses_single_parameter() {
        let query = NounQuery::by_singular(
            strings(&["plural"]),
            strings(&["singular", "nominativeSingular"]),
            "cat",
        );
        assert_eq!(
            query.to_sql("nouns").unwrap(),
            "SELECT \"plural\" FROM \"nouns\" WHERE \"singular\" = ?1 OR \"nominativeSingular\" = ?1"
        );
        assert_eq!(query.params(), vec!["cat"]);
    }

    #[test]
    fn test_hostile_column_name_stays_an_identifier() {
        let query = NounQuery::by_singular(
            strings(&["plural\" FROM sqlite_master --"]),
            strings(&["singular"]),
            "x' OR '1'='1",
        );
        let sql = query.to_sql("nouns").unwrap();
        assert_eq!(
            sql,
            "SELECT \"plural\"\" FROM sqlite_master --\" FROM \"nouns\" WHERE \"singular\" = ?1"
        );
        assert_eq!(query.params(), vec!["x' OR '1'='1"]);
    }

    #[test]
    fn test_empty_projection_fails() {
        let query = NounQuery::all(Vec::new());
        assert!(matches!(
            query.to_sql("nouns"),
            Err(Error::QueryConstructionFailed(_))
        ));
    }

    #[test]
    fn test_zero_singular_candidates_fails() {
        let query = NounQuery::by_singular(strings(&["plural"]), Vec::new(), "cat");
        assert!(matches!(
            query.to_sql("nouns"),
            Err(Error::QueryConstructionFailed(_))
        ));
    }
}
