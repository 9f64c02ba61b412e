//! Numeric-category contracts
//!
//! A language's data contract names the columns of its `nouns` table. The
//! `numbers` section maps each singular-form column to the column holding the
//! word form for one grammatical-number category, e.g. `{"singular": "plural"}`
//! for English or `{"nominativeSingular": "nominativePlural"}` for German.
//!
//! Order matters: it is the canonical order in which category values are
//! extracted and reported, so the contract keeps the order of the JSON document.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Result;

/// Ordered mapping from singular-form column to category column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericCategoryContract {
    entries: Vec<(String, String)>,
}

impl NumericCategoryContract {
    /// Build a contract from `(singular_column, category_column)` pairs
    ///
    /// A repeated singular column replaces the earlier category column but
    /// keeps its original position.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut contract = Self::default();
        for (key, value) in pairs {
            contract.insert(key.into(), value.into());
        }
        contract
    }

    fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Singular-form column names, in contract order
    pub fn singular_columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Category column names, in contract order
    ///
    /// Two singular columns may share a category column; it is then listed twice.
    pub fn category_columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    /// Iterate over `(singular_column, category_column)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for NumericCategoryContract {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ContractVisitor;

        impl<'de> Visitor<'de> for ContractVisitor {
            type Value = NumericCategoryContract;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of singular-form column to category column")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut contract = NumericCategoryContract::default();
                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    contract.insert(key, value);
                }
                Ok(contract)
            }
        }

        deserializer.deserialize_map(ContractVisitor)
    }
}

impl Serialize for NumericCategoryContract {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

/// The part of a language's JSON data contract read by this crate
///
/// Other sections (genders, conjugations, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DataContract {
    /// Singular-form column to category column mapping
    #[serde(default)]
    pub numbers: Option<NumericCategoryContract>,
}

impl DataContract {
    /// Parse a data contract from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a data contract file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The numeric-category contract, if present and non-empty
    pub fn numbers(&self) -> Option<&NumericCategoryContract> {
        self.numbers.as_ref().filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_preserves_document_order() {
        let json = r#"{"zeta": "z_form", "alpha": "a_form", "mid": "m_form"}"#;
        let contract: NumericCategoryContract = serde_json::from_str(json).unwrap();

        let keys: Vec<_> = contract.singular_columns().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        let values: Vec<_> = contract.category_columns().collect();
        assert_eq!(values, vec!["z_form", "a_form", "m_form"]);
    }

    #[test]
    fn test_repeated_key_replaces_in_place() {
        let contract = NumericCategoryContract::new([("a", "x"), ("b", "y"), ("a", "z")]);
        assert_eq!(contract.len(), 2);
        let pairs: Vec<_> = contract.iter().collect();
        assert_eq!(pairs, vec![("a", "z"), ("b", "y")]);
    }

    #[test]
    fn test_shared_category_column_is_listed_twice() {
        let contract = NumericCategoryContract::new([("a", "plural"), ("b", "plural")]);
        let values: Vec<_> = contract.category_columns().collect();
        assert_eq!(values, vec!["plural", "plural"]);
    }

    #[test]
    fn test_data_contract_ignores_other_sections() {
        let json = r#"{
            "numbers": {"nominativeSingular": "nominativePlural"},
            "genders": {"canonical": ["gender"]},
            "conjugations": {}
        }"#;
        let data = DataContract::from_json(json).unwrap();
        let numbers = data.numbers().unwrap();
        assert_eq!(
            numbers.iter().collect::<Vec<_>>(),
            vec![("nominativeSingular", "nominativePlural")]
        );
    }

    #[test]
    fn test_data_contract_empty_numbers_is_absent() {
        let data = DataContract::from_json(r#"{"numbers": {}}"#).unwrap();
        assert!(data.numbers.is_some());
        assert!(data.numbers().is_none());

        let data = DataContract::from_json("{}").unwrap();
        assert!(data.numbers().is_none());
    }

    #[test]
    fn test_data_contract_rejects_non_string_columns() {
        let result = DataContract::from_json(r#"{"numbers": {"singular": 3}}"#);
        assert!(matches!(result, Err(crate::Error::Json(_))));
    }

    #[test]
    fn test_serialize_round_trips_order() {
        let contract = NumericCategoryContract::new([("b", "two"), ("a", "one")]);
        let json = serde_json::to_string(&contract).unwrap();
        assert_eq!(json, r#"{"b":"two","a":"one"}"#);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en.json");
        std::fs::write(&path, r#"{"numbers": {"singular": "plural"}}"#).unwrap();

        let data = DataContract::load(&path).unwrap();
        assert_eq!(data.numbers().unwrap().len(), 1);

        let missing = DataContract::load(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(crate::Error::Io(_))));
    }
}
