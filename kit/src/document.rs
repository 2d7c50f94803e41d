//! The result of a parse.

use core::fmt;
use std::io;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::TomlError;
use crate::json;
use crate::query::{self, FromValue};
use crate::value::{Table, Value};

// ANCHOR: toml
/// A parsed document: the root table and every diagnostic raised while
/// producing it.
///
/// A `Toml` is never "failed". Malformed input yields whatever tree could be
/// built plus a non-empty [`errors`](Toml::errors) list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Toml {
    root: Table,
    errors: Vec<String>,
}
// ANCHOR_END: toml

impl Toml {
    pub(crate) fn new(root: Table, errors: Vec<String>) -> Self {
        Self { root, errors }
    }

    /// An empty tree carrying a single diagnostic.
    pub(crate) fn failed(message: String) -> Self {
        Self {
            root: Table::new(),
            errors: vec![message],
        }
    }

    pub fn root(&self) -> &Table {
        &self.root
    }

    /// Diagnostics in the order they were raised; syntax errors first.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_parts(self) -> (Table, Vec<String>) {
        (self.root, self.errors)
    }

    /// The value at a `/`-separated path. See [`query`](crate::query).
    pub fn get_value(&self, path: &str) -> Option<&Value> {
        query::lookup(&self.root, path)
    }

    /// The value at `path` read as `T`.
    pub fn get<'a, T: FromValue<'a>>(&'a self, path: &str) -> Option<T> {
        query::get(&self.root, path)
    }

    pub fn get_string(&self, path: &str) -> Option<&str> {
        self.get(path)
    }

    pub fn get_integer(&self, path: &str) -> Option<i64> {
        self.get(path)
    }

    pub fn get_float(&self, path: &str) -> Option<f64> {
        self.get(path)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path)
    }

    pub fn get_offset_date_time(&self, path: &str) -> Option<DateTime<FixedOffset>> {
        self.get(path)
    }

    /// An offset date-time converted to UTC.
    pub fn get_instant(&self, path: &str) -> Option<DateTime<Utc>> {
        self.get(path)
    }

    pub fn get_local_date_time(&self, path: &str) -> Option<NaiveDateTime> {
        self.get(path)
    }

    pub fn get_local_date(&self, path: &str) -> Option<NaiveDate> {
        self.get(path)
    }

    pub fn get_local_time(&self, path: &str) -> Option<NaiveTime> {
        self.get(path)
    }

    pub fn get_array(&self, path: &str) -> Option<&[Value]> {
        self.get(path)
    }

    pub fn get_table(&self, path: &str) -> Option<&Table> {
        self.get(path)
    }

    pub fn get_table_array(&self, path: &str) -> Option<Vec<&Table>> {
        self.get(path)
    }

    /// A new document rooted at the table found at `path`, carrying this
    /// document's diagnostics.
    pub fn subtree(&self, path: &str) -> Option<Toml> {
        let table = self.get_table(path)?;
        Some(Toml::new(table.clone(), self.errors.clone()))
    }

    /// Compact JSON of the root table.
    pub fn to_json(&self) -> Result<String, TomlError> {
        json::to_string(&self.root)
    }

    pub fn write_json<W: io::Write>(&self, writer: W) -> Result<(), TomlError> {
        json::write(&self.root, writer)
    }
}

impl fmt::Display for Toml {
    /// Indented dump of the tree, one key per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dump(f, &self.root, 0)
    }
}

fn dump(f: &mut fmt::Formatter<'_>, table: &Table, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    for (key, value) in table {
        match value {
            Value::Table(inner) => {
                writeln!(f, "{indent}{key:?}:")?;
                dump(f, inner, depth + 1)?;
            }
            array if array.is_table_array() => {
                for (i, item) in array.as_array().into_iter().flatten().enumerate() {
                    writeln!(f, "{indent}{key:?}[{i}]:")?;
                    if let Some(inner) = item.as_table() {
                        dump(f, inner, depth + 1)?;
                    }
                }
            }
            other => writeln!(f, "{indent}{key:?} = {other}")?,
        }
    }
    Ok(())
}

// Compile-time assertions for Toml
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Toml>();
    assert_sync::<Toml>();
    assert_send::<Value>();
    assert_sync::<Value>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Toml {
        let mut owner = Table::new();
        owner.insert("name".into(), Value::from("Tom"));
        let mut item = Table::new();
        item.insert("sku".into(), Value::from(738_594_937_i64));

        let mut root = Table::new();
        root.insert("title".into(), Value::from("TOML"));
        root.insert("owner".into(), Value::Table(owner));
        root.insert("items".into(), Value::from(vec![Value::Table(item)]));
        Toml::new(root, vec!["a warning".into()])
    }

    #[test]
    fn typed_getters() {
        let toml = sample();
        assert_eq!(toml.get_string("title"), Some("TOML"));
        assert_eq!(toml.get_string("owner/name"), Some("Tom"));
        assert_eq!(toml.get_integer("items/0/sku"), Some(738_594_937));
        assert_eq!(toml.get_integer("title"), None);
        assert_eq!(toml.get_table_array("items").map(|t| t.len()), Some(1));
    }

    #[test]
    fn subtree_keeps_errors() {
        let toml = sample();
        let owner = toml.subtree("owner").unwrap();
        assert_eq!(owner.get_string("name"), Some("Tom"));
        assert_eq!(owner.errors(), ["a warning"]);
        assert!(toml.subtree("title").is_none());
    }

    #[test]
    fn display_dumps_the_tree() {
        let toml = sample();
        assert_eq!(
            toml.to_string(),
            "\"title\" = \"TOML\"\n\"owner\":\n  \"name\" = \"Tom\"\n\"items\"[0]:\n  \"sku\" = 738594937\n"
        );
    }

    #[test]
    fn failed_document_is_empty() {
        let toml = Toml::failed("boom".into());
        assert!(!toml.is_valid());
        assert!(toml.root().is_empty());
    }
}
