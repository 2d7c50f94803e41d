//! JSON rendering of a parsed tree.
//!
//! Tables keep their insertion order. Non-finite floats have no JSON form and
//! become `null`; date/times become ISO-8601 strings.

use std::io;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::TomlError;
use crate::value::{Table, Value};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(x) if x.is_finite() => serializer.serialize_f64(*x),
            Value::Float(_) => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Table(table) => JsonTable(table).serialize(serializer),
            other => serializer.serialize_str(&other.to_iso8601().unwrap_or_default()),
        }
    }
}

/// Serializes a [`Table`] as a JSON object.
pub struct JsonTable<'a>(pub &'a Table);

impl Serialize for JsonTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Compact JSON text of `table`.
pub fn to_string(table: &Table) -> Result<String, TomlError> {
    Ok(serde_json::to_string(&JsonTable(table))?)
}

/// Writes compact JSON of `table` to `writer`.
pub fn write<W: io::Write>(table: &Table, writer: W) -> Result<(), TomlError> {
    Ok(serde_json::to_writer(writer, &JsonTable(table))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn keys_with_dots_stay_single_keys() {
        let mut name = Table::new();
        name.insert("name".into(), Value::from("pug"));
        let mut tater = Table::new();
        tater.insert("type".into(), Value::Table(name));
        let mut dog = Table::new();
        dog.insert("tater.man".into(), Value::Table(tater));
        let mut root = Table::new();
        root.insert("dog".into(), Value::Table(dog));

        assert_eq!(
            to_string(&root).unwrap(),
            r#"{"dog":{"tater.man":{"type":{"name":"pug"}}}}"#
        );
    }

    #[test]
    fn non_finite_floats_are_null() {
        let mut root = Table::new();
        root.insert("a".into(), Value::Float(f64::NAN));
        root.insert("b".into(), Value::Float(f64::NEG_INFINITY));
        root.insert("c".into(), Value::Float(0.5));
        assert_eq!(to_string(&root).unwrap(), r#"{"a":null,"b":null,"c":0.5}"#);
    }

    #[test]
    fn dates_are_strings_and_order_is_kept() {
        let mut root = Table::new();
        root.insert("z".into(), Value::Integer(1));
        root.insert(
            "d".into(),
            Value::LocalDate(NaiveDate::from_ymd_opt(1979, 5, 27).unwrap()),
        );
        let mut out = Vec::new();
        write(&root, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"{"z":1,"d":"1979-05-27"}"#);
    }
}
