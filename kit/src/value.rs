//! The document tree produced by a parse.

use core::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use indexmap::IndexMap;

/// Insertion-ordered mapping from keys to values.
pub type Table = IndexMap<String, Value>;

// ANCHOR: value
/// A TOML value.
///
/// An array of tables is an [`Value::Array`] whose items are all
/// [`Value::Table`]s; there is no separate variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    OffsetDateTime(DateTime<FixedOffset>),
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
    Array(Vec<Value>),
    Table(Table),
}
// ANCHOR_END: value

const DATE: &str = "%Y-%m-%d";
const TIME: &str = "%H:%M:%S";
const DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S";

/// Fractional seconds without trailing zeros; empty for whole seconds.
fn fraction(nanos: u32) -> String {
    match nanos % 1_000_000_000 {
        0 => String::new(),
        nanos => format!(".{:09}", nanos).trim_end_matches('0').to_string(),
    }
}

impl Value {
    /// Human-readable name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::OffsetDateTime(_) => "offset date-time",
            Value::LocalDateTime(_) => "local date-time",
            Value::LocalDate(_) => "local date",
            Value::LocalTime(_) => "local time",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_offset_date_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::OffsetDateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_local_date_time(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::LocalDateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_local_date(&self) -> Option<&NaiveDate> {
        match self {
            Value::LocalDate(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_local_time(&self) -> Option<&NaiveTime> {
        match self {
            Value::LocalTime(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Whether this is a non-empty array holding only tables.
    pub fn is_table_array(&self) -> bool {
        matches!(self, Value::Array(items) if !items.is_empty() && items.iter().all(|v| matches!(v, Value::Table(_))))
    }

    /// ISO-8601 text of a date/time value. Offsets of zero render as `Z`;
    /// fractional seconds keep only their significant digits.
    pub fn to_iso8601(&self) -> Option<String> {
        match self {
            Value::OffsetDateTime(dt) => {
                let mut text = dt.format(DATE_TIME).to_string();
                text.push_str(&fraction(dt.nanosecond()));
                if dt.offset().local_minus_utc() == 0 {
                    text.push('Z');
                } else {
                    text.push_str(&dt.format("%:z").to_string());
                }
                Some(text)
            }
            Value::LocalDateTime(dt) => {
                Some(format!("{}{}", dt.format(DATE_TIME), fraction(dt.nanosecond())))
            }
            Value::LocalDate(d) => Some(d.format(DATE).to_string()),
            Value::LocalTime(t) => Some(format!("{}{}", t.format(TIME), fraction(t.nanosecond()))),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Inline TOML-like rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s.escape_debug()),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) if x.is_nan() => f.write_str("nan"),
            Value::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "inf" } else { "-inf" })
            }
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Table(table) => {
                if table.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in table.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?} = {value}")?;
                }
                f.write_str(" }")
            }
            other => f.write_str(&other.to_iso8601().unwrap_or_default()),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Value::Table(table)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_only_their_variant() {
        let v = Value::Integer(3);
        assert_eq!(v.as_integer(), Some(3));
        assert_eq!(v.as_float(), None);
        assert_eq!(v.type_name(), "integer");
    }

    #[test]
    fn iso8601_rendering() {
        let dt = DateTime::parse_from_rfc3339("1979-05-27T07:32:00Z").unwrap();
        assert_eq!(
            Value::OffsetDateTime(dt).to_iso8601().as_deref(),
            Some("1979-05-27T07:32:00Z")
        );

        let dt = DateTime::parse_from_rfc3339("1979-05-27T00:32:00.999999-07:00").unwrap();
        assert_eq!(
            Value::OffsetDateTime(dt).to_iso8601().as_deref(),
            Some("1979-05-27T00:32:00.999999-07:00")
        );

        let t = NaiveTime::from_hms_opt(7, 32, 0).unwrap();
        assert_eq!(Value::LocalTime(t).to_iso8601().as_deref(), Some("07:32:00"));
    }

    #[test_case::test_case(500_000_000, "07:32:00.5" ; "half second")]
    #[test_case::test_case(120_000_000, "07:32:00.12" ; "two digits")]
    #[test_case::test_case(999_999, "07:32:00.000999999" ; "nanoseconds")]
    fn fractional_seconds_keep_significant_digits(nanos: u32, expected: &str) {
        let t = NaiveTime::from_hms_nano_opt(7, 32, 0, nanos).unwrap();
        assert_eq!(Value::LocalTime(t).to_iso8601().as_deref(), Some(expected));
    }

    #[test]
    fn display_is_inline_toml() {
        let mut table = Table::new();
        table.insert("a".into(), Value::from(vec![Value::from(1_i64), Value::from(1.5_f64)]));
        table.insert("b c".into(), Value::from("x\"y"));
        assert_eq!(
            Value::Table(table).to_string(),
            r#"{ "a" = [1, 1.5], "b c" = "x\"y" }"#
        );
    }

    #[test]
    fn table_arrays() {
        assert!(Value::Array(vec![Value::Table(Table::new())]).is_table_array());
        assert!(!Value::Array(vec![]).is_table_array());
        assert!(!Value::Array(vec![Value::from(true)]).is_table_array());
    }
}
