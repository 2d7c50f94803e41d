//! Slash-separated lookups into a parsed tree.
//!
//! A path such as `servers/alpha/ip` or `products/-1/name` is split on `/`;
//! blank segments are ignored. Table segments are keys, array segments are
//! integer indices, negative ones counting from the end. Lookups never fail:
//! a missing key, an index out of range, a non-numeric index or a value of
//! another type all give `None`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::value::{Table, Value};

/// Types a [`Value`] can be read as.
pub trait FromValue<'a>: Sized {
    fn from_value(value: &'a Value) -> Option<Self>;
}

impl<'a> FromValue<'a> for &'a Value {
    fn from_value(value: &'a Value) -> Option<Self> {
        Some(value)
    }
}

impl<'a> FromValue<'a> for &'a str {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl FromValue<'_> for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue<'_> for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer()
    }
}

impl FromValue<'_> for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue<'_> for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue<'_> for DateTime<FixedOffset> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_offset_date_time().copied()
    }
}

/// An offset date-time as an instant in UTC.
impl FromValue<'_> for DateTime<Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_offset_date_time().map(|dt| dt.with_timezone(&Utc))
    }
}

impl FromValue<'_> for NaiveDateTime {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_local_date_time().copied()
    }
}

impl FromValue<'_> for NaiveDate {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_local_date().copied()
    }
}

impl FromValue<'_> for NaiveTime {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_local_time().copied()
    }
}

impl<'a> FromValue<'a> for &'a [Value] {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_array().map(Vec::as_slice)
    }
}

impl<'a> FromValue<'a> for &'a Table {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_table()
    }
}

/// An array whose items are all tables.
impl<'a> FromValue<'a> for Vec<&'a Table> {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_array()?.iter().map(Value::as_table).collect()
    }
}

fn index<'a>(items: &'a [Value], segment: &str) -> Option<&'a Value> {
    let index = segment.trim().parse::<i64>().ok()?;
    let len = i64::try_from(items.len()).ok()?;
    let index = if index < 0 { len + index } else { index };
    items.get(usize::try_from(index).ok()?)
}

/// The value at `path`, if any.
pub fn lookup<'a>(root: &'a Table, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('/').filter(|s| !s.trim().is_empty());
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Table(table) => table.get(segment)?,
            Value::Array(items) => index(items, segment)?,
            _ => return None,
        };
    }
    Some(current)
}

/// The value at `path` read as `T`, if it exists and has that type.
pub fn get<'a, T: FromValue<'a>>(root: &'a Table, path: &str) -> Option<T> {
    lookup(root, path).and_then(T::from_value)
}
