//! Concrete syntax tree for TOML documents.
//!
//! Leaves keep the raw source text of their token; un-escaping and scalar
//! coercion happen later, in the tree builder, where failures can be
//! reported against the whole expression.

use crate::error::TomlError;
use crate::span::Spanned;

// ANCHOR: document
/// The root of a TOML document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub expressions: Vec<Spanned<Expression>>,
    /// Syntax errors, in source order. Each one also left an
    /// [`Expression::Error`] in `expressions`.
    pub errors: Vec<TomlError>,
}

/// A single line-level construct.
#[derive(Debug, Clone)]
pub enum Expression {
    /// `key = value`
    KeyValue(KeyValue),
    /// `[name]`
    Table(TableHeader),
    /// `[[name]]`
    ArrayTable(TableHeader),
    /// An expression that failed to parse; the span covers what was skipped.
    /// `header` is set when the line opened with `[` or `[[`.
    Error { header: bool },
}
// ANCHOR_END: document

// ANCHOR: key_value
/// A key-value pair: `key = value`
#[derive(Debug, Clone)]
pub struct KeyValue {
    pub key: Spanned<Key>,
    pub value: Spanned<Value>,
}

/// The key of a `[name]` or `[[name]]` header.
#[derive(Debug, Clone)]
pub struct TableHeader {
    pub key: Spanned<Key>,
}
// ANCHOR_END: key_value

// ANCHOR: key
/// A TOML key, either a single segment or dotted.
#[derive(Debug, Clone)]
pub enum Key {
    Simple(Spanned<SimpleKey>),
    Dotted(DottedKey),
}

/// A dotted key like `server.host.name`
#[derive(Debug, Clone)]
pub struct DottedKey {
    pub first: Spanned<SimpleKey>,
    pub rest: Vec<Spanned<SimpleKey>>,
}

/// A simple (non-dotted) key, holding the text between its quotes.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleKey {
    Bare(String),
    Basic(String),
    Literal(String),
}

impl Key {
    /// Every segment in order.
    pub fn segments(&self) -> Vec<&Spanned<SimpleKey>> {
        match self {
            Key::Simple(key) => vec![key],
            Key::Dotted(dotted) => std::iter::once(&dotted.first)
                .chain(dotted.rest.iter())
                .collect(),
        }
    }
}
// ANCHOR_END: key

// ANCHOR: value
/// A TOML value. Scalars keep their literal text.
#[derive(Debug, Clone)]
pub enum Value {
    String(StringLiteral),
    Integer(String),
    Float(String),
    Boolean(bool),
    OffsetDateTime(String),
    LocalDateTime(String),
    LocalDate(String),
    LocalTime(String),
    Array(Array),
    InlineTable(InlineTable),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Basic,
    MultiLineBasic,
    Literal,
    MultiLineLiteral,
}

/// A string literal with its delimiters removed.
#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub kind: StringKind,
    pub raw: String,
}
// ANCHOR_END: value

// ANCHOR: array
/// An array: `[1, 2, 3]`
#[derive(Debug, Clone, Default)]
pub struct Array {
    pub items: Vec<Spanned<Value>>,
}
// ANCHOR_END: array

// ANCHOR: inline_table
/// An inline table: `{ key = value, ... }`
#[derive(Debug, Clone, Default)]
pub struct InlineTable {
    pub entries: Vec<Spanned<KeyValue>>,
}
// ANCHOR_END: inline_table
