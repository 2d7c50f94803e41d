use std::sync::Arc;

use thiserror::Error;

use crate::span::Span;
use crate::traits::Diagnostic;
use crate::unescape::StringError;

// ANCHOR: lex_error
/// Why the lexer turned a stretch of input into [`Token::Invalid`].
#[derive(Error, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LexError {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,

    #[error("unterminated string")]
    UnterminatedString,

    #[error("malformed number")]
    InvalidNumber,

    #[error("malformed date-time")]
    InvalidDateTime,

    #[error("control characters are not allowed in comments")]
    ControlCharacterInComment,

    #[error("value must be followed by whitespace, a newline, a comma or a closing bracket")]
    MissingDelimiter,
}
// ANCHOR_END: lex_error

// ANCHOR: error_type
#[derive(Error, Debug, Clone, Default)]
pub enum TomlError {
    #[default]
    #[error("unknown error")]
    Unknown,

    #[error("expected {expect}, found {found}")]
    Expected { expect: &'static str, found: String },

    #[error("expected {expect}, found EOF")]
    Empty { expect: &'static str },

    #[error("unclosed array")]
    UnclosedArray,

    #[error("{0}")]
    Lex(#[from] LexError),

    #[error("{0}")]
    Core(#[from] tomltree_core::Error),

    #[error("Key '{key}' is defined more than once")]
    DuplicateKey { key: String },

    #[error("Table '{path}' is defined more than once")]
    DuplicateTable { path: String },

    #[error("Table '{path}' was already created by dotted keys and cannot be redefined")]
    DottedTableRedefinition { path: String },

    #[error("Key '{key}' in '{path}' is already used for a non-table object")]
    NotATable { key: String, path: String },

    #[error("Key '{key}' in '{path}' is a table defined by a header and cannot be extended by dotted keys")]
    HeaderTableExtension { key: String, path: String },

    #[error("Inline table '{path}' cannot be extended")]
    FrozenTable { path: String },

    #[error("Array '{path}' is a static array and cannot be extended")]
    StaticArray { path: String },

    #[error("Table '{path}' cannot be redefined as an array of tables")]
    RedefineAsArray { path: String },

    #[error("Key '{prefix}' and '{path}' overlap inside one inline table")]
    InlineTableOverlap { prefix: String, path: String },

    #[error("{0}")]
    InvalidString(#[from] StringError),

    #[error("Invalid integer '{text}': {reason}")]
    InvalidInteger { text: String, reason: String },

    #[error("Invalid float '{text}'")]
    InvalidFloat { text: String },

    #[error("Invalid date-time '{text}': {reason}")]
    InvalidDateTime { text: String, reason: String },

    #[error("Malformed {encoding} detected on input")]
    MalformedInput { encoding: &'static str },

    #[error("I/O error: {0}")]
    Io(#[source] Arc<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[source] Arc<serde_json::Error>),

    #[error("{source}")]
    Spanned {
        #[source]
        source: Box<TomlError>,
        span: Span,
    },
}
// ANCHOR_END: error_type

// ANCHOR: error_impl
impl TomlError {
    pub fn expected<D: Diagnostic>(found: impl std::fmt::Display) -> Self {
        Self::Expected {
            expect: D::fmt(),
            found: found.to_string(),
        }
    }

    pub fn empty<D: Diagnostic>() -> Self {
        Self::Empty { expect: D::fmt() }
    }

    /// Fatal errors cancel the whole parse instead of a single expression.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Core(_) => true,
            Self::Spanned { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// The error without any span wrapping.
    pub fn inner(&self) -> &TomlError {
        match self {
            Self::Spanned { source, .. } => source.inner(),
            other => other,
        }
    }
}

impl From<std::io::Error> for TomlError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for TomlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(Arc::new(err))
    }
}

impl tomltree_core::SpannedError for TomlError {
    type Span = Span;

    fn with_span(self, span: Span) -> Self {
        Self::Spanned {
            source: Box::new(self),
            span,
        }
    }

    fn span(&self) -> Option<&Span> {
        match self {
            Self::Spanned { span, .. } => Some(span),
            _ => None,
        }
    }
}
// ANCHOR_END: error_impl
