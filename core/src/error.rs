//! Core error types for tomltree.
//!
//! Grammar-level error types should implement `From<tomltree_core::Error>`
//! so that resource-limit failures propagate through `?`.

use core::fmt;

/// Errors raised by the parsing infrastructure itself.
///
/// Both variants are fatal: a parse that hits one of them is cancelled and
/// the caller receives an empty tree with a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Nesting of arrays or inline tables went deeper than
    /// [`ParseConfig::max_recursion_depth`](crate::ParseConfig::max_recursion_depth).
    ///
    /// Input like `a = [[[[[[...]]]]]]` with thousands of nesting levels
    /// triggers this with the default limit of 128.
    RecursionLimitExceeded {
        /// Current recursion depth when limit was exceeded.
        depth: usize,
        /// Maximum allowed recursion depth.
        limit: usize,
    },

    /// The lexer produced more tokens than
    /// [`ParseConfig::max_tokens`](crate::ParseConfig::max_tokens).
    TokenLimitExceeded {
        /// Number of tokens produced when limit was exceeded.
        consumed: usize,
        /// Maximum allowed token count.
        limit: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RecursionLimitExceeded { depth, limit } => {
                write!(
                    f,
                    "recursion limit exceeded: depth {} > limit {}",
                    depth, limit
                )
            }
            Error::TokenLimitExceeded { consumed, limit } => {
                write!(
                    f,
                    "token limit exceeded: consumed {} > limit {}",
                    consumed, limit
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
