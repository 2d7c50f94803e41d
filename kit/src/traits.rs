//! Grammar traits over the concrete [`TokenStream`] and [`Token`] types.
//!
//! Every CST node implements [`Parse`]; nodes that start with a recognisable
//! token also implement [`Peek`] so callers can choose a production without
//! consuming anything.

use crate::error::TomlError;
use crate::span::Spanned;
use crate::stream::TokenStream;
use crate::tokens::Token;

pub use tomltree_core::Diagnostic;

pub trait Parse: Sized {
    fn parse(stream: &mut TokenStream) -> Result<Self, TomlError>;

    /// Parse and wrap the result with span information.
    ///
    /// The span starts at the first significant token, not at leading
    /// whitespace.
    fn parse_spanned(stream: &mut TokenStream) -> Result<Spanned<Self>, TomlError> {
        use tomltree_core::TokenStream as _;
        let start = stream.peek_token().map(|t| t.span.start).unwrap_or(0);

        let value = Self::parse(stream)?;

        let end = stream
            .last_span()
            .map(|s| s.end)
            .unwrap_or(start)
            .max(start);

        Ok(Spanned::new(start, end, value))
    }
}

pub trait Peek: Sized {
    /// Check if a token can start this node.
    fn is(token: &Token) -> bool;
}
