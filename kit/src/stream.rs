use std::sync::Arc;

use tomltree_core::{LineIndex, ParseConfig, RecursionGuard, SpannedError};

use crate::error::TomlError;
use crate::lexer::Lexer;
use crate::span::{Span, Spanned};
use crate::tokens::{SpannedToken, Token};
use crate::traits::{Diagnostic, Parse};

// ANCHOR: stream
/// Cursor over the tokens of one document.
///
/// Tokens are lexed eagerly, up front, so the token budget is enforced
/// before any grammar rule runs. The stream also carries the recursion guard
/// used while descending into arrays and inline tables.
pub struct TokenStream {
    source: Arc<str>,
    lines: LineIndex,
    tokens: Vec<SpannedToken>,
    cursor: usize,
    last_cursor: usize,
    config: ParseConfig,
    depth: RecursionGuard,
}

impl TokenStream {
    pub fn lex(source: &str) -> Result<Self, TomlError> {
        Self::lex_with_config(source, ParseConfig::default())
    }

    /// Lexes `source`, failing once more than `config.max_tokens` tokens
    /// have been produced.
    pub fn lex_with_config(source: &str, config: ParseConfig) -> Result<Self, TomlError> {
        let mut tokens = Vec::new();
        for tok in Lexer::new(source) {
            if tokens.len() >= config.max_tokens {
                return Err(TomlError::from(tomltree_core::Error::TokenLimitExceeded {
                    consumed: tokens.len() + 1,
                    limit: config.max_tokens,
                })
                .with_span(tok.span));
            }
            tokens.push(tok);
        }
        log::debug!("lexed {} tokens from {} bytes", tokens.len(), source.len());

        let source: Arc<str> = Arc::from(source);
        Ok(Self {
            lines: LineIndex::new(Arc::clone(&source)),
            source,
            tokens,
            cursor: 0,
            last_cursor: 0,
            config,
            depth: RecursionGuard::new(),
        })
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn slice(&self, span: &Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or_default()
    }

    /// Source text from the end of `span` to the end of input.
    pub fn text_after(&self, span: &Span) -> &str {
        self.source.get(span.end..).unwrap_or_default()
    }

    /// Parse a value from the stream and wrap it with span information.
    pub fn parse<T: Parse>(&mut self) -> Result<Spanned<T>, TomlError> {
        T::parse_spanned(self)
    }

    /// Whether the next significant token is `token`.
    pub fn peek_is(&self, token: Token) -> bool {
        use tomltree_core::TokenStream as _;
        self.peek_token().is_some_and(|t| t.value == token)
    }

    /// Empty span at the end of input.
    pub fn eof_span(&self) -> Span {
        Span::point(self.source.len())
    }

    /// Span of the next significant token, or the end of input.
    pub fn current_span(&self) -> Span {
        use tomltree_core::TokenStream as _;
        self.peek_token().map(|t| t.span).unwrap_or(self.eof_span())
    }

    /// Builds an "expected `D`" error for the next significant token,
    /// spanned at that token.
    pub fn expected<D: Diagnostic>(&self) -> TomlError {
        use tomltree_core::TokenStream as _;
        match self.peek_token() {
            Some(tok) => TomlError::expected::<D>(self.describe(tok)).with_span(tok.span),
            None => TomlError::empty::<D>().with_span(self.eof_span()),
        }
    }

    /// Consumes the next significant token if it is `token`, failing with an
    /// "expected `D`" error otherwise.
    pub fn expect<D: Diagnostic>(&mut self, token: Token) -> Result<SpannedToken, TomlError> {
        use tomltree_core::TokenStream as _;
        if self.peek_is(token)
            && let Some(tok) = self.next()
        {
            return Ok(tok);
        }
        Err(self.expected::<D>())
    }

    /// Consumes newlines and comments. Invalid comments are left in place so
    /// the grammar reports them.
    pub fn skip_blank_lines(&mut self) {
        use tomltree_core::TokenStream as _;
        while let Some(tok) = self.peek_token() {
            if !matches!(tok.value, Token::Newline | Token::Comment) {
                break;
            }
            self.next();
        }
    }

    fn describe(&self, tok: &SpannedToken) -> String {
        match tok.value {
            Token::Invalid(err) => format!("'{}' ({err})", self.first_line(&tok.span)),
            other if other.is_scalar() || other == Token::BareKey => {
                format!("{other} '{}'", self.first_line(&tok.span))
            }
            other => other.to_string(),
        }
    }

    fn first_line(&self, span: &Span) -> &str {
        let text = self.slice(span);
        text.split(['\r', '\n']).next().unwrap_or(text)
    }
}
// ANCHOR_END: stream

// ANCHOR: stream_impl
impl tomltree_core::TokenStream for TokenStream {
    type Token = Token;
    type Span = Span;
    type Spanned<T: Clone> = Spanned<T>;

    fn peek_token_raw(&self) -> Option<&SpannedToken> {
        self.peek_at(self.cursor)
    }

    fn next_raw(&mut self) -> Option<SpannedToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.last_cursor = self.cursor;
            self.cursor += 1;
        }
        tok
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn last_span(&self) -> Option<Span> {
        self.tokens.get(self.last_cursor).map(|t| t.span)
    }

    fn is_trivia(token: &Token) -> bool {
        matches!(token, Token::Whitespace)
    }

    fn peek_at(&self, pos: usize) -> Option<&SpannedToken> {
        self.tokens.get(pos)
    }

    fn enter_nested(&mut self) -> Result<(), tomltree_core::Error> {
        self.depth.enter(self.config.max_recursion_depth)
    }

    fn exit_nested(&mut self) {
        self.depth.exit();
    }
}

// Compile-time assertions for TokenStream
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<TokenStream>();
    assert_sync::<TokenStream>();
};
// ANCHOR_END: stream_impl
