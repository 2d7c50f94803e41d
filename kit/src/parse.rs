//! Grammar rules for TOML.
//!
//! ```text
//! document    := expression*
//! expression  := ( key_value | table | array_table )? comment? ( newline | EOF )
//! table       := `[` key `]`
//! array_table := `[[` key `]]`
//! key_value   := key `=` value
//! key         := simple_key ( `.` simple_key )*
//! value       := string | integer | float | boolean | date-time | array | inline_table
//! array       := `[` ( value `,` )* value? `]`        (newlines and comments allowed)
//! inline_table:= `{` ( key_value ( `,` key_value )* )? `}`
//! ```
//!
//! [`Document`] is the only rule that recovers: an expression that fails is
//! recorded, replaced by [`Expression::Error`], and parsing resumes on the
//! next line. An array still open when the next line starts a new
//! expression is reported as unclosed, and parsing resumes on that line.

use tomltree_core::{SpannedError, TokenStream as _};

use crate::ast::{
    Array, DottedKey, Document, Expression, InlineTable, Key, KeyValue, SimpleKey, StringKind,
    StringLiteral, TableHeader, Value,
};
use crate::error::TomlError;
use crate::lexer::opens_expression;
use crate::span::{Span, Spanned};
use crate::stream::TokenStream;
use crate::tokens::Token;
use crate::traits::{Diagnostic, Parse, Peek};

/// Builds the error for an unexpected next token. Invalid tokens report
/// their lexical error instead of a generic expectation.
fn unexpected<D: Diagnostic>(stream: &TokenStream) -> TomlError {
    match stream.peek_token() {
        Some(tok) => match tok.value {
            Token::Invalid(err) => TomlError::Lex(err).with_span(tok.span),
            _ => stream.expected::<D>(),
        },
        None => stream.expected::<D>(),
    }
}

/// Text between a string token's delimiters.
fn string_body(stream: &TokenStream, span: &Span, quotes: usize) -> String {
    let start = span.start + quotes;
    let end = span.end.saturating_sub(quotes).max(start);
    stream.slice(&Span::new(start, end)).to_string()
}

// ANCHOR: document
struct LineEnd;

impl Diagnostic for LineEnd {
    fn fmt() -> &'static str {
        "end of line"
    }
}

impl Diagnostic for Document {
    fn fmt() -> &'static str {
        "document"
    }
}

impl Parse for Document {
    fn parse(stream: &mut TokenStream) -> Result<Self, TomlError> {
        let mut doc = Document::default();
        loop {
            stream.skip_blank_lines();
            if stream.is_empty() {
                break;
            }

            let start = stream.current_span().start;
            let header = matches!(
                stream.peek_token().map(|t| t.value),
                Some(Token::LBracket | Token::DoubleLBracket)
            );
            let result = stream.parse::<Expression>().and_then(|expr| {
                end_of_line(stream)?;
                Ok(expr)
            });
            match result {
                Ok(expr) => doc.expressions.push(expr),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    let err = err.or_span(stream.current_span());
                    log::trace!("recovering from syntax error: {err}");
                    stream.skip_until(|t| *t == Token::Newline);
                    let end = stream
                        .last_span()
                        .map(|s| s.end)
                        .unwrap_or(start)
                        .max(start);
                    doc.errors.push(err);
                    doc.expressions
                        .push(Spanned::new(start, end, Expression::Error { header }));
                }
            }
        }

        log::debug!(
            "parsed {} expressions with {} syntax errors",
            doc.expressions.len(),
            doc.errors.len()
        );
        Ok(doc)
    }
}

/// An optional comment, then a newline or the end of input.
fn end_of_line(stream: &mut TokenStream) -> Result<(), TomlError> {
    if stream.peek_is(Token::Comment) {
        stream.next();
    }
    match stream.peek_token().map(|t| t.value) {
        None => Ok(()),
        Some(Token::Newline) => {
            stream.next();
            Ok(())
        }
        Some(_) => Err(unexpected::<LineEnd>(stream)),
    }
}
// ANCHOR_END: document

// ANCHOR: expression
struct TableClose;

impl Diagnostic for TableClose {
    fn fmt() -> &'static str {
        "`]`"
    }
}

struct ArrayTableClose;

impl Diagnostic for ArrayTableClose {
    fn fmt() -> &'static str {
        "`]]`"
    }
}

impl Diagnostic for Expression {
    fn fmt() -> &'static str {
        "expression"
    }
}

impl Parse for Expression {
    fn parse(stream: &mut TokenStream) -> Result<Self, TomlError> {
        let Some(tok) = stream.peek_token() else {
            return Err(stream.expected::<Self>());
        };

        match tok.value {
            Token::LBracket => {
                stream.next();
                let key = stream.parse::<Key>()?;
                stream.expect::<TableClose>(Token::RBracket)?;
                Ok(Expression::Table(TableHeader { key }))
            }
            Token::DoubleLBracket => {
                stream.next();
                let key = stream.parse::<Key>()?;
                stream.expect::<ArrayTableClose>(Token::DoubleRBracket)?;
                Ok(Expression::ArrayTable(TableHeader { key }))
            }
            token if KeyValue::is(&token) => Ok(Expression::KeyValue(KeyValue::parse(stream)?)),
            _ => Err(unexpected::<Self>(stream)),
        }
    }
}
// ANCHOR_END: expression

// ANCHOR: key
impl Peek for SimpleKey {
    fn is(token: &Token) -> bool {
        matches!(
            token,
            Token::BareKey | Token::BasicString | Token::LiteralString
        )
    }
}

impl Diagnostic for SimpleKey {
    fn fmt() -> &'static str {
        "key"
    }
}

impl Parse for SimpleKey {
    fn parse(stream: &mut TokenStream) -> Result<Self, TomlError> {
        let Some(tok) = stream.peek_token() else {
            return Err(stream.expected::<Self>());
        };
        let span = tok.span;

        let key = match tok.value {
            Token::BareKey => SimpleKey::Bare(stream.slice(&span).to_string()),
            Token::BasicString => SimpleKey::Basic(string_body(stream, &span, 1)),
            Token::LiteralString => SimpleKey::Literal(string_body(stream, &span, 1)),
            _ => return Err(unexpected::<Self>(stream)),
        };
        stream.next();
        Ok(key)
    }
}

impl Peek for Key {
    fn is(token: &Token) -> bool {
        SimpleKey::is(token)
    }
}

impl Diagnostic for Key {
    fn fmt() -> &'static str {
        "key"
    }
}

impl Parse for Key {
    fn parse(stream: &mut TokenStream) -> Result<Self, TomlError> {
        let first = stream.parse::<SimpleKey>()?;
        let mut rest = Vec::new();
        while stream.peek_is(Token::Dot) {
            stream.next();
            rest.push(stream.parse::<SimpleKey>()?);
        }

        if rest.is_empty() {
            Ok(Key::Simple(first))
        } else {
            Ok(Key::Dotted(DottedKey { first, rest }))
        }
    }
}
// ANCHOR_END: key

// ANCHOR: key_value
struct EqualsSign;

impl Diagnostic for EqualsSign {
    fn fmt() -> &'static str {
        "`=`"
    }
}

impl Peek for KeyValue {
    fn is(token: &Token) -> bool {
        Key::is(token)
    }
}

impl Diagnostic for KeyValue {
    fn fmt() -> &'static str {
        "key/value pair"
    }
}

impl Parse for KeyValue {
    fn parse(stream: &mut TokenStream) -> Result<Self, TomlError> {
        let key = stream.parse::<Key>()?;
        stream.expect::<EqualsSign>(Token::Equals)?;
        let value = stream.parse::<Value>()?;
        Ok(KeyValue { key, value })
    }
}
// ANCHOR_END: key_value

// ANCHOR: value
impl Peek for Value {
    fn is(token: &Token) -> bool {
        matches!(token, Token::LBracket | Token::LBrace)
            || (token.is_scalar() && !matches!(token, Token::Invalid(_)))
    }
}

impl Diagnostic for Value {
    fn fmt() -> &'static str {
        "value"
    }
}

impl Parse for Value {
    fn parse(stream: &mut TokenStream) -> Result<Self, TomlError> {
        let Some(tok) = stream.peek_token() else {
            return Err(stream.expected::<Self>());
        };
        let (token, span) = (tok.value, tok.span);

        let string = |kind, quotes| {
            Value::String(StringLiteral {
                kind,
                raw: string_body(stream, &span, quotes),
            })
        };
        let text = || stream.slice(&span).to_string();

        let value = match token {
            Token::BasicString => string(StringKind::Basic, 1),
            Token::LiteralString => string(StringKind::Literal, 1),
            Token::MultiLineBasicString => string(StringKind::MultiLineBasic, 3),
            Token::MultiLineLiteralString => string(StringKind::MultiLineLiteral, 3),
            Token::Integer => Value::Integer(text()),
            Token::Float => Value::Float(text()),
            Token::Boolean(b) => Value::Boolean(b),
            Token::OffsetDateTime => Value::OffsetDateTime(text()),
            Token::LocalDateTime => Value::LocalDateTime(text()),
            Token::LocalDate => Value::LocalDate(text()),
            Token::LocalTime => Value::LocalTime(text()),
            Token::LBracket => return Ok(Value::Array(Array::parse(stream)?)),
            Token::LBrace => return Ok(Value::InlineTable(InlineTable::parse(stream)?)),
            _ => return Err(unexpected::<Self>(stream)),
        };
        stream.next();
        Ok(value)
    }
}
// ANCHOR_END: value

/// Runs `f` one nesting level deeper, failing fatally past the configured
/// recursion limit.
fn nested<T>(
    stream: &mut TokenStream,
    open: Span,
    f: impl FnOnce(&mut TokenStream) -> Result<T, TomlError>,
) -> Result<T, TomlError> {
    stream
        .enter_nested()
        .map_err(|err| TomlError::from(err).with_span(open))?;
    let result = f(stream);
    stream.exit_nested();
    result
}

// ANCHOR: array
struct ArrayDelimiter;

impl Diagnostic for ArrayDelimiter {
    fn fmt() -> &'static str {
        "`,` or `]`"
    }
}

impl Peek for Array {
    fn is(token: &Token) -> bool {
        matches!(token, Token::LBracket)
    }
}

impl Diagnostic for Array {
    fn fmt() -> &'static str {
        "array"
    }
}

impl Parse for Array {
    fn parse(stream: &mut TokenStream) -> Result<Self, TomlError> {
        let open = stream.expect::<Self>(Token::LBracket)?.span;
        nested(stream, open, |stream| {
            let mut items = Vec::new();
            loop {
                skip_array_lines(stream, open)?;
                if stream.peek_is(Token::RBracket) {
                    stream.next();
                    return Ok(Array { items });
                }

                items.push(stream.parse::<Value>()?);

                skip_array_lines(stream, open)?;
                match stream.peek_token().map(|t| t.value) {
                    Some(Token::Comma) => {
                        stream.next();
                    }
                    Some(Token::RBracket) => {
                        stream.next();
                        return Ok(Array { items });
                    }
                    _ => return Err(unexpected::<ArrayDelimiter>(stream)),
                }
            }
        })
    }
}

/// Consumes newlines and comments between array items. Reaching the end of
/// input, or a line that starts a new expression, means the array opened at
/// `open` was never closed.
fn skip_array_lines(stream: &mut TokenStream, open: Span) -> Result<(), TomlError> {
    while let Some(tok) = stream.peek_token() {
        let (token, span) = (tok.value, tok.span);
        match token {
            Token::Comment => {}
            Token::Newline if opens_expression(stream.text_after(&span)) => {
                return Err(TomlError::UnclosedArray.with_span(open));
            }
            Token::Newline => {}
            _ => return Ok(()),
        }
        stream.next();
    }
    Err(TomlError::UnclosedArray.with_span(open))
}
// ANCHOR_END: array

// ANCHOR: inline_table
struct InlineTableDelimiter;

impl Diagnostic for InlineTableDelimiter {
    fn fmt() -> &'static str {
        "`,` or `}`"
    }
}

impl Peek for InlineTable {
    fn is(token: &Token) -> bool {
        matches!(token, Token::LBrace)
    }
}

impl Diagnostic for InlineTable {
    fn fmt() -> &'static str {
        "inline table"
    }
}

impl Parse for InlineTable {
    fn parse(stream: &mut TokenStream) -> Result<Self, TomlError> {
        let open = stream.expect::<Self>(Token::LBrace)?;
        nested(stream, open.span, |stream| {
            let mut entries = Vec::new();
            if stream.peek_is(Token::RBrace) {
                stream.next();
                return Ok(InlineTable { entries });
            }

            loop {
                entries.push(stream.parse::<KeyValue>()?);
                match stream.peek_token().map(|t| t.value) {
                    Some(Token::Comma) => {
                        stream.next();
                    }
                    Some(Token::RBrace) => {
                        stream.next();
                        return Ok(InlineTable { entries });
                    }
                    _ => return Err(unexpected::<InlineTableDelimiter>(stream)),
                }
            }
        })
    }
}
// ANCHOR_END: inline_table
