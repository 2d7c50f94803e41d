//! Turns the raw text between string delimiters into the string's value.
//!
//! The lexer only finds where a string ends; everything about its content
//! (escape sequences, line-ending backslashes, the leading newline of
//! multi-line strings, forbidden control characters) is checked here.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use crate::ast::{SimpleKey, StringKind};

/// Number of offending control characters listed before eliding the rest.
const MAX_REPORTED_CONTROL_CHARACTERS: usize = 10;

// ANCHOR: string_error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StringError {
    #[error("Bad escape sequence '\\{0}'")]
    InvalidEscape(char),

    #[error("Escape sequence '\\{kind}{digits}' needs {expected} hex digits")]
    InvalidUnicodeEscape {
        kind: char,
        digits: String,
        expected: usize,
    },

    #[error("Unicode point \\u{0:X} is not a Unicode scalar")]
    NotAScalar(u32),

    #[error("Backslash followed by whitespace must end the line")]
    WhitespaceAfterBackslash,

    #[error("Backslash at the end of a string")]
    TrailingBackslash,

    #[error("String value contains illegal Unicode control characters ({0})")]
    ControlCharacters(String),
}
// ANCHOR_END: string_error

/// Un-escapes a string value of the given kind.
pub fn unescape(raw: &str, kind: StringKind) -> Result<Cow<'_, str>, StringError> {
    match kind {
        StringKind::Basic => basic(raw),
        StringKind::MultiLineBasic => multi_line_basic(raw),
        StringKind::Literal => literal(raw),
        StringKind::MultiLineLiteral => multi_line_literal(raw),
    }
}

/// The text of a key segment.
pub fn simple_key(key: &SimpleKey) -> Result<Cow<'_, str>, StringError> {
    match key {
        SimpleKey::Bare(raw) => Ok(Cow::Borrowed(raw)),
        SimpleKey::Basic(raw) => basic(raw),
        SimpleKey::Literal(raw) => literal(raw),
    }
}

pub fn basic(raw: &str) -> Result<Cow<'_, str>, StringError> {
    check_control_characters(raw)?;
    process_escapes(raw, false)
}

pub fn multi_line_basic(raw: &str) -> Result<Cow<'_, str>, StringError> {
    let raw = strip_leading_newline(raw);
    check_control_characters(raw)?;
    process_escapes(raw, true)
}

pub fn literal(raw: &str) -> Result<Cow<'_, str>, StringError> {
    check_control_characters(raw)?;
    Ok(Cow::Borrowed(raw))
}

pub fn multi_line_literal(raw: &str) -> Result<Cow<'_, str>, StringError> {
    let raw = strip_leading_newline(raw);
    check_control_characters(raw)?;
    Ok(Cow::Borrowed(raw))
}

fn strip_leading_newline(raw: &str) -> &str {
    raw.strip_prefix("\r\n")
        .or_else(|| raw.strip_prefix('\n'))
        .unwrap_or(raw)
}

fn is_forbidden_control(c: char) -> bool {
    c.is_control() && (c as u32) < 0x80 && !matches!(c, '\t' | '\n' | '\r' | '\u{c}')
}

fn check_control_characters(raw: &str) -> Result<(), StringError> {
    let mut offending = raw.chars().filter(|c| is_forbidden_control(*c));
    let Some(first) = offending.next() else {
        return Ok(());
    };

    let mut codes = vec![format!("0x{:02x}", first as u32)];
    for c in offending {
        if codes.len() == MAX_REPORTED_CONTROL_CHARACTERS {
            codes.push("...".to_string());
            break;
        }
        codes.push(format!("0x{:02x}", c as u32));
    }
    Err(StringError::ControlCharacters(codes.join(",")))
}

// ANCHOR: escapes
fn process_escapes(raw: &str, multi_line: bool) -> Result<Cow<'_, str>, StringError> {
    if !raw.contains('\\') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            return Err(StringError::TrailingBackslash);
        };
        match escape {
            'b' => out.push('\u{8}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'f' => out.push('\u{c}'),
            'r' => out.push('\r'),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'u' => out.push(unicode_escape(&mut chars, 'u', 4)?),
            'U' => out.push(unicode_escape(&mut chars, 'U', 8)?),
            ' ' | '\t' | '\r' | '\n' if multi_line => trim_line_ending(escape, &mut chars)?,
            other => return Err(StringError::InvalidEscape(other)),
        }
    }
    Ok(Cow::Owned(out))
}

fn unicode_escape(
    chars: &mut Peekable<Chars<'_>>,
    kind: char,
    expected: usize,
) -> Result<char, StringError> {
    let mut digits = String::with_capacity(expected);
    while digits.len() < expected
        && let Some(c) = chars.next_if(char::is_ascii_hexdigit)
    {
        digits.push(c);
    }
    if digits.len() != expected {
        return Err(StringError::InvalidUnicodeEscape {
            kind,
            digits,
            expected,
        });
    }

    let code = u32::from_str_radix(&digits, 16).map_err(|_| StringError::InvalidUnicodeEscape {
        kind,
        digits: digits.clone(),
        expected,
    })?;
    char::from_u32(code).ok_or(StringError::NotAScalar(code))
}

/// Skips from a line-ending backslash to the next non-whitespace character.
fn trim_line_ending(first: char, chars: &mut Peekable<Chars<'_>>) -> Result<(), StringError> {
    let mut saw_newline = first == '\n';
    while !saw_newline && let Some(c) = chars.next_if(|c| matches!(c, ' ' | '\t' | '\r' | '\n')) {
        saw_newline = c == '\n';
    }
    if !saw_newline {
        return Err(StringError::WhitespaceAfterBackslash);
    }
    while chars
        .next_if(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
        .is_some()
    {}
    Ok(())
}
// ANCHOR_END: escapes
