//! Token definitions for both lexical modes.
//!
//! TOML reads the same characters differently on either side of `=`:
//! `1979-05-27` is a bare key before it and a date after it, `[` opens a
//! table header in one place and an array in another. Each side therefore
//! gets its own `logos` token set, [`KeyToken`] and [`ValueToken`], and the
//! [`Lexer`](crate::lexer::Lexer) picks one per token according to its
//! mode stack. Both sets fold into the single [`Token`] the parser sees.

use core::fmt;

use logos::{Lexer, Logos};

use crate::error::LexError;
use crate::span::Spanned;

// ANCHOR: token
/// A classified lexical unit. Payload-free: the text lives in the source and
/// is recovered through the token's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Whitespace,
    Newline,
    Comment,
    Equals,
    Dot,
    Comma,
    LBracket,
    RBracket,
    DoubleLBracket,
    DoubleRBracket,
    LBrace,
    RBrace,
    BareKey,
    BasicString,
    LiteralString,
    MultiLineBasicString,
    MultiLineLiteralString,
    Integer,
    Float,
    Boolean(bool),
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
    Invalid(LexError),
}

pub type SpannedToken = Spanned<Token>;
// ANCHOR_END: token

impl Token {
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            Token::BasicString
                | Token::LiteralString
                | Token::MultiLineBasicString
                | Token::MultiLineLiteralString
        )
    }

    /// Tokens that complete a value in value mode.
    pub fn is_scalar(&self) -> bool {
        self.is_string()
            || matches!(
                self,
                Token::Integer
                    | Token::Float
                    | Token::Boolean(_)
                    | Token::OffsetDateTime
                    | Token::LocalDateTime
                    | Token::LocalDate
                    | Token::LocalTime
                    | Token::Invalid(_)
            )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Whitespace => f.write_str("whitespace"),
            Token::Newline => f.write_str("newline"),
            Token::Comment => f.write_str("comment"),
            Token::Equals => f.write_str("`=`"),
            Token::Dot => f.write_str("`.`"),
            Token::Comma => f.write_str("`,`"),
            Token::LBracket => f.write_str("`[`"),
            Token::RBracket => f.write_str("`]`"),
            Token::DoubleLBracket => f.write_str("`[[`"),
            Token::DoubleRBracket => f.write_str("`]]`"),
            Token::LBrace => f.write_str("`{`"),
            Token::RBrace => f.write_str("`}`"),
            Token::BareKey => f.write_str("bare key"),
            Token::BasicString => f.write_str("string"),
            Token::LiteralString => f.write_str("literal string"),
            Token::MultiLineBasicString => f.write_str("multi-line string"),
            Token::MultiLineLiteralString => f.write_str("multi-line literal string"),
            Token::Integer => f.write_str("integer"),
            Token::Float => f.write_str("float"),
            Token::Boolean(_) => f.write_str("boolean"),
            Token::OffsetDateTime => f.write_str("offset date-time"),
            Token::LocalDateTime => f.write_str("local date-time"),
            Token::LocalDate => f.write_str("local date"),
            Token::LocalTime => f.write_str("local time"),
            Token::Invalid(err) => write!(f, "invalid token ({err})"),
        }
    }
}

// ANCHOR: key_token
/// Tokens of the key side: table headers, keys, and inline-table bodies.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexError)]
pub enum KeyToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[token("#", comment)]
    Comment,

    #[token("=")]
    Equals,

    #[token(".")]
    Dot,

    #[token(",")]
    Comma,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("[[")]
    DoubleLBracket,

    #[token("]]")]
    DoubleRBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[regex(r"[A-Za-z0-9_-]+")]
    BareKey,

    #[token("\"", basic_string)]
    BasicString,

    #[token("'", literal_string)]
    LiteralString,

    #[token("\"\"\"", multi_line_basic_string)]
    MultiLineBasicString,

    #[token("'''", multi_line_literal_string)]
    MultiLineLiteralString,
}
// ANCHOR_END: key_token

// ANCHOR: value_token
/// Tokens of the value side: scalars and the punctuation of arrays.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexError)]
pub enum ValueToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[token("#", comment)]
    Comment,

    #[token("=")]
    Equals,

    #[token(",")]
    Comma,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[regex(r"[+-]?(inf|nan)")]
    SpecialFloat,

    #[regex(r"[+-]?[0-9]", number_or_date)]
    Scalar(Scalar),

    #[token("\"", basic_string)]
    BasicString,

    #[token("'", literal_string)]
    LiteralString,

    #[token("\"\"\"", multi_line_basic_string)]
    MultiLineBasicString,

    #[token("'''", multi_line_literal_string)]
    MultiLineLiteralString,
}
// ANCHOR_END: value_token

/// Classification of a numeric or date/time literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Integer,
    Float,
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
}

impl From<KeyToken> for Token {
    fn from(tok: KeyToken) -> Self {
        match tok {
            KeyToken::Whitespace => Token::Whitespace,
            KeyToken::Newline => Token::Newline,
            KeyToken::Comment => Token::Comment,
            KeyToken::Equals => Token::Equals,
            KeyToken::Dot => Token::Dot,
            KeyToken::Comma => Token::Comma,
            KeyToken::LBracket => Token::LBracket,
            KeyToken::RBracket => Token::RBracket,
            KeyToken::DoubleLBracket => Token::DoubleLBracket,
            KeyToken::DoubleRBracket => Token::DoubleRBracket,
            KeyToken::LBrace => Token::LBrace,
            KeyToken::RBrace => Token::RBrace,
            KeyToken::BareKey => Token::BareKey,
            KeyToken::BasicString => Token::BasicString,
            KeyToken::LiteralString => Token::LiteralString,
            KeyToken::MultiLineBasicString => Token::MultiLineBasicString,
            KeyToken::MultiLineLiteralString => Token::MultiLineLiteralString,
        }
    }
}

impl From<ValueToken> for Token {
    fn from(tok: ValueToken) -> Self {
        match tok {
            ValueToken::Whitespace => Token::Whitespace,
            ValueToken::Newline => Token::Newline,
            ValueToken::Comment => Token::Comment,
            ValueToken::Equals => Token::Equals,
            ValueToken::Comma => Token::Comma,
            ValueToken::LBracket => Token::LBracket,
            ValueToken::RBracket => Token::RBracket,
            ValueToken::LBrace => Token::LBrace,
            ValueToken::RBrace => Token::RBrace,
            ValueToken::True => Token::Boolean(true),
            ValueToken::False => Token::Boolean(false),
            ValueToken::SpecialFloat => Token::Float,
            ValueToken::Scalar(Scalar::Integer) => Token::Integer,
            ValueToken::Scalar(Scalar::Float) => Token::Float,
            ValueToken::Scalar(Scalar::OffsetDateTime) => Token::OffsetDateTime,
            ValueToken::Scalar(Scalar::LocalDateTime) => Token::LocalDateTime,
            ValueToken::Scalar(Scalar::LocalDate) => Token::LocalDate,
            ValueToken::Scalar(Scalar::LocalTime) => Token::LocalTime,
            ValueToken::BasicString => Token::BasicString,
            ValueToken::LiteralString => Token::LiteralString,
            ValueToken::MultiLineBasicString => Token::MultiLineBasicString,
            ValueToken::MultiLineLiteralString => Token::MultiLineLiteralString,
        }
    }
}

// ANCHOR: callbacks
fn comment<'s, T>(lex: &mut Lexer<'s, T>) -> Result<(), LexError>
where
    T: Logos<'s, Source = str>,
{
    let (len, clean) = scan_comment(lex.remainder());
    lex.bump(len);
    if clean {
        Ok(())
    } else {
        Err(LexError::ControlCharacterInComment)
    }
}

fn basic_string<'s, T>(lex: &mut Lexer<'s, T>) -> Result<(), LexError>
where
    T: Logos<'s, Source = str>,
{
    finish(lex, scan_basic(lex.remainder()))
}

fn literal_string<'s, T>(lex: &mut Lexer<'s, T>) -> Result<(), LexError>
where
    T: Logos<'s, Source = str>,
{
    finish(lex, scan_literal(lex.remainder()))
}

fn multi_line_basic_string<'s, T>(lex: &mut Lexer<'s, T>) -> Result<(), LexError>
where
    T: Logos<'s, Source = str>,
{
    finish(lex, scan_multi_line(lex.remainder(), b'"', true))
}

fn multi_line_literal_string<'s, T>(lex: &mut Lexer<'s, T>) -> Result<(), LexError>
where
    T: Logos<'s, Source = str>,
{
    finish(lex, scan_multi_line(lex.remainder(), b'\'', false))
}

fn finish<'s, T>(lex: &mut Lexer<'s, T>, (len, closed): (usize, bool)) -> Result<(), LexError>
where
    T: Logos<'s, Source = str>,
{
    lex.bump(len);
    if closed {
        Ok(())
    } else {
        Err(LexError::UnterminatedString)
    }
}

fn number_or_date(lex: &mut Lexer<'_, ValueToken>) -> Result<Scalar, LexError> {
    let start = lex.span().start;
    let text = lex.source().get(start..).unwrap_or_default();
    let len = scan_scalar_word(text);
    lex.bump(len.saturating_sub(lex.slice().len()));
    classify(text.get(..len).unwrap_or_default())
}
// ANCHOR_END: callbacks

// ANCHOR: scanners
/// Length of a comment body after `#`, and whether it is free of control
/// characters other than tab.
pub(crate) fn scan_comment(rest: &str) -> (usize, bool) {
    let mut len = rest.find('\n').unwrap_or(rest.len());
    if len > 0 && rest.as_bytes().get(len - 1) == Some(&b'\r') && len < rest.len() {
        len -= 1;
    }
    let body = rest.get(..len).unwrap_or_default();
    let clean = !body.chars().any(|c| (c < ' ' && c != '\t') || c == '\u{7f}');
    (len, clean)
}

/// Scans a single-line basic string after its opening quote.
/// Returns the consumed length and whether the closing quote was found.
pub(crate) fn scan_basic(rest: &str) -> (usize, bool) {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'"' => return (i + 1, true),
            b'\\' => match bytes.get(i + 1) {
                None | Some(b'\n') => return (i + 1, false),
                Some(b'\r') if bytes.get(i + 2) == Some(&b'\n') => return (i + 1, false),
                Some(next) if !next.is_ascii() => {
                    i += 1;
                }
                Some(_) => i += 2,
            },
            b'\n' => return (i, false),
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => return (i, false),
            _ => i += 1,
        }
    }
    (bytes.len(), false)
}

/// Scans a single-line literal string after its opening quote.
pub(crate) fn scan_literal(rest: &str) -> (usize, bool) {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'\'' => return (i + 1, true),
            b'\n' => return (i, false),
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => return (i, false),
            _ => i += 1,
        }
    }
    (bytes.len(), false)
}

/// Scans a multi-line string body after its opening triple quote. Up to two
/// quotes directly before the closing delimiter belong to the content.
pub(crate) fn scan_multi_line(rest: &str, quote: u8, escapes: bool) -> (usize, bool) {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while let Some(&b) = bytes.get(i) {
        if escapes && b == b'\\' {
            i += match bytes.get(i + 1) {
                Some(next) if next.is_ascii() => 2,
                _ => 1,
            };
            continue;
        }
        if b == quote {
            let run = bytes
                .get(i..)
                .unwrap_or_default()
                .iter()
                .take_while(|&&c| c == quote)
                .count();
            if run >= 3 {
                return (i + run.min(5), true);
            }
            i += run;
            continue;
        }
        i += 1;
    }
    (bytes.len(), false)
}

/// Length of the numeric or date/time literal at the start of `text`.
///
/// Takes every character that can occur in such a literal, plus a single
/// space when it separates a full date from a time (`1979-05-27 07:32:00`).
pub(crate) fn scan_scalar_word(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    while let Some(&b) = bytes.get(i) {
        let take = b.is_ascii_alphanumeric()
            || matches!(b, b'_' | b'+' | b'-' | b'.' | b':')
            || (b == b' ' && is_full_date(bytes.get(..i)) && starts_with_hour(bytes.get(i + 1..)));
        if !take {
            break;
        }
        i += 1;
    }
    i
}

fn is_full_date(prefix: Option<&[u8]>) -> bool {
    let mut c = Cursor::new(prefix.unwrap_or_default());
    c.date() && c.is_done()
}

fn starts_with_hour(rest: Option<&[u8]>) -> bool {
    matches!(rest, Some([h1, h2, b':', ..]) if h1.is_ascii_digit() && h2.is_ascii_digit())
}
// ANCHOR_END: scanners

// ANCHOR: classify
/// Validates a scanned literal with exact digit counts and classifies it.
pub(crate) fn classify(word: &str) -> Result<Scalar, LexError> {
    let bytes = word.as_bytes();
    let date_like = matches!(bytes, [a, b, c, d, b'-', ..] if [a, b, c, d].iter().all(|x| x.is_ascii_digit()));
    let time_like = matches!(bytes, [a, b, b':', ..] if a.is_ascii_digit() && b.is_ascii_digit());

    if date_like {
        classify_date_time(bytes).ok_or(LexError::InvalidDateTime)
    } else if time_like {
        let mut c = Cursor::new(bytes);
        if c.time() && c.is_done() {
            Ok(Scalar::LocalTime)
        } else {
            Err(LexError::InvalidDateTime)
        }
    } else {
        classify_number(bytes).ok_or(LexError::InvalidNumber)
    }
}

fn classify_date_time(bytes: &[u8]) -> Option<Scalar> {
    let mut c = Cursor::new(bytes);
    if !c.date() {
        return None;
    }
    if c.is_done() {
        return Some(Scalar::LocalDate);
    }
    if !c.eat_any(b"Tt ") || !c.time() {
        return None;
    }
    if c.is_done() {
        return Some(Scalar::LocalDateTime);
    }
    let offset = if c.eat_any(b"Zz") {
        true
    } else {
        c.eat_any(b"+-") && c.digits(2) && c.eat(b':') && c.digits(2)
    };
    (offset && c.is_done()).then_some(Scalar::OffsetDateTime)
}

fn classify_number(bytes: &[u8]) -> Option<Scalar> {
    let mut c = Cursor::new(bytes);

    for (prefix, radix) in [(b"0x", 16), (b"0o", 8), (b"0b", 2)] {
        if bytes.starts_with(prefix) {
            c.pos = 2;
            return (c.grouped_digits(radix) && c.is_done()).then_some(Scalar::Integer);
        }
    }

    c.eat_any(b"+-");
    if c.eat(b'0') {
        if c.peek().is_some_and(|b| b.is_ascii_digit() || b == b'_') {
            return None;
        }
    } else if !c.grouped_digits(10) {
        return None;
    }

    let mut float = false;
    if c.eat(b'.') {
        float = true;
        if !c.grouped_digits(10) {
            return None;
        }
    }
    if c.eat_any(b"eE") {
        float = true;
        c.eat_any(b"+-");
        if !c.grouped_digits(10) {
            return None;
        }
    }

    c.is_done()
        .then_some(if float { Scalar::Float } else { Scalar::Integer })
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn eat(&mut self, expected: u8) -> bool {
        self.eat_any(&[expected])
    }

    fn eat_any(&mut self, set: &[u8]) -> bool {
        match self.peek() {
            Some(b) if set.contains(&b) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Exactly `n` ASCII digits.
    fn digits(&mut self, n: usize) -> bool {
        let run = self
            .bytes
            .get(self.pos..)
            .unwrap_or_default()
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if run == n {
            self.pos += n;
            true
        } else {
            false
        }
    }

    /// One or more digits of `radix`, with single underscores only between
    /// digits.
    fn grouped_digits(&mut self, radix: u32) -> bool {
        let is_digit = |b: u8| (b as char).is_digit(radix);
        if !self.peek().is_some_and(is_digit) {
            return false;
        }
        while let Some(b) = self.peek() {
            if is_digit(b) {
                self.pos += 1;
            } else if b == b'_' && self.bytes.get(self.pos + 1).is_some_and(|&n| is_digit(n)) {
                self.pos += 1;
            } else {
                break;
            }
        }
        true
    }

    fn date(&mut self) -> bool {
        self.digits(4) && self.eat(b'-') && self.digits(2) && self.eat(b'-') && self.digits(2)
    }

    fn time(&mut self) -> bool {
        if !(self.digits(2) && self.eat(b':') && self.digits(2) && self.eat(b':') && self.digits(2)) {
            return false;
        }
        if self.eat(b'.') {
            let run = self
                .bytes
                .get(self.pos..)
                .unwrap_or_default()
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            self.pos += run;
            return run > 0;
        }
        true
    }
}
// ANCHOR_END: classify

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("42" => Ok(Scalar::Integer); "decimal")]
    #[test_case("+1_000" => Ok(Scalar::Integer); "signed grouped")]
    #[test_case("0xDEAD_beef" => Ok(Scalar::Integer); "hex")]
    #[test_case("0o755" => Ok(Scalar::Integer); "octal")]
    #[test_case("0b1101" => Ok(Scalar::Integer); "binary")]
    #[test_case("3.1415" => Ok(Scalar::Float); "fraction")]
    #[test_case("-2E-2" => Ok(Scalar::Float); "exponent")]
    #[test_case("6.626e-34" => Ok(Scalar::Float); "fraction and exponent")]
    #[test_case("1e06" => Ok(Scalar::Float); "exponent leading zero")]
    #[test_case("1979-05-27T07:32:00Z" => Ok(Scalar::OffsetDateTime); "offset utc")]
    #[test_case("1979-05-27t00:32:00.999999-07:00" => Ok(Scalar::OffsetDateTime); "offset fraction")]
    #[test_case("1979-05-27 07:32:00" => Ok(Scalar::LocalDateTime); "space separator")]
    #[test_case("1979-05-27" => Ok(Scalar::LocalDate); "local date")]
    #[test_case("07:32:00.5" => Ok(Scalar::LocalTime); "local time")]
    #[test_case("01" => Err(LexError::InvalidNumber); "leading zero")]
    #[test_case("1__0" => Err(LexError::InvalidNumber); "double underscore")]
    #[test_case("1_" => Err(LexError::InvalidNumber); "trailing underscore")]
    #[test_case("0x" => Err(LexError::InvalidNumber); "empty hex")]
    #[test_case("+0x10" => Err(LexError::InvalidNumber); "signed hex")]
    #[test_case("1." => Err(LexError::InvalidNumber); "empty fraction")]
    #[test_case("1.e5" => Err(LexError::InvalidNumber); "fraction before exponent")]
    #[test_case("1979-5-27" => Err(LexError::InvalidDateTime); "single digit month")]
    #[test_case("1979-05-27T7:32:00" => Err(LexError::InvalidDateTime); "single digit hour")]
    #[test_case("07:32" => Err(LexError::InvalidDateTime); "missing seconds")]
    #[test_case("1979-05-27T07:32:00+0700" => Err(LexError::InvalidDateTime); "offset without colon")]
    fn classifies_literals(word: &str) -> Result<Scalar, LexError> {
        classify(word)
    }

    #[test]
    fn scalar_word_stops_at_delimiters() {
        assert_eq!(scan_scalar_word("123, 4"), 3);
        assert_eq!(scan_scalar_word("1.5]"), 3);
        assert_eq!(scan_scalar_word("1979-05-27 07:32:00 # c"), 19);
        assert_eq!(scan_scalar_word("1979-05-27 # c"), 10);
        assert_eq!(scan_scalar_word("12 34"), 2);
    }

    #[test]
    fn basic_strings_honour_escaped_quotes() {
        assert_eq!(scan_basic(r#"a\"b" = 1"#), (5, true));
        assert_eq!(scan_basic("abc\nx"), (3, false));
        assert_eq!(scan_basic("abc"), (3, false));
        assert_eq!(scan_basic("ab\\"), (3, false));
    }

    #[test]
    fn multi_line_strings_allow_two_extra_quotes() {
        assert_eq!(scan_multi_line("a\"\"\"\"\"", b'"', true), (6, true));
        assert_eq!(scan_multi_line("a\n\"\" b'''", b'\'', false), (9, true));
        assert_eq!(scan_multi_line("a\\\"\"\"\"", b'"', true), (6, true));
        assert_eq!(scan_multi_line("open", b'"', true), (4, false));
    }

    #[test]
    fn comments_reject_control_characters() {
        assert_eq!(scan_comment(" fine\ttab\nnext"), (9, true));
        assert_eq!(scan_comment(" crlf\r\nnext"), (5, true));
        assert_eq!(scan_comment(" bell \u{7} here"), (12, false));
        assert_eq!(scan_comment(" lone \r cr"), (10, false));
    }
}
