//! The mode-switching tokenizer.
//!
//! [`Lexer`] owns an explicit stack of [`Mode`]s. Each call to `next` lexes
//! exactly one token with the token set of the mode on top of the stack and
//! then applies that token's transition:
//!
//! ```text
//! Top ──`=`──▶ Value ──scalar──▶ (pop)
//!               │ `[` ▶ Array        (`[` pushes Array, `{` pushes InlineTable, `]` pops)
//!               │ `{` ▶ InlineTable  (`=` pushes Value, `}` pops)
//! ```
//!
//! A newline inside `Value` or `InlineTable` pops back out, so a value left
//! unfinished at the end of a line cannot swallow the rest of the document.
//! Arrays may span lines, so an open array is only abandoned when the next
//! line can only be a key/value pair or a table header (see
//! [`opens_expression`]); the stack then collapses back to `Top`.
//!
//! The lexer never fails. Anything it cannot classify becomes
//! [`Token::Invalid`]; in value position the invalid stretch is widened to
//! the next delimiter so that `12abc` is one bad token rather than three.

use logos::Logos;

use crate::error::LexError;
use crate::span::Spanned;
use crate::tokens::{KeyToken, SpannedToken, Token, ValueToken};

const BOM: &str = "\u{feff}";

/// Lexical context, deciding which token set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Table headers and keys at the start of a line.
    Top,
    /// Exactly one value after `=`.
    Value,
    /// Inside `[ ... ]` on the value side.
    Array,
    /// Inside `{ ... }`: keys, with a `Value` pushed after each `=`.
    InlineTable,
}

impl Mode {
    fn uses_key_tokens(self) -> bool {
        matches!(self, Mode::Top | Mode::InlineTable)
    }
}

// ANCHOR: lexer
/// Lazy token iterator over one source text. Not restartable: create a
/// fresh lexer per parse.
#[derive(Debug, Clone)]
pub struct Lexer<'s> {
    source: &'s str,
    offset: usize,
    modes: Vec<Mode>,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        let offset = if source.starts_with(BOM) { BOM.len() } else { 0 };
        Self {
            source,
            offset,
            modes: vec![Mode::Top],
        }
    }

    /// Mode on top of the stack.
    pub fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Top)
    }

    /// Current nesting of modes, bottom first.
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    fn rest(&self) -> &'s str {
        self.source.get(self.offset..).unwrap_or_default()
    }

    /// Lexes one token at the current offset with the given mode's token set.
    fn lex_one(&self, mode: Mode) -> Option<(Token, usize)> {
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }
        let (result, len) = if mode.uses_key_tokens() {
            let mut lex = KeyToken::lexer(rest);
            let tok = lex.next()?;
            (tok.map(Token::from), lex.span().end)
        } else {
            let mut lex = ValueToken::lexer(rest);
            let tok = lex.next()?;
            (tok.map(Token::from), lex.span().end)
        };
        let len = len.max(first_char_len(rest));
        Some((result.unwrap_or_else(Token::Invalid), len))
    }

    /// In value position a scalar must be followed by a delimiter; otherwise
    /// it is widened into a single invalid token.
    fn check_delimiter(&self, token: Token, len: usize) -> (Token, usize) {
        let rest = self.rest();
        let after = rest.get(len..).unwrap_or_default();
        match token {
            Token::Invalid(err) => (Token::Invalid(err), len + delimited_len(after)),
            tok if tok.is_scalar() && !after.is_empty() && !starts_with_delimiter(after) => (
                Token::Invalid(LexError::MissingDelimiter),
                len + delimited_len(after),
            ),
            tok => (tok, len),
        }
    }

    // ANCHOR: transitions
    fn transition(&mut self, token: Token) {
        match (self.mode(), token) {
            (Mode::Top, Token::Equals) => self.modes.push(Mode::Value),
            (Mode::Top, _) => {}

            (Mode::Value, Token::LBracket) => self.replace(Mode::Array),
            (Mode::Value, Token::LBrace) => self.replace(Mode::InlineTable),
            (Mode::Value, Token::Whitespace) => {}
            (Mode::Value, tok) if tok.is_scalar() => self.pop(),
            (Mode::Value, tok) => {
                // No value before a delimiter: leave value mode and let the
                // enclosing mode see the same token.
                self.pop();
                if matches!(
                    tok,
                    Token::Newline | Token::Comma | Token::RBracket | Token::RBrace
                ) {
                    self.transition(tok);
                }
            }

            (Mode::Array, Token::LBracket) => self.modes.push(Mode::Array),
            (Mode::Array, Token::LBrace) => self.modes.push(Mode::InlineTable),
            (Mode::Array, Token::RBracket) => self.pop(),
            (Mode::Array, _) => {}

            (Mode::InlineTable, Token::Equals) => self.modes.push(Mode::Value),
            (Mode::InlineTable, Token::RBrace | Token::Newline) => self.pop(),
            (Mode::InlineTable, _) => {}
        }
    }
    // ANCHOR_END: transitions

    fn replace(&mut self, mode: Mode) {
        self.pop();
        self.modes.push(mode);
    }

    fn pop(&mut self) {
        if self.modes.len() > 1 {
            self.modes.pop();
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        let mode = self.mode();
        let (token, len) = self.lex_one(mode)?;
        let (token, len) = if mode.uses_key_tokens() {
            (token, len)
        } else {
            self.check_delimiter(token, len)
        };

        let start = self.offset;
        self.offset = (start + len).min(self.source.len());
        self.transition(token);
        if token == Token::Newline
            && self.modes.contains(&Mode::Array)
            && opens_expression(self.rest())
        {
            log::trace!("array left open before offset {}", self.offset);
            self.modes.truncate(1);
        }
        Some(Spanned::new(start, self.offset, token))
    }
}
// ANCHOR_END: lexer

fn first_char_len(rest: &str) -> usize {
    rest.chars().next().map(char::len_utf8).unwrap_or(0)
}

fn starts_with_delimiter(rest: &str) -> bool {
    rest.starts_with([' ', '\t', '\n', '\r', ',', ']', '}', '#'])
}

/// Length of `rest` up to the next delimiter.
fn delimited_len(rest: &str) -> usize {
    rest.find([' ', '\t', '\n', '\r', ',', ']', '}', '#'])
        .unwrap_or(rest.len())
}

// ANCHOR: unclosed_arrays
/// Whether the line at the start of `rest` is a key/value pair or a table
/// header, and therefore cannot continue an array from the line before.
///
/// `[name]` only counts as a header when some segment of `name` is a bare
/// word that is not also a value (`[1]` and `[true]` are nested arrays).
pub fn opens_expression(rest: &str) -> bool {
    let line = rest
        .split('\n')
        .next()
        .unwrap_or_default()
        .trim_start_matches([' ', '\t']);

    let Some(inner) = line.strip_prefix('[') else {
        return key_segments(line)
            .is_some_and(|(_, after)| after.starts_with('='));
    };
    let (inner, close) = match inner.strip_prefix('[') {
        Some(inner) => (inner, "]]"),
        None => (inner, "]"),
    };
    let Some((segments, after)) = key_segments(inner) else {
        return false;
    };
    let Some(after) = after.strip_prefix(close) else {
        return false;
    };
    let after = after.trim_matches([' ', '\t', '\r']);
    (after.is_empty() || after.starts_with('#')) && segments.iter().any(|s| names_a_table(s))
}

/// Splits a dotted key off the front of `text`, returning its raw segments
/// and what follows, with surrounding blanks removed.
fn key_segments(text: &str) -> Option<(Vec<&str>, &str)> {
    let mut segments = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start_matches([' ', '\t']);
        let (segment, after) = rest.split_at_checked(simple_key_len(rest)?)?;
        segments.push(segment);
        rest = after.trim_start_matches([' ', '\t']);
        match rest.strip_prefix('.') {
            Some(after) => rest = after,
            None => return Some((segments, rest)),
        }
    }
}

fn simple_key_len(text: &str) -> Option<usize> {
    match text.chars().next()? {
        '"' => {
            let mut escaped = false;
            for (i, c) in text.char_indices().skip(1) {
                match c {
                    '\\' if !escaped => escaped = true,
                    '"' if !escaped => return Some(i + 1),
                    _ => escaped = false,
                }
            }
            None
        }
        '\'' => text.get(1..)?.find('\'').map(|i| i + 2),
        _ => {
            let len = text
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(text.len());
            (len > 0).then_some(len)
        }
    }
}

fn names_a_table(segment: &str) -> bool {
    segment.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && !matches!(segment, "true" | "false" | "inf" | "nan")
}
// ANCHOR_END: unclosed_arrays

/// Lexes a whole document eagerly.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .into_iter()
            .map(|t| t.value)
            .filter(|t| *t != Token::Whitespace)
            .collect()
    }

    #[test]
    fn key_value_switches_into_value_mode_and_back() {
        assert_eq!(
            kinds("a = 1\nb = true\n"),
            vec![
                Token::BareKey,
                Token::Equals,
                Token::Integer,
                Token::Newline,
                Token::BareKey,
                Token::Equals,
                Token::Boolean(true),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn same_text_is_key_on_the_left_and_date_on_the_right() {
        assert_eq!(
            kinds("1979-05-27 = 1979-05-27"),
            vec![Token::BareKey, Token::Equals, Token::LocalDate]
        );
    }

    #[test]
    fn dotted_numeric_keys_split_on_dots() {
        assert_eq!(
            kinds("3.14 = 3.14"),
            vec![
                Token::BareKey,
                Token::Dot,
                Token::BareKey,
                Token::Equals,
                Token::Float
            ]
        );
    }

    #[test]
    fn headers_use_double_brackets() {
        assert_eq!(
            kinds("[[a.b]]\n[c]"),
            vec![
                Token::DoubleLBracket,
                Token::BareKey,
                Token::Dot,
                Token::BareKey,
                Token::DoubleRBracket,
                Token::Newline,
                Token::LBracket,
                Token::BareKey,
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn nested_arrays_and_inline_tables_track_modes() {
        let mut lexer = Lexer::new("a = [[1], {b = [2]}]\nc = 3");
        let mut deepest = 0;
        let mut tokens = Vec::new();
        while let Some(tok) = lexer.next() {
            deepest = deepest.max(lexer.modes().len());
            tokens.push(tok.value);
        }
        assert_eq!(lexer.modes(), &[Mode::Top]);
        assert_eq!(deepest, 4);
        assert!(!tokens.iter().any(|t| matches!(t, Token::Invalid(_))));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Integer).count(), 3);
    }

    #[test]
    fn inline_table_keys_are_bare_keys() {
        assert_eq!(
            kinds("t = {true = false}"),
            vec![
                Token::BareKey,
                Token::Equals,
                Token::LBrace,
                Token::BareKey,
                Token::Equals,
                Token::Boolean(false),
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn arrays_span_lines_with_comments() {
        assert_eq!(
            kinds("a = [\n  1, # one\n  2,\n]"),
            vec![
                Token::BareKey,
                Token::Equals,
                Token::LBracket,
                Token::Newline,
                Token::Integer,
                Token::Comma,
                Token::Comment,
                Token::Newline,
                Token::Integer,
                Token::Comma,
                Token::Newline,
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn scalar_without_delimiter_is_one_invalid_token() {
        let tokens = tokenize("a = 12abc\nb = 1");
        let invalid: Vec<_> = tokens
            .iter()
            .filter(|t| matches!(t.value, Token::Invalid(_)))
            .collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].span.start, 4);
        assert_eq!(invalid[0].span.end, 9);
        assert!(tokens.iter().any(|t| t.value == Token::Integer));
    }

    #[test]
    fn unterminated_string_stops_at_newline() {
        let tokens = tokenize("x = \"abc\ny = 1");
        assert_eq!(
            tokens[4].value,
            Token::Invalid(LexError::UnterminatedString)
        );
        assert_eq!(tokens[4].span.end, 8);
        assert_eq!(tokens[5].value, Token::Newline);
        assert_eq!(tokens[6].value, Token::BareKey);
    }

    #[test]
    fn comment_with_control_character_is_invalid() {
        let tokens = tokenize("# bad \u{1}\n");
        assert_eq!(
            tokens[0].value,
            Token::Invalid(LexError::ControlCharacterInComment)
        );
    }

    #[test]
    fn leading_bom_is_skipped() {
        let tokens = tokenize("\u{feff}a = 1");
        assert_eq!(tokens[0].value, Token::BareKey);
        assert_eq!(tokens[0].span.start, 3);
    }

    #[test]
    fn newline_ends_unfinished_inline_table() {
        let mut lexer = Lexer::new("a = {b = 1\nc = 2");
        let tokens: Vec<_> = lexer.by_ref().map(|t| t.value).collect();
        assert_eq!(lexer.modes(), &[Mode::Top]);
        assert_eq!(tokens.last(), Some(&Token::Integer));
    }

    #[test]
    fn open_array_closes_before_a_key_value_line() {
        let mut lexer = Lexer::new("a = [1,\nb = 2");
        let tokens: Vec<_> = lexer.by_ref().map(|t| t.value).collect();
        assert_eq!(lexer.modes(), &[Mode::Top]);
        assert!(tokens.contains(&Token::BareKey));
        assert_eq!(tokens.last(), Some(&Token::Integer));
    }

    #[test]
    fn open_array_continues_over_value_lines() {
        let mut lexer = Lexer::new("a = [\n  [1],\n  'x',\n");
        lexer.by_ref().for_each(drop);
        assert_eq!(lexer.modes(), &[Mode::Top, Mode::Array]);
    }

    #[test_case::test_case("b = 1", true ; "key value")]
    #[test_case::test_case("  a.\"b c\".'d' = 1", true ; "quoted dotted key")]
    #[test_case::test_case("[table]", true ; "table header")]
    #[test_case::test_case("[[a.b]] # c", true ; "array table header")]
    #[test_case::test_case("[ 1.x ]\r", true ; "header with one word segment")]
    #[test_case::test_case("[1]", false ; "nested integer array")]
    #[test_case::test_case("[true]", false ; "nested boolean array")]
    #[test_case::test_case("[\"a\"]", false ; "nested string array")]
    #[test_case::test_case("[a], [b]", false ; "two arrays")]
    #[test_case::test_case("1, 2", false ; "values")]
    #[test_case::test_case("'x' # no equals", false ; "string")]
    #[test_case::test_case("]", false ; "closing bracket")]
    #[test_case::test_case("", false ; "blank")]
    fn lines_that_open_an_expression(line: &str, expected: bool) {
        assert_eq!(opens_expression(&format!("{line}\nrest = 1")), expected);
    }

    #[test]
    fn tokens_cover_the_whole_input() {
        let source = "a = [1, 'x', \"y\"] # c\n[t]\nb = 1979-05-27 07:32:00Z\n";
        let tokens = tokenize(source);
        let mut expected_start = 0;
        for tok in &tokens {
            assert_eq!(tok.span.start, expected_start);
            expected_start = tok.span.end;
        }
        assert_eq!(expected_start, source.len());
    }
}
