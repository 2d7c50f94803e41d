//! Line/column resolution for byte spans.
//!
//! Tokens and syntax nodes carry byte offsets only. Diagnostics want
//! human-readable positions, so [`LineIndex`] records where every line
//! starts once per document and resolves offsets on demand.

use core::fmt;

/// A 1-based line and column. Columns count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Precomputed line starts of a source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    source: std::sync::Arc<str>,
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: impl Into<std::sync::Arc<str>>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    /// Resolves a byte offset. Offsets past the end clamp to the end of input,
    /// offsets inside a multi-byte character resolve to that character.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = self
            .source
            .get(start..)
            .map(|rest| {
                rest.char_indices()
                    .take_while(|(i, _)| start + i < offset)
                    .count()
            })
            .unwrap_or(0);
        Position {
            line: line + 1,
            column: column + 1,
        }
    }

    /// Resolves both ends of a byte range.
    pub fn range(&self, start: usize, end: usize) -> (Position, Position) {
        (self.position(start), self.position(end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_is_one_based() {
        let index = LineIndex::new("a = 1");
        assert_eq!(index.position(0), Position { line: 1, column: 1 });
        assert_eq!(index.position(4), Position { line: 1, column: 5 });
    }

    #[test]
    fn offsets_after_newline_start_next_line() {
        let index = LineIndex::new("a = 1\nb = 2\n");
        assert_eq!(index.position(12), Position { line: 3, column: 1 });
        assert_eq!(index.position(5), Position { line: 1, column: 6 });
        assert_eq!(index.position(6), Position { line: 2, column: 1 });
        assert_eq!(index.position(10), Position { line: 2, column: 5 });
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        let index = LineIndex::new("k = \"é\" x");
        // 'é' is two bytes; the trailing 'x' sits at byte 9 but char column 9
        assert_eq!(index.position(9), Position { line: 1, column: 9 });
    }

    #[test]
    fn out_of_range_offsets_clamp() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.position(100), Position { line: 2, column: 3 });
    }

    #[test]
    fn display_is_line_colon_column() {
        assert_eq!(Position { line: 3, column: 7 }.to_string(), "3:7");
    }
}
