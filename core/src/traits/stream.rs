use crate::Error;

/// A byte range within the source text.
pub trait SpanLike: Clone {
    /// Returns the start byte offset.
    fn start(&self) -> usize;

    /// Returns the end byte offset (exclusive).
    fn end(&self) -> usize;

    /// Creates a new span from start and end offsets.
    fn new(start: usize, end: usize) -> Self;
}

/// A value paired with its source span.
pub trait SpannedLike<T> {
    /// The span type used to track source locations.
    type Span: SpanLike + Copy;

    /// Returns a reference to the span.
    fn span(&self) -> &Self::Span;

    /// Returns a reference to the wrapped value.
    fn value_ref(&self) -> &T;
}

/// A cursor over lexed tokens.
///
/// Token streams support peeking and consumption. Trivia (whitespace) is
/// visible through the `_raw` methods and skipped by
/// [`peek_token`](TokenStream::peek_token) and [`next`](TokenStream::next).
pub trait TokenStream: Sized {
    /// The token type produced by the lexer.
    type Token: Clone;

    /// The span type for tracking source locations.
    type Span: SpanLike;

    /// A spanned wrapper type for associating values with spans.
    type Spanned<T: Clone>: SpannedLike<T, Span = Self::Span>;

    /// Peeks at the next token without consuming (includes trivia).
    fn peek_token_raw(&self) -> Option<&Self::Spanned<Self::Token>>;

    /// Consumes and returns the next token (includes trivia).
    fn next_raw(&mut self) -> Option<Self::Spanned<Self::Token>>;

    /// Returns the current cursor position.
    fn cursor(&self) -> usize;

    /// Returns the span of the last consumed token.
    fn last_span(&self) -> Option<Self::Span>;

    /// Whether `token` is trivia that `peek_token` and `next` step over.
    fn is_trivia(token: &Self::Token) -> bool;

    /// Peeks at the next significant token.
    #[inline]
    fn peek_token(&self) -> Option<&Self::Spanned<Self::Token>> {
        let mut pos = self.cursor();
        loop {
            let tok = self.peek_at(pos)?;
            if !Self::is_trivia(tok.value_ref()) {
                return Some(tok);
            }
            pos += 1;
        }
    }

    /// Peeks at the token stored at absolute position `pos`, or `None`
    /// when `pos` is outside the stream's range.
    fn peek_at(&self, pos: usize) -> Option<&Self::Spanned<Self::Token>>;

    /// Consumes and returns the next significant token.
    #[inline]
    fn next(&mut self) -> Option<Self::Spanned<Self::Token>> {
        loop {
            let tok = self.next_raw()?;
            if !Self::is_trivia(tok.value_ref()) {
                return Some(tok);
            }
        }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.peek_token().is_none()
    }

    /// Consumes raw tokens until `stop` matches the next one, leaving the
    /// matching token unconsumed. Returns how many tokens were skipped.
    fn skip_until(&mut self, mut stop: impl FnMut(&Self::Token) -> bool) -> usize {
        let mut skipped = 0;
        while let Some(tok) = self.peek_token_raw() {
            if stop(tok.value_ref()) {
                break;
            }
            self.next_raw();
            skipped += 1;
        }
        skipped
    }

    /// Enters a nested construct, failing once the configured depth is hit.
    ///
    /// Streams without a limit accept any depth.
    #[inline]
    fn enter_nested(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Leaves a nested construct entered with
    /// [`enter_nested`](TokenStream::enter_nested).
    #[inline]
    fn exit_nested(&mut self) {}
}
