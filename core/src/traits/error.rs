use super::stream::SpanLike;

/// Error that can carry the source range it was raised for.
///
/// Parse errors gain their span at the grammar rule that failed; the driver
/// turns that span into a `line:column` prefix for the diagnostic.
pub trait SpannedError: Sized {
    type Span: SpanLike;

    /// Wrap with span information.
    fn with_span(self, span: Self::Span) -> Self;

    /// Get span if present.
    fn span(&self) -> Option<&Self::Span>;

    /// Attach `span` unless the error already carries a more precise one.
    fn or_span(self, span: Self::Span) -> Self {
        if self.span().is_some() {
            self
        } else {
            self.with_span(span)
        }
    }
}
