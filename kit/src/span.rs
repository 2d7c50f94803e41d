/// Byte range into the parsed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty span at `offset`, used for end-of-input errors.
    #[inline]
    pub const fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }
}

impl tomltree_core::SpanLike for Span {
    #[inline]
    fn start(&self) -> usize {
        self.start
    }

    #[inline]
    fn end(&self) -> usize {
        self.end
    }

    #[inline]
    fn new(start: usize, end: usize) -> Self {
        Self::new(start, end)
    }
}

/// A value with associated source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub span: Span,
    pub value: T,
}

impl<T> Spanned<T> {
    #[inline]
    pub fn new(start: usize, end: usize, value: T) -> Self {
        Self {
            span: Span::new(start, end),
            value,
        }
    }
}

impl<T> std::ops::Deref for Spanned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: Clone> tomltree_core::SpannedLike<T> for Spanned<T> {
    type Span = Span;

    fn span(&self) -> &Span {
        &self.span
    }

    fn value_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(target_pointer_width = "64")]
const _: () = {
    use core::mem::size_of;

    const _SPAN_SIZE: () = assert!(size_of::<Span>() == 16);
    const _SPANNED_USIZE_SIZE: () = assert!(size_of::<Spanned<usize>>() == 24);
};
