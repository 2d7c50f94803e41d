/// Diagnostic formatting for error messages.
pub trait Diagnostic {
    /// Human name of the expected construct, e.g. "`]`" or "key".
    fn fmt() -> &'static str;
}
