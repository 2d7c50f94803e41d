//! Parser configuration for resource limits and error policy.
//!
//! This module provides [`ParseConfig`] for controlling parser behavior:
//! a nesting-depth guard for arrays and inline tables, a token budget, and
//! whether tree building keeps going after the first semantic error.
//!
//! # Recursion Limits
//!
//! Arrays and inline tables are parsed recursively. Following `serde_json`,
//! the parser enforces a maximum recursion depth so that adversarial input
//! such as `a = [[[[[[...]]]]]]` cannot overflow the stack. The default
//! limit of 128 is far deeper than any hand-written configuration file.
//!
//! # Example
//!
//! ```
//! use tomltree_core::config::ParseConfig;
//!
//! // Use default limits (recursion depth: 128)
//! let config = ParseConfig::default();
//!
//! // Increase limit for machine-generated data
//! let config = ParseConfig::new()
//!     .with_max_recursion_depth(256);
//!
//! // Stop tree building at the first redefinition or type conflict
//! let config = ParseConfig::new().with_first_error_only(true);
//! assert!(config.first_error_only);
//! ```

use crate::Error;

/// Configuration for parser behavior and resource limits.
///
/// # Default Values
///
/// | Setting | Default | Rationale |
/// |---------|---------|-----------|
/// | `max_recursion_depth` | 128 | Matches serde_json default |
/// | `max_tokens` | `usize::MAX` | No limit by default |
/// | `first_error_only` | `false` | Report every independent semantic error |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct ParseConfig {
    /// Maximum nesting of arrays and inline tables.
    ///
    /// Exceeding it cancels the parse with
    /// [`Error::RecursionLimitExceeded`].
    ///
    /// Default: 128 (matching serde_json)
    pub max_recursion_depth: usize,

    /// Maximum number of tokens the lexer may produce.
    ///
    /// Exceeding it cancels the parse with [`Error::TokenLimitExceeded`].
    ///
    /// Default: `usize::MAX` (no limit)
    pub max_tokens: usize,

    /// Stop building the tree at the first semantic error.
    ///
    /// Syntax errors are always collected for the whole document. When this
    /// is `false`, semantic errors (duplicate keys, table redefinitions) are
    /// collected per expression as well.
    ///
    /// Default: `false`
    pub first_error_only: bool,
}

impl Default for ParseConfig {
    /// Returns the default configuration.
    ///
    /// - `max_recursion_depth`: 128
    /// - `max_tokens`: `usize::MAX`
    /// - `first_error_only`: `false`
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ParseConfig {
    /// Default configuration, usable in const contexts.
    pub const DEFAULT: Self = Self {
        max_recursion_depth: 128,
        max_tokens: usize::MAX,
        first_error_only: false,
    };

    /// Creates a new configuration with default values.
    #[inline]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Sets the maximum recursion depth.
    ///
    /// # Arguments
    ///
    /// * `depth` - Maximum nesting level. Use `usize::MAX` to disable the limit.
    #[inline]
    pub const fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Sets the maximum token count.
    ///
    /// # Arguments
    ///
    /// * `count` - Maximum tokens to produce. Use `usize::MAX` to disable.
    #[inline]
    pub const fn with_max_tokens(mut self, count: usize) -> Self {
        self.max_tokens = count;
        self
    }

    /// Selects between first-wins and cumulative semantic error reporting.
    #[inline]
    pub const fn with_first_error_only(mut self, first_only: bool) -> Self {
        self.first_error_only = first_only;
        self
    }

    /// Disables the recursion limit.
    ///
    /// # Warning
    ///
    /// Only use this when parsing trusted input! Untrusted deeply-nested
    /// input can cause stack overflow.
    #[inline]
    pub const fn disable_recursion_limit(self) -> Self {
        self.with_max_recursion_depth(usize::MAX)
    }
}

/// Tracks recursion depth during parsing.
///
/// Token streams embed one of these and pair it with
/// [`ParseConfig::max_recursion_depth`] in
/// [`TokenStream::enter_nested`](crate::TokenStream::enter_nested).
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursionGuard {
    depth: usize,
}

impl RecursionGuard {
    /// Creates a new guard with depth 0.
    #[inline]
    pub const fn new() -> Self {
        Self { depth: 0 }
    }

    /// Current recursion depth.
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Enter a nested context, incrementing depth.
    ///
    /// Returns `Err(Error::RecursionLimitExceeded)` if the new depth would
    /// exceed `limit`.
    #[inline]
    pub fn enter(&mut self, limit: usize) -> Result<(), Error> {
        self.depth = self.depth.saturating_add(1);
        if self.depth > limit {
            Err(Error::RecursionLimitExceeded {
                depth: self.depth,
                limit,
            })
        } else {
            Ok(())
        }
    }

    /// Exit a nested context, decrementing depth.
    ///
    /// Uses saturating subtraction so extra `exit()` calls don't underflow.
    #[inline]
    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_defaults() {
        let config = ParseConfig::default();
        assert_eq!(config.max_recursion_depth, 128);
        assert_eq!(config.max_tokens, usize::MAX);
        assert!(!config.first_error_only);
        assert_eq!(config, ParseConfig::DEFAULT);
    }

    #[test]
    fn test_parse_config_builder() {
        let config = ParseConfig::new()
            .with_max_recursion_depth(256)
            .with_max_tokens(10000)
            .with_first_error_only(true);

        assert_eq!(config.max_recursion_depth, 256);
        assert_eq!(config.max_tokens, 10000);
        assert!(config.first_error_only);
    }

    #[test]
    fn test_parse_config_disable_recursion() {
        let config = ParseConfig::new().disable_recursion_limit();
        assert_eq!(config.max_recursion_depth, usize::MAX);
    }

    #[test]
    fn test_recursion_guard_tracks_nesting() {
        let mut guard = RecursionGuard::new();
        guard.enter(3).unwrap();
        guard.enter(3).unwrap();
        assert_eq!(guard.depth(), 2);

        guard.enter(3).unwrap();
        assert!(matches!(
            guard.enter(3),
            Err(Error::RecursionLimitExceeded { depth: 4, limit: 3 })
        ));

        for _ in 0..6 {
            guard.exit();
        }
        assert_eq!(guard.depth(), 0);
    }
}
