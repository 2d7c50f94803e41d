//! Core traits shared by every grammar built on tomltree-core.
//!
//! # Trait Hierarchy
//!
//! ```text
//! TokenStream (cursor over lexed tokens)
//!     ├── peek_token / next (trivia skipped)
//!     ├── skip_until (error recovery)
//!     └── enter_nested / exit_nested (recursion limits)
//!
//! SpanLike (position tracking)
//!     └── SpannedLike<T> (value + span)
//!
//! Diagnostic (error reporting)
//!     └── SpannedError (error + span)
//! ```
//!
//! Grammar crates define their own concrete `Parse` and `Peek` traits over
//! their token type; the stream here only moves the cursor.
//!
//! # Feature Flags
//!
//! - `std`: Enables `std::error::Error` implementations
//! - `serde`: Enables serialization for positions and configuration

mod diagnostic;
mod error;
mod stream;

pub use diagnostic::Diagnostic;
pub use error::SpannedError;
pub use stream::{SpanLike, SpannedLike, TokenStream};
