#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Grammar-agnostic parsing infrastructure for `tomltree`.
//!
//! This crate holds the pieces of the pipeline that do not know anything
//! about TOML itself: byte spans and their line/column resolution, the
//! [`TokenStream`] cursor interface, resource limits, and the core error
//! type raised when those limits are hit.

pub mod config;
mod error;
pub mod span;
pub mod traits;

pub use config::{ParseConfig, RecursionGuard};
pub use error::Error;
pub use span::{LineIndex, Position};
pub use traits::{Diagnostic, SpanLike, SpannedError, SpannedLike, TokenStream};
