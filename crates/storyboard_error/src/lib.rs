//! Error types for the storyboard generation pipeline.
//!
//! This crate provides the error taxonomy shared by every storyboard crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Phase-level failures (story world, script) abort a run; frame-level
//! failures are recovered by the pipeline and never reach the caller.
//!
//! # Examples
//!
//! ```
//! use storyboard_error::{ConfigError, ErrorCategory, StoryboardResult};
//!
//! fn load_key() -> StoryboardResult<String> {
//!     Err(ConfigError::new("GEMINI_API_KEY not set"))?
//! }
//!
//! let err = load_key().unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::MissingConfiguration);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod frame;
mod gemini;
mod http;
mod json;
mod pipeline;
mod schema;

pub use config::ConfigError;
pub use error::{ErrorCategory, StoryboardError, StoryboardErrorKind, StoryboardResult};
pub use frame::{FrameError, FrameErrorKind};
pub use gemini::{GeminiError, GeminiErrorKind, RetryableError};
pub use http::HttpError;
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use schema::SchemaError;
