//! Generative backend integrations for the storyboard pipeline.
//!
//! Currently a single provider, Google Gemini over its REST API, implementing
//! [`storyboard_interface::JsonMode`] and
//! [`storyboard_interface::ImageGeneration`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extraction;
mod gemini;

pub use extraction::{extract_json, parse_json_response};
pub use gemini::{GEMINI_API_KEY_VAR, GeminiClient};
