//! Google Gemini REST provider.

mod client;
mod dto;

pub use client::{GEMINI_API_KEY_VAR, GeminiClient};
