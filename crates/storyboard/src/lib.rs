//! Storyboard - multi-scene visual storyboards from a story prompt
//!
//! Storyboard turns a natural-language story into an ordered set of scenes,
//! each with two generated image variants, by sequencing structured-output
//! and image-generation calls against a generative backend.
//!
//! # Features
//!
//! - **Story world synthesis**: premise, three-act structure and 6-8 attractors
//! - **Character consistency**: reference-image profiles re-embedded in every prompt
//! - **Exact scene counts**: schema-bounded scripts with truncation on overrun
//! - **Resilient frames**: backoff retries, a simplified fallback prompt and
//!   visible error frames instead of failed runs
//! - **Continuation**: append one scene to an existing storyboard
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storyboard::{
//!     AspectRatio, FrameCount, GeminiClient, GenerationOrchestrator, RunControl,
//!     StoryboardConfig, StoryboardRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryboardConfig::load()?;
//!     let client = GeminiClient::from_env(config.gemini.clone())?;
//!     let orchestrator = GenerationOrchestrator::new(Arc::new(client), &config);
//!
//!     let request = StoryboardRequest::builder()
//!         .story("A fox searches a forest for a lost key")
//!         .frame_count(FrameCount::try_from(4)?)
//!         .aspect_ratio(AspectRatio::Landscape)
//!         .build()?;
//!
//!     let storyboard = orchestrator.generate(&request, RunControl::new()).await?;
//!     println!("{}", serde_json::to_string_pretty(&storyboard)?);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `storyboard_error` - Error types
//! - `storyboard_core` - Data model and LLM request types
//! - `storyboard_interface` - Backend capability traits
//! - `storyboard_rate_limit` - Configuration, rate limiting and retry policy
//! - `storyboard_models` - Gemini provider
//! - `storyboard_pipeline` - Generation pipeline and orchestrator
//!
//! This crate (`storyboard`) re-exports everything for convenience.

#![forbid(unsafe_code)]

pub use storyboard_core::*;
pub use storyboard_error::*;
pub use storyboard_interface::*;
pub use storyboard_models::*;
pub use storyboard_pipeline::*;
pub use storyboard_rate_limit::*;
