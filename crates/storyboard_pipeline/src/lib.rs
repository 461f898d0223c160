//! Storyboard generation pipeline.
//!
//! Turns a story prompt into a [`Storyboard`](storyboard_core::Storyboard):
//!
//! 1. [`StoryWorldSynthesizer`] builds the narrative architecture
//! 2. [`CharacterConsistencyAgent`] turns reference images into blueprints
//! 3. [`ScriptGenerator`] writes exactly the requested number of scenes
//! 4. [`ConsistencyValidator`] logs heuristic consistency issues
//! 5. [`FrameSynthesizer`] renders two variants per scene with retry and fallback
//!
//! [`GenerationOrchestrator`] sequences the phases, reports progress and
//! handles continuation of an existing storyboard.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storyboard_core::{AspectRatio, FrameCount, StoryboardRequest};
//! use storyboard_models::GeminiClient;
//! use storyboard_pipeline::{GenerationOrchestrator, RunControl};
//! use storyboard_rate_limit::StoryboardConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoryboardConfig::load()?;
//! let client = GeminiClient::from_env(config.gemini.clone())?;
//! let orchestrator = GenerationOrchestrator::new(Arc::new(client), &config);
//!
//! let request = StoryboardRequest::builder()
//!     .story("A fox searches a forest for a lost key")
//!     .frame_count(FrameCount::try_from(4)?)
//!     .aspect_ratio(AspectRatio::Landscape)
//!     .build()?;
//! let storyboard = orchestrator.generate(&request, RunControl::new()).await?;
//! assert_eq!(storyboard.scenes.len(), 2);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod character;
mod frames;
mod orchestrator;
mod progress;
mod prompt;
pub mod schema;
mod script;
mod story_world;
mod validator;

pub use character::{
    CONSISTENCY_DIRECTIVE, CharacterConsistencyAgent, merge_blueprint, secondary_blueprint,
};
pub use frames::{FrameContext, FrameSynthesizer, accept_image, derive_metadata};
pub use orchestrator::{GenerationOrchestrator, GenerationState, RunControl};
pub use progress::{ProgressReporter, TickerGuard, estimate_remaining};
pub use prompt::{
    PromptParts, ReferenceFlags, ReferencePart, build_prompt_context, continuity_context,
};
pub use script::{ScriptContext, ScriptGenerator};
pub use story_world::{StoryWorldSynthesizer, parse_story_world, placeholder_world};
pub use validator::{ConsistencyValidator, ValidationReport};
