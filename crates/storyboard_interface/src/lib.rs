//! Trait definitions for the generative backends behind the storyboard pipeline.
//!
//! The pipeline never talks to a provider directly. It depends on two
//! capability traits, [`JsonMode`] for schema-constrained structured output
//! (including vision analysis of reference images) and [`ImageGeneration`]
//! for frame synthesis. [`GenerativeBackend`] bundles both.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{GenerativeBackend, ImageGeneration, JsonMode, StoryboardDriver};
