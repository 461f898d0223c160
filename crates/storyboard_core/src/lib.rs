//! Core data types for the storyboard generation pipeline.
//!
//! This crate provides the storyboard data model (story world, character
//! profiles, scenes, frames, progress events) and the request/response
//! types exchanged with generative backends.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset;
mod format;
mod input;
mod media;
mod profile;
mod progress;
mod request;
mod scene;
mod storyboard;
mod world;

pub use asset::{CharacterRole, MAX_SECONDARY_CHARACTERS, ReferenceAsset, ReferenceAssets};
pub use format::{AspectRatio, FrameCount};
pub use input::Input;
pub use media::MediaSource;
pub use profile::{CharacterProfile, EnhancedBlueprints};
pub use progress::{GenerationPhase, GenerationProgress};
pub use request::{
    GeneratedImage, ImageRequest, ImageRequestBuilder, ImageRequestBuilderError,
    StructuredRequest, StructuredRequestBuilder, StructuredRequestBuilderError,
};
pub use scene::{ERROR_IMAGE_URL, Frame, FrameMetadata, FrameVariant, Scene, SceneScript};
pub use storyboard::{
    Storyboard, StoryboardRequest, StoryboardRequestBuilder, StoryboardRequestBuilderError,
};
pub use world::{Boundaries, CoreConflict, StoryStructure, StoryWorld};
