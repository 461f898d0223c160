//! Backend capability traits.

use async_trait::async_trait;
use storyboard_core::{GeneratedImage, ImageRequest, StructuredRequest};
use storyboard_error::StoryboardResult;

/// Core trait every generative backend implements.
pub trait StoryboardDriver: Send + Sync {
    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier for text and structured output.
    fn model_name(&self) -> &str;
}

/// Trait for models that support structured JSON output.
///
/// Image parts in the request are analyzed by the model, so this trait also
/// covers vision analysis.
#[async_trait]
pub trait JsonMode: StoryboardDriver {
    /// Generate output conforming to the request's JSON schema.
    ///
    /// Returns the parsed JSON value. Conformance to the schema is requested
    /// from the provider but still has to be checked by the caller.
    async fn generate_json(&self, req: &StructuredRequest) -> StoryboardResult<serde_json::Value>;
}

/// Trait for models that can generate images.
#[async_trait]
pub trait ImageGeneration: StoryboardDriver {
    /// Generate a single image from reference images and instructions.
    async fn generate_image(&self, req: &ImageRequest) -> StoryboardResult<GeneratedImage>;

    /// Default model identifier for image output.
    fn image_model_name(&self) -> &str {
        self.model_name()
    }
}

/// Everything the storyboard pipeline needs from a backend.
pub trait GenerativeBackend: JsonMode + ImageGeneration {}

impl<T> GenerativeBackend for T where T: JsonMode + ImageGeneration {}
