//! Request and response types at the generative-backend boundary.

use crate::{AspectRatio, Input};
use serde::{Deserialize, Serialize};

/// Request for schema-constrained structured output.
///
/// # Examples
///
/// ```
/// use storyboard_core::{Input, StructuredRequest};
/// use serde_json::json;
///
/// let request = StructuredRequest::builder()
///     .parts(vec![Input::Text("Describe a forest".to_string())])
///     .schema(json!({"type": "object"}))
///     .temperature(0.8_f32)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.parts.len(), 1);
/// assert_eq!(request.model, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct StructuredRequest {
    /// Prompt parts, in order
    pub parts: Vec<Input>,
    /// JSON schema the response must conform to
    pub schema: serde_json::Value,
    /// Model override (provider default when `None`)
    #[builder(default, setter(into, strip_option))]
    pub model: Option<String>,
    /// Sampling temperature
    #[builder(default, setter(into, strip_option))]
    pub temperature: Option<f32>,
}

impl StructuredRequest {
    /// Creates a new request builder.
    pub fn builder() -> StructuredRequestBuilder {
        StructuredRequestBuilder::default()
    }
}

/// Request for a single generated image.
///
/// # Examples
///
/// ```
/// use storyboard_core::{AspectRatio, ImageRequest, Input};
///
/// let request = ImageRequest::builder()
///     .parts(vec![Input::Text("A fox in a forest".to_string())])
///     .aspect_ratio(AspectRatio::Portrait)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.aspect_ratio, AspectRatio::Portrait);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ImageRequest {
    /// Prompt parts: reference images followed by instructions
    pub parts: Vec<Input>,
    /// Target aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Model override (provider default when `None`)
    #[builder(default, setter(into, strip_option))]
    pub model: Option<String>,
}

impl ImageRequest {
    /// Creates a new request builder.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}

/// Raw image returned by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// MIME type reported by the backend
    pub mime: String,
    /// Image bytes
    pub data: Vec<u8>,
}
