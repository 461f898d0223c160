//! Input parts sent to generative backends.

use crate::MediaSource;
use serde::{Deserialize, Serialize};

/// One part of a multimodal prompt.
///
/// Backends must preserve part order: image models weigh references that
/// precede an instruction differently from ones that follow it.
///
/// # Examples
///
/// ```
/// use storyboard_core::{Input, MediaSource};
///
/// let parts = vec![
///     Input::Image {
///         mime: Some("image/png".to_string()),
///         source: MediaSource::Base64("iVBORw0KGgo...".to_string()),
///     },
///     Input::Text("Render this character in a forest".to_string()),
/// ];
/// assert!(parts[1].as_text().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Input {
    /// Plain text input.
    Text(String),

    /// Image input (PNG, JPEG, WebP, etc.).
    Image {
        /// MIME type, e.g., "image/png" or "image/jpeg"
        mime: Option<String>,
        /// Media source (URL, base64, or raw bytes)
        source: MediaSource,
    },
}

impl Input {
    /// Text content of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Input::Text(text) => Some(text),
            Input::Image { .. } => None,
        }
    }

    /// Whether this part carries an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Input::Image { .. })
    }
}
