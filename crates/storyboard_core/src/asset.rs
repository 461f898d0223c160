//! Reference image assets supplied by the caller.

use crate::{Input, MediaSource};
use serde::{Deserialize, Serialize};

/// Maximum number of secondary character references per run.
pub const MAX_SECONDARY_CHARACTERS: usize = 9;

/// A binary asset as `{mimeType, base64Data}`.
///
/// # Examples
///
/// ```
/// use storyboard_core::{Input, ReferenceAsset};
///
/// let asset = ReferenceAsset::new("image/png", "iVBORw0KGgo=");
/// assert!(asset.to_input().is_image());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceAsset {
    /// MIME type of the image
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub base64_data: String,
}

impl ReferenceAsset {
    /// Creates a new asset from a MIME type and base64 payload.
    pub fn new(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64_data: base64_data.into(),
        }
    }

    /// The asset as an inline image prompt part.
    pub fn to_input(&self) -> Input {
        Input::Image {
            mime: Some(self.mime_type.clone()),
            source: MediaSource::Base64(self.base64_data.clone()),
        }
    }
}

/// Which character a reference image depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CharacterRole {
    /// The protagonist
    Main,
    /// A supporting character
    Secondary,
}

/// Optional reference images guiding frame synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceAssets {
    /// Brand logo to place in frames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<ReferenceAsset>,
    /// The protagonist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_character: Option<ReferenceAsset>,
    /// Supporting characters, at most [`MAX_SECONDARY_CHARACTERS`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_characters: Vec<ReferenceAsset>,
    /// Environment reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<ReferenceAsset>,
    /// Visual style reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_style: Option<ReferenceAsset>,
}

impl ReferenceAssets {
    /// Whether no reference image was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.logo.is_none()
            && self.main_character.is_none()
            && self.secondary_characters.is_empty()
            && self.background.is_none()
            && self.art_style.is_none()
    }
}
