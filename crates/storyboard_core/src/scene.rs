//! Scenes and frames.

use serde::{Deserialize, Serialize};

/// Visible error image substituted for a frame that could not be generated.
pub const ERROR_IMAGE_URL: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' width='640' height='360'><rect width='100%' height='100%' fill='%232b2b2b'/><text x='50%' y='50%' fill='%23ff6b6b' font-size='28' font-family='sans-serif' text-anchor='middle'>Frame generation failed</text></svg>";

/// Script of one scene: narrative fields plus the eight-tier attribute hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneScript {
    /// 1-based, contiguous scene number
    pub id: u32,
    /// Short title
    pub title: String,
    /// Narrative line of the scene
    pub script_line: String,
    /// Dominant emotion
    pub emotion: String,
    /// Narrative purpose
    pub intent: String,
    /// Tier 1: shot format, lens, frame rate feel
    pub cinematography_format: String,
    /// Tier 2: who appears and exactly how they look
    pub subject_identity: String,
    /// Tier 3: location, time, environment
    pub scene_context: String,
    /// Tier 4: what happens
    pub action: String,
    /// Tier 5: framing and camera movement
    pub camera_composition: String,
    /// Tier 6: look, lighting, mood
    pub style_ambiance: String,
    /// Tier 7: sound and dialogue cues
    pub audio_dialogue: String,
    /// Tier 8: what must not appear
    pub technical_negative: String,
    /// Single prompt integrating every tier
    pub veo_prompt: String,
}

impl SceneScript {
    /// The eight tiers, labelled, in hierarchy order.
    pub fn tiers(&self) -> [(&'static str, &str); 8] {
        [
            ("Cinematography & format", self.cinematography_format.as_str()),
            ("Subject identity", self.subject_identity.as_str()),
            ("Scene context", self.scene_context.as_str()),
            ("Action", self.action.as_str()),
            ("Camera & composition", self.camera_composition.as_str()),
            ("Style & ambiance", self.style_ambiance.as_str()),
            ("Audio & dialogue", self.audio_dialogue.as_str()),
            ("Technical & negative", self.technical_negative.as_str()),
        ]
    }

    /// Renders the tiers as one prompt paragraph.
    pub fn render_tiers(&self) -> String {
        self.tiers()
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Which of the two frames of a scene.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
pub enum FrameVariant {
    /// Primary composition
    A,
    /// Alternate composition
    B,
}

impl FrameVariant {
    /// Both variants, in order.
    pub const BOTH: [FrameVariant; 2] = [FrameVariant::A, FrameVariant::B];

    /// Variant letter.
    pub fn letter(&self) -> char {
        match self {
            FrameVariant::A => 'A',
            FrameVariant::B => 'B',
        }
    }
}

/// Visual metadata describing a frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMetadata {
    /// Composition summary
    pub composition: String,
    /// Dominant colors
    pub palette: Vec<String>,
    /// Lighting summary
    pub lighting: String,
    /// Camera summary
    pub camera: String,
}

/// One generated image variant of a scene.
///
/// # Examples
///
/// ```
/// use storyboard_core::{ERROR_IMAGE_URL, Frame, FrameMetadata, FrameVariant};
///
/// let frame = Frame::new(3, FrameVariant::B, ERROR_IMAGE_URL, FrameMetadata::default());
/// assert_eq!(frame.id, "3B");
/// assert!(frame.is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// `"{sceneId}{variant}"`
    pub id: String,
    /// A or B
    pub variant: FrameVariant,
    /// Image data URL, or [`ERROR_IMAGE_URL`]
    pub image_url: String,
    /// Visual metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    /// Creates a frame for a scene and variant.
    pub fn new(
        scene_id: u32,
        variant: FrameVariant,
        image_url: impl Into<String>,
        metadata: FrameMetadata,
    ) -> Self {
        Self {
            id: format!("{}{}", scene_id, variant),
            variant,
            image_url: image_url.into(),
            metadata,
        }
    }

    /// Whether this frame holds the error sentinel.
    pub fn is_error(&self) -> bool {
        self.image_url == ERROR_IMAGE_URL
    }
}

/// A scripted scene with its two frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Script and tier fields
    #[serde(flatten)]
    pub script: SceneScript,
    /// Variants A and B, in that order
    pub frames: [Frame; 2],
}

impl Scene {
    /// Scene number.
    pub fn id(&self) -> u32 {
        self.script.id
    }
}
