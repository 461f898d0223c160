//! Progress events emitted during a generation run.

use serde::{Deserialize, Serialize};

/// Coarse phase of a generation run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GenerationPhase {
    /// Synthesizing the story world
    StoryWorld,
    /// Analyzing characters and writing scene scripts
    Script,
    /// Synthesizing frames
    Images,
    /// Done
    Complete,
}

/// Snapshot of run progress, sent on every phase, scene and frame transition.
///
/// # Examples
///
/// ```
/// use storyboard_core::{GenerationPhase, GenerationProgress};
///
/// let event = GenerationProgress::new(GenerationPhase::StoryWorld, 5, "Building story world");
/// let json = serde_json::to_value(&event).unwrap();
/// assert_eq!(json["phase"], "story-world");
/// assert!(json.get("currentScene").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationProgress {
    /// Current phase
    pub phase: GenerationPhase,
    /// Percent complete, 0..=100
    pub progress: u8,
    /// Human-readable status
    pub message: String,
    /// Scene being processed (1-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_scene: Option<u32>,
    /// Total scenes in this run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_scenes: Option<u32>,
    /// Frames finished so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_frame: Option<u32>,
    /// Seconds remaining, never negative
    pub estimated_time_remaining: u64,
    /// Seconds since the run started
    pub elapsed_time: u64,
}

impl GenerationProgress {
    /// Creates an event with no scene information and zeroed timing.
    pub fn new(phase: GenerationPhase, progress: u8, message: impl Into<String>) -> Self {
        Self {
            phase,
            progress: progress.min(100),
            message: message.into(),
            current_scene: None,
            total_scenes: None,
            current_frame: None,
            estimated_time_remaining: 0,
            elapsed_time: 0,
        }
    }

    /// Attaches scene position.
    pub fn with_scene(mut self, current_scene: u32, total_scenes: u32) -> Self {
        self.current_scene = Some(current_scene);
        self.total_scenes = Some(total_scenes);
        self
    }

    /// Attaches the number of finished frames.
    pub fn with_frame(mut self, current_frame: u32) -> Self {
        self.current_frame = Some(current_frame);
        self
    }
}
