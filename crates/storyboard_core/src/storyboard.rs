//! The root storyboard artifact and the request that produces it.

use crate::{AspectRatio, FrameCount, ReferenceAssets, Scene, StoryWorld};
use serde::{Deserialize, Serialize};

/// Ordered scenes plus the story world and aspect ratio that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storyboard {
    /// Scenes with strictly increasing, gap-free ids
    pub scenes: Vec<Scene>,
    /// Story world; absent only in storyboards saved by older versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_world: Option<StoryWorld>,
    /// Frame aspect ratio
    pub aspect_ratio: AspectRatio,
}

impl Storyboard {
    /// The last scene, if any.
    pub fn last_scene(&self) -> Option<&Scene> {
        self.scenes.last()
    }

    /// Total number of frames across scenes.
    pub fn frame_count(&self) -> usize {
        self.scenes.iter().map(|s| s.frames.len()).sum()
    }

    /// Returns a copy of this storyboard with `scene` appended.
    pub fn with_scene(&self, scene: Scene) -> Self {
        let mut next = self.clone();
        next.scenes.push(scene);
        next
    }
}

/// Inputs for a fresh storyboard generation run.
///
/// # Examples
///
/// ```
/// use storyboard_core::{AspectRatio, FrameCount, StoryboardRequest};
///
/// let request = StoryboardRequest::builder()
///     .story("A fox searches a forest for a lost key")
///     .frame_count(FrameCount::try_from(4).unwrap())
///     .aspect_ratio(AspectRatio::Landscape)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.frame_count.scene_count(), 2);
/// assert!(request.assets.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_builder::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct StoryboardRequest {
    /// Natural-language story description
    pub story: String,
    /// Optional reference images
    #[builder(default)]
    #[serde(default)]
    pub assets: ReferenceAssets,
    /// Frame aspect ratio
    #[builder(default)]
    pub aspect_ratio: AspectRatio,
    /// Requested number of frames
    #[builder(default)]
    pub frame_count: FrameCount,
}

impl StoryboardRequest {
    /// Creates a new request builder.
    pub fn builder() -> StoryboardRequestBuilder {
        StoryboardRequestBuilder::default()
    }
}
