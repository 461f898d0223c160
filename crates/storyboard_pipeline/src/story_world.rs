//! Story-world synthesis.

use crate::schema::story_world_schema;
use std::sync::Arc;
use storyboard_core::{
    Boundaries, CoreConflict, Input, Scene, StoryStructure, StoryWorld, StructuredRequest,
};
use storyboard_error::{PipelineError, PipelineErrorKind, SchemaError, StoryboardResult};
use storyboard_interface::JsonMode;
use tracing::{debug, instrument};

const PHASE: &str = "story-world";

/// Produces the narrative architecture of a story.
///
/// Makes exactly one model call per [`StoryWorldSynthesizer::synthesize`];
/// retrying is the orchestrator's job.
pub struct StoryWorldSynthesizer<B> {
    backend: Arc<B>,
}

impl<B: JsonMode> StoryWorldSynthesizer<B> {
    /// Creates a synthesizer on a backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Synthesizes a complete story world.
    ///
    /// # Errors
    ///
    /// - [`PipelineErrorKind::EmptyStory`] for blank input
    /// - a [`SchemaError`] if the output is missing fields or violates the
    ///   attractor bounds; a partially populated world is never returned
    /// - provider errors as returned by the backend
    #[instrument(skip_all, fields(story_len = story.len()))]
    pub async fn synthesize(&self, story: &str) -> StoryboardResult<StoryWorld> {
        if story.trim().is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::EmptyStory).into());
        }

        let request = StructuredRequest::builder()
            .parts(vec![Input::Text(story_world_prompt(story))])
            .schema(story_world_schema())
            .temperature(0.8_f32)
            .build()
            .map_err(|e| SchemaError::new(PHASE, format!("Invalid request: {}", e)))?;

        let value = self.backend.generate_json(&request).await?;
        let world = parse_story_world(value)?;
        debug!(
            attractors = world.structure.attractors.len(),
            "Story world synthesized"
        );
        Ok(world)
    }
}

/// Parses and validates model output as a story world.
///
/// # Errors
///
/// Returns a [`SchemaError`] for any missing field or violated invariant.
pub fn parse_story_world(value: serde_json::Value) -> StoryboardResult<StoryWorld> {
    let world: StoryWorld = serde_json::from_value(value)
        .map_err(|e| SchemaError::new(PHASE, format!("Response does not match schema: {}", e)))?;
    world
        .validate()
        .map_err(|message| SchemaError::new(PHASE, message))?;
    Ok(world)
}

fn story_world_prompt(story: &str) -> String {
    format!(
        "You are a story architect preparing a visual storyboard.\n\n\
         STORY:\n{}\n\n\
         Build the story world:\n\
         - premise: one sentence\n\
         - theme: the central theme\n\
         - structure: act1 (setup), act2 (confrontation), act3 (resolution) and \
         between {} and {} attractors, the key beats that pull the story forward\n\
         - characterBlueprint: a verbatim, reusable description of the protagonist's \
         appearance with at least 15 distinguishing attributes (face, eyes, hair, build, \
         skin, clothing, colours, accessories, marks). It will be pasted into every \
         image prompt, so describe appearance only\n\
         - coreConflict: internal and external\n\
         - boundaries: spatial, temporal, historical and visual limits of the world\n\n\
         Every field must be filled in.",
        story.trim(),
        StoryWorld::MIN_ATTRACTORS,
        StoryWorld::MAX_ATTRACTORS
    )
}

/// Minimal world derived from the last scene, for storyboards saved without one.
pub fn placeholder_world(last: &Scene) -> StoryWorld {
    let script = &last.script;
    let attractors = (1..=StoryWorld::MIN_ATTRACTORS)
        .map(|i| format!("Beat {} following \"{}\"", i, script.title))
        .collect();

    StoryWorld {
        premise: script.script_line.clone(),
        theme: script.intent.clone(),
        structure: StoryStructure {
            act1: format!("Events up to \"{}\"", script.title),
            act2: script.script_line.clone(),
            act3: "The story continues from the last scene".to_string(),
            attractors,
        },
        character_blueprint: script.subject_identity.clone(),
        core_conflict: CoreConflict {
            internal: script.emotion.clone(),
            external: script.action.clone(),
        },
        boundaries: Boundaries {
            spatial: script.scene_context.clone(),
            temporal: "Immediately after the last scene".to_string(),
            historical: script.scene_context.clone(),
            visual: script.style_ambiance.clone(),
        },
    }
}
