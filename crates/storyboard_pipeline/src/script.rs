//! Scene-script generation with cardinality enforcement and repair.

use crate::prompt::ReferenceFlags;
use crate::schema::{scene_list_schema, scene_schema};
use serde::Deserialize;
use std::sync::Arc;
use storyboard_core::{
    AspectRatio, EnhancedBlueprints, Input, SceneScript, StoryWorld, StructuredRequest,
};
use storyboard_error::{SchemaError, StoryboardResult};
use storyboard_interface::JsonMode;
use tracing::{debug, instrument, warn};

const PHASE: &str = "script";

/// Scene as returned by the model, before repair.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScene {
    #[serde(default)]
    id: Option<serde_json::Value>,
    title: String,
    script_line: String,
    emotion: String,
    intent: String,
    cinematography_format: String,
    subject_identity: String,
    scene_context: String,
    action: String,
    camera_composition: String,
    style_ambiance: String,
    audio_dialogue: String,
    technical_negative: String,
    #[serde(default)]
    veo_prompt: String,
}

impl RawScene {
    fn into_script(self, id: u32) -> SceneScript {
        if let Some(returned) = &self.id {
            if returned.as_u64() != Some(u64::from(id)) {
                debug!(returned = %returned, assigned = id, "Renumbering scene");
            }
        }
        SceneScript {
            id,
            title: self.title,
            script_line: self.script_line,
            emotion: self.emotion,
            intent: self.intent,
            cinematography_format: self.cinematography_format,
            subject_identity: self.subject_identity,
            scene_context: self.scene_context,
            action: self.action,
            camera_composition: self.camera_composition,
            style_ambiance: self.style_ambiance,
            audio_dialogue: self.audio_dialogue,
            technical_negative: self.technical_negative,
            veo_prompt: self.veo_prompt,
        }
    }
}

/// Context shared by fresh and continuation script requests.
#[derive(Debug, Clone, Copy)]
pub struct ScriptContext<'a> {
    /// Story world of the run
    pub story_world: &'a StoryWorld,
    /// Enhanced blueprints
    pub blueprints: &'a EnhancedBlueprints,
    /// Frame aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Supplied reference images
    pub references: ReferenceFlags,
}

/// Writes scene scripts with the eight-tier attribute hierarchy.
pub struct ScriptGenerator<B> {
    backend: Arc<B>,
}

impl<B: JsonMode> ScriptGenerator<B> {
    /// Creates a generator on a backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Generates `scene_count` scenes numbered from 1.
    ///
    /// More scenes than requested are truncated to the first `scene_count`;
    /// fewer are accepted. Both cases log a warning.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the output is not a scene list or contains
    /// no scenes, and provider errors as returned by the backend.
    #[instrument(skip(self, ctx), fields(aspect_ratio = %ctx.aspect_ratio))]
    pub async fn generate(
        &self,
        ctx: ScriptContext<'_>,
        scene_count: usize,
    ) -> StoryboardResult<Vec<SceneScript>> {
        let request = StructuredRequest::builder()
            .parts(vec![Input::Text(script_prompt(&ctx, scene_count))])
            .schema(scene_list_schema(scene_count))
            .temperature(0.9_f32)
            .build()
            .map_err(|e| SchemaError::new(PHASE, e.to_string()))?;

        let value = self.backend.generate_json(&request).await?;
        let raw = parse_scene_list(value)?;
        let returned = raw.len();

        if returned > scene_count {
            warn!(
                requested = scene_count,
                returned, "Model returned too many scenes, keeping the first ones"
            );
        } else if returned < scene_count {
            warn!(
                requested = scene_count,
                returned, "Model returned fewer scenes than requested, continuing degraded"
            );
        }

        let scenes = raw
            .into_iter()
            .take(scene_count)
            .enumerate()
            .map(|(i, scene)| repair(scene.into_script(i as u32 + 1), &ctx))
            .collect::<Vec<_>>();
        debug!(scenes = scenes.len(), "Script generated");
        Ok(scenes)
    }

    /// Generates exactly one scene continuing `prior`, numbered `next_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the output is not a scene, and provider
    /// errors as returned by the backend.
    #[instrument(skip(self, ctx, prior, instruction), fields(prior = prior.len()))]
    pub async fn generate_continuation(
        &self,
        ctx: ScriptContext<'_>,
        prior: &[&SceneScript],
        instruction: Option<&str>,
        next_id: u32,
    ) -> StoryboardResult<SceneScript> {
        let request = StructuredRequest::builder()
            .parts(vec![Input::Text(continuation_prompt(
                &ctx,
                prior,
                instruction,
                next_id,
            ))])
            .schema(scene_schema())
            .temperature(0.9_f32)
            .build()
            .map_err(|e| SchemaError::new(PHASE, e.to_string()))?;

        let value = self.backend.generate_json(&request).await?;
        // Some models still wrap a single scene in a list
        let single = value
            .as_object()
            .is_some_and(|map| !map.contains_key("scenes"));
        let raw = if single {
            vec![parse_scene(value)?]
        } else {
            parse_scene_list(value)?
        };
        if raw.len() > 1 {
            warn!(
                requested = 1,
                returned = raw.len(),
                "Model returned too many scenes, keeping the first one"
            );
        }
        let scene = raw
            .into_iter()
            .next()
            .ok_or_else(|| SchemaError::new(PHASE, "Continuation returned no scene"))?;

        Ok(repair(scene.into_script(next_id), &ctx))
    }
}

fn parse_scene(value: serde_json::Value) -> StoryboardResult<RawScene> {
    serde_json::from_value(value)
        .map_err(|e| SchemaError::new(PHASE, format!("Invalid scene: {}", e)).into())
}

fn parse_scene_list(value: serde_json::Value) -> StoryboardResult<Vec<RawScene>> {
    let list = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("scenes") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Err(SchemaError::new(PHASE, "Expected a `scenes` array").into()),
        },
        _ => return Err(SchemaError::new(PHASE, "Expected a scene list").into()),
    };
    if list.is_empty() {
        return Err(SchemaError::new(PHASE, "Model returned no scenes").into());
    }
    list.into_iter().map(parse_scene).collect()
}

/// Enforces the blueprint and composite-prompt invariants on a scene.
fn repair(mut scene: SceneScript, ctx: &ScriptContext<'_>) -> SceneScript {
    let blueprint = ctx.blueprints.main_character_blueprint.as_str();
    if ctx.references.main_character
        && !blueprint.is_empty()
        && !scene.subject_identity.contains(blueprint)
    {
        debug!(scene_id = scene.id, "Embedding main blueprint in subject identity");
        scene.subject_identity = format!("{}\n\n{}", blueprint, scene.subject_identity);
    }
    if scene.veo_prompt.trim().is_empty() {
        debug!(scene_id = scene.id, "Rendering missing composite prompt from tiers");
        scene.veo_prompt = scene.render_tiers();
    }
    scene
}

fn world_summary(world: &StoryWorld) -> String {
    format!(
        "Premise: {}\nTheme: {}\nAct 1: {}\nAct 2: {}\nAct 3: {}\nAttractors:\n{}\n\
         Core conflict: internal: {}; external: {}\n\
         Boundaries: spatial: {}; temporal: {}; historical: {}; visual: {}",
        world.premise,
        world.theme,
        world.structure.act1,
        world.structure.act2,
        world.structure.act3,
        world
            .structure
            .attractors
            .iter()
            .map(|a| format!("- {}", a))
            .collect::<Vec<_>>()
            .join("\n"),
        world.core_conflict.internal,
        world.core_conflict.external,
        world.boundaries.spatial,
        world.boundaries.temporal,
        world.boundaries.historical,
        world.boundaries.visual
    )
}

fn character_rules(ctx: &ScriptContext<'_>) -> String {
    let mut rules = vec![format!(
        "MAIN CHARACTER BLUEPRINT:\n{}",
        ctx.blueprints.main_character_blueprint
    )];
    for (i, blueprint) in ctx.blueprints.additional_character_blueprints.iter().enumerate() {
        rules.push(format!("SECONDARY CHARACTER {}:\n{}", i + 1, blueprint));
    }
    if ctx.references.main_character {
        rules.push(
            "A main character reference image is supplied. subjectIdentity MUST contain the \
             main character blueprint above verbatim, word for word."
                .to_string(),
        );
    }
    rules.push(
        "In subjectIdentity, name the main character and use explicit consistency markers \
         such as \"identical\", \"exact\" or \"same\"."
            .to_string(),
    );
    rules.join("\n\n")
}

fn tier_guide(aspect_ratio: AspectRatio) -> String {
    format!(
        "Each scene has title, scriptLine, emotion, intent and eight tiers:\n\
         1. cinematographyFormat: shot format, lens and film feel for a {} ({}) frame\n\
         2. subjectIdentity: who appears and exactly how they look\n\
         3. sceneContext: location, time and environment\n\
         4. action: what happens\n\
         5. cameraComposition: framing and camera movement\n\
         6. styleAmbiance: look, colour palette, lighting and mood\n\
         7. audioDialogue: sound and dialogue cues\n\
         8. technicalNegative: what must not appear\n\
         veoPrompt is a single prompt integrating all eight tiers.",
        aspect_ratio.orientation(),
        aspect_ratio
    )
}

fn script_prompt(ctx: &ScriptContext<'_>, scene_count: usize) -> String {
    format!(
        "You are a storyboard writer.\n\nSTORY WORLD:\n{}\n\n{}\n\n{}\n\n\
         Write EXACTLY {} scenes, numbered 1 to {}, following the three acts and attractors \
         in order. Return exactly {} scenes, no more and no fewer.",
        world_summary(ctx.story_world),
        character_rules(ctx),
        tier_guide(ctx.aspect_ratio),
        scene_count,
        scene_count,
        scene_count
    )
}

fn continuation_prompt(
    ctx: &ScriptContext<'_>,
    prior: &[&SceneScript],
    instruction: Option<&str>,
    next_id: u32,
) -> String {
    let previous = prior
        .iter()
        .map(|s| format!("Scene {}: {} - {}", s.id, s.title, s.script_line))
        .collect::<Vec<_>>()
        .join("\n");
    let direction = instruction
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .map(|i| format!("DIRECTION FOR THE NEXT SCENE: {}", i))
        .unwrap_or_else(|| {
            "Continue the story naturally toward the next unresolved attractor.".to_string()
        });

    format!(
        "You are continuing an existing storyboard.\n\nSTORY WORLD:\n{}\n\n\
         PREVIOUS SCENES:\n{}\n\n{}\n\n{}\n\n{}\n\n\
         Write exactly ONE new scene, scene {}, that follows directly from the previous \
         scenes and keeps characters, setting and style continuous.",
        world_summary(ctx.story_world),
        previous,
        direction,
        character_rules(ctx),
        tier_guide(ctx.aspect_ratio),
        next_id
    )
}
