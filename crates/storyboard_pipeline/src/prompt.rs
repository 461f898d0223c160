//! Frame prompt assembly.
//!
//! The image model keeps no memory between calls, so every frame prompt
//! re-injects the full character blueprints, reference images and continuity
//! notes. [`build_prompt_context`] is pure and is called fresh for every frame.

use storyboard_core::{
    AspectRatio, EnhancedBlueprints, FrameVariant, Input, ReferenceAsset, ReferenceAssets,
    SceneScript, StoryWorld,
};

const ART_STYLE_DIRECTIVE: &str = "ART STYLE REFERENCE: Match the rendering technique, colour palette, \
     line quality and texture of this image exactly. Do not copy its subject matter.";
const BACKGROUND_DIRECTIVE: &str = "BACKGROUND REFERENCE: Use this environment as the setting of the frame. \
     Keep its architecture, landmarks and atmosphere recognisable.";
const MAIN_CHARACTER_DIRECTIVE: &str = "MAIN CHARACTER REFERENCE: This is the protagonist. Reproduce the face, \
     hair, body type, skin tone, clothing and every distinctive feature exactly as shown. \
     Only pose and expression may change.";
const LOGO_DIRECTIVE: &str = "LOGO REFERENCE: Place this logo legibly and unaltered in the frame, \
     integrated naturally into the scene.";
const VARIANT_A_DIRECTIVE: &str = "VARIANT A: Primary composition, exactly as specified above.";
const VARIANT_B_DIRECTIVE: &str = "VARIANT B: Alternate take of the same moment. Change the camera angle \
     and composition while keeping characters, setting, lighting and style identical.";
const STANDARD_NEGATIVES: &str =
    "No text, captions, speech bubbles, watermarks, borders or split panels.";

/// Which reference images a run supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReferenceFlags {
    /// Main character reference present
    pub main_character: bool,
    /// Number of secondary character references
    pub secondary_characters: usize,
    /// Background reference present
    pub background: bool,
    /// Art-style reference present
    pub art_style: bool,
    /// Logo reference present
    pub logo: bool,
}

impl ReferenceFlags {
    /// Flags for a set of assets.
    pub fn from_assets(assets: &ReferenceAssets) -> Self {
        Self {
            main_character: assets.main_character.is_some(),
            secondary_characters: assets.secondary_characters.len(),
            background: assets.background.is_some(),
            art_style: assets.art_style.is_some(),
            logo: assets.logo.is_some(),
        }
    }

    /// Usage reminders for every supplied reference, one per line.
    pub fn reminders(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.art_style {
            lines.push("Render everything in the style of the art-style reference.".to_string());
        }
        if self.background {
            lines.push("Set the scene in the environment of the background reference.".to_string());
        }
        if self.main_character {
            lines.push(
                "The protagonist must be identical to the main character reference.".to_string(),
            );
        }
        if self.secondary_characters > 0 {
            lines.push(format!(
                "Secondary characters that appear must match their {} reference image(s) exactly.",
                self.secondary_characters
            ));
        }
        if self.logo {
            lines.push("Include the logo from the logo reference.".to_string());
        }
        lines
    }
}

/// One reference image and the directive that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePart {
    /// Image part
    pub image: Input,
    /// Instruction on how to use the image
    pub directive: String,
}

impl ReferencePart {
    fn new(asset: &ReferenceAsset, directive: impl Into<String>) -> Self {
        Self {
            image: asset.to_input(),
            directive: directive.into(),
        }
    }
}

/// Ordered multimodal prompt for one frame.
///
/// References always precede the final instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptParts {
    /// Reference images with directives, in fixed order
    pub references: Vec<ReferencePart>,
    /// Final composite instruction
    pub instruction: String,
}

impl PromptParts {
    /// Flattens to backend input parts: each image followed by its directive,
    /// then the instruction.
    pub fn to_inputs(&self) -> Vec<Input> {
        let mut inputs = Vec::with_capacity(self.references.len() * 2 + 1);
        for reference in &self.references {
            inputs.push(reference.image.clone());
            inputs.push(Input::Text(reference.directive.clone()));
        }
        inputs.push(Input::Text(self.instruction.clone()));
        inputs
    }

    /// Number of reference images.
    pub fn image_count(&self) -> usize {
        self.references.len()
    }

    /// Fallback prompt: same references, instruction cut down to the scene
    /// line plus the first `max_chars` characters of the full instruction.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_pipeline::PromptParts;
    ///
    /// let parts = PromptParts { references: vec![], instruction: "x".repeat(2000) };
    /// let fallback = parts.simplified("A fox finds the key", 500);
    /// assert!(fallback.instruction.starts_with("A fox finds the key"));
    /// assert!(fallback.instruction.len() < 600);
    /// ```
    pub fn simplified(&self, script_line: &str, max_chars: usize) -> PromptParts {
        let excerpt: String = self.instruction.chars().take(max_chars).collect();
        PromptParts {
            references: self.references.clone(),
            instruction: format!("{}\n\n{}", script_line, excerpt),
        }
    }
}

/// Cross-scene continuity block naming every prior scene and the act progression.
///
/// Returns `None` for the first scene.
pub fn continuity_context<'a>(
    prior: impl IntoIterator<Item = &'a SceneScript>,
    story_world: &StoryWorld,
) -> Option<String> {
    let titles: Vec<String> = prior
        .into_iter()
        .map(|s| format!("Scene {}: {}", s.id, s.title))
        .collect();
    if titles.is_empty() {
        return None;
    }
    Some(format!(
        "CONTINUITY: This frame continues an ongoing storyboard. Previous scenes:\n{}\n\
         Story progression: {}\n\
         Keep characters, wardrobe, setting and visual style continuous with the previous scenes.",
        titles.join("\n"),
        story_world.act_progression()
    ))
}

/// Builds the frame prompt for one scene and variant.
///
/// Reference order is fixed: art style, background, main character, each
/// secondary character, logo. The final instruction restates every tier,
/// the blueprints, reference reminders, aspect ratio and negative constraints.
pub fn build_prompt_context(
    scene: &SceneScript,
    blueprints: &EnhancedBlueprints,
    assets: &ReferenceAssets,
    aspect_ratio: AspectRatio,
    continuity: Option<&str>,
    variant: FrameVariant,
) -> PromptParts {
    let mut references = Vec::new();
    if let Some(asset) = &assets.art_style {
        references.push(ReferencePart::new(asset, ART_STYLE_DIRECTIVE));
    }
    if let Some(asset) = &assets.background {
        references.push(ReferencePart::new(asset, BACKGROUND_DIRECTIVE));
    }
    if let Some(asset) = &assets.main_character {
        references.push(ReferencePart::new(asset, MAIN_CHARACTER_DIRECTIVE));
    }
    for (i, asset) in assets.secondary_characters.iter().enumerate() {
        references.push(ReferencePart::new(
            asset,
            format!(
                "SECONDARY CHARACTER {} REFERENCE: When this character appears, reproduce their \
                 appearance exactly as shown.",
                i + 1
            ),
        ));
    }
    if let Some(asset) = &assets.logo {
        references.push(ReferencePart::new(asset, LOGO_DIRECTIVE));
    }

    let flags = ReferenceFlags::from_assets(assets);
    let instruction = composite_instruction(scene, blueprints, flags, aspect_ratio, continuity, variant);

    PromptParts {
        references,
        instruction,
    }
}

fn composite_instruction(
    scene: &SceneScript,
    blueprints: &EnhancedBlueprints,
    flags: ReferenceFlags,
    aspect_ratio: AspectRatio,
    continuity: Option<&str>,
    variant: FrameVariant,
) -> String {
    let mut sections = vec![
        format!(
            "Create frame {}{} of a cinematic storyboard as a single {} image ({}).",
            scene.id,
            variant,
            aspect_ratio.orientation(),
            aspect_ratio
        ),
        format!(
            "SCENE {}: {}\n{}\nEmotion: {}\nIntent: {}",
            scene.id, scene.title, scene.script_line, scene.emotion, scene.intent
        ),
        format!(
            "MAIN CHARACTER (reproduce verbatim):\n{}",
            blueprints.main_character_blueprint
        ),
    ];

    if !blueprints.additional_character_blueprints.is_empty() {
        let secondary = blueprints
            .additional_character_blueprints
            .iter()
            .enumerate()
            .map(|(i, b)| format!("Secondary character {}: {}", i + 1, b))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("SECONDARY CHARACTERS:\n{}", secondary));
    }

    sections.push(format!("SHOT SPECIFICATION:\n{}", scene.render_tiers()));
    sections.push(format!("COMPOSITE PROMPT: {}", scene.veo_prompt));

    if let Some(block) = continuity {
        sections.push(block.to_string());
    }

    let reminders = flags.reminders();
    if !reminders.is_empty() {
        sections.push(format!("REFERENCE USAGE:\n{}", reminders.join("\n")));
    }

    sections.push(
        match variant {
            FrameVariant::A => VARIANT_A_DIRECTIVE,
            FrameVariant::B => VARIANT_B_DIRECTIVE,
        }
        .to_string(),
    );
    sections.push(format!(
        "Aspect ratio: {} ({}).",
        aspect_ratio,
        aspect_ratio.orientation()
    ));
    sections.push(format!(
        "NEGATIVE: {} {}",
        scene.technical_negative, STANDARD_NEGATIVES
    ));

    sections.join("\n\n")
}
