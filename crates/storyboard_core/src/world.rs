//! Story world: the narrative architecture grounding every scene.

use serde::{Deserialize, Serialize};

/// Three-act structure plus the narrative attractors pulling the story forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryStructure {
    /// Setup
    pub act1: String,
    /// Confrontation
    pub act2: String,
    /// Resolution
    pub act3: String,
    /// Key story beats, 6 to 8 entries
    pub attractors: Vec<String>,
}

/// The protagonist's internal and external conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConflict {
    /// Inner struggle
    pub internal: String,
    /// Outer obstacle
    pub external: String,
}

/// Limits that keep the world coherent across scenes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boundaries {
    /// Where the story may take place
    pub spatial: String,
    /// When and over what span
    pub temporal: String,
    /// Historical or cultural setting
    pub historical: String,
    /// Visual rules
    pub visual: String,
}

/// Narrative architecture synthesized from the story text.
///
/// Immutable once produced for a generation run.
///
/// # Examples
///
/// ```
/// use storyboard_core::StoryWorld;
///
/// let world: StoryWorld = serde_json::from_value(serde_json::json!({
///     "premise": "A fox searches for a key",
///     "theme": "Perseverance",
///     "structure": {
///         "act1": "Loss", "act2": "Search", "act3": "Discovery",
///         "attractors": ["a", "b", "c", "d", "e", "f"]
///     },
///     "characterBlueprint": "A small red fox with a white-tipped tail",
///     "coreConflict": {"internal": "Doubt", "external": "The dark forest"},
///     "boundaries": {"spatial": "Forest", "temporal": "One night", "historical": "Timeless", "visual": "Moonlit"}
/// })).unwrap();
///
/// assert!(world.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryWorld {
    /// One-sentence premise
    pub premise: String,
    /// Central theme
    pub theme: String,
    /// Act structure and attractors
    pub structure: StoryStructure,
    /// Verbatim character description reused in every prompt
    pub character_blueprint: String,
    /// Central conflict
    pub core_conflict: CoreConflict,
    /// World limits
    pub boundaries: Boundaries,
}

impl StoryWorld {
    /// Minimum number of attractors.
    pub const MIN_ATTRACTORS: usize = 6;
    /// Maximum number of attractors.
    pub const MAX_ATTRACTORS: usize = 8;

    /// Validates that every field is populated and the attractor count is in range.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("premise", &self.premise),
            ("theme", &self.theme),
            ("structure.act1", &self.structure.act1),
            ("structure.act2", &self.structure.act2),
            ("structure.act3", &self.structure.act3),
            ("characterBlueprint", &self.character_blueprint),
            ("coreConflict.internal", &self.core_conflict.internal),
            ("coreConflict.external", &self.core_conflict.external),
            ("boundaries.spatial", &self.boundaries.spatial),
            ("boundaries.temporal", &self.boundaries.temporal),
            ("boundaries.historical", &self.boundaries.historical),
            ("boundaries.visual", &self.boundaries.visual),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(format!("{} must not be empty", name));
        }

        let count = self.structure.attractors.len();
        if !(Self::MIN_ATTRACTORS..=Self::MAX_ATTRACTORS).contains(&count) {
            return Err(format!(
                "structure.attractors must contain {} to {} entries, got {}",
                Self::MIN_ATTRACTORS,
                Self::MAX_ATTRACTORS,
                count
            ));
        }
        if self.structure.attractors.iter().any(|a| a.trim().is_empty()) {
            return Err("structure.attractors must not contain empty entries".to_string());
        }
        Ok(())
    }

    /// Compact act summary used as a continuity anchor in prompts.
    pub fn act_progression(&self) -> String {
        format!(
            "Act 1: {} | Act 2: {} | Act 3: {}",
            self.structure.act1, self.structure.act2, self.structure.act3
        )
    }
}
