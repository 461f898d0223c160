//! Heuristic consistency checks over generated scene scripts.

use serde::Serialize;
use storyboard_core::SceneScript;
use tracing::warn;

const CHARACTER_TOKENS: [&str; 3] = ["character", "protagonist", "main"];
const CONSISTENCY_MARKERS: [&str; 4] = ["exact", "verbatim", "identical", "same"];

/// Outcome of a validation pass. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True when no issue was found
    pub is_valid: bool,
    /// Human-readable issues
    pub issues: Vec<String>,
}

/// Cheap pass checking that scenes reference their characters consistently.
///
/// Pure: it never mutates scenes and never blocks the pipeline. Every issue
/// is also logged as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyValidator;

impl ConsistencyValidator {
    /// Validates scenes against the blueprints in use.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_pipeline::ConsistencyValidator;
    ///
    /// let report = ConsistencyValidator.validate(&[], "A red fox", &[]);
    /// assert!(report.is_valid);
    /// ```
    pub fn validate(
        &self,
        scenes: &[SceneScript],
        main_blueprint: &str,
        secondary_blueprints: &[String],
    ) -> ValidationReport {
        let mut issues = Vec::new();

        for scene in scenes {
            let identity = scene.subject_identity.to_lowercase();
            if !CHARACTER_TOKENS.iter().any(|t| identity.contains(t)) {
                issues.push(format!(
                    "Scene {}: subject identity does not reference the main character",
                    scene.id
                ));
            }
            if !CONSISTENCY_MARKERS.iter().any(|m| identity.contains(m)) {
                issues.push(format!(
                    "Scene {}: subject identity has no explicit consistency marker",
                    scene.id
                ));
            }
        }

        if main_blueprint.trim().is_empty() && !scenes.is_empty() {
            issues.push("Main character blueprint is empty".to_string());
        }

        if !secondary_blueprints.is_empty()
            && !scenes.is_empty()
            && !scenes
                .iter()
                .any(|s| s.subject_identity.to_lowercase().contains("secondary"))
        {
            issues.push(format!(
                "{} secondary character reference(s) supplied but no scene mentions a secondary character",
                secondary_blueprints.len()
            ));
        }

        for issue in &issues {
            warn!(issue = %issue, "Consistency warning");
        }

        ValidationReport {
            is_valid: issues.is_empty(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(id: u32, subject_identity: &str) -> SceneScript {
        SceneScript {
            id,
            title: "t".into(),
            script_line: "s".into(),
            emotion: "e".into(),
            intent: "i".into(),
            cinematography_format: "c".into(),
            subject_identity: subject_identity.into(),
            scene_context: "c".into(),
            action: "a".into(),
            camera_composition: "c".into(),
            style_ambiance: "s".into(),
            audio_dialogue: "a".into(),
            technical_negative: "n".into(),
            veo_prompt: "v".into(),
        }
    }

    #[test]
    fn consistent_scenes_pass() {
        let scenes = vec![
            scene(1, "The main character, identical to the reference"),
            scene(2, "The protagonist in the exact same outfit"),
        ];
        let report = ConsistencyValidator.validate(&scenes, "A red fox", &[]);
        assert!(report.is_valid, "{:?}", report.issues);
    }

    #[test]
    fn missing_markers_are_reported_per_scene() {
        let scenes = vec![
            scene(1, "A fox in a forest"),
            scene(2, "The main character, identical"),
        ];
        let report = ConsistencyValidator.validate(&scenes, "A red fox", &[]);
        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues.iter().all(|i| i.starts_with("Scene 1")));
    }

    #[test]
    fn absent_secondary_characters_are_reported() {
        let scenes = vec![scene(1, "The main character, identical")];
        let report =
            ConsistencyValidator.validate(&scenes, "A red fox", &["An owl".to_string()]);
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn validation_does_not_touch_scenes() {
        let scenes = vec![scene(1, "nothing useful")];
        let before = scenes.clone();
        let _ = ConsistencyValidator.validate(&scenes, "", &[]);
        assert_eq!(scenes, before);
    }
}
