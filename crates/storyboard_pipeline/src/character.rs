//! Character analysis and blueprint enhancement.
//!
//! Reference images are analyzed into structured [`CharacterProfile`]s, which
//! are merged into the story world's blueprint together with an explicit
//! consistency directive. The merged text is re-injected into every prompt.

use crate::schema::character_profile_schema;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use storyboard_core::{
    CharacterProfile, CharacterRole, EnhancedBlueprints, Input, ReferenceAsset, StructuredRequest,
};
use storyboard_error::{PipelineError, PipelineErrorKind, SchemaError, StoryboardResult};
use storyboard_interface::JsonMode;
use tracing::{debug, instrument, warn};

/// Directive embedded in every enhanced blueprint.
pub const CONSISTENCY_DIRECTIVE: &str = "CHARACTER CONSISTENCY DIRECTIVE: This character must look \
     exactly identical in every scene: the same face, hair, body type, skin tone, clothing and \
     distinctive features. Only pose, expression and context may vary between scenes.";

/// Analyzes reference images and produces enhanced character blueprints.
pub struct CharacterConsistencyAgent<B> {
    backend: Arc<B>,
    call_timeout: Option<Duration>,
}

impl<B: JsonMode> CharacterConsistencyAgent<B> {
    /// Creates an agent on a backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            call_timeout: None,
        }
    }

    /// Bounds each analysis call; a timed-out analysis falls back like any other failure.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Analyzes one reference image.
    ///
    /// Never fails: any error yields [`CharacterProfile::fallback`].
    #[instrument(skip(self, image), fields(mime = %image.mime_type))]
    pub async fn analyze(
        &self,
        image: &ReferenceAsset,
        role: CharacterRole,
        index: Option<usize>,
    ) -> CharacterProfile {
        let analysis = self.try_analyze(image, role);
        let result = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, analysis).await {
                Ok(result) => result,
                Err(_) => Err(PipelineError::new(PipelineErrorKind::Timeout(limit.as_secs())).into()),
            },
            None => analysis.await,
        };

        match result {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Character analysis failed, using fallback profile");
                CharacterProfile::fallback(role, index)
            }
        }
    }

    async fn try_analyze(
        &self,
        image: &ReferenceAsset,
        role: CharacterRole,
    ) -> StoryboardResult<CharacterProfile> {
        let request = StructuredRequest::builder()
            .parts(vec![image.to_input(), Input::Text(analysis_prompt(role))])
            .schema(character_profile_schema())
            .temperature(0.2_f32)
            .build()
            .map_err(|e| SchemaError::new("character-analysis", e.to_string()))?;

        let value = self.backend.generate_json(&request).await?;
        let profile: CharacterProfile = serde_json::from_value(value).map_err(|e| {
            SchemaError::new("character-analysis", format!("Invalid profile: {}", e))
        })?;
        if profile.complete_description.trim().is_empty() {
            return Err(SchemaError::new("character-analysis", "Empty completeDescription").into());
        }
        Ok(profile)
    }

    /// Merges reference-image profiles into the blueprints used downstream.
    ///
    /// Without a main reference the original blueprint is returned unchanged.
    /// Secondary references are analyzed concurrently and keep input order.
    #[instrument(skip_all, fields(main = main.is_some(), secondary = secondaries.len()))]
    pub async fn enhance_blueprint(
        &self,
        original: &str,
        main: Option<&ReferenceAsset>,
        secondaries: &[ReferenceAsset],
    ) -> EnhancedBlueprints {
        let main_analysis = async {
            match main {
                Some(image) => Some(self.analyze(image, CharacterRole::Main, None).await),
                None => None,
            }
        };
        let secondary_analyses = join_all(
            secondaries
                .iter()
                .enumerate()
                .map(|(i, image)| self.analyze(image, CharacterRole::Secondary, Some(i))),
        );
        let (main_profile, secondary_profiles) = tokio::join!(main_analysis, secondary_analyses);

        let main_character_blueprint = match &main_profile {
            Some(profile) => merge_blueprint(original, profile),
            None => original.to_string(),
        };
        let additional_character_blueprints = secondary_profiles
            .iter()
            .enumerate()
            .map(|(i, profile)| secondary_blueprint(i, profile))
            .collect();

        debug!(
            blueprint_len = main_character_blueprint.len(),
            "Blueprints enhanced"
        );
        EnhancedBlueprints {
            main_character_blueprint,
            additional_character_blueprints,
        }
    }
}

/// Main blueprint: original text, reference profile and consistency directive.
///
/// # Examples
///
/// ```
/// use storyboard_core::{CharacterProfile, CharacterRole};
/// use storyboard_pipeline::{CONSISTENCY_DIRECTIVE, merge_blueprint};
///
/// let profile = CharacterProfile::fallback(CharacterRole::Main, None);
/// let merged = merge_blueprint("A red fox", &profile);
/// assert!(merged.starts_with("A red fox"));
/// assert!(merged.contains(&profile.complete_description));
/// assert!(merged.contains(CONSISTENCY_DIRECTIVE));
/// ```
pub fn merge_blueprint(original: &str, profile: &CharacterProfile) -> String {
    format!(
        "{}\n\nREFERENCE IMAGE PROFILE (main character):\n{}\n{}\n\n{}",
        original.trim(),
        profile.complete_description,
        profile.attribute_lines(),
        CONSISTENCY_DIRECTIVE
    )
}

/// Blueprint for the secondary character at `index` (0-based).
pub fn secondary_blueprint(index: usize, profile: &CharacterProfile) -> String {
    format!(
        "Secondary character {}: {}\n{}\n\n{}",
        index + 1,
        profile.complete_description,
        profile.attribute_lines(),
        CONSISTENCY_DIRECTIVE
    )
}

fn analysis_prompt(role: CharacterRole) -> String {
    format!(
        "Analyze the {} character in this reference image for a storyboard that must \
         reproduce them identically in every frame. Describe facial features, hair, body \
         type, distinctive features, clothing style, skin tone, apparent age and apparent \
         ethnicity precisely and concretely. Then write completeDescription: one dense \
         paragraph combining every attribute, suitable for pasting verbatim into an image \
         prompt.",
        role
    )
}
