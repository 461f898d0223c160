//! Character profiles extracted from reference images.

use crate::CharacterRole;
use serde::{Deserialize, Serialize};

/// Structured appearance profile of one reference image.
///
/// Produced once per reference image. When vision analysis is unavailable a
/// deterministic [`CharacterProfile::fallback`] is used, so a profile is
/// always available downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    /// Face shape, eyes, nose, mouth
    pub facial_features: String,
    /// Hair color, length, style
    pub hair_description: String,
    /// Build and height
    pub body_type: String,
    /// Scars, marks, accessories
    pub distinctive_features: String,
    /// Typical clothing
    pub clothing_style: String,
    /// Skin tone
    pub skin_tone: String,
    /// Apparent age
    pub age_estimate: String,
    /// Apparent ethnicity
    pub ethnicity: String,
    /// Full prose description combining every attribute
    pub complete_description: String,
}

impl CharacterProfile {
    /// Deterministic profile used when analysis fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_core::{CharacterProfile, CharacterRole};
    ///
    /// let profile = CharacterProfile::fallback(CharacterRole::Secondary, Some(2));
    /// assert!(profile.complete_description.contains("verbatim"));
    /// assert_eq!(profile, CharacterProfile::fallback(CharacterRole::Secondary, Some(2)));
    /// ```
    pub fn fallback(role: CharacterRole, index: Option<usize>) -> Self {
        let label = match (role, index) {
            (CharacterRole::Main, _) => "main character".to_string(),
            (CharacterRole::Secondary, Some(i)) => format!("secondary character {}", i + 1),
            (CharacterRole::Secondary, None) => "secondary character".to_string(),
        };
        let as_shown = format!("Exactly as shown in the {} reference image", label);
        Self {
            facial_features: as_shown.clone(),
            hair_description: as_shown.clone(),
            body_type: as_shown.clone(),
            distinctive_features: as_shown.clone(),
            clothing_style: as_shown.clone(),
            skin_tone: as_shown.clone(),
            age_estimate: as_shown.clone(),
            ethnicity: as_shown,
            complete_description: format!(
                "Use the {} reference image verbatim: reproduce the face, hair, body type, \
                 skin tone, clothing and every distinctive feature exactly as shown.",
                label
            ),
        }
    }

    /// Labelled attribute list for embedding into blueprints.
    pub fn attribute_lines(&self) -> String {
        format!(
            "- Facial features: {}\n- Hair: {}\n- Body type: {}\n- Distinctive features: {}\n\
             - Clothing: {}\n- Skin tone: {}\n- Age: {}\n- Ethnicity: {}",
            self.facial_features,
            self.hair_description,
            self.body_type,
            self.distinctive_features,
            self.clothing_style,
            self.skin_tone,
            self.age_estimate,
            self.ethnicity
        )
    }
}

/// Character blueprints after merging reference-image profiles.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedBlueprints {
    /// Blueprint of the protagonist
    pub main_character_blueprint: String,
    /// One blueprint per secondary reference, in input order
    pub additional_character_blueprints: Vec<String>,
}
