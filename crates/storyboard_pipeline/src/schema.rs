//! Response schemas for each structured-output phase.
//!
//! Schemas use the OpenAPI subset accepted by Gemini's `responseSchema`.

use serde_json::{Map, Value, json};

fn string_object(fields: &[&str]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|f| (f.to_string(), json!({"type": "STRING"})))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": fields,
    })
}

/// Schema of a [`storyboard_core::StoryWorld`].
pub fn story_world_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "premise": {"type": "STRING"},
            "theme": {"type": "STRING"},
            "structure": {
                "type": "OBJECT",
                "properties": {
                    "act1": {"type": "STRING"},
                    "act2": {"type": "STRING"},
                    "act3": {"type": "STRING"},
                    "attractors": {
                        "type": "ARRAY",
                        "items": {"type": "STRING"},
                        "minItems": 6,
                        "maxItems": 8
                    }
                },
                "required": ["act1", "act2", "act3", "attractors"]
            },
            "characterBlueprint": {"type": "STRING"},
            "coreConflict": string_object(&["internal", "external"]),
            "boundaries": string_object(&["spatial", "temporal", "historical", "visual"])
        },
        "required": ["premise", "theme", "structure", "characterBlueprint", "coreConflict", "boundaries"]
    })
}

/// Schema of a [`storyboard_core::CharacterProfile`].
pub fn character_profile_schema() -> Value {
    string_object(&[
        "facialFeatures",
        "hairDescription",
        "bodyType",
        "distinctiveFeatures",
        "clothingStyle",
        "skinTone",
        "ageEstimate",
        "ethnicity",
        "completeDescription",
    ])
}

/// Scene fields in the order the model should fill them.
pub const SCENE_FIELDS: [&str; 13] = [
    "title",
    "scriptLine",
    "emotion",
    "intent",
    "cinematographyFormat",
    "subjectIdentity",
    "sceneContext",
    "action",
    "cameraComposition",
    "styleAmbiance",
    "audioDialogue",
    "technicalNegative",
    "veoPrompt",
];

/// Schema of a single scene script.
pub fn scene_schema() -> Value {
    let mut schema = string_object(&SCENE_FIELDS);
    schema["properties"]["id"] = json!({"type": "INTEGER"});
    schema
}

/// Schema of `{scenes: [...]}` with exactly `scene_count` scenes.
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::schema::scene_list_schema;
///
/// let schema = scene_list_schema(3);
/// assert_eq!(schema["properties"]["scenes"]["minItems"], 3);
/// assert_eq!(schema["properties"]["scenes"]["maxItems"], 3);
/// ```
pub fn scene_list_schema(scene_count: usize) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "scenes": {
                "type": "ARRAY",
                "items": scene_schema(),
                "minItems": scene_count,
                "maxItems": scene_count
            }
        },
        "required": ["scenes"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_schema_requires_every_tier() {
        let schema = scene_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), SCENE_FIELDS.len());
        assert!(required.iter().any(|f| f == "technicalNegative"));
        assert_eq!(schema["properties"]["id"]["type"], "INTEGER");
    }

    #[test]
    fn story_world_bounds_attractors() {
        let schema = story_world_schema();
        let attractors = &schema["properties"]["structure"]["properties"]["attractors"];
        assert_eq!(attractors["minItems"], 6);
        assert_eq!(attractors["maxItems"], 8);
    }
}
