//! Storyboard JSON produced by the CLI keeps the wire field names.

use storyboard::{AspectRatio, ERROR_IMAGE_URL, Storyboard, StoryboardConfig};

const SAVED: &str = r#"{
  "scenes": [
    {
      "id": 1,
      "title": "The lost key",
      "scriptLine": "The fox wakes to find the key gone",
      "emotion": "Worry",
      "intent": "Set up the search",
      "cinematographyFormat": "35mm",
      "subjectIdentity": "The main character, the same red fox",
      "sceneContext": "A den at dawn",
      "action": "The fox searches the den",
      "cameraComposition": "Close-up",
      "styleAmbiance": "Warm golden light",
      "audioDialogue": "Birdsong",
      "technicalNegative": "No text",
      "veoPrompt": "A red fox searching its den at dawn",
      "frames": [
        {"id": "1A", "variant": "A", "imageUrl": "data:image/png;base64,AAAA",
         "metadata": {"composition": "Close-up", "palette": ["golden"], "lighting": "Warm golden light", "camera": "35mm"}},
        {"id": "1B", "variant": "B", "imageUrl": "ERROR",
         "metadata": {"composition": "Alternate angle: Close-up", "palette": [], "lighting": "", "camera": "35mm"}}
      ]
    }
  ],
  "aspectRatio": "9:16"
}"#;

#[test]
fn test_saved_storyboard_loads_without_story_world() {
    let json = SAVED.replace("ERROR", &ERROR_IMAGE_URL.replace('"', "\\\""));
    let storyboard: Storyboard = serde_json::from_str(&json).unwrap();

    assert_eq!(storyboard.aspect_ratio, AspectRatio::Portrait);
    assert!(storyboard.story_world.is_none());
    assert_eq!(storyboard.frame_count(), 2);
    assert!(storyboard.scenes[0].frames[1].is_error());

    let value = serde_json::to_value(&storyboard).unwrap();
    assert_eq!(value["scenes"][0]["scriptLine"], "The fox wakes to find the key gone");
    assert!(value.get("storyWorld").is_none());
}

#[test]
fn test_default_configuration_matches_documented_values() {
    let config = StoryboardConfig::default();
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.frames.fallback_prompt_chars, 500);
}
