//! Response fixtures shaped like real model output.

use serde_json::{Value, json};
use std::io::Cursor;
use storyboard_core::{ReferenceAsset, SceneScript};

pub const FOX_STORY: &str = "A fox searches a forest for a lost key";
pub const FOX_BLUEPRINT: &str = "A small red fox with a white-tipped tail and a torn left ear";
pub const PROFILE_DESCRIPTION: &str =
    "A slender red fox with amber eyes, a white chest and a torn left ear";

pub fn story_world_json(attractors: usize) -> Value {
    let attractors: Vec<String> = (1..=attractors)
        .map(|i| format!("Beat {}", i))
        .collect();
    json!({
        "premise": "A young fox must recover the key to her family's den",
        "theme": "Perseverance",
        "structure": {
            "act1": "The key is lost",
            "act2": "The search through the forest",
            "act3": "The key is found at the old oak",
            "attractors": attractors
        },
        "characterBlueprint": FOX_BLUEPRINT,
        "coreConflict": {"internal": "Self-doubt", "external": "The dark forest"},
        "boundaries": {
            "spatial": "An ancient forest",
            "temporal": "One night",
            "historical": "Timeless fable",
            "visual": "Moonlit blues and warm lantern light"
        }
    })
}

pub fn profile_json() -> Value {
    json!({
        "facialFeatures": "Narrow muzzle, amber eyes",
        "hairDescription": "Bright red fur",
        "bodyType": "Slender",
        "distinctiveFeatures": "Torn left ear",
        "clothingStyle": "None",
        "skinTone": "Red fur with white chest",
        "ageEstimate": "Young adult",
        "ethnicity": "Red fox",
        "completeDescription": PROFILE_DESCRIPTION
    })
}

pub fn scene_json(id: u32) -> Value {
    json!({
        "id": id,
        "title": format!("Scene title {}", id),
        "scriptLine": format!("The fox continues the search, beat {}", id),
        "emotion": "Determined",
        "intent": "Show the search",
        "cinematographyFormat": "35mm film look",
        "subjectIdentity": "The main character, the same fox in every scene",
        "sceneContext": "A misty green forest at night",
        "action": "The fox sniffs the ground",
        "cameraComposition": "Low angle medium shot",
        "styleAmbiance": "Painterly, soft blue moonlight",
        "audioDialogue": "Wind in the leaves",
        "technicalNegative": "No blur",
        "veoPrompt": format!("Cinematic shot of the fox, beat {}", id)
    })
}

pub fn scene_script(id: u32) -> SceneScript {
    serde_json::from_value(scene_json(id)).unwrap()
}

/// A noisy 64x64 PNG, large enough to pass the default size threshold.
pub fn png_bytes() -> Vec<u8> {
    png_of_size(64, 64)
}

pub fn png_of_size(width: u32, height: u32) -> Vec<u8> {
    let mut seed: u32 = 0x2545_f491;
    let img = image::RgbImage::from_fn(width, height, |_, _| {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let [r, g, b, _] = seed.to_le_bytes();
        image::Rgb([r, g, b])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn reference() -> ReferenceAsset {
    ReferenceAsset::new("image/png", "iVBORw0KGgo=")
}
