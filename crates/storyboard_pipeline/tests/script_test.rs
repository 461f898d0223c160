//! Script generation tests: cardinality, repair and continuation.

mod test_utils;

use serde_json::{Value, json};
use std::sync::Arc;
use storyboard_core::{AspectRatio, EnhancedBlueprints, StoryWorld};
use storyboard_error::{ErrorCategory, StoryboardErrorKind};
use storyboard_pipeline::{ReferenceFlags, ScriptContext, ScriptGenerator};
use test_utils::*;

fn world() -> StoryWorld {
    serde_json::from_value(story_world_json(6)).unwrap()
}

fn blueprints() -> EnhancedBlueprints {
    EnhancedBlueprints {
        main_character_blueprint: FOX_BLUEPRINT.to_string(),
        additional_character_blueprints: Vec::new(),
    }
}

fn scenes(count: u32) -> Value {
    json!({ "scenes": (1..=count).map(scene_json).collect::<Vec<_>>() })
}

#[tokio::test]
async fn test_exact_count_for_each_supported_size() {
    let world = world();
    let blueprints = blueprints();
    for count in 1..=4usize {
        let backend = Arc::new(MockBackend::happy());
        let generator = ScriptGenerator::new(Arc::clone(&backend));
        let ctx = ScriptContext {
            story_world: &world,
            blueprints: &blueprints,
            aspect_ratio: AspectRatio::Landscape,
            references: ReferenceFlags::default(),
        };

        let scripts = generator.generate(ctx, count).await.unwrap();

        assert_eq!(scripts.len(), count);
        let ids: Vec<u32> = scripts.iter().map(|s| s.id).collect();
        assert_eq!(ids, (1..=count as u32).collect::<Vec<_>>());

        let request = &backend.json_requests(Phase::SceneList)[0];
        assert_eq!(requested_scenes(request), count);
        assert_eq!(request.schema["properties"]["scenes"]["maxItems"], count);
    }
}

#[tokio::test]
async fn test_excess_scenes_truncated_in_order() {
    let backend = Arc::new(MockBackend::with_json(|_, _, _| {
        let mut list = scenes(5);
        for (i, scene) in list["scenes"].as_array_mut().unwrap().iter_mut().enumerate() {
            scene["title"] = json!(format!("Beat {}", i + 1));
        }
        Ok(list)
    }));
    let generator = ScriptGenerator::new(backend);
    let (world, blueprints) = (world(), blueprints());
    let ctx = ScriptContext {
        story_world: &world,
        blueprints: &blueprints,
        aspect_ratio: AspectRatio::Landscape,
        references: ReferenceFlags::default(),
    };

    let scripts = generator.generate(ctx, 2).await.unwrap();

    let titles: Vec<&str> = scripts.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Beat 1", "Beat 2"]);
}

#[tokio::test]
async fn test_fewer_scenes_accepted() {
    let backend = Arc::new(MockBackend::with_json(|_, _, _| Ok(scenes(1))));
    let generator = ScriptGenerator::new(backend);
    let (world, blueprints) = (world(), blueprints());
    let ctx = ScriptContext {
        story_world: &world,
        blueprints: &blueprints,
        aspect_ratio: AspectRatio::Portrait,
        references: ReferenceFlags::default(),
    };

    let scripts = generator.generate(ctx, 3).await.unwrap();
    assert_eq!(scripts.len(), 1);
}

#[tokio::test]
async fn test_zero_scenes_is_schema_error() {
    let backend = Arc::new(MockBackend::with_json(|_, _, _| Ok(json!({"scenes": []}))));
    let generator = ScriptGenerator::new(backend);
    let (world, blueprints) = (world(), blueprints());
    let ctx = ScriptContext {
        story_world: &world,
        blueprints: &blueprints,
        aspect_ratio: AspectRatio::Landscape,
        references: ReferenceFlags::default(),
    };

    let err = generator.generate(ctx, 2).await.unwrap_err();
    assert!(matches!(err.kind(), StoryboardErrorKind::Schema(_)));
    assert_eq!(err.category(), ErrorCategory::MalformedOutput);
}

#[tokio::test]
async fn test_bare_array_and_renumbering() {
    let backend = Arc::new(MockBackend::with_json(|_, _, _| {
        Ok(json!([scene_json(7), scene_json(3)]))
    }));
    let generator = ScriptGenerator::new(backend);
    let (world, blueprints) = (world(), blueprints());
    let ctx = ScriptContext {
        story_world: &world,
        blueprints: &blueprints,
        aspect_ratio: AspectRatio::Landscape,
        references: ReferenceFlags::default(),
    };

    let scripts = generator.generate(ctx, 2).await.unwrap();
    assert_eq!(scripts[0].id, 1);
    assert_eq!(scripts[1].id, 2);
    assert_eq!(scripts[0].title, "Scene title 7");
}

#[tokio::test]
async fn test_repair_embeds_blueprint_and_composite_prompt() {
    let backend = Arc::new(MockBackend::with_json(|_, _, _| {
        let mut scene = scene_json(1);
        scene.as_object_mut().unwrap().remove("veoPrompt");
        Ok(json!({ "scenes": [scene] }))
    }));
    let generator = ScriptGenerator::new(backend);
    let (world, blueprints) = (world(), blueprints());
    let ctx = ScriptContext {
        story_world: &world,
        blueprints: &blueprints,
        aspect_ratio: AspectRatio::Landscape,
        references: ReferenceFlags {
            main_character: true,
            ..ReferenceFlags::default()
        },
    };

    let scripts = generator.generate(ctx, 1).await.unwrap();

    let scene = &scripts[0];
    assert!(scene.subject_identity.starts_with(FOX_BLUEPRINT));
    assert!(scene.veo_prompt.contains(&scene.camera_composition));
    assert!(scene.veo_prompt.contains(&scene.technical_negative));
}

#[tokio::test]
async fn test_continuation_uses_next_id_and_instruction() {
    let backend = Arc::new(MockBackend::happy());
    let generator = ScriptGenerator::new(Arc::clone(&backend));
    let (world, blueprints) = (world(), blueprints());
    let ctx = ScriptContext {
        story_world: &world,
        blueprints: &blueprints,
        aspect_ratio: AspectRatio::Landscape,
        references: ReferenceFlags::default(),
    };
    let first = scene_script(1);
    let second = scene_script(2);

    let scene = generator
        .generate_continuation(ctx, &[&first, &second], Some("The owl returns the key"), 3)
        .await
        .unwrap();

    assert_eq!(scene.id, 3);
    let request = &backend.json_requests(Phase::Continuation)[0];
    let prompt = request.parts[0].as_text().unwrap();
    assert!(prompt.contains("The owl returns the key"));
    assert!(prompt.contains("Scene 2: Scene title 2"));
}

#[tokio::test]
async fn test_continuation_accepts_wrapped_scene() {
    let backend = Arc::new(MockBackend::with_json(|_, _, _| Ok(json!({"scenes": [scene_json(1)]}))));
    let generator = ScriptGenerator::new(backend);
    let (world, blueprints) = (world(), blueprints());
    let ctx = ScriptContext {
        story_world: &world,
        blueprints: &blueprints,
        aspect_ratio: AspectRatio::Landscape,
        references: ReferenceFlags::default(),
    };
    let first = scene_script(1);

    let scene = generator
        .generate_continuation(ctx, &[&first], None, 2)
        .await
        .unwrap();
    assert_eq!(scene.id, 2);
}
