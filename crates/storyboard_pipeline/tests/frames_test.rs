//! Frame synthesis tests: retry timing, fallback and sentinel substitution.

mod test_utils;

use std::sync::Arc;
use std::time::Duration;
use storyboard_core::{
    AspectRatio, ERROR_IMAGE_URL, EnhancedBlueprints, FrameVariant, GeneratedImage, Input,
    ReferenceAssets, SceneScript,
};
use storyboard_error::{
    ErrorCategory, FrameErrorKind, GeminiError, GeminiErrorKind, StoryboardError,
    StoryboardErrorKind,
};
use storyboard_pipeline::{FrameContext, FrameSynthesizer};
use storyboard_rate_limit::{FrameSettings, RetryPolicy};
use test_utils::*;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn overloaded() -> StoryboardError {
    StoryboardError::from(GeminiError::new(GeminiErrorKind::HttpError {
        status_code: 429,
        message: "Resource exhausted".to_string(),
    }))
}

fn synthesizer(backend: &Arc<MockBackend>) -> FrameSynthesizer<MockBackend> {
    FrameSynthesizer::new(
        Arc::clone(backend),
        RetryPolicy::default(),
        FrameSettings::default(),
    )
}

struct Fixture {
    scene: SceneScript,
    blueprints: EnhancedBlueprints,
    assets: ReferenceAssets,
    cancel: CancellationToken,
}

impl Fixture {
    fn new() -> Self {
        Self {
            scene: scene_script(1),
            blueprints: EnhancedBlueprints {
                main_character_blueprint: FOX_BLUEPRINT.to_string(),
                additional_character_blueprints: Vec::new(),
            },
            assets: ReferenceAssets {
                main_character: Some(reference()),
                ..ReferenceAssets::default()
            },
            cancel: CancellationToken::new(),
        }
    }

    fn ctx(&self) -> FrameContext<'_> {
        FrameContext {
            scene: &self.scene,
            blueprints: &self.blueprints,
            assets: &self.assets,
            aspect_ratio: AspectRatio::Landscape,
            continuity: None,
            cancel: &self.cancel,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_fail_twice_then_succeed_waits_one_and_two_seconds() {
    let backend = Arc::new(MockBackend::with_images(|n, _| {
        if n < 2 { Err(overloaded()) } else { Ok(default_image()) }
    }));
    let fixture = Fixture::new();
    let start = Instant::now();

    let url = synthesizer(&backend)
        .synthesize_frame(&fixture.ctx(), FrameVariant::A)
        .await
        .unwrap();

    let elapsed = start.elapsed();
    assert!(url.starts_with("data:image/png;base64,"));
    assert_eq!(backend.image_calls(), 3);
    assert!(elapsed >= Duration::from_secs(3), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(3500), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_prompt_after_exhausted_attempts() {
    let backend = Arc::new(MockBackend::with_images(|n, _| {
        if n < 3 { Err(overloaded()) } else { Ok(default_image()) }
    }));
    let fixture = Fixture::new();
    let start = Instant::now();

    let result = synthesizer(&backend)
        .synthesize_frame(&fixture.ctx(), FrameVariant::B)
        .await;

    assert!(result.is_ok());
    assert_eq!(backend.image_calls(), 4);
    assert!(start.elapsed() >= Duration::from_secs(7));

    let requests = backend.image_requests();
    let full = requests[0].parts.last().and_then(Input::as_text).unwrap();
    let fallback = requests[3].parts.last().and_then(Input::as_text).unwrap();
    assert!(fallback.starts_with(&fixture.scene.script_line));
    assert!(fallback.len() < full.len());
    assert!(fallback.chars().count() <= fixture.scene.script_line.chars().count() + 2 + 500);
    // Reference images survive simplification
    assert!(requests[3].parts[0].is_image());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_frame_reports_attempts() {
    let backend = Arc::new(MockBackend::with_images(|_, _| Err(overloaded())));
    let fixture = Fixture::new();

    let err = synthesizer(&backend)
        .synthesize_frame(&fixture.ctx(), FrameVariant::A)
        .await
        .unwrap_err();

    assert_eq!(backend.image_calls(), 4);
    match err.kind() {
        StoryboardErrorKind::Frame(frame) => {
            assert_eq!(frame.scene_id, 1);
            assert_eq!(frame.variant, 'A');
            assert!(matches!(frame.kind, FrameErrorKind::Exhausted { attempts: 3, .. }));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_tiny_image_is_retried() {
    let backend = Arc::new(MockBackend::with_images(|n, _| {
        Ok(GeneratedImage {
            mime: "image/png".to_string(),
            data: if n == 0 { png_of_size(2, 2) } else { png_bytes() },
        })
    }));
    let fixture = Fixture::new();

    let result = synthesizer(&backend)
        .synthesize_frame(&fixture.ctx(), FrameVariant::A)
        .await;

    assert!(result.is_ok());
    assert_eq!(backend.image_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_scene_frames_always_two_with_sentinels() {
    let backend = Arc::new(MockBackend::with_images(|_, _| Err(overloaded())));
    let fixture = Fixture::new();

    let frames = synthesizer(&backend)
        .synthesize_scene_frames(&fixture.ctx())
        .await;

    assert_eq!(frames[0].id, "1A");
    assert_eq!(frames[1].id, "1B");
    assert_eq!(frames[0].variant, FrameVariant::A);
    assert_eq!(frames[1].variant, FrameVariant::B);
    assert!(frames.iter().all(|f| f.image_url == ERROR_IMAGE_URL));
    assert_eq!(frames[0].metadata.composition, fixture.scene.camera_composition);
}

#[tokio::test(start_paused = true)]
async fn test_variants_render_concurrently() {
    let backend = Arc::new(MockBackend::happy());
    let fixture = Fixture::new();
    let start = Instant::now();

    let frames = synthesizer(&backend)
        .synthesize_scene_frames(&fixture.ctx())
        .await;

    assert!(frames.iter().all(|f| !f.is_error()));
    assert_eq!(backend.image_calls(), 2);
    assert_eq!(start.elapsed(), Duration::ZERO);

    let texts: Vec<String> = backend
        .image_requests()
        .iter()
        .filter_map(|r| r.parts.last().and_then(Input::as_text).map(str::to_string))
        .collect();
    assert!(texts.iter().any(|t| t.contains("VARIANT A")));
    assert!(texts.iter().any(|t| t.contains("VARIANT B")));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_frame_makes_no_call() {
    let backend = Arc::new(MockBackend::happy());
    let fixture = Fixture::new();
    fixture.cancel.cancel();

    let err = synthesizer(&backend)
        .synthesize_frame(&fixture.ctx(), FrameVariant::A)
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Cancelled);
    assert_eq!(backend.image_calls(), 0);
}
