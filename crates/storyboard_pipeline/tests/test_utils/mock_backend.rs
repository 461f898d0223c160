//! Scripted backend implementing both LLM capabilities.

use super::fixtures::{png_bytes, profile_json, scene_json, story_world_json};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use storyboard_core::{GeneratedImage, ImageRequest, StructuredRequest};
use storyboard_error::StoryboardResult;
use storyboard_interface::{ImageGeneration, JsonMode, StoryboardDriver};

/// Which structured-output phase a request belongs to, read from its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    StoryWorld,
    Profile,
    SceneList,
    Continuation,
}

impl Phase {
    pub fn of(request: &StructuredRequest) -> Self {
        let properties = &request.schema["properties"];
        if properties.get("premise").is_some() {
            Phase::StoryWorld
        } else if properties.get("facialFeatures").is_some() {
            Phase::Profile
        } else if properties.get("scenes").is_some() {
            Phase::SceneList
        } else {
            Phase::Continuation
        }
    }
}

/// Produces a JSON response for the n-th call (0-based) of a phase.
pub type JsonHandler =
    Box<dyn Fn(Phase, usize, &StructuredRequest) -> StoryboardResult<Value> + Send + Sync>;

/// Produces an image for the n-th image call (0-based).
pub type ImageHandler =
    Box<dyn Fn(usize, &ImageRequest) -> StoryboardResult<GeneratedImage> + Send + Sync>;

#[derive(Default)]
struct Calls {
    json: Vec<(Phase, StructuredRequest)>,
    images: Vec<ImageRequest>,
}

/// Mock backend whose responses are scripted per phase.
///
/// Records every request so tests can inspect prompts and call counts.
pub struct MockBackend {
    json: JsonHandler,
    image: ImageHandler,
    stalled: Vec<Phase>,
    calls: Arc<Mutex<Calls>>,
}

impl MockBackend {
    pub fn new<J, I>(json: J, image: I) -> Self
    where
        J: Fn(Phase, usize, &StructuredRequest) -> StoryboardResult<Value> + Send + Sync + 'static,
        I: Fn(usize, &ImageRequest) -> StoryboardResult<GeneratedImage> + Send + Sync + 'static,
    {
        Self {
            json: Box::new(json),
            image: Box::new(image),
            stalled: Vec::new(),
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    /// Valid responses for every phase; scene lists honour the requested count.
    pub fn happy() -> Self {
        Self::new(default_json, |_, _| Ok(default_image()))
    }

    /// Valid JSON responses with a custom image handler.
    pub fn with_images<I>(image: I) -> Self
    where
        I: Fn(usize, &ImageRequest) -> StoryboardResult<GeneratedImage> + Send + Sync + 'static,
    {
        Self::new(default_json, image)
    }

    /// Custom JSON handler with valid images.
    pub fn with_json<J>(json: J) -> Self
    where
        J: Fn(Phase, usize, &StructuredRequest) -> StoryboardResult<Value> + Send + Sync + 'static,
    {
        Self::new(json, |_, _| Ok(default_image()))
    }

    /// Requests of `phase` are recorded but never answered.
    pub fn stalling(mut self, phase: Phase) -> Self {
        self.stalled.push(phase);
        self
    }

    pub fn json_calls(&self, phase: Phase) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.json.iter().filter(|(p, _)| *p == phase).count()
    }

    pub fn json_requests(&self, phase: Phase) -> Vec<StructuredRequest> {
        let calls = self.calls.lock().unwrap();
        calls
            .json
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn image_calls(&self) -> usize {
        self.calls.lock().unwrap().images.len()
    }

    pub fn image_requests(&self) -> Vec<ImageRequest> {
        self.calls.lock().unwrap().images.clone()
    }
}

/// Scene count requested by a scene-list schema.
pub fn requested_scenes(request: &StructuredRequest) -> usize {
    request.schema["properties"]["scenes"]["minItems"]
        .as_u64()
        .unwrap_or(1) as usize
}

pub fn default_json(phase: Phase, _n: usize, request: &StructuredRequest) -> StoryboardResult<Value> {
    Ok(match phase {
        Phase::StoryWorld => story_world_json(6),
        Phase::Profile => profile_json(),
        Phase::SceneList => {
            let scenes: Vec<Value> = (1..=requested_scenes(request) as u32).map(scene_json).collect();
            json!({ "scenes": scenes })
        }
        Phase::Continuation => scene_json(99),
    })
}

pub fn default_image() -> GeneratedImage {
    GeneratedImage {
        mime: "image/png".to_string(),
        data: png_bytes(),
    }
}

impl StoryboardDriver for MockBackend {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

#[async_trait]
impl JsonMode for MockBackend {
    async fn generate_json(&self, request: &StructuredRequest) -> StoryboardResult<Value> {
        let phase = Phase::of(request);
        let n = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.json.iter().filter(|(p, _)| *p == phase).count();
            calls.json.push((phase, request.clone()));
            n
        };
        if self.stalled.contains(&phase) {
            std::future::pending::<()>().await;
        }
        (self.json)(phase, n, request)
    }
}

#[async_trait]
impl ImageGeneration for MockBackend {
    async fn generate_image(&self, request: &ImageRequest) -> StoryboardResult<GeneratedImage> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.images.push(request.clone());
            calls.images.len() - 1
        };
        (self.image)(n, request)
    }
}
