//! Top-level generation state machine.
//!
//! A fresh run moves through
//! `Idle → StoryWorld → CharacterAnalysis → Script → Validate → Images → Complete`.
//! Story-world and script failures end the run in `Failed`; frame failures are
//! contained to the frame and replaced with the error sentinel.

use crate::character::CharacterConsistencyAgent;
use crate::frames::{FrameContext, FrameSynthesizer};
use crate::progress::ProgressReporter;
use crate::prompt::{ReferenceFlags, continuity_context};
use crate::script::{ScriptContext, ScriptGenerator};
use crate::story_world::{StoryWorldSynthesizer, placeholder_world};
use crate::validator::ConsistencyValidator;
use std::future::Future;
use std::sync::Arc;
use storyboard_core::{
    AspectRatio, EnhancedBlueprints, GenerationPhase, GenerationProgress,
    MAX_SECONDARY_CHARACTERS, ReferenceAssets, Scene, SceneScript, Storyboard, StoryboardRequest,
    StoryWorld,
};
use storyboard_error::{PipelineError, PipelineErrorKind, StoryboardError, StoryboardResult};
use storyboard_interface::{GenerativeBackend, ImageGeneration, StoryboardDriver};
use storyboard_rate_limit::{EstimateSettings, RetryPolicy, StoryboardConfig};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum GenerationState {
    /// Not started
    #[display("idle")]
    Idle,
    /// Synthesizing the story world
    #[display("story-world")]
    StoryWorld,
    /// Analyzing reference images
    #[display("character-analysis")]
    CharacterAnalysis,
    /// Writing scene scripts
    #[display("script")]
    Script,
    /// Running consistency heuristics
    #[display("validate")]
    Validate,
    /// Rendering the frames of one scene
    #[display("images(scene {})", scene)]
    Images {
        /// Scene being rendered
        scene: u32,
    },
    /// Finished
    #[display("complete")]
    Complete,
    /// Aborted
    #[display("failed")]
    Failed,
}

/// Caller-side controls for one run.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    /// Receives progress events
    pub progress: Option<UnboundedSender<GenerationProgress>>,
    /// Stops the run before its next provider call
    pub cancel: CancellationToken,
}

impl RunControl {
    /// Controls with no progress listener and a fresh cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends progress events to `sender`.
    pub fn with_progress(mut self, sender: UnboundedSender<GenerationProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Uses `cancel` to stop the run.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Tracks the state of one run and logs every transition.
struct RunState<'a> {
    state: GenerationState,
    cancel: &'a CancellationToken,
    reporter: ProgressReporter,
}

impl<'a> RunState<'a> {
    fn new(cancel: &'a CancellationToken, reporter: ProgressReporter) -> Self {
        Self {
            state: GenerationState::Idle,
            cancel,
            reporter,
        }
    }

    fn enter(&mut self, next: GenerationState) -> StoryboardResult<()> {
        if self.cancel.is_cancelled() {
            return Err(cancelled());
        }
        info!(from = %self.state, to = %next, "State transition");
        self.state = next;
        Ok(())
    }

    fn report(&self, event: GenerationProgress) {
        self.reporter.report(event);
    }

    fn finish(&mut self, message: &str) {
        info!(from = %self.state, to = %GenerationState::Complete, "State transition");
        self.state = GenerationState::Complete;
        self.reporter.complete(message);
    }

    fn fail(&mut self, err: &StoryboardError) {
        error!(state = %self.state, error = %err, "Run failed");
        self.state = GenerationState::Failed;
        self.reporter.fail();
    }

    async fn cancellable<T>(
        &self,
        call: impl Future<Output = StoryboardResult<T>>,
    ) -> StoryboardResult<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(cancelled()),
            result = call => result,
        }
    }
}

fn cancelled() -> StoryboardError {
    PipelineError::new(PipelineErrorKind::Cancelled).into()
}

fn check_secondaries(assets: &ReferenceAssets) -> StoryboardResult<()> {
    let got = assets.secondary_characters.len();
    if got > MAX_SECONDARY_CHARACTERS {
        return Err(PipelineError::new(PipelineErrorKind::TooManySecondaryReferences {
            max: MAX_SECONDARY_CHARACTERS,
            got,
        })
        .into());
    }
    Ok(())
}

/// Sequences the pipeline components into a storyboard.
pub struct GenerationOrchestrator<B> {
    story_world: StoryWorldSynthesizer<B>,
    characters: CharacterConsistencyAgent<B>,
    scripts: ScriptGenerator<B>,
    validator: ConsistencyValidator,
    frames: FrameSynthesizer<B>,
    retry: RetryPolicy,
    estimates: EstimateSettings,
    backend: Arc<B>,
}

impl<B: GenerativeBackend> GenerationOrchestrator<B> {
    /// Creates an orchestrator sharing one backend across all components.
    pub fn new(backend: Arc<B>, config: &StoryboardConfig) -> Self {
        let retry = RetryPolicy::from_settings(&config.retry);
        info!(
            provider = backend.provider_name(),
            model = backend.model_name(),
            image_model = backend.image_model_name(),
            "Creating orchestrator"
        );
        Self {
            story_world: StoryWorldSynthesizer::new(Arc::clone(&backend)),
            characters: CharacterConsistencyAgent::new(Arc::clone(&backend))
                .with_call_timeout(retry.call_timeout()),
            scripts: ScriptGenerator::new(Arc::clone(&backend)),
            validator: ConsistencyValidator,
            frames: FrameSynthesizer::new(Arc::clone(&backend), retry, config.frames),
            retry,
            estimates: config.estimates,
            backend,
        }
    }

    /// Generates a complete storyboard.
    ///
    /// # Errors
    ///
    /// - [`PipelineErrorKind::EmptyStory`] or
    ///   [`PipelineErrorKind::TooManySecondaryReferences`] for invalid input
    /// - story-world and script failures, after story-world retries
    /// - [`PipelineErrorKind::Cancelled`] when `control.cancel` fires
    ///
    /// Frame failures never abort the run.
    #[instrument(
        skip_all,
        fields(
            provider = self.backend.provider_name(),
            model = self.backend.model_name(),
            image_model = self.backend.image_model_name(),
            frames = request.frame_count.get(),
            aspect_ratio = %request.aspect_ratio
        )
    )]
    pub async fn generate(
        &self,
        request: &StoryboardRequest,
        control: RunControl,
    ) -> StoryboardResult<Storyboard> {
        let scene_count = request.frame_count.scene_count();
        let baseline = self.estimates.baseline_secs(scene_count, scene_count * 2);
        let reporter = ProgressReporter::new(control.progress.clone(), baseline);
        let _ticker = reporter.start_ticker();
        let mut run = RunState::new(&control.cancel, reporter);

        match self.run_generate(request, scene_count, &mut run).await {
            Ok(storyboard) => {
                run.finish("Storyboard complete");
                info!(
                    scenes = storyboard.scenes.len(),
                    frames = storyboard.frame_count(),
                    "Storyboard generated"
                );
                Ok(storyboard)
            }
            Err(e) => {
                run.fail(&e);
                Err(e)
            }
        }
    }

    async fn run_generate(
        &self,
        request: &StoryboardRequest,
        scene_count: usize,
        run: &mut RunState<'_>,
    ) -> StoryboardResult<Storyboard> {
        if request.story.trim().is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::EmptyStory).into());
        }
        check_secondaries(&request.assets)?;

        run.enter(GenerationState::StoryWorld)?;
        run.report(GenerationProgress::new(
            GenerationPhase::StoryWorld,
            2,
            "Building story world",
        ));
        let story = request.story.as_str();
        let world = run
            .cancellable(
                self.retry
                    .run("story world", |_| self.story_world.synthesize(story)),
            )
            .await?;
        run.report(GenerationProgress::new(
            GenerationPhase::StoryWorld,
            10,
            "Story world ready",
        ));

        run.enter(GenerationState::CharacterAnalysis)?;
        let blueprints = self
            .analyze_characters(run, &world.character_blueprint, &request.assets)
            .await?;

        run.enter(GenerationState::Script)?;
        run.report(GenerationProgress::new(
            GenerationPhase::Script,
            15,
            format!("Writing {} scenes", scene_count),
        ));
        let ctx = ScriptContext {
            story_world: &world,
            blueprints: &blueprints,
            aspect_ratio: request.aspect_ratio,
            references: ReferenceFlags::from_assets(&request.assets),
        };
        let scripts = run
            .cancellable(self.retry.attempt(self.scripts.generate(ctx, scene_count)))
            .await?;
        run.report(GenerationProgress::new(
            GenerationPhase::Script,
            25,
            format!("{} scenes written", scripts.len()),
        ));

        run.enter(GenerationState::Validate)?;
        self.validate(&scripts, &blueprints);

        let scenes = self
            .render_scenes(run, &world, &blueprints, &request.assets, request.aspect_ratio, &[], scripts)
            .await?;

        Ok(Storyboard {
            scenes,
            story_world: Some(world),
            aspect_ratio: request.aspect_ratio,
        })
    }

    /// Generates exactly one scene continuing `storyboard`.
    ///
    /// The new scene is numbered `last id + 1`. `storyboard` is not modified;
    /// appending the scene is up to the caller, so two calls on the same
    /// storyboard return two scenes with the same id.
    ///
    /// # Errors
    ///
    /// - [`PipelineErrorKind::EmptyStoryboard`] if there is no scene to continue
    /// - script failures for the single scene
    /// - [`PipelineErrorKind::Cancelled`] when `control.cancel` fires
    #[instrument(
        skip_all,
        fields(
            provider = self.backend.provider_name(),
            model = self.backend.model_name(),
            scenes = storyboard.scenes.len(),
            instruction = instruction.is_some()
        )
    )]
    pub async fn continue_story(
        &self,
        storyboard: &Storyboard,
        assets: &ReferenceAssets,
        instruction: Option<&str>,
        control: RunControl,
    ) -> StoryboardResult<Scene> {
        let baseline = self.estimates.script_secs_per_scene + 2 * self.estimates.frame_secs;
        let reporter = ProgressReporter::new(control.progress.clone(), baseline);
        let _ticker = reporter.start_ticker();
        let mut run = RunState::new(&control.cancel, reporter);

        match self.run_continue(storyboard, assets, instruction, &mut run).await {
            Ok(scene) => {
                run.finish("Scene added");
                info!(scene_id = scene.id(), "Continuation generated");
                Ok(scene)
            }
            Err(e) => {
                run.fail(&e);
                Err(e)
            }
        }
    }

    async fn run_continue(
        &self,
        storyboard: &Storyboard,
        assets: &ReferenceAssets,
        instruction: Option<&str>,
        run: &mut RunState<'_>,
    ) -> StoryboardResult<Scene> {
        let last = storyboard
            .last_scene()
            .ok_or_else(|| StoryboardError::from(PipelineError::new(PipelineErrorKind::EmptyStoryboard)))?;
        check_secondaries(assets)?;

        let placeholder;
        let world = match &storyboard.story_world {
            Some(world) => world,
            None => {
                warn!(last_scene = last.id(), "Storyboard has no story world, using a placeholder");
                placeholder = placeholder_world(last);
                &placeholder
            }
        };

        run.enter(GenerationState::CharacterAnalysis)?;
        let blueprints = self
            .analyze_characters(run, &world.character_blueprint, assets)
            .await?;

        run.enter(GenerationState::Script)?;
        let next_id = last.id() + 1;
        run.report(GenerationProgress::new(
            GenerationPhase::Script,
            15,
            format!("Writing scene {}", next_id),
        ));
        let prior: Vec<&SceneScript> = storyboard.scenes.iter().map(|s| &s.script).collect();
        let ctx = ScriptContext {
            story_world: world,
            blueprints: &blueprints,
            aspect_ratio: storyboard.aspect_ratio,
            references: ReferenceFlags::from_assets(assets),
        };
        let script = run
            .cancellable(self.retry.attempt(self.scripts.generate_continuation(
                ctx,
                &prior,
                instruction,
                next_id,
            )))
            .await?;
        run.report(GenerationProgress::new(
            GenerationPhase::Script,
            25,
            format!("Scene {} written", next_id),
        ));

        run.enter(GenerationState::Validate)?;
        let scripts = vec![script];
        self.validate(&scripts, &blueprints);

        let mut scenes = self
            .render_scenes(run, world, &blueprints, assets, storyboard.aspect_ratio, &prior, scripts)
            .await?;
        scenes
            .pop()
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::EmptyStoryboard).into())
    }

    async fn analyze_characters(
        &self,
        run: &RunState<'_>,
        original: &str,
        assets: &ReferenceAssets,
    ) -> StoryboardResult<EnhancedBlueprints> {
        let references = usize::from(assets.main_character.is_some()) + assets.secondary_characters.len();
        run.report(GenerationProgress::new(
            GenerationPhase::Script,
            10,
            format!("Analyzing {} character references", references),
        ));
        let enhance = async {
            Ok(self
                .characters
                .enhance_blueprint(original, assets.main_character.as_ref(), &assets.secondary_characters)
                .await)
        };
        run.cancellable(enhance).await
    }

    fn validate(&self, scripts: &[SceneScript], blueprints: &EnhancedBlueprints) {
        let report = self.validator.validate(
            scripts,
            &blueprints.main_character_blueprint,
            &blueprints.additional_character_blueprints,
        );
        if report.is_valid {
            debug!(scenes = scripts.len(), "Consistency checks passed");
        } else {
            info!(issues = report.issues.len(), "Consistency checks reported issues");
        }
    }

    /// Renders scenes one after another; each scene's prompt names all prior scenes.
    #[allow(clippy::too_many_arguments)]
    async fn render_scenes(
        &self,
        run: &mut RunState<'_>,
        world: &StoryWorld,
        blueprints: &EnhancedBlueprints,
        assets: &ReferenceAssets,
        aspect_ratio: AspectRatio,
        earlier: &[&SceneScript],
        scripts: Vec<SceneScript>,
    ) -> StoryboardResult<Vec<Scene>> {
        let total_scenes = scripts.len() as u32;
        let total_frames = scripts.len() * 2;
        let mut done_frames = 0usize;
        let mut scenes: Vec<Scene> = Vec::with_capacity(scripts.len());

        for (index, script) in scripts.into_iter().enumerate() {
            let position = index as u32 + 1;
            run.enter(GenerationState::Images { scene: script.id })?;
            run.report(
                GenerationProgress::new(
                    GenerationPhase::Images,
                    images_progress(done_frames, total_frames),
                    format!("Rendering scene {} of {}", position, total_scenes),
                )
                .with_scene(position, total_scenes)
                .with_frame(done_frames as u32),
            );

            let continuity = continuity_context(
                earlier
                    .iter()
                    .copied()
                    .chain(scenes.iter().map(|s| &s.script)),
                world,
            );
            let ctx = FrameContext {
                scene: &script,
                blueprints,
                assets,
                aspect_ratio,
                continuity: continuity.as_deref(),
                cancel: run.cancel,
            };
            let frames = self.frames.synthesize_scene_frames(&ctx).await;
            if run.cancel.is_cancelled() {
                return Err(cancelled());
            }
            if frames.iter().all(|f| f.is_error()) {
                warn!(scene_id = script.id, "Both frames failed, keeping error images");
            }

            done_frames += 2;
            run.report(
                GenerationProgress::new(
                    GenerationPhase::Images,
                    images_progress(done_frames, total_frames),
                    format!("Scene {} of {} rendered", position, total_scenes),
                )
                .with_scene(position, total_scenes)
                .with_frame(done_frames as u32),
            );
            scenes.push(Scene { script, frames });
        }
        Ok(scenes)
    }
}

fn images_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (25 + 75 * done / total).min(100) as u8
}
