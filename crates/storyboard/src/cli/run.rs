//! Command handlers.

use super::assets::load_references;
use super::commands::{ContinueArgs, GenerateArgs, StorySource};
use std::path::Path;
use std::sync::Arc;
use storyboard::{
    ConfigError, GeminiClient, GenerationOrchestrator, GenerationProgress, JsonError, RunControl,
    Storyboard, StoryboardConfig, StoryboardError, StoryboardRequest, StoryboardResult,
};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Background tasks feeding a run: progress logging and Ctrl-C handling.
struct RunTasks {
    progress: JoinHandle<()>,
    interrupt: JoinHandle<()>,
}

impl RunTasks {
    fn start() -> (RunControl, Self) {
        let (tx, rx) = unbounded_channel();
        let cancel = CancellationToken::new();
        let control = RunControl::new()
            .with_progress(tx)
            .with_cancel(cancel.clone());

        let progress = tokio::spawn(log_progress(rx));
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling after the current call");
                cancel.cancel();
            }
        });
        (control, Self { progress, interrupt })
    }

    async fn finish(self) {
        self.interrupt.abort();
        // The progress task ends once the run drops its sender
        let _ = self.progress.await;
    }
}

async fn log_progress(mut rx: UnboundedReceiver<GenerationProgress>) {
    let mut last_logged = None;
    while let Some(event) = rx.recv().await {
        // Ticks repeat the last event with fresh timing; log only real changes
        let key = (event.progress, event.message.clone());
        if last_logged.as_ref() == Some(&key) {
            continue;
        }
        info!(
            phase = %event.phase,
            progress = event.progress,
            scene = event.current_scene,
            total_scenes = event.total_scenes,
            elapsed_secs = event.elapsed_time,
            eta_secs = event.estimated_time_remaining,
            "{}",
            event.message
        );
        last_logged = Some(key);
    }
}

fn orchestrator(config: &StoryboardConfig) -> StoryboardResult<GenerationOrchestrator<GeminiClient>> {
    let client = GeminiClient::from_env(config.gemini.clone())?;
    Ok(GenerationOrchestrator::new(Arc::new(client), config))
}

fn read_story(source: &StorySource) -> StoryboardResult<String> {
    match (&source.story, &source.story_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("Failed to read story file {}: {}", path.display(), e)).into()
        }),
        (None, None) => Err(ConfigError::new("Provide --story or --story-file").into()),
    }
}

fn read_storyboard(path: &Path) -> StoryboardResult<Storyboard> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::new(format!("Failed to read storyboard {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        StoryboardError::from(JsonError::new(format!(
            "Invalid storyboard {}: {}",
            path.display(),
            e
        )))
    })
}

fn write_storyboard(path: &Path, storyboard: &Storyboard) -> StoryboardResult<()> {
    let json = serde_json::to_string_pretty(storyboard)
        .map_err(|e| JsonError::new(format!("Failed to serialize storyboard: {}", e)))?;
    std::fs::write(path, json).map_err(|e| {
        ConfigError::new(format!("Failed to write {}: {}", path.display(), e))
    })?;
    info!(path = %path.display(), scenes = storyboard.scenes.len(), "Storyboard written");
    Ok(())
}

/// Handles `storyboard generate`.
#[instrument(skip_all, fields(frames = %args.frames, aspect = %args.aspect))]
pub async fn generate_storyboard(config: Option<&Path>, args: GenerateArgs) -> StoryboardResult<()> {
    let config = StoryboardConfig::load_with(config)?;
    let request = StoryboardRequest {
        story: read_story(&args.story)?,
        assets: load_references(&args.references)?,
        aspect_ratio: args.aspect,
        frame_count: args.frames,
    };
    let orchestrator = orchestrator(&config)?;

    let (control, tasks) = RunTasks::start();
    let result = orchestrator.generate(&request, control).await;
    tasks.finish().await;

    let storyboard = result?;
    let failed = storyboard
        .scenes
        .iter()
        .flat_map(|s| s.frames.iter())
        .filter(|f| f.is_error())
        .count();
    if failed > 0 {
        warn!(failed, "Some frames could not be generated and show an error image");
    }
    write_storyboard(&args.output, &storyboard)
}

/// Handles `storyboard continue`.
#[instrument(skip_all, fields(storyboard = %args.storyboard.display()))]
pub async fn continue_storyboard(config: Option<&Path>, args: ContinueArgs) -> StoryboardResult<()> {
    let config = StoryboardConfig::load_with(config)?;
    let storyboard = read_storyboard(&args.storyboard)?;
    let assets = load_references(&args.references)?;
    let orchestrator = orchestrator(&config)?;

    let (control, tasks) = RunTasks::start();
    let result = orchestrator
        .continue_story(&storyboard, &assets, args.instruction.as_deref(), control)
        .await;
    tasks.finish().await;

    let scene = result?;
    info!(scene_id = scene.id(), "Scene appended");
    let output = args.output.as_deref().unwrap_or(&args.storyboard);
    write_storyboard(output, &storyboard.with_scene(scene))
}
