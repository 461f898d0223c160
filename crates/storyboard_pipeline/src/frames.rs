//! Frame synthesis: two variants per scene with retry and fallback.

use crate::prompt::{PromptParts, build_prompt_context};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use storyboard_core::{
    AspectRatio, ERROR_IMAGE_URL, EnhancedBlueprints, Frame, FrameMetadata, FrameVariant,
    GeneratedImage, ImageRequest, ReferenceAssets, SceneScript,
};
use storyboard_error::{
    FrameError, FrameErrorKind, PipelineError, PipelineErrorKind, StoryboardErrorKind,
    StoryboardResult,
};
use storyboard_interface::ImageGeneration;
use storyboard_rate_limit::{FrameSettings, RetryPolicy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

const COLOUR_WORDS: [&str; 28] = [
    "red", "crimson", "scarlet", "orange", "amber", "gold", "golden", "yellow", "ochre", "green",
    "emerald", "teal", "turquoise", "cyan", "blue", "navy", "indigo", "purple", "violet",
    "magenta", "pink", "brown", "beige", "black", "white", "grey", "gray", "silver",
];
const LIGHTING_WORDS: [&str; 7] = ["light", "lit", "glow", "shadow", "sun", "moon", "neon"];

/// Everything needed to render the frames of one scene.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Scene to render
    pub scene: &'a SceneScript,
    /// Enhanced blueprints
    pub blueprints: &'a EnhancedBlueprints,
    /// Reference images
    pub assets: &'a ReferenceAssets,
    /// Frame aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Cross-scene continuity block
    pub continuity: Option<&'a str>,
    /// Stops further provider calls
    pub cancel: &'a CancellationToken,
}

/// Renders scene frames through an image-generation backend.
pub struct FrameSynthesizer<B> {
    backend: Arc<B>,
    retry: RetryPolicy,
    settings: FrameSettings,
}

impl<B: ImageGeneration> FrameSynthesizer<B> {
    /// Creates a synthesizer.
    pub fn new(backend: Arc<B>, retry: RetryPolicy, settings: FrameSettings) -> Self {
        Self {
            backend,
            retry,
            settings,
        }
    }

    /// Renders one variant and returns its image data URL.
    ///
    /// Up to `max_attempts` attempts with exponential backoff, then one
    /// fallback attempt with a simplified prompt.
    ///
    /// # Errors
    ///
    /// - [`FrameErrorKind::Exhausted`] if every attempt and the fallback fail
    /// - [`PipelineErrorKind::Cancelled`] if the run is cancelled
    #[instrument(skip(self, ctx, variant), fields(scene_id = ctx.scene.id, variant = %variant))]
    pub async fn synthesize_frame(
        &self,
        ctx: &FrameContext<'_>,
        variant: FrameVariant,
    ) -> StoryboardResult<String> {
        let prompt = build_prompt_context(
            ctx.scene,
            ctx.blueprints,
            ctx.assets,
            ctx.aspect_ratio,
            ctx.continuity,
            variant,
        );
        let label = format!("frame {}{}", ctx.scene.id, variant);

        let regular = self
            .retry
            .run(&label, |attempt| {
                let prompt = &prompt;
                async move {
                    debug!(attempt, "Requesting frame");
                    self.render(ctx, prompt, variant).await
                }
            })
            .await;

        let last_error = match regular {
            Ok(url) => return Ok(url),
            Err(e) if is_cancelled(&e) => return Err(e),
            Err(e) => e,
        };

        let delay = self.retry.fallback_delay();
        warn!(error = %last_error, delay_ms = delay.as_millis() as u64, "Attempts exhausted, trying simplified prompt");
        tokio::select! {
            _ = ctx.cancel.cancelled() => {
                return Err(PipelineError::new(PipelineErrorKind::Cancelled).into());
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let fallback = prompt.simplified(&ctx.scene.script_line, self.settings.fallback_prompt_chars);
        match self.retry.attempt(self.render(ctx, &fallback, variant)).await {
            Ok(url) => {
                info!("Frame recovered with simplified prompt");
                Ok(url)
            }
            Err(e) if is_cancelled(&e) => Err(e),
            Err(e) => Err(FrameError::new(
                ctx.scene.id,
                variant.letter(),
                FrameErrorKind::Exhausted {
                    attempts: self.retry.max_attempts(),
                    last_error: e.to_string(),
                },
            )
            .into()),
        }
    }

    async fn render(
        &self,
        ctx: &FrameContext<'_>,
        prompt: &PromptParts,
        variant: FrameVariant,
    ) -> StoryboardResult<String> {
        if ctx.cancel.is_cancelled() {
            return Err(PipelineError::new(PipelineErrorKind::Cancelled).into());
        }
        let request = ImageRequest {
            parts: prompt.to_inputs(),
            aspect_ratio: ctx.aspect_ratio,
            model: None,
        };
        let image = self.backend.generate_image(&request).await?;
        accept_image(&image, self.settings.min_image_bytes)
            .map_err(|kind| FrameError::new(ctx.scene.id, variant.letter(), kind).into())
    }

    /// Renders variants A and B concurrently.
    ///
    /// Always returns two frames; a variant that cannot be rendered carries
    /// [`ERROR_IMAGE_URL`].
    #[instrument(skip(self, ctx), fields(scene_id = ctx.scene.id))]
    pub async fn synthesize_scene_frames(&self, ctx: &FrameContext<'_>) -> [Frame; 2] {
        let (a, b) = tokio::join!(
            self.synthesize_frame(ctx, FrameVariant::A),
            self.synthesize_frame(ctx, FrameVariant::B)
        );

        let frame = |variant: FrameVariant, result: StoryboardResult<String>| {
            let url = result.unwrap_or_else(|e| {
                warn!(scene_id = ctx.scene.id, variant = %variant, error = %e, "Substituting error image");
                ERROR_IMAGE_URL.to_string()
            });
            Frame::new(ctx.scene.id, variant, url, derive_metadata(ctx.scene, variant))
        };
        [frame(FrameVariant::A, a), frame(FrameVariant::B, b)]
    }
}

fn is_cancelled(err: &storyboard_error::StoryboardError) -> bool {
    matches!(
        err.kind(),
        StoryboardErrorKind::Pipeline(PipelineError {
            kind: PipelineErrorKind::Cancelled,
            ..
        })
    )
}

/// Accepts an image if it is large enough, decodable and not a blank
/// placeholder, returning its data URL.
///
/// # Errors
///
/// Returns [`FrameErrorKind::InvalidImage`] describing the rejection.
pub fn accept_image(image: &GeneratedImage, min_bytes: usize) -> Result<String, FrameErrorKind> {
    if image.data.len() <= min_bytes {
        return Err(FrameErrorKind::InvalidImage(format!(
            "{} bytes, expected more than {}",
            image.data.len(),
            min_bytes
        )));
    }
    let format = image::guess_format(&image.data)
        .map_err(|e| FrameErrorKind::InvalidImage(format!("Unknown format: {}", e)))?;
    let decoded = image::load_from_memory_with_format(&image.data, format)
        .map_err(|e| FrameErrorKind::InvalidImage(format!("Not decodable: {}", e)))?;
    if is_blank(&decoded) {
        return Err(FrameErrorKind::InvalidImage(
            "Blank placeholder image".to_string(),
        ));
    }

    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(&image.data)
    ))
}

// Providers answer some refusals with a single flat colour instead of an error.
fn is_blank(decoded: &image::DynamicImage) -> bool {
    let pixels = decoded.to_rgba8();
    let mut iter = pixels.pixels();
    match iter.next() {
        Some(first) => iter.all(|p| p == first),
        None => true,
    }
}

/// Derives frame metadata from the scene tiers.
pub fn derive_metadata(scene: &SceneScript, variant: FrameVariant) -> FrameMetadata {
    let composition = match variant {
        FrameVariant::A => scene.camera_composition.clone(),
        FrameVariant::B => format!("Alternate angle: {}", scene.camera_composition),
    };

    let colour_source = format!("{} {}", scene.style_ambiance, scene.scene_context).to_lowercase();
    let mut palette: Vec<String> = Vec::new();
    for word in colour_source.split(|c: char| !c.is_alphanumeric()) {
        if COLOUR_WORDS.contains(&word) && !palette.iter().any(|p| p == word) {
            palette.push(word.to_string());
        }
    }

    let lighting = scene
        .style_ambiance
        .split([',', '.', ';'])
        .map(str::trim)
        .find(|clause| {
            let lower = clause.to_lowercase();
            LIGHTING_WORDS.iter().any(|w| lower.contains(w))
        })
        .unwrap_or(scene.style_ambiance.trim())
        .to_string();

    FrameMetadata {
        composition,
        palette,
        lighting,
        camera: scene.cinematography_format.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn scene() -> SceneScript {
        SceneScript {
            id: 1,
            title: "t".into(),
            script_line: "s".into(),
            emotion: "e".into(),
            intent: "i".into(),
            cinematography_format: "Anamorphic 2.39 look".into(),
            subject_identity: "main character".into(),
            scene_context: "A teal lake under a grey sky".into(),
            action: "a".into(),
            camera_composition: "Wide establishing shot".into(),
            style_ambiance: "Painterly, warm golden light through mist, red accents".into(),
            audio_dialogue: "a".into(),
            technical_negative: "n".into(),
            veo_prompt: "v".into(),
        }
    }

    #[test]
    fn valid_png_becomes_data_url() {
        let image = GeneratedImage {
            mime: "application/octet-stream".into(),
            data: png(32, 32),
        };
        let url = accept_image(&image, 16).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn small_or_garbage_images_are_rejected() {
        let tiny = GeneratedImage {
            mime: "image/png".into(),
            data: png(2, 2),
        };
        assert!(accept_image(&tiny, 1024).is_err());

        let garbage = GeneratedImage {
            mime: "image/png".into(),
            data: vec![0x42; 4096],
        };
        assert!(accept_image(&garbage, 16).is_err());
    }

    #[test]
    fn truncated_png_is_rejected() {
        let mut data = png(64, 64);
        data.truncate(data.len() / 2);
        let image = GeneratedImage {
            mime: "image/png".into(),
            data,
        };
        assert!(accept_image(&image, 16).is_err());
    }

    #[test]
    fn flat_colour_placeholder_is_rejected() {
        let img = image::RgbImage::from_pixel(64, 64, image::Rgb([128, 128, 128]));
        let mut data = Vec::new();
        img.write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
            .unwrap();
        let image = GeneratedImage {
            mime: "image/png".into(),
            data,
        };
        match accept_image(&image, 16) {
            Err(FrameErrorKind::InvalidImage(reason)) => assert!(reason.contains("Blank")),
            other => panic!("Expected blank rejection, got {:?}", other),
        }
    }

    #[test]
    fn metadata_reads_tiers() {
        let a = derive_metadata(&scene(), FrameVariant::A);
        assert_eq!(a.composition, "Wide establishing shot");
        assert_eq!(a.palette, vec!["golden", "red", "teal", "grey"]);
        assert_eq!(a.lighting, "warm golden light through mist");
        assert_eq!(a.camera, "Anamorphic 2.39 look");

        let b = derive_metadata(&scene(), FrameVariant::B);
        assert!(b.composition.starts_with("Alternate angle"));
    }
}
