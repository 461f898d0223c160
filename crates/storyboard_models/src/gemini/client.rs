//! Gemini REST client implementing the storyboard capability traits.

use crate::gemini::dto::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, Part,
};
use crate::parse_json_response;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use storyboard_core::{GeneratedImage, ImageRequest, Input, MediaSource, StructuredRequest};
use storyboard_error::{GeminiError, GeminiErrorKind, StoryboardResult};
use storyboard_interface::{ImageGeneration, JsonMode, StoryboardDriver};
use storyboard_rate_limit::{GeminiSettings, RateLimiter};
use tracing::{debug, instrument, warn};

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Client for the Gemini `generateContent` endpoint.
///
/// Every request waits on a shared [`RateLimiter`] built from the settings.
///
/// # Example
///
/// ```no_run
/// use storyboard_models::GeminiClient;
/// use storyboard_rate_limit::GeminiSettings;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClient::new("my-api-key", GeminiSettings::default())?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    settings: GeminiSettings,
    limiter: RateLimiter,
}

impl GeminiClient {
    /// Creates a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiErrorKind::MissingApiKey`] if the key is blank.
    pub fn new(api_key: impl Into<String>, settings: GeminiSettings) -> StoryboardResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GeminiError::new(GeminiErrorKind::MissingApiKey).into());
        }

        let limiter = RateLimiter::from_settings(&settings);
        Ok(Self {
            client: Client::new(),
            api_key,
            settings,
            limiter,
        })
    }

    /// Creates a client with the key from `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiErrorKind::MissingApiKey`] if the variable is unset or blank.
    #[instrument(skip_all)]
    pub fn from_env(settings: GeminiSettings) -> StoryboardResult<Self> {
        let api_key = std::env::var(GEMINI_API_KEY_VAR)
            .map_err(|_| GeminiError::new(GeminiErrorKind::MissingApiKey))?;
        Self::new(api_key, settings)
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Sends one `generateContent` request and decodes the response body.
    async fn send(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> StoryboardResult<GenerateContentResponse> {
        let url = self.endpoint(model);
        let _guard = self.limiter.acquire().await;
        debug!(url = %url, parts = body.contents.iter().map(|c| c.parts().len()).sum::<usize>(), "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                GeminiError::new(GeminiErrorKind::ApiRequest(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini request rejected");
            return Err(GeminiError::new(GeminiErrorKind::HttpError {
                status_code: status.as_u16(),
                message,
            })
            .into());
        }

        response.json().await.map_err(|e| {
            GeminiError::new(GeminiErrorKind::ApiRequest(format!(
                "Failed to read response body: {}",
                e
            )))
            .into()
        })
    }
}

/// Converts prompt parts, preserving order.
fn to_parts(inputs: &[Input]) -> StoryboardResult<Vec<Part>> {
    inputs
        .iter()
        .map(|input| match input {
            Input::Text(text) => Ok(Part::from_text(text.clone())),
            Input::Image { mime, source } => {
                let mime = mime.clone().unwrap_or_else(|| "image/png".to_string());
                match source {
                    MediaSource::Base64(data) => Ok(Part::from_inline(mime, data.clone())),
                    MediaSource::Binary(bytes) => Ok(Part::from_inline(mime, STANDARD.encode(bytes))),
                    MediaSource::Url(_) => {
                        Err(GeminiError::new(GeminiErrorKind::UrlMediaNotSupported).into())
                    }
                }
            }
        })
        .collect()
}

impl StoryboardDriver for GeminiClient {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.settings.text_model
    }
}

#[async_trait]
impl JsonMode for GeminiClient {
    #[instrument(skip(self, req), fields(parts = req.parts.len()))]
    async fn generate_json(&self, req: &StructuredRequest) -> StoryboardResult<serde_json::Value> {
        let model = req.model.as_deref().unwrap_or(&self.settings.text_model);
        let body = GenerateContentRequest {
            contents: vec![Content::user(to_parts(&req.parts)?)],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(req.schema.clone()),
                temperature: req.temperature,
                ..Default::default()
            }),
        };

        let response = self.send(model, &body).await?;
        let text = response.text().ok_or_else(|| {
            GeminiError::new(GeminiErrorKind::EmptyResponse {
                finish_reason: response.finish_reason(),
            })
        })?;
        debug!(length = text.len(), "Received structured response");

        parse_json_response(&text)
    }
}

#[async_trait]
impl ImageGeneration for GeminiClient {
    #[instrument(skip(self, req), fields(parts = req.parts.len(), aspect_ratio = %req.aspect_ratio))]
    async fn generate_image(&self, req: &ImageRequest) -> StoryboardResult<GeneratedImage> {
        let model = req.model.as_deref().unwrap_or(&self.settings.image_model);
        let body = GenerateContentRequest {
            contents: vec![Content::user(to_parts(&req.parts)?)],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: req.aspect_ratio.to_string(),
                }),
                ..Default::default()
            }),
        };

        let response = self.send(model, &body).await?;
        let inline = response.inline_data().ok_or_else(|| {
            let finish_reason = response.finish_reason();
            if finish_reason == "STOP" || finish_reason == "UNKNOWN" {
                GeminiError::new(GeminiErrorKind::NoImageInResponse)
            } else {
                GeminiError::new(GeminiErrorKind::EmptyResponse { finish_reason })
            }
        })?;

        let data = STANDARD
            .decode(inline.data())
            .map_err(|e| GeminiError::new(GeminiErrorKind::Base64Decode(e.to_string())))?;
        debug!(bytes = data.len(), mime = %inline.mime_type(), "Received image");

        Ok(GeneratedImage {
            mime: inline.mime_type().clone(),
            data,
        })
    }

    fn image_model_name(&self) -> &str {
        &self.settings.image_model
    }
}
