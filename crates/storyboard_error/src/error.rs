//! Top-level error wrapper types.

use crate::{
    ConfigError, FrameError, GeminiError, GeminiErrorKind, HttpError, JsonError, PipelineError,
    PipelineErrorKind, RetryableError, SchemaError,
};

/// Every failure the storyboard crates can report.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: StoryboardError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryboardErrorKind {
    /// Missing credential or invalid configuration
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP transport error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Gemini provider error
    #[from(GeminiError)]
    Gemini(GeminiError),
    /// Model output did not match the phase schema
    #[from(SchemaError)]
    Schema(SchemaError),
    /// Frame synthesis failed after retries and fallback
    #[from(FrameError)]
    Frame(FrameError),
    /// Run-level condition (cancellation, timeouts, invalid request)
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// How a failure should be remedied, for user-facing reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ErrorCategory {
    /// Fix a credential or configuration value
    #[display("missing configuration")]
    MissingConfiguration,
    /// Transient or provider-side failure; retrying may help
    #[display("generation failed")]
    GenerationFailed,
    /// The model produced output the pipeline cannot use; worth reporting
    #[display("malformed model output")]
    MalformedOutput,
    /// The caller stopped the run
    #[display("cancelled")]
    Cancelled,
}

/// Storyboard error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardError, StoryboardResult, ConfigError};
///
/// fn might_fail() -> StoryboardResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyboard Error: {}", _0)]
pub struct StoryboardError(Box<StoryboardErrorKind>);

impl StoryboardError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryboardErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryboardErrorKind {
        &self.0
    }

    /// Classify the error by the remediation it needs.
    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            StoryboardErrorKind::Config(_) => ErrorCategory::MissingConfiguration,
            StoryboardErrorKind::Gemini(e) if e.kind == GeminiErrorKind::MissingApiKey => {
                ErrorCategory::MissingConfiguration
            }
            StoryboardErrorKind::Gemini(GeminiError {
                kind: GeminiErrorKind::HttpError { status_code: 401 | 403, .. },
                ..
            }) => ErrorCategory::MissingConfiguration,
            StoryboardErrorKind::Schema(_) | StoryboardErrorKind::Json(_) => {
                ErrorCategory::MalformedOutput
            }
            StoryboardErrorKind::Pipeline(e) => match e.kind {
                PipelineErrorKind::Cancelled => ErrorCategory::Cancelled,
                PipelineErrorKind::EmptyStory
                | PipelineErrorKind::TooManySecondaryReferences { .. }
                | PipelineErrorKind::EmptyStoryboard => ErrorCategory::MissingConfiguration,
                PipelineErrorKind::Timeout(_) => ErrorCategory::GenerationFailed,
            },
            StoryboardErrorKind::Http(_)
            | StoryboardErrorKind::Gemini(_)
            | StoryboardErrorKind::Frame(_) => ErrorCategory::GenerationFailed,
        }
    }

    /// A single message suitable for end users, naming the remediation.
    pub fn user_message(&self) -> String {
        let hint = match self.category() {
            ErrorCategory::MissingConfiguration => {
                "Check your API key and generation settings, then try again."
            }
            ErrorCategory::GenerationFailed => {
                "The generation service failed. Retrying usually resolves this."
            }
            ErrorCategory::MalformedOutput => {
                "The model returned output that could not be understood. Please report this."
            }
            ErrorCategory::Cancelled => "The generation was cancelled.",
        };
        format!("{} ({}): {}", hint, self.category(), self.kind())
    }
}

impl RetryableError for StoryboardError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            StoryboardErrorKind::Gemini(e) => e.is_retryable(),
            StoryboardErrorKind::Http(_) => true,
            StoryboardErrorKind::Frame(_) => true,
            StoryboardErrorKind::Pipeline(e) => matches!(e.kind, PipelineErrorKind::Timeout(_)),
            StoryboardErrorKind::Config(_)
            | StoryboardErrorKind::Json(_)
            | StoryboardErrorKind::Schema(_) => false,
        }
    }
}

// Generic From implementation for any type that converts to StoryboardErrorKind
impl<T> From<T> for StoryboardError
where
    T: Into<StoryboardErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for storyboard operations.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardResult, HttpError};
///
/// fn fetch_data() -> StoryboardResult<String> {
///     Err(HttpError::new("404 Not Found"))?
/// }
/// ```
pub type StoryboardResult<T> = std::result::Result<T, StoryboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_distinguish_remediation() {
        let config: StoryboardError = ConfigError::new("no key").into();
        assert_eq!(config.category(), ErrorCategory::MissingConfiguration);

        let missing_key: StoryboardError = GeminiError::new(GeminiErrorKind::MissingApiKey).into();
        assert_eq!(missing_key.category(), ErrorCategory::MissingConfiguration);

        let schema: StoryboardError = SchemaError::new("script", "not an array").into();
        assert_eq!(schema.category(), ErrorCategory::MalformedOutput);

        let overloaded: StoryboardError = GeminiError::new(GeminiErrorKind::HttpError {
            status_code: 503,
            message: "overloaded".into(),
        })
        .into();
        assert_eq!(overloaded.category(), ErrorCategory::GenerationFailed);

        let cancelled: StoryboardError = PipelineError::new(PipelineErrorKind::Cancelled).into();
        assert_eq!(cancelled.category(), ErrorCategory::Cancelled);
    }

    #[test]
    fn user_message_names_category() {
        let err: StoryboardError = SchemaError::new("story-world", "missing premise").into();
        let message = err.user_message();
        assert!(message.contains("malformed model output"));
        assert!(message.contains("missing premise"));
    }

    #[test]
    fn schema_and_config_errors_are_permanent() {
        let schema: StoryboardError = SchemaError::new("script", "bad").into();
        assert!(!schema.is_retryable());
        let config: StoryboardError = ConfigError::new("bad").into();
        assert!(!config.is_retryable());
        let timeout: StoryboardError = PipelineError::new(PipelineErrorKind::Timeout(120)).into();
        assert!(timeout.is_retryable());
    }
}
