//! Run-level pipeline error types.

/// Specific error conditions for a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Story text is empty or whitespace
    #[display("Story text cannot be empty")]
    EmptyStory,
    /// More secondary character references than supported
    #[display("At most {} secondary character references are supported, got {}", max, got)]
    TooManySecondaryReferences {
        /// Supported maximum
        max: usize,
        /// Number supplied
        got: usize,
    },
    /// Continuation requested on a storyboard without scenes
    #[display("Cannot continue a storyboard that has no scenes")]
    EmptyStoryboard,
    /// Run was cancelled by the caller
    #[display("Generation cancelled")]
    Cancelled,
    /// A provider call exceeded its timeout
    #[display("Provider call timed out after {} seconds", _0)]
    Timeout(u64),
}

/// Error type for generation runs.
///
/// # Examples
///
/// ```
/// use storyboard_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::EmptyStory);
/// assert!(format!("{}", err).contains("empty"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
