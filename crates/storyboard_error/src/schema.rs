//! Schema conformance errors for structured model output.

/// Model output did not conform to the schema of a generation phase.
///
/// Fatal for the story-world and script phases.
///
/// # Examples
///
/// ```
/// use storyboard_error::SchemaError;
///
/// let err = SchemaError::new("story-world", "attractors must contain 6 to 8 entries");
/// assert_eq!(err.phase, "story-world");
/// assert!(format!("{}", err).contains("attractors"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Schema Error in {} phase: {} at line {} in {}", phase, message, line, file)]
pub struct SchemaError {
    /// Phase whose output was rejected
    pub phase: &'static str,
    /// What was wrong with the output
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl SchemaError {
    /// Create a new SchemaError for a phase at the current location.
    #[track_caller]
    pub fn new(phase: &'static str, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            phase,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
