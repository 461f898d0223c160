//! Frame synthesis error types.

/// Frame synthesis failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FrameErrorKind {
    /// The provider answered but the bytes are not an acceptable image
    #[display("Invalid image: {}", _0)]
    InvalidImage(String),
    /// All attempts, including the simplified fallback, failed
    #[display("Frame generation failed after {} attempts and fallback: {}", attempts, last_error)]
    Exhausted {
        /// Number of regular attempts made
        attempts: u32,
        /// Message of the final failure
        last_error: String,
    },
}

/// Frame generation error for one variant of one scene.
///
/// The orchestrator substitutes an error sentinel image when this occurs.
///
/// # Examples
///
/// ```
/// use storyboard_error::{FrameError, FrameErrorKind};
///
/// let err = FrameError::new(3, 'B', FrameErrorKind::InvalidImage("too small".into()));
/// assert!(format!("{}", err).contains("3B"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Frame Error for frame {}{}: {} at line {} in {}", scene_id, variant, kind, line, file)]
pub struct FrameError {
    /// Scene the frame belongs to
    pub scene_id: u32,
    /// Variant letter ('A' or 'B')
    pub variant: char,
    /// The specific failure
    pub kind: FrameErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl FrameError {
    /// Create a new FrameError with automatic location tracking.
    #[track_caller]
    pub fn new(scene_id: u32, variant: char, kind: FrameErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            scene_id,
            variant,
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
