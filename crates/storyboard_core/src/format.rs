//! Output format parameters: aspect ratio and frame count.

use serde::{Deserialize, Serialize};

/// Aspect ratio of generated frames.
///
/// # Examples
///
/// ```
/// use storyboard_core::AspectRatio;
/// use std::str::FromStr;
///
/// let ratio = AspectRatio::from_str("9:16").unwrap();
/// assert_eq!(ratio, AspectRatio::Portrait);
/// assert_eq!(ratio.to_string(), "9:16");
/// assert!(AspectRatio::from_str("4:3").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum AspectRatio {
    /// 16:9 widescreen
    #[default]
    #[serde(rename = "16:9")]
    #[strum(serialize = "16:9")]
    Landscape,
    /// 9:16 vertical
    #[serde(rename = "9:16")]
    #[strum(serialize = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Framing guidance for prompts.
    pub fn orientation(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "horizontal widescreen",
            AspectRatio::Portrait => "vertical portrait",
        }
    }
}

/// Number of frames requested for a storyboard: 2, 4, 6 or 8.
///
/// Every scene yields two frames, so the scene count is half the frame count.
///
/// # Examples
///
/// ```
/// use storyboard_core::FrameCount;
///
/// let frames = FrameCount::try_from(6).unwrap();
/// assert_eq!(frames.scene_count(), 3);
/// assert!(FrameCount::try_from(5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "u32", into = "u32")]
pub struct FrameCount(u32);

impl FrameCount {
    /// Supported frame counts.
    pub const ALLOWED: [u32; 4] = [2, 4, 6, 8];

    /// Total frames.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Scenes needed to produce this many frames.
    pub fn scene_count(&self) -> usize {
        (self.0 / 2) as usize
    }
}

impl Default for FrameCount {
    fn default() -> Self {
        Self(4)
    }
}

impl TryFrom<u32> for FrameCount {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "frame count must be one of {:?}, got {}",
                Self::ALLOWED,
                value
            ))
        }
    }
}

impl From<FrameCount> for u32 {
    fn from(count: FrameCount) -> Self {
        count.0
    }
}
