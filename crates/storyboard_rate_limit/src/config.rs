//! Layered TOML configuration for the storyboard pipeline.
//!
//! Sources, later ones overriding earlier ones:
//! - Bundled defaults (include_str! from storyboard.toml)
//! - User config in the home directory (~/.config/storyboard/storyboard.toml)
//! - User config in the current directory (./storyboard.toml)
//! - An explicit file passed to [`StoryboardConfig::load_with`]

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use storyboard_error::{ConfigError, StoryboardError, StoryboardResult};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../storyboard.toml");

/// Gemini endpoint, models and request limits.
///
/// ```toml
/// [gemini]
/// text_model = "gemini-2.5-flash"
/// rpm = 10
/// max_concurrent = 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Model used for structured output and vision analysis
    pub text_model: String,
    /// Model used for frame synthesis
    pub image_model: String,
    /// Requests per minute (0 disables the limit)
    pub rpm: u32,
    /// Maximum requests in flight
    pub max_concurrent: u32,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            rpm: 60,
            max_concurrent: 4,
        }
    }
}

/// Retry schedule shared by story-world and frame generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts before the fallback, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on every further retry
    pub base_delay_ms: u64,
    /// Upper bound for a single provider call
    pub call_timeout_secs: u64,
}

impl RetrySettings {
    /// Base delay as a duration.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Per-call timeout as a duration.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            call_timeout_secs: 120,
        }
    }
}

/// Frame acceptance and fallback prompt settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FrameSettings {
    /// Images must be strictly larger than this many bytes
    pub min_image_bytes: usize,
    /// Characters of the composite prompt kept in the fallback prompt
    pub fallback_prompt_chars: usize,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            min_image_bytes: 1024,
            fallback_prompt_chars: 500,
        }
    }
}

/// Per-phase cost table for the baseline time estimate, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EstimateSettings {
    /// Story-world synthesis
    pub story_world_secs: u64,
    /// Script generation, per scene
    pub script_secs_per_scene: u64,
    /// One frame
    pub frame_secs: u64,
}

impl EstimateSettings {
    /// Baseline seconds for a run producing `scenes` scenes and `frames` frames.
    pub fn baseline_secs(&self, scenes: usize, frames: usize) -> u64 {
        self.story_world_secs
            + self.script_secs_per_scene * scenes as u64
            + self.frame_secs * frames as u64
    }
}

impl Default for EstimateSettings {
    fn default() -> Self {
        Self {
            story_world_secs: 15,
            script_secs_per_scene: 20,
            frame_secs: 30,
        }
    }
}

/// Top-level storyboard configuration.
///
/// Passed explicitly to the provider and the orchestrator at construction.
///
/// # Example
///
/// ```no_run
/// use storyboard_rate_limit::StoryboardConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryboardConfig::load()?;
/// println!("Image model: {}", config.gemini.image_model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoryboardConfig {
    /// Provider settings
    pub gemini: GeminiSettings,
    /// Retry schedule
    pub retry: RetrySettings,
    /// Frame acceptance
    pub frames: FrameSettings,
    /// Progress estimates
    pub estimates: EstimateSettings,
}

impl StoryboardConfig {
    /// Load configuration from a single file, without the bundled defaults.
    ///
    /// Missing sections and keys fall back to their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> StoryboardResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed.
    pub fn load() -> StoryboardResult<Self> {
        Self::load_with(None)
    }

    /// Like [`StoryboardConfig::load`], with an optional explicit file on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing or any source cannot be parsed.
    #[instrument]
    pub fn load_with(explicit: Option<&Path>) -> StoryboardResult<Self> {
        debug!("Loading configuration with precedence: explicit > current dir > home dir > bundled");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyboard/storyboard.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyboard").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_defaults_match_built_in_defaults() {
        let bundled: StoryboardConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(bundled, StoryboardConfig::default());
    }

    #[test]
    fn baseline_uses_cost_table() {
        let estimates = EstimateSettings::default();
        // 15 + 20 * 2 + 30 * 4
        assert_eq!(estimates.baseline_secs(2, 4), 175);
    }
}
