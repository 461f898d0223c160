//! Reference image loading.

use super::commands::ReferenceArgs;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use storyboard::{ConfigError, ReferenceAsset, ReferenceAssets, StoryboardResult};
use tracing::debug;

/// MIME type for an image path, from its extension.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Reads one image file as a base64 reference asset.
pub fn load_asset(path: &Path) -> StoryboardResult<ReferenceAsset> {
    let mime = mime_for(path).ok_or_else(|| {
        ConfigError::new(format!(
            "Unsupported image type for {}: use png, jpeg, webp, gif or heic",
            path.display()
        ))
    })?;
    let bytes = std::fs::read(path)
        .map_err(|e| ConfigError::new(format!("Failed to read {}: {}", path.display(), e)))?;
    debug!(path = %path.display(), mime, bytes = bytes.len(), "Loaded reference image");
    Ok(ReferenceAsset::new(mime, STANDARD.encode(bytes)))
}

fn load_optional(path: Option<&Path>) -> StoryboardResult<Option<ReferenceAsset>> {
    path.map(load_asset).transpose()
}

/// Loads every reference image named on the command line.
pub fn load_references(args: &ReferenceArgs) -> StoryboardResult<ReferenceAssets> {
    Ok(ReferenceAssets {
        logo: load_optional(args.logo.as_deref())?,
        main_character: load_optional(args.main_character.as_deref())?,
        secondary_characters: args
            .secondary
            .iter()
            .map(|p| load_asset(p))
            .collect::<StoryboardResult<Vec<_>>>()?,
        background: load_optional(args.background.as_deref())?,
        art_style: load_optional(args.art_style.as_deref())?,
    })
}
