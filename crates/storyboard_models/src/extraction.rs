//! Recovering JSON from loosely formatted model text.
//!
//! Structured-output mode usually returns bare JSON, but models still wrap
//! answers in markdown fences or surround them with prose now and then.

use storyboard_error::{JsonError, StoryboardResult};

/// Parse model text as JSON, extracting it from fences or prose if needed.
///
/// # Errors
///
/// Returns a [`JsonError`] if no parseable JSON is found.
///
/// # Examples
///
/// ```
/// use storyboard_models::parse_json_response;
///
/// let value = parse_json_response("Sure!\n```json\n{\"premise\": \"A fox\"}\n```").unwrap();
/// assert_eq!(value["premise"], "A fox");
/// ```
pub fn parse_json_response(text: &str) -> StoryboardResult<serde_json::Value> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Ok(value);
    }

    let candidate = extract_json(text).ok_or_else(|| {
        JsonError::new(format!(
            "No JSON found in model response (length: {})",
            text.len()
        ))
    })?;

    serde_json::from_str(&candidate).map_err(|e| {
        tracing::warn!(error = %e, length = candidate.len(), "Extracted text is not valid JSON");
        JsonError::new(format!("Failed to parse model response as JSON: {}", e)).into()
    })
}

/// Extract the first JSON document from a response.
///
/// Tries a fenced code block first, then whichever balanced object or array
/// starts earliest.
///
/// # Examples
///
/// ```
/// use storyboard_models::extract_json;
///
/// let text = "Here are the scenes: [{\"id\": 1}] Enjoy!";
/// assert_eq!(extract_json(text).as_deref(), Some("[{\"id\": 1}]"));
/// ```
pub fn extract_json(text: &str) -> Option<String> {
    if let Some(fenced) = fenced_block(text) {
        return Some(fenced);
    }

    let mut openers: Vec<(usize, char, char)> = [('{', '}'), ('[', ']')]
        .into_iter()
        .filter_map(|(open, close)| text.find(open).map(|pos| (pos, open, close)))
        .collect();
    openers.sort_by_key(|(pos, _, _)| *pos);

    openers
        .into_iter()
        .find_map(|(start, open, close)| balanced(&text[start..], open, close))
}

/// Contents of the first ``` fence, skipping a language tag.
fn fenced_block(text: &str) -> Option<String> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let body_start = rest.find('\n').map(|n| n + 1).unwrap_or(0);
    let body = &rest[body_start..];
    let body = match body.find("```") {
        Some(end) => &body[..end],
        // Truncated response
        None => body,
    };
    let body = body.trim();
    (!body.is_empty()).then(|| body.to_string())
}

/// Prefix of `text` (which starts with `open`) up to the matching `close`.
fn balanced(text: &str, open: char, close: char) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(text[..i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}
