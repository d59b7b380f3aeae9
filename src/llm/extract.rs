use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::client::truncate;

/// Raw text kept on extraction errors, in characters.
pub const RAW_PREVIEW_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no JSON found in response")]
    NoJson { raw: String },
    #[error("malformed JSON in response: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

impl ExtractError {
    pub fn raw(&self) -> &str {
        match self {
            Self::NoJson { raw } | Self::Malformed { raw, .. } => raw,
        }
    }
}

/// Remove markdown code fences the model tends to wrap JSON in.
pub fn strip_fences(text: &str) -> String {
    lazy_static! {
        static ref FENCE_RE: Regex = Regex::new(r"```(?:json|JSON)?\n?").unwrap();
    }
    FENCE_RE.replace_all(text.trim(), "").trim().to_string()
}

/// Pull the first `{ ... }` span out of model output and parse it.
///
/// The span runs from the first `{` to the last `}`, so two separate objects
/// in one reply fail to parse rather than yielding the first.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    lazy_static! {
        static ref OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    }
    let clean = strip_fences(text);
    let span = OBJECT_RE.find(&clean).ok_or_else(|| ExtractError::NoJson {
        raw: truncate(text, RAW_PREVIEW_CHARS),
    })?;
    serde_json::from_str(span.as_str()).map_err(|source| ExtractError::Malformed {
        source,
        raw: truncate(text, RAW_PREVIEW_CHARS),
    })
}
