use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::{
    client::{truncate, GenerationParams, InlineImage, ModelError, Prompt},
    extract::{extract_json, ExtractError, RAW_PREVIEW_CHARS},
    invoker::FallbackInvoker,
};

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("response does not match the expected shape: {source}")]
    Schema {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

impl AiError {
    /// Truncated model output for diagnostics, when there is one.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Model(_) => None,
            Self::Extract(e) => Some(e.raw()),
            Self::Schema { raw, .. } => Some(raw),
        }
    }
}

/// A prompt that must come back as a JSON object of a known shape.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub instructions: String,
    /// Example of the expected object, shown to the model verbatim.
    pub schema: &'static str,
    pub image: Option<InlineImage>,
    pub params: GenerationParams,
}

impl StructuredRequest {
    pub fn new(instructions: impl Into<String>, schema: &'static str) -> Self {
        Self {
            instructions: instructions.into(),
            schema,
            image: None,
            params: GenerationParams::default(),
        }
    }

    pub fn image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    fn render(&self) -> String {
        format!(
            "{}\n\nReturn ONLY valid JSON (no markdown, no code blocks, no explanations) in exactly this shape:\n{}",
            self.instructions.trim_end(),
            self.schema
        )
    }
}

/// Run `req` through the fallback invoker and decode the reply into `T`.
pub async fn generate_structured<T: DeserializeOwned>(
    invoker: &FallbackInvoker,
    req: StructuredRequest,
) -> Result<T, AiError> {
    let prompt = match &req.image {
        Some(image) => Prompt::with_image(req.render(), image.clone()),
        None => Prompt::text(req.render()),
    };
    let generated = invoker.invoke(&prompt, &req.params).await?;
    debug!(model = %generated.model, "structured reply received");

    let value = extract_json(&generated.text).map_err(|e| {
        error!(error = %e, "failed to extract JSON from model reply");
        e
    })?;
    serde_json::from_value(value).map_err(|source| {
        error!(error = %source, "model reply has unexpected shape");
        AiError::Schema {
            source,
            raw: truncate(&generated.text, RAW_PREVIEW_CHARS),
        }
    })
}
