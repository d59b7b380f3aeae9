use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Failure of a single generation attempt against one model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model {model} is rate limited")]
    RateLimited { model: String },
    #[error("model {model} is unavailable")]
    Unavailable { model: String },
    #[error("model {model} returned {status}: {body}")]
    Api {
        model: String,
        status: u16,
        body: String,
    },
    #[error("request to model {model} failed: {message}")]
    Transport { model: String, message: String },
    #[error("model {model} returned no text")]
    Empty { model: String },
    #[error("no models configured")]
    NoModels,
}

impl ModelError {
    /// Rate-limit and unavailability signals move on to the next model
    /// without retrying this one.
    pub fn skips_model(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Unavailable { .. })
    }

    fn from_status(model: &str, status: StatusCode, body: String) -> Self {
        let model = model.to_string();
        match status {
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { model },
            StatusCode::SERVICE_UNAVAILABLE => Self::Unavailable { model },
            _ => Self::Api {
                model,
                status: status.as_u16(),
                body: truncate(&body, 300),
            },
        }
    }
}

/// Inline image sent alongside the prompt.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub data: Bytes,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    /// Extra attempts on the same model for non rate-limit failures.
    pub retries: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: None,
            top_p: None,
            top_k: None,
            retries: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub image: Option<InlineImage>,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(text: impl Into<String>, image: InlineImage) -> Self {
        Self {
            text: text.into(),
            image: Some(image),
        }
    }
}

/// Entry of the provider's model catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(
        default,
        rename(serialize = "supportedMethods", deserialize = "supportedGenerationMethods")
    )]
    pub supported_methods: Vec<String>,
}

impl ModelInfo {
    /// Whether this model can take a photo through `generateContent`.
    pub fn accepts_images(&self) -> bool {
        self.supported_methods.iter().any(|m| m == "generateContent")
            && ["vision", "flash", "pro"].iter().any(|k| self.name.contains(k))
    }
}

/// One hosted model endpoint, addressed by identifier.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        prompt: &Prompt,
        params: &GenerationParams,
    ) -> Result<String, ModelError>;

    /// Models the API key can see.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ModelError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// Google Generative Language API (`generateContent`).
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn build_request(prompt: &Prompt, params: &GenerationParams) -> GeminiRequest {
        let mut parts = vec![Part::Text {
            text: prompt.text.clone(),
        }];
        if let Some(img) = &prompt.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: img.mime_type.clone(),
                    data: general_purpose::STANDARD.encode(&img.data),
                },
            });
        }
        GeminiRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
                top_p: params.top_p,
                top_k: params.top_k,
            },
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &Prompt,
        params: &GenerationParams,
    ) -> Result<String, ModelError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = Self::build_request(prompt, params);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Transport {
                model: model.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%model, %status, "gemini api error");
            return Err(ModelError::from_status(model, status, body));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| ModelError::Transport {
            model: model.to_string(),
            message: format!("decode response: {e}"),
        })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ModelError::Empty {
                model: model.to_string(),
            });
        }
        debug!(%model, len = text.len(), "gemini response received");
        Ok(text)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ModelError> {
        const CATALOGUE: &str = "models";
        let transport = |e: reqwest::Error| ModelError::Transport {
            model: CATALOGUE.into(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .query(&[("key", self.api_key.as_str()), ("pageSize", "1000")])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "gemini model listing failed");
            return Err(ModelError::from_status(CATALOGUE, status, body));
        }
        let list: ModelList = response.json().await.map_err(transport)?;
        debug!(count = list.models.len(), "gemini models listed");
        Ok(list.models)
    }
}

/// Cut `s` to at most `max` characters.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
