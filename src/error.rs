use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::llm::{AiError, ModelError};

/// Error returned by every handler.
///
/// Upstream, parsing and storage failures all surface as 500; only request
/// validation and unknown favorites get their own status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
    #[serde(rename = "rawResponse", skip_serializing_if = "Option::is_none")]
    raw_response: Option<String>,
}

impl From<ModelError> for AppError {
    fn from(e: ModelError) -> Self {
        Self::Ai(AiError::Model(e))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Store(e.into())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Ai(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) => ErrorBody {
                error: msg.clone(),
                details: msg.clone(),
                hint: None,
                raw_response: None,
            },
            Self::Ai(AiError::Model(e)) => ErrorBody {
                error: "AI service request failed".into(),
                details: e.to_string(),
                hint: Some("The AI service is busy or unavailable, please try again later"),
                raw_response: None,
            },
            Self::Ai(e) => ErrorBody {
                error: "Failed to parse AI response".into(),
                details: e.to_string(),
                hint: None,
                raw_response: e.raw().map(str::to_string),
            },
            Self::Store(e) => ErrorBody {
                error: "Storage operation failed".into(),
                details: format!("{e:#}"),
                hint: None,
                raw_response: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::extract::ExtractError;

    #[test]
    fn model_failures_are_500_with_hint() {
        let err: AppError = ModelError::RateLimited { model: "m".into() }.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_value(err.body()).unwrap();
        assert!(body["hint"].as_str().unwrap().contains("try again later"));
        assert!(body.get("rawResponse").is_none());
    }

    #[test]
    fn parse_failures_carry_raw_text() {
        let err = AppError::Ai(AiError::Extract(ExtractError::NoJson { raw: "nope".into() }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(body["error"], "Failed to parse AI response");
        assert_eq!(body["rawResponse"], "nope");
    }

    #[test]
    fn validation_is_400() {
        let err = AppError::BadRequest("No image file provided".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(serde_json::to_value(err.body()).unwrap()["error"], "No image file provided");
    }
}
