use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body that may be left out entirely.
///
/// An empty body yields `T::default()`. A body that is present but does not
/// decode is a 400, never silently replaced by the defaults.
pub struct JsonOrDefault<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonOrDefault<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        serde_json::from_slice(&body)
            .map(Self)
            .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{self, StatusCode},
        response::IntoResponse,
    };
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Opts {
        #[serde(default)]
        days: Option<u32>,
    }

    async fn extract(body: &'static str) -> Result<Opts, AppError> {
        let req = http::Request::post("/").body(Body::from(body)).unwrap();
        JsonOrDefault::<Opts>::from_request(req, &()).await.map(|JsonOrDefault(o)| o)
    }

    #[tokio::test]
    async fn empty_body_gives_defaults() {
        assert_eq!(extract("").await.unwrap(), Opts::default());
        assert_eq!(extract(" \n").await.unwrap(), Opts::default());
    }

    #[tokio::test]
    async fn present_body_is_decoded() {
        assert_eq!(extract(r#"{"days":3}"#).await.unwrap().days, Some(3));
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let err = extract(r#"{"days":"three"}"#).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
