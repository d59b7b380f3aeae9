use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use super::client::{GenerationParams, GenerativeModel, ModelError, ModelInfo, Prompt};

/// Text produced by the first model that answered.
#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    pub model: String,
}

/// Walks an ordered list of model identifiers until one answers.
///
/// Rate-limited or unavailable models are skipped at once. Any other failure
/// is retried on the same model `params.retries` times with a linearly
/// growing pause before moving on. Each call is independent.
#[derive(Clone)]
pub struct FallbackInvoker {
    backend: Arc<dyn GenerativeModel>,
    models: Vec<String>,
    retry_delay: Duration,
}

impl FallbackInvoker {
    pub fn new(backend: Arc<dyn GenerativeModel>, models: Vec<String>, retry_delay: Duration) -> Self {
        Self {
            backend,
            models,
            retry_delay,
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// The provider's catalogue, independent of the configured order.
    pub async fn catalogue(&self) -> Result<Vec<ModelInfo>, ModelError> {
        self.backend.list_models().await
    }

    pub async fn invoke(
        &self,
        prompt: &Prompt,
        params: &GenerationParams,
    ) -> Result<Generated, ModelError> {
        let mut last_error = None;

        for model in &self.models {
            let mut attempt: u32 = 0;
            loop {
                info!(%model, attempt, "trying model");
                match self.backend.generate(model, prompt, params).await {
                    Ok(text) => {
                        info!(%model, "model succeeded");
                        return Ok(Generated {
                            text,
                            model: model.clone(),
                        });
                    }
                    Err(e) if e.skips_model() => {
                        warn!(%model, error = %e, "skipping model");
                        last_error = Some(e);
                        break;
                    }
                    Err(e) => {
                        warn!(%model, attempt, error = %e, "model attempt failed");
                        last_error = Some(e);
                        if attempt >= params.retries {
                            break;
                        }
                        attempt += 1;
                        sleep(self.retry_delay * attempt).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(ModelError::NoModels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Script, ScriptedModel};

    fn invoker(model: Arc<ScriptedModel>, names: &[&str]) -> FallbackInvoker {
        FallbackInvoker::new(
            model,
            names.iter().map(|s| s.to_string()).collect(),
            Duration::from_millis(1),
        )
    }

    #[tokio::test]
    async fn skips_rate_limited_models_without_retry() {
        let model = Arc::new(
            ScriptedModel::new()
                .script("a", Script::RateLimited)
                .script("b", Script::RateLimited)
                .script("c", Script::Unavailable)
                .script("d", Script::Reply("hello".into())),
        );
        let inv = invoker(model.clone(), &["a", "b", "c", "d"]);
        let params = GenerationParams {
            retries: 3,
            ..Default::default()
        };

        let out = inv.invoke(&Prompt::text("hi"), &params).await.unwrap();
        assert_eq!(out.text, "hello");
        assert_eq!(out.model, "d");
        assert_eq!(model.calls(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn retries_other_failures_on_same_model() {
        let model = Arc::new(
            ScriptedModel::new()
                .script("a", Script::Fail)
                .script("a", Script::Fail)
                .script("a", Script::Reply("third time".into())),
        );
        let inv = invoker(model.clone(), &["a", "b"]);
        let params = GenerationParams {
            retries: 2,
            ..Default::default()
        };

        let out = inv.invoke(&Prompt::text("hi"), &params).await.unwrap();
        assert_eq!(out.text, "third time");
        assert_eq!(model.calls(), vec!["a", "a", "a"]);
    }

    #[tokio::test]
    async fn moves_on_after_retries_are_spent() {
        let model = Arc::new(
            ScriptedModel::new()
                .script("a", Script::Fail)
                .script("a", Script::Fail)
                .script("b", Script::Reply("ok".into())),
        );
        let inv = invoker(model.clone(), &["a", "b"]);
        let params = GenerationParams {
            retries: 1,
            ..Default::default()
        };

        let out = inv.invoke(&Prompt::text("hi"), &params).await.unwrap();
        assert_eq!(out.model, "b");
        assert_eq!(model.calls(), vec!["a", "a", "b"]);
    }

    #[tokio::test]
    async fn surfaces_last_error_when_exhausted() {
        let model = Arc::new(
            ScriptedModel::new()
                .script("a", Script::Fail)
                .script("b", Script::RateLimited),
        );
        let inv = invoker(model, &["a", "b"]);
        let params = GenerationParams {
            retries: 0,
            ..Default::default()
        };

        let err = inv.invoke(&Prompt::text("hi"), &params).await.unwrap_err();
        assert!(matches!(err, ModelError::RateLimited { ref model } if model == "b"));
    }

    #[tokio::test]
    async fn empty_model_list_is_an_error() {
        let inv = invoker(Arc::new(ScriptedModel::new()), &[]);
        let err = inv
            .invoke(&Prompt::text("hi"), &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::NoModels));
    }
}
