use crate::{ClassifierLoader, ProviderError, ZeroShotClassifier, ZeroShotResponse};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct HuggingFaceConfig {
    pub base_url: String,
    pub model: String,
    pub api_token: Option<String>,
}

/// Zero-shot classification over the Hugging Face inference API.
#[derive(Clone)]
pub struct HuggingFaceProvider {
    client: Client,
    cfg: Arc<HuggingFaceConfig>,
}

impl HuggingFaceProvider {
    pub fn new(cfg: HuggingFaceConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.model
        )
    }
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
    options: RequestOptions,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
    multi_label: bool,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct ZeroShotApiItem {
    labels: Vec<String>,
    scores: Vec<f64>,
}

// The API answers with a bare object for a single input, some deployments wrap it in a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotApiResponse {
    Single(ZeroShotApiItem),
    Batch(Vec<ZeroShotApiItem>),
}

#[async_trait::async_trait]
impl ZeroShotClassifier for HuggingFaceProvider {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<ZeroShotResponse, ProviderError> {
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
                multi_label: false,
            },
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(token) = &self.cfg.api_token {
            builder = builder.bearer_auth(token);
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {} body {:?}",
                status, body
            )));
        }

        let parsed: ZeroShotApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let item = match parsed {
            ZeroShotApiResponse::Single(item) => item,
            ZeroShotApiResponse::Batch(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::InvalidResponse("empty batch".into()))?,
        };
        debug!(top = ?item.labels.first(), "zero-shot response");
        Ok(ZeroShotResponse {
            labels: item.labels,
            scores: item.scores,
        })
    }
}

/// Loader that warms the remote model with a throwaway request so the first
/// real row does not pay the cold-start cost.
#[derive(Clone)]
pub struct HuggingFaceLoader {
    cfg: HuggingFaceConfig,
}

impl HuggingFaceLoader {
    pub fn new(cfg: HuggingFaceConfig) -> Self {
        Self { cfg }
    }
}

#[async_trait::async_trait]
impl ClassifierLoader for HuggingFaceLoader {
    async fn load(&self) -> Result<Arc<dyn ZeroShotClassifier>, ProviderError> {
        info!(model = %self.cfg.model, "loading classification model");
        let provider = HuggingFaceProvider::new(self.cfg.clone());
        provider
            .classify("warmup", &["warmup".to_string()])
            .await?;
        Ok(Arc::new(provider))
    }
}
