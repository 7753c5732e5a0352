//! Provider abstractions for zero-shot text classifiers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod huggingface;
pub mod noop;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not implemented")]
    NotImplemented,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// Ranked output of a zero-shot call. `labels` and `scores` are parallel,
/// best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZeroShotResponse {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ZeroShotResponse {
    /// Highest scoring (label, score) pair.
    pub fn top(&self) -> Result<(&str, f64), ProviderError> {
        if self.labels.len() != self.scores.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "{} labels but {} scores",
                self.labels.len(),
                self.scores.len()
            )));
        }
        self.labels
            .iter()
            .zip(self.scores.iter().copied())
            .fold(None::<(&str, f64)>, |best, (label, score)| match best {
                Some((_, s)) if s >= score => best,
                _ => Some((label.as_str(), score)),
            })
            .ok_or_else(|| ProviderError::InvalidResponse("empty label list".into()))
    }
}

#[async_trait::async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Single-winner classification of `text` against `labels`.
    async fn classify(&self, text: &str, labels: &[String])
        -> Result<ZeroShotResponse, ProviderError>;
}

/// Produces a ready classifier. Loading may be slow (model download, warmup),
/// callers are expected to do it once.
#[async_trait::async_trait]
pub trait ClassifierLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn ZeroShotClassifier>, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    loaders: HashMap<String, Arc<dyn ClassifierLoader>>,
    pub preferred: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loader(mut self, name: &str, loader: Arc<dyn ClassifierLoader>) -> Self {
        self.loaders.insert(name.to_string(), loader);
        self
    }

    pub fn set_preferred(mut self, name: &str) -> Self {
        self.preferred = Some(name.to_string());
        self
    }

    pub fn loader(&self, name: Option<&str>) -> Result<Arc<dyn ClassifierLoader>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred.clone())
            .ok_or_else(|| ProviderError::UnknownProvider("no classifier configured".into()))?;
        self.loaders
            .get(&key)
            .cloned()
            .ok_or(ProviderError::UnknownProvider(key))
    }
}
