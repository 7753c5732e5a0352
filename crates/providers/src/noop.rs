use crate::{ClassifierLoader, ProviderError, ZeroShotClassifier, ZeroShotResponse};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct NoopProvider;

#[async_trait::async_trait]
impl ZeroShotClassifier for NoopProvider {
    async fn classify(
        &self,
        _text: &str,
        _labels: &[String],
    ) -> Result<ZeroShotResponse, ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}

#[async_trait::async_trait]
impl ClassifierLoader for NoopProvider {
    async fn load(&self) -> Result<Arc<dyn ZeroShotClassifier>, ProviderError> {
        Ok(Arc::new(NoopProvider))
    }
}
