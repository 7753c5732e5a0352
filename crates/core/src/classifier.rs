use crate::models::format_score;
use crate::taxonomy::NONE_TAG;
use providers::{ClassifierLoader, ProviderError, ZeroShotClassifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OnceCell, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Label written for rows whose classification failed.
pub const ERROR_TAG: &str = "ERROR";

/// Result of classifying one row. Consumed by the row writer, never raised.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    Classified { label: String, score: f64 },
    /// Empty or whitespace-only text. The classifier is not consulted.
    Blank,
    Failed { reason: String },
}

impl ClassificationOutcome {
    pub fn label(&self) -> &str {
        match self {
            ClassificationOutcome::Classified { label, .. } => label,
            ClassificationOutcome::Blank => NONE_TAG,
            ClassificationOutcome::Failed { .. } => ERROR_TAG,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            ClassificationOutcome::Classified { score, .. } => *score,
            ClassificationOutcome::Blank => 1.0,
            ClassificationOutcome::Failed { .. } => 0.0,
        }
    }

    pub fn score_field(&self) -> String {
        format_score(self.score())
    }
}

/// Lazily loaded classifier. The loader runs at most once, concurrent first
/// callers wait on the same initialisation. A failed load is not cached.
pub struct ClassifierHandle {
    loader: Arc<dyn ClassifierLoader>,
    cell: OnceCell<Arc<dyn ZeroShotClassifier>>,
}

impl ClassifierHandle {
    pub fn new(loader: Arc<dyn ClassifierLoader>) -> Self {
        Self {
            loader,
            cell: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> Result<Arc<dyn ZeroShotClassifier>, ProviderError> {
        self.cell
            .get_or_try_init(|| async {
                info!("Loading classification model (this may take a moment)...");
                self.loader.load().await
            })
            .await
            .map(Arc::clone)
    }
}

/// Candidate list sent to the classifier: the given tags plus exactly one
/// sentinel, with blanks dropped.
pub fn candidate_set(tags: &[String]) -> Vec<String> {
    let mut labels: Vec<String> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && *t != NONE_TAG)
        .map(str::to_string)
        .collect();
    labels.push(NONE_TAG.to_string());
    labels
}

pub async fn classify_text(
    text: &str,
    candidates: &[String],
    handle: &ClassifierHandle,
    timeout: Duration,
) -> ClassificationOutcome {
    let text = text.trim();
    if text.is_empty() {
        return ClassificationOutcome::Blank;
    }
    match try_classify(text, candidates, handle, timeout).await {
        Ok((label, score)) => ClassificationOutcome::Classified { label, score },
        Err(reason) => ClassificationOutcome::Failed { reason },
    }
}

async fn try_classify(
    text: &str,
    candidates: &[String],
    handle: &ClassifierHandle,
    timeout: Duration,
) -> Result<(String, f64), String> {
    // A load abandoned here leaves the cell empty, so the next row retries it.
    let classifier = tokio::time::timeout(timeout, handle.get())
        .await
        .map_err(|_| format!("model load timed out after {:?}", timeout))?
        .map_err(|e| format!("model load failed: {}", e))?;
    let resp = tokio::time::timeout(timeout, classifier.classify(text, candidates))
        .await
        .map_err(|_| format!("classifier timed out after {:?}", timeout))?
        .map_err(|e| e.to_string())?;
    let (label, score) = resp.top().map_err(|e| e.to_string())?;
    Ok((label.to_string(), score))
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Classifies every text, at most `concurrency` calls in flight. The returned
/// outcomes are in input order, one per text. `on_done` is called once per
/// finished row in completion order.
pub async fn classify_batch<F>(
    texts: Vec<String>,
    candidates: Arc<Vec<String>>,
    handle: Arc<ClassifierHandle>,
    opts: BatchOptions,
    mut on_done: F,
) -> Vec<ClassificationOutcome>
where
    F: FnMut(usize, &ClassificationOutcome),
{
    let total = texts.len();
    let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));
    let mut set = JoinSet::new();

    for (idx, text) in texts.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let candidates = candidates.clone();
        let handle = handle.clone();
        set.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => classify_text(&text, &candidates, &handle, opts.timeout).await,
                Err(e) => ClassificationOutcome::Failed {
                    reason: e.to_string(),
                },
            };
            (idx, outcome)
        });
    }

    let mut results: Vec<Option<ClassificationOutcome>> = vec![None; total];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, outcome)) => {
                match &outcome {
                    ClassificationOutcome::Failed { reason } => {
                        warn!(row = idx + 1, %reason, "Error processing row");
                    }
                    other => debug!(row = idx + 1, label = other.label(), "classified"),
                }
                on_done(idx, &outcome);
                results[idx] = Some(outcome);
            }
            Err(e) => warn!("classification task aborted: {}", e),
        }
    }

    results
        .into_iter()
        .map(|r| {
            r.unwrap_or_else(|| ClassificationOutcome::Failed {
                reason: "classification task aborted".to_string(),
            })
        })
        .collect()
}
