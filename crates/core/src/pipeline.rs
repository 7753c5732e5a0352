use crate::audit::{self, AuditReport};
use crate::classifier::{
    candidate_set, classify_batch, BatchOptions, ClassificationOutcome, ClassifierHandle,
};
use crate::clean::{self, CleanSummary};
use crate::config::{AppConfig, Thresholds};
use crate::error::{PipelineError, Result};
use crate::models::{CONFIDENCE_COLUMN, FINAL_TAG_COLUMN, PREDICTED_COLUMN, STATUS_COLUMN};
use crate::table::{RecordColumns, Table};
use crate::taxonomy::TaxonomyMapping;
use providers::huggingface::{HuggingFaceConfig, HuggingFaceLoader};
use providers::noop::NoopProvider;
use providers::ProviderRegistry;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Header of the column holding the text to classify.
    pub column: String,
    /// Candidate tags. Empty means the taxonomy's labels.
    pub tags: Vec<String>,
    pub batch: BatchOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessSummary {
    pub total: usize,
    pub classified: usize,
    pub blank: usize,
    pub failed: usize,
    /// Rows whose fields beyond the header width were dropped on output.
    pub truncated_rows: usize,
}

/// Stage 1: classify `column` of every row and write the input back out with
/// `Predicted_Tag` and `Confidence_Score`. Rows are never dropped.
pub async fn run_process<F>(
    input: &Path,
    output: &Path,
    opts: &ProcessOptions,
    taxonomy: &TaxonomyMapping,
    handle: Arc<ClassifierHandle>,
    mut on_progress: F,
) -> Result<ProcessSummary>
where
    F: FnMut(usize, usize),
{
    info!("Starting batch processing for {}...", input.display());
    let mut table = Table::read(input)?;
    let text_idx = table
        .column(&opts.column)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: opts.column.clone(),
            path: input.to_path_buf(),
        })?;

    let tags = if opts.tags.is_empty() {
        taxonomy.candidate_labels()
    } else {
        opts.tags.clone()
    };
    for tag in &tags {
        if !taxonomy.contains(tag.trim()) {
            warn!(tag = %tag, "tag is not in the taxonomy, its predictions can never be auto-fixed");
        }
    }
    let candidates = Arc::new(candidate_set(&tags));

    let texts: Vec<String> = table.rows.iter().map(|r| r[text_idx].clone()).collect();
    let total = texts.len();
    let mut done = 0;
    on_progress(done, total);
    let outcomes = classify_batch(texts, candidates, handle, opts.batch, |_, _| {
        done += 1;
        on_progress(done, total);
    })
    .await;

    let pred_idx = table.ensure_column(PREDICTED_COLUMN);
    let conf_idx = table.ensure_column(CONFIDENCE_COLUMN);
    let mut summary = ProcessSummary {
        total,
        truncated_rows: table.truncated_rows,
        ..Default::default()
    };
    for (row, outcome) in table.rows.iter_mut().zip(&outcomes) {
        match outcome {
            ClassificationOutcome::Classified { .. } => summary.classified += 1,
            ClassificationOutcome::Blank => summary.blank += 1,
            ClassificationOutcome::Failed { .. } => summary.failed += 1,
        }
        row[pred_idx] = outcome.label().to_string();
        row[conf_idx] = outcome.score_field();
    }

    table.write_atomic(output)?;
    info!(
        classified = summary.classified,
        blank = summary.blank,
        failed = summary.failed,
        "Processed file saved to {}",
        output.display()
    );
    Ok(summary)
}

/// Stage 2: read-only agreement analysis.
pub fn run_audit(
    input: &Path,
    taxonomy: &TaxonomyMapping,
    thresholds: &Thresholds,
) -> Result<AuditReport> {
    info!("Starting audit of {}...", input.display());
    let table = Table::read(input)?;
    let columns = RecordColumns::resolve(&table);
    let report = audit::audit(
        table.rows.iter().map(|row| columns.record(row)),
        taxonomy,
        thresholds,
    );
    info!(
        total = report.total,
        danger = report.high_confidence_disagreements,
        "Audit complete."
    );
    Ok(report)
}

/// Stage 3: assign `Audit_Status` and `Final_Tag` to every row.
pub fn run_clean(
    input: &Path,
    output: &Path,
    taxonomy: &TaxonomyMapping,
    thresholds: &Thresholds,
) -> Result<CleanSummary> {
    info!("Starting clean of {}...", input.display());
    let mut table = Table::read(input)?;
    let columns = RecordColumns::resolve(&table);
    let status_idx = table.ensure_column(STATUS_COLUMN);
    let final_idx = table.ensure_column(FINAL_TAG_COLUMN);

    let mut summary = CleanSummary {
        truncated_rows: table.truncated_rows,
        ..Default::default()
    };
    for row in table.rows.iter_mut() {
        let record = columns.record(row);
        let decision = clean::decide(&record, taxonomy, thresholds);
        summary.record(decision.status);
        row[status_idx] = decision.status.to_string();
        row[final_idx] = decision.final_tag;
    }

    table.write_atomic(output)?;
    info!(
        total = summary.total,
        auto_fixed = summary.auto_fixed,
        "Fixes applied to {}",
        output.display()
    );
    Ok(summary)
}

pub fn load_taxonomy(config: &AppConfig) -> Result<TaxonomyMapping> {
    match &config.taxonomy.path {
        Some(path) => TaxonomyMapping::load(Path::new(path)),
        None => Ok(TaxonomyMapping::builtin()),
    }
}

pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let hf = HuggingFaceLoader::new(HuggingFaceConfig {
        base_url: config.classifier.base_url.clone(),
        model: config.classifier.model.clone(),
        api_token: std::env::var("HF_API_TOKEN").ok(),
    });
    ProviderRegistry::new()
        .with_loader("noop", Arc::new(NoopProvider))
        .with_loader("huggingface", Arc::new(hf))
        .set_preferred(&config.classifier.provider)
}

pub fn build_classifier(config: &AppConfig) -> anyhow::Result<ClassifierHandle> {
    let loader = build_registry(config).loader(None)?;
    Ok(ClassifierHandle::new(loader))
}

pub fn batch_options(config: &AppConfig) -> BatchOptions {
    BatchOptions {
        concurrency: config.classifier.concurrency.max(1),
        timeout: Duration::from_secs(config.classifier.timeout_secs.max(1)),
    }
}
