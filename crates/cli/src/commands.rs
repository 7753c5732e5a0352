//! Command bodies. Each returns the text to print on stdout.

use crate::progress;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tag_genie_core::config::AppConfig;
use tag_genie_core::error::PipelineError;
use tag_genie_core::pipeline::{self, ProcessOptions};
use tag_genie_core::report;

/// Exit status and stderr message for a failed command. Configuration-class
/// errors exit 2 with the plain message, anything else exits 1 with the chain.
pub fn failure(err: &anyhow::Error) -> (u8, String) {
    match err.downcast_ref::<PipelineError>() {
        Some(e) if e.is_user_facing() => (2, format!("Error: {}", e)),
        _ => (1, format!("Error: {:#}", err)),
    }
}

pub async fn process(
    cfg: &AppConfig,
    input: &Path,
    output: &Path,
    column: &str,
    tags: Vec<String>,
    json: bool,
) -> Result<String> {
    let taxonomy = pipeline::load_taxonomy(cfg)?;
    let handle = Arc::new(pipeline::build_classifier(cfg)?);
    let opts = ProcessOptions {
        column: column.to_string(),
        tags,
        batch: pipeline::batch_options(cfg),
    };

    let pb = progress::row_progress();
    let summary = pipeline::run_process(input, output, &opts, &taxonomy, handle, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })
    .await;
    pb.finish_and_clear();
    let summary = summary?;

    if json {
        return Ok(serde_json::to_string_pretty(&summary)?);
    }
    let mut out = format!("Success! Processed file saved to {}.", output.display());
    if summary.failed > 0 {
        out.push_str(&format!(
            "\n{} of {} rows could not be classified and were marked ERROR.",
            summary.failed, summary.total
        ));
    }
    if summary.truncated_rows > 0 {
        out.push('\n');
        out.push_str(&report::truncation_note(summary.truncated_rows));
    }
    Ok(out)
}

pub fn audit(cfg: &AppConfig, input: &Path, json: bool) -> Result<String> {
    let taxonomy = pipeline::load_taxonomy(cfg)?;
    let report = pipeline::run_audit(input, &taxonomy, &cfg.thresholds)?;
    if json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }
    Ok(report::render_audit(&report, &input.display().to_string()))
}

pub fn clean(cfg: &AppConfig, input: &Path, output: &Path, json: bool) -> Result<String> {
    let taxonomy = pipeline::load_taxonomy(cfg)?;
    let summary = pipeline::run_clean(input, output, &taxonomy, &cfg.thresholds)?;
    if json {
        return Ok(serde_json::to_string_pretty(&summary)?);
    }
    Ok(report::render_clean(&summary, &output.display().to_string()))
}
