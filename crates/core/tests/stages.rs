use providers::{ClassifierLoader, ProviderError, ZeroShotClassifier, ZeroShotResponse};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tag_genie_core::classifier::{BatchOptions, ClassifierHandle};
use tag_genie_core::config::Thresholds;
use tag_genie_core::error::PipelineError;
use tag_genie_core::pipeline::{run_audit, run_clean, run_process, ProcessOptions};
use tag_genie_core::table::Table;
use tag_genie_core::taxonomy::TaxonomyMapping;
use tempfile::tempdir;

const LEGAL: &str = "Legal Services and Immigration Consultants";

/// Picks the first candidate whose first word appears in the text, otherwise
/// the sentinel (always last).
struct KeywordClassifier;

#[async_trait::async_trait]
impl ZeroShotClassifier for KeywordClassifier {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<ZeroShotResponse, ProviderError> {
        if text.contains("FAIL") {
            return Err(ProviderError::RequestFailed("upstream 500".into()));
        }
        let lower = text.to_lowercase();
        let winner = labels
            .iter()
            .position(|l| {
                let first = l.split_whitespace().next().unwrap_or("").to_lowercase();
                !first.is_empty() && lower.contains(&first)
            })
            .unwrap_or(labels.len() - 1);
        let mut ranked = vec![labels[winner].clone()];
        ranked.extend(
            labels
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != winner)
                .map(|(_, l)| l.clone()),
        );
        let mut scores = vec![0.92];
        scores.extend(std::iter::repeat(0.08 / (labels.len() - 1) as f64).take(labels.len() - 1));
        Ok(ZeroShotResponse {
            labels: ranked,
            scores,
        })
    }
}

#[derive(Default)]
struct Loader {
    loads: AtomicUsize,
}

#[async_trait::async_trait]
impl ClassifierLoader for Loader {
    async fn load(&self) -> Result<Arc<dyn ZeroShotClassifier>, ProviderError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(KeywordClassifier))
    }
}

fn opts(column: &str, concurrency: usize) -> ProcessOptions {
    ProcessOptions {
        column: column.to_string(),
        tags: vec![],
        batch: BatchOptions {
            concurrency,
            timeout: Duration::from_secs(5),
        },
    }
}

fn write(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

#[tokio::test]
async fn process_writes_labels_in_input_order() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    let output = dir.path().join("processed.csv");
    write(
        &input,
        "Name,Category,Description\n\
         Acme Law,Legal & Immigration,Legal advice and visas\n\
         Blank Co,Real Estate,   \n\
         Broken Ltd,Finance & Tax,FAIL please\n\
         Homes R Us,Real Estate,Real estate rentals downtown\n\
         Mystery,,Bakery and cakes\n",
    );

    let loader = Arc::new(Loader::default());
    let handle = Arc::new(ClassifierHandle::new(loader.clone()));
    let mut last = (0, 0);
    let summary = run_process(
        &input,
        &output,
        &opts("Description", 3),
        &TaxonomyMapping::builtin(),
        handle,
        |done, total| last = (done, total),
    )
    .await
    .unwrap();

    assert_eq!(last, (5, 5));
    assert_eq!(summary.total, 5);
    assert_eq!(summary.blank, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.classified, 3);
    assert_eq!(summary.truncated_rows, 0);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);

    let table = Table::read(&output).unwrap();
    assert_eq!(
        table.headers,
        vec!["Name", "Category", "Description", "Predicted_Tag", "Confidence_Score"]
    );
    let names: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(names, vec!["Acme Law", "Blank Co", "Broken Ltd", "Homes R Us", "Mystery"]);
    assert_eq!(table.rows[0][3], LEGAL);
    assert_eq!(table.rows[0][4], "0.92");
    assert_eq!(table.rows[1][3], "None of the above");
    assert_eq!(table.rows[1][4], "1.0");
    assert_eq!(table.rows[2][3], "ERROR");
    assert_eq!(table.rows[2][4], "0.0");
    assert_eq!(table.rows[3][3], "Real Estate Agency and Property Rentals");
    assert_eq!(table.rows[4][3], "None of the above");
}

#[tokio::test]
async fn process_reports_missing_column_before_writing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    let output = dir.path().join("processed.csv");
    write(&input, "Name,Category\nAcme,Legal\n");

    let handle = Arc::new(ClassifierHandle::new(Arc::new(Loader::default())));
    let err = run_process(
        &input,
        &output,
        &opts("Description", 1),
        &TaxonomyMapping::builtin(),
        handle,
        |_, _| {},
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::MissingColumn { ref column, .. } if column == "Description"));
    assert!(err.is_user_facing());
    assert!(!output.exists());
}

#[tokio::test]
async fn process_missing_input_is_user_facing() {
    let dir = tempdir().unwrap();
    let handle = Arc::new(ClassifierHandle::new(Arc::new(Loader::default())));
    let err = run_process(
        &dir.path().join("nope.csv"),
        &dir.path().join("out.csv"),
        &opts("Description", 1),
        &TaxonomyMapping::builtin(),
        handle,
        |_, _| {},
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PipelineError::InputNotFound { .. }));
    assert!(!dir.path().join("out.csv").exists());
}

#[test]
fn audit_counts_scenario_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("processed.csv");
    write(
        &input,
        "Name,Category,Predicted_Tag,Confidence_Score\n\
         A,Legal & Immigration,Legal Services and Immigration Consultants,0.95\n\
         B,Real Estate,Legal Services and Immigration Consultants,0.9\n\
         C,Real Estate,None of the above,0.3\n\
         D,Finance & Tax,Chartered Accountants and Tax Consultants,not-a-number\n",
    );

    let report = run_audit(&input, &TaxonomyMapping::builtin(), &Thresholds::default()).unwrap();
    assert_eq!(report.total, 4);
    assert_eq!(report.agreements, 2);
    assert_eq!(report.high_confidence_agreements, 1);
    assert_eq!(report.high_confidence_disagreements, 1);
    assert_eq!(report.low_confidence, 2);
    assert_eq!(report.danger_samples[0].name, "B");
}

#[test]
fn audit_of_header_only_file_has_zero_rows() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    write(&input, "Name,Category,Predicted_Tag,Confidence_Score\n");
    let report = run_audit(&input, &TaxonomyMapping::builtin(), &Thresholds::default()).unwrap();
    assert_eq!(report.total, 0);
    assert_eq!(report.percent(report.low_confidence), 0.0);
}

#[test]
fn clean_applies_policy_and_is_idempotent() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("processed.csv");
    let cleaned = dir.path().join("clean.csv");
    let recleaned = dir.path().join("clean2.csv");
    write(
        &input,
        "Name,Category,Predicted_Tag,Confidence_Score\n\
         Fix Me,Real Estate,Legal Services and Immigration Consultants,0.90\n\
         Blocked,Real Estate,None of the above,0.95\n\
         Unsure,Finance & Tax,Chartered Accountants and Tax Consultants,0.40\n\
         Fine,Real Estate,Real Estate Agency and Property Rentals,0.7\n\
         Err,Real Estate,ERROR,0.0\n",
    );
    let taxonomy = TaxonomyMapping::builtin();
    let thresholds = Thresholds::default();

    let summary = run_clean(&input, &cleaned, &taxonomy, &thresholds).unwrap();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.auto_fixed, 1);
    assert_eq!(summary.verified, 2);
    assert_eq!(summary.needs_review, 2);

    let table = Table::read(&cleaned).unwrap();
    assert_eq!(table.headers[4..], ["Audit_Status", "Final_Tag"]);
    let decisions: Vec<(&str, &str)> = table
        .rows
        .iter()
        .map(|r| (r[4].as_str(), r[5].as_str()))
        .collect();
    assert_eq!(
        decisions,
        vec![
            ("AUTO_FIXED", "Legal"),
            ("VERIFIED", "Real Estate"),
            ("NEEDS_REVIEW", "Finance & Tax"),
            ("VERIFIED", "Real Estate"),
            ("NEEDS_REVIEW", "Real Estate"),
        ]
    );

    run_clean(&cleaned, &recleaned, &taxonomy, &thresholds).unwrap();
    let again = Table::read(&recleaned).unwrap();
    assert_eq!(again, table);
}

#[test]
fn clean_missing_input_leaves_no_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("clean.csv");
    let err = run_clean(
        &dir.path().join("missing.csv"),
        &output,
        &TaxonomyMapping::builtin(),
        &Thresholds::default(),
    )
    .unwrap_err();
    assert!(err.is_user_facing());
    assert!(!output.exists());
}

#[test]
fn clean_counts_rows_wider_than_header() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("processed.csv");
    let output = dir.path().join("clean.csv");
    write(
        &input,
        "Name,Category,Predicted_Tag,Confidence_Score\n\
         Wide,Real Estate,Real Estate Agency and Property Rentals,0.7,stray,cells\n\
         Fine,Real Estate,Real Estate Agency and Property Rentals,0.7\n",
    );

    let summary = run_clean(
        &input,
        &output,
        &TaxonomyMapping::builtin(),
        &Thresholds::default(),
    )
    .unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.truncated_rows, 1);

    let table = Table::read(&output).unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].len(), 6);
    assert_eq!(table.truncated_rows, 0);
}
