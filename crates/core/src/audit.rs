//! Read-only agreement analysis of a classified file.
//!
//! Buckets here overlap on purpose: a row may be both a mismatch and low
//! confidence. The clean stage, by contrast, assigns exactly one status.

use crate::config::Thresholds;
use crate::models::Record;
use crate::taxonomy::TaxonomyMapping;
use serde::Serialize;

/// Number of danger-zone rows kept for the report.
pub const DANGER_SAMPLE_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DangerRow {
    pub name: String,
    pub original: String,
    pub predicted: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub total: usize,
    pub agreements: usize,
    pub high_confidence_agreements: usize,
    pub high_confidence_disagreements: usize,
    pub low_confidence: usize,
    pub danger_samples: Vec<DangerRow>,
}

impl AuditReport {
    pub fn observe(&mut self, record: &Record, taxonomy: &TaxonomyMapping, thresholds: &Thresholds) {
        self.total += 1;
        let predicted_short = taxonomy.comparison_key(&record.predicted_label);
        let high = record.confidence > thresholds.high_confidence;

        if record.original_category == predicted_short {
            self.agreements += 1;
            if high {
                self.high_confidence_agreements += 1;
            }
        } else if high {
            self.high_confidence_disagreements += 1;
            if self.danger_samples.len() < DANGER_SAMPLE_LIMIT {
                self.danger_samples.push(DangerRow {
                    name: record.name.clone(),
                    original: record.original_category.clone(),
                    predicted: record.predicted_label.clone(),
                    confidence: record.confidence,
                });
            }
        }

        if record.confidence < thresholds.low_confidence {
            self.low_confidence += 1;
        }
    }

    pub fn disagreements(&self) -> usize {
        self.total - self.agreements
    }

    /// Danger-zone rows counted but not kept as samples.
    pub fn omitted_danger_rows(&self) -> usize {
        self.high_confidence_disagreements - self.danger_samples.len()
    }

    /// Share of `count` in the total, 0.0 when there are no rows.
    pub fn percent(&self, count: usize) -> f64 {
        percent_of(count, self.total)
    }
}

pub(crate) fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

pub fn audit<I>(records: I, taxonomy: &TaxonomyMapping, thresholds: &Thresholds) -> AuditReport
where
    I: IntoIterator<Item = Record>,
{
    let mut report = AuditReport::default();
    for record in records {
        report.observe(&record, taxonomy, thresholds);
    }
    report
}
