use crate::audit::percent_of;
use crate::config::Thresholds;
use crate::models::Record;
use crate::taxonomy::{TaxonomyMapping, NONE_TOKEN};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    AutoFixed,
    Verified,
    NeedsReview,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::AutoFixed => "AUTO_FIXED",
            AuditStatus::Verified => "VERIFIED",
            AuditStatus::NeedsReview => "NEEDS_REVIEW",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub status: AuditStatus,
    pub final_tag: String,
}

/// Applies the compliance policy to one record. Branches are checked in order
/// and the first match wins.
pub fn decide(record: &Record, taxonomy: &TaxonomyMapping, thresholds: &Thresholds) -> Decision {
    let keep = |status: AuditStatus| Decision {
        status,
        final_tag: record.original_category.clone(),
    };

    let predicted_short = taxonomy.comparison_key(&record.predicted_label);
    if record.confidence > thresholds.auto_fix && record.original_category != predicted_short {
        // Only mapped, substantive labels may override the human category.
        return match taxonomy.to_final_form(&record.predicted_label) {
            Some(tag) if !tag.is_empty() && tag != NONE_TOKEN => Decision {
                status: AuditStatus::AutoFixed,
                final_tag: tag.to_string(),
            },
            _ => keep(AuditStatus::Verified),
        };
    }
    if record.confidence < thresholds.low_confidence {
        return keep(AuditStatus::NeedsReview);
    }
    keep(AuditStatus::Verified)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanSummary {
    pub total: usize,
    pub auto_fixed: usize,
    pub verified: usize,
    pub needs_review: usize,
    pub truncated_rows: usize,
}

impl CleanSummary {
    pub fn record(&mut self, status: AuditStatus) {
        self.total += 1;
        match status {
            AuditStatus::AutoFixed => self.auto_fixed += 1,
            AuditStatus::Verified => self.verified += 1,
            AuditStatus::NeedsReview => self.needs_review += 1,
        }
    }

    pub fn percent(&self, count: usize) -> f64 {
        percent_of(count, self.total)
    }
}
