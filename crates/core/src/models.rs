pub const NAME_COLUMN: &str = "Name";
pub const CATEGORY_COLUMN: &str = "Category";
pub const PREDICTED_COLUMN: &str = "Predicted_Tag";
pub const CONFIDENCE_COLUMN: &str = "Confidence_Score";
pub const STATUS_COLUMN: &str = "Audit_Status";
pub const FINAL_TAG_COLUMN: &str = "Final_Tag";

/// One classified directory listing, as read back by the audit and clean stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub original_category: String,
    pub predicted_label: String,
    pub confidence: f64,
}

impl Record {
    pub fn new(name: &str, original_category: &str, predicted_label: &str, confidence: f64) -> Self {
        Self {
            name: name.to_string(),
            original_category: original_category.trim().to_string(),
            predicted_label: predicted_label.trim().to_string(),
            confidence,
        }
    }

    /// Builds a record from raw CSV fields. Missing fields read as empty and a
    /// confidence that does not parse reads as 0.0.
    pub fn from_fields(
        name: Option<&str>,
        category: Option<&str>,
        predicted: Option<&str>,
        confidence: Option<&str>,
    ) -> Self {
        Self::new(
            name.unwrap_or_default(),
            category.unwrap_or_default(),
            predicted.unwrap_or_default(),
            parse_confidence(confidence),
        )
    }
}

pub fn parse_confidence(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(0.0)
}

/// Renders a score the way it is written to the output file: whole numbers
/// keep one decimal place ("1.0"), everything else uses the shortest exact form.
pub fn format_score(score: f64) -> String {
    if score.is_finite() && score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        score.to_string()
    }
}
