//! Static vocabulary linking the classifier's long-form labels to the short
//! categories used in the directory and the DB-safe tags written on fix.

use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Extra candidate meaning "none of the provided categories fit".
pub const NONE_TAG: &str = "None of the above";
/// What the sentinel maps to in both tables.
pub const NONE_TOKEN: &str = "None";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxonomyEntry {
    pub label: String,
    pub category: String,
    #[serde(rename = "final")]
    pub final_tag: String,
}

impl TaxonomyEntry {
    fn new(label: &str, category: &str, final_tag: &str) -> Self {
        Self {
            label: label.to_string(),
            category: category.to_string(),
            final_tag: final_tag.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    labels: Vec<TaxonomyEntry>,
}

#[derive(Debug, Clone)]
pub struct TaxonomyMapping {
    entries: Vec<TaxonomyEntry>,
    comparison: HashMap<String, String>,
    final_forms: HashMap<String, String>,
}

impl TaxonomyMapping {
    /// The business-directory taxonomy the tool ships with.
    pub fn builtin() -> Self {
        let entries = vec![
            TaxonomyEntry::new(
                "Legal Services and Immigration Consultants",
                "Legal & Immigration",
                "Legal",
            ),
            TaxonomyEntry::new(
                "Chartered Accountants and Tax Consultants",
                "Finance & Tax",
                "Finance",
            ),
            TaxonomyEntry::new(
                "Relocation Services and Lifestyle Management",
                "Relocation & Lifestyle",
                "Lifestyle",
            ),
            TaxonomyEntry::new(
                "Real Estate Agency and Property Rentals",
                "Real Estate",
                "Real Estate",
            ),
        ];
        Self::from_entries(entries).expect("builtin taxonomy is well formed")
    }

    pub fn from_entries(entries: Vec<TaxonomyEntry>) -> Result<Self> {
        let mut comparison = HashMap::new();
        let mut final_forms = HashMap::new();
        for entry in &entries {
            if entry.label.trim().is_empty() {
                return Err(PipelineError::Taxonomy("empty label".into()));
            }
            if entry.label == NONE_TAG {
                return Err(PipelineError::Taxonomy(format!(
                    "'{}' is reserved and cannot be redefined",
                    NONE_TAG
                )));
            }
            if comparison
                .insert(entry.label.clone(), entry.category.clone())
                .is_some()
            {
                return Err(PipelineError::Taxonomy(format!(
                    "duplicate label '{}'",
                    entry.label
                )));
            }
            final_forms.insert(entry.label.clone(), entry.final_tag.clone());
        }
        comparison.insert(NONE_TAG.to_string(), NONE_TOKEN.to_string());
        final_forms.insert(NONE_TAG.to_string(), NONE_TOKEN.to_string());
        Ok(Self {
            entries,
            comparison,
            final_forms,
        })
    }

    /// Reads `[[labels]]` tables with `label`, `category` and `final` keys.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        let file: TaxonomyFile = toml::from_str(&content)
            .map_err(|e| PipelineError::Taxonomy(format!("{}: {}", path.display(), e)))?;
        Self::from_entries(file.labels)
    }

    pub fn to_comparison_form(&self, label: &str) -> Option<&str> {
        self.comparison.get(label).map(String::as_str)
    }

    pub fn to_final_form(&self, label: &str) -> Option<&str> {
        self.final_forms.get(label).map(String::as_str)
    }

    /// Value a predicted label is compared against the original category with.
    /// Unmapped labels compare as themselves.
    pub fn comparison_key<'a>(&'a self, label: &'a str) -> &'a str {
        self.to_comparison_form(label).unwrap_or(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.comparison.contains_key(label)
    }

    /// Candidate labels in declaration order, without the sentinel.
    pub fn candidate_labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }
}

impl Default for TaxonomyMapping {
    fn default() -> Self {
        Self::builtin()
    }
}
