use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub thresholds: Thresholds,
    pub taxonomy: TaxonomyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Maximum number of classifier calls in flight.
    pub concurrency: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: "huggingface".to_string(),
            base_url: "https://api-inference.huggingface.co".to_string(),
            model: "facebook/bart-large-mnli".to_string(),
            timeout_secs: 60,
            concurrency: 1,
        }
    }
}

/// Confidence cut-offs. `high_confidence` and `auto_fix` are strict lower
/// bounds, `low_confidence` is a strict upper bound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub high_confidence: f64,
    pub auto_fix: f64,
    pub low_confidence: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_confidence: 0.8,
            auto_fix: 0.85,
            low_confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    pub path: Option<String>,
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("TAG_GENIE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
