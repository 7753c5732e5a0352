use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input file '{}' not found.", .path.display())]
    InputNotFound { path: PathBuf },
    #[error("Column '{column}' not found in the CSV header of '{}'.", .path.display())]
    MissingColumn { column: String, path: PathBuf },
    #[error("taxonomy: {0}")]
    Taxonomy(String),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Configuration-class errors that should be shown to the user as a plain
    /// message instead of a failure trace.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            PipelineError::InputNotFound { .. }
                | PipelineError::MissingColumn { .. }
                | PipelineError::Taxonomy(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
