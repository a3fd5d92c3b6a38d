use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Admx2OmaError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("XML parsing error: {0}")]
    XmlError(#[from] roxmltree::Error),

    #[error("Directory walk error: {0}")]
    WalkDirError(#[from] walkdir::Error),

    #[error("Unsupported text encoding: {0}")]
    EncodingError(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No ADML file found for '{}' (looked in {})", .admx.display(), format_paths(.tried))]
    AdmlNotFound { admx: PathBuf, tried: Vec<PathBuf> },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Policy '{0}' has no parent category")]
    MissingParentCategory(String),

    #[error("Policy '{policy}' references unknown category '{category}'")]
    UnknownCategory { policy: String, category: String },

    #[error("Policy '{policy}' has an invalid decimal enum value '{value}'")]
    InvalidEnumValue { policy: String, value: String },

    #[error("{failed} of {total} templates failed to convert")]
    BatchFailed { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, Admx2OmaError>;

pub use Admx2OmaError as Error;

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
