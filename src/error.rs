use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, NovaError>;

/// Errors raised by the I/O-performing parts of the pipeline.
///
/// Field extraction itself never fails; a field that cannot be located is
/// simply missing from the [`ExtractedFields`](crate::extract::ExtractedFields).
#[derive(Error, Debug)]
pub enum NovaError {
    #[error("No paper IDs provided")]
    NoPaperIdsProvided,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Paper not found on arXiv: {0}")]
    PaperNotFound(String),

    #[error("Failed to download source: {0}")]
    Download(String),

    #[error("No LaTeX main file found in {0:?}")]
    MainFileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Translation failed: {0}")]
    TranslationError(String),
}
