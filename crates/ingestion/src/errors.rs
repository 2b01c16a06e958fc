//! Ingestion error types

use ragline_common::errors::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unsupported file format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to parse {name}: {message}")]
    Parse { name: String, message: String },

    #[error("No text content extracted from {0}")]
    EmptyDocument(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::UnsupportedFormat { extension } => {
                AppError::UnsupportedFormat { extension }
            }
            IngestError::Parse { name, message } => AppError::Validation {
                message: format!("Failed to parse {}: {}", name, message),
                field: None,
            },
            IngestError::EmptyDocument(name) => AppError::Validation {
                message: format!("No text content extracted from {}", name),
                field: None,
            },
            IngestError::FileNotFound(path) => AppError::Validation {
                message: format!("File not found: {}", path),
                field: None,
            },
            IngestError::Io(e) => AppError::Internal {
                message: e.to_string(),
            },
            IngestError::App(e) => e,
        }
    }
}
