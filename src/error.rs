use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("invalid dataset id: {0}")]
    InvalidDatasetId(String),

    #[error("invalid database descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("invalid FDR level: {0} (expected a value in (0, 1])")]
    InvalidFdr(f64),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("METASPACE request failed: {0}")]
    MetaspaceHttp(String),

    #[error("METASPACE returned status {status}: {message}")]
    MetaspaceStatus { status: u16, message: String },

    #[error("METASPACE GraphQL error: {0}")]
    GraphQl(String),

    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to write CSV: {0}")]
    Csv(String),
}
