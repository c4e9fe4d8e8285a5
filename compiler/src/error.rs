use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum T2cError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("TOML file {} parsing failed:\n{message}", path.display())]
    ParseError {
        path:    PathBuf,
        message: String,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("Schema encode error: {0}")]
    EncodeError(String),

    #[error("Verifier error: {0}")]
    VerifierError(String),
}
