//! Error types for runeopt-script

use runeopt_core::RuneId;
use thiserror::Error;

/// Script loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Duplicate rune: {0}")]
    DuplicateRune(RuneId),

    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(String),

    #[error(transparent)]
    Core(#[from] runeopt_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
