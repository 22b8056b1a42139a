//! Error types for runeopt-core

use crate::RuneId;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed rune {id}: {reason}")]
    MalformedRune { id: RuneId, reason: String },

    #[error("Invalid combination: {0}")]
    InvalidCombination(String),

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Invalid score config: {0}")]
    InvalidConfig(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
