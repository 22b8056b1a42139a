//! Error types for runeopt-search

use runeopt_core::Category;
use thiserror::Error;

/// Result type for runeopt-search operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when starting a search
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer usable runes in a category than the loadout has slots for it
    #[error("not enough {category} runes: {required} required, {available} available")]
    InsufficientRunes {
        category: Category,
        required: usize,
        available: usize,
    },

    /// No usable rune left in a category after filtering
    #[error("no usable {0} runes after filtering")]
    EmptyPool(Category),

    /// The search thread could not be spawned and inline fallback is disabled
    #[error("failed to spawn search thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// Core error
    #[error("core error: {0}")]
    Core(#[from] runeopt_core::Error),
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
// This function is never called but will fail to compile if the bound is not satisfied.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
