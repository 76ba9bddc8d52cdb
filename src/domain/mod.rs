/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, CompletionRecord, Streak) and
/// their validation rules. The streak engine lives here because it is a pure
/// function over domain values and never touches storage.

pub mod habit;
pub mod completion;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use completion::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
///
/// Every variant describes input that was rejected before any computation
/// ran. None of them are retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit title: {0}")]
    InvalidTitle(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),

    #[error("Unknown filter key: {0}")]
    UnknownFilterKey(String),

    #[error("Unsupported by the current schema: {0}")]
    Unsupported(String),
}
