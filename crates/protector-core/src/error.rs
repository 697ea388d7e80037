//! Error types for core PII types.

use thiserror::Error;

/// Error returned when a string does not name a known PII category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCategoryError {
    /// The name matched no category or alias.
    #[error("unknown PII category: {0}")]
    Unknown(String),

    /// A `custom:` category was given without a label.
    #[error("custom category requires a label (custom:<label>)")]
    MissingLabel,
}
