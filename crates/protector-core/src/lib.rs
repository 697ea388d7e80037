//! # Protector Core
//!
//! Core domain types shared by the privacy protector crates:
//! - PII categories (a closed set plus labelled custom categories)
//! - Span-based matches produced by detectors and detection backends
//! - Error types for parsing categories

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod pii;
pub mod span;

pub use error::ParseCategoryError;
pub use pii::PiiCategory;
pub use span::{spans_overlap, Match};
