//! Integration tests covering pattern detection, backend merging,
//! substitution and the file and batch wrappers.

pub mod common;
pub mod pii;
