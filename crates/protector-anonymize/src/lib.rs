//! PII detection and synthetic substitution.
//!
//! The pipeline is linear: a [`PatternCatalog`] feeds a [`SpanDetector`],
//! whose disjoint matches (optionally merged with a [`DetectionBackend`]'s)
//! are replaced by format-preserving values from a
//! [`SubstitutionGenerator`]. [`AnonymizationEngine`] ties the pieces together
//! and produces an [`AnonymizationReport`].
//!
//! ```
//! use protector_anonymize::{AnonymizationEngine, ProtectorConfig};
//!
//! let mut engine = AnonymizationEngine::new(ProtectorConfig::new().with_seed(7))?;
//! let report = engine.anonymize_with_report("Contact john@example.com or call 555-123-4567")?;
//!
//! assert_eq!(report.count_found, 2);
//! assert!(report.anonymized_text.starts_with("Contact "));
//! # Ok::<(), protector_anonymize::AnonymizeError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod anonymizer;
pub mod backend;
pub mod config;
pub mod detector;
pub mod error;
pub mod generator;
pub mod locale;
pub mod patterns;
pub mod report;

pub use anonymizer::AnonymizationEngine;
pub use backend::{BackendFactory, BackendRegistry, DetectionBackend, LexiconBackend, LexiconOptions};
pub use config::{CustomPattern, ProtectorConfig};
pub use detector::SpanDetector;
pub use error::{AnonymizeError, AnonymizeResult};
pub use generator::{is_luhn_valid, is_valid_iban, is_valid_ssn, SubstitutionGenerator, Synthesizer};
pub use locale::Locale;
pub use patterns::{PatternCatalog, PatternRule, RuleSpec, BUILTIN_RULES};
pub use report::{AnonymizationReport, Replacement, ReportFormat, ReportSummary};

/// Re-export core types.
pub use protector_core::{Match, PiiCategory};
