//! PII detection and anonymization integration tests.

pub mod anonymization;
pub mod detection;
