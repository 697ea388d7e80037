//! PII anonymization integration tests.

use protector_anonymize::{
    is_luhn_valid, is_valid_ssn, AnonymizationReport, AnonymizeError, Match, PiiCategory,
    ProtectorConfig, ReportFormat,
};
use regex::Regex;

use crate::common::{engine_with, pii_samples, seeded_engine, MockBackend, TEST_SEED};

/// Rebuilds the anonymized text from the original and the report, checking
/// that every unmatched byte survived unchanged.
fn assert_splices_exact(report: &AnonymizationReport) {
    let original = &report.original_text;
    let mut rebuilt = String::new();
    let mut cursor = 0;
    for r in &report.replacements {
        rebuilt.push_str(&original[cursor..r.position]);
        rebuilt.push_str(&r.replacement);
        cursor = r.position + r.original.len();
    }
    rebuilt.push_str(&original[cursor..]);
    assert_eq!(rebuilt, report.anonymized_text);
}

/// Tests the contact-line scenario.
#[test]
fn test_anonymize_contact_line() {
    let mut engine = seeded_engine();
    let text = "Contact john@example.com or call 555-123-4567";
    let report = engine.anonymize_with_report(text).unwrap();

    assert_eq!(report.count_found, 2);
    let email = &report.replacements[0];
    let phone = &report.replacements[1];
    assert_eq!(email.category, PiiCategory::Email);
    assert_eq!(phone.category, PiiCategory::Phone);
    assert_ne!(email.replacement, "john@example.com");
    assert_ne!(phone.replacement, "555-123-4567");
    assert_ne!(email.replacement, phone.replacement);

    assert!(Regex::new(r"^\S+@\S+\.\w+$").unwrap().is_match(&email.replacement));
    assert!(Regex::new(r"^\d{3}-\d{3}-\d{4}$").unwrap().is_match(&phone.replacement));

    let expected = format!("Contact {} or call {}", email.replacement, phone.replacement);
    assert_eq!(report.anonymized_text, expected);
}

/// Tests that unmatched text is preserved byte for byte.
#[test]
fn test_unmatched_text_preserved() {
    let mut engine = seeded_engine();
    let report = engine.anonymize_with_report(pii_samples::MIXED_PII).unwrap();

    assert_eq!(report.count_found, report.replacements.len());
    assert_splices_exact(&report);
    assert!(!report.anonymized_text.contains("123-45-6789"));
    assert!(!report.anonymized_text.contains("192.168.1.100"));
}

/// Tests that replacements are reported in ascending position order.
#[test]
fn test_replacements_ascending() {
    let mut engine = seeded_engine();
    let report = engine.anonymize_with_report(pii_samples::MIXED_PII).unwrap();

    for pair in report.replacements.windows(2) {
        assert!(pair[0].position < pair[1].position);
    }
}

/// Tests determinism with a fixed seed across engines.
#[test]
fn test_same_seed_same_output() {
    let mut a = seeded_engine();
    let mut b = seeded_engine();

    let text = pii_samples::MIXED_PII;
    assert_eq!(a.anonymize(text).unwrap(), b.anonymize(text).unwrap());
}

/// Tests that equal originals get equal replacements within an engine.
#[test]
fn test_consistent_replacements() {
    let mut engine = seeded_engine();
    let first = engine.anonymize_with_report("Email a@b.io").unwrap();
    let second = engine.anonymize_with_report("Reply to a@b.io please").unwrap();

    assert_eq!(
        first.replacements[0].replacement,
        second.replacements[0].replacement
    );
    assert_eq!(engine.generator().cached("a@b.io"), Some(first.replacements[0].replacement.as_str()));
}

/// Tests that output stays valid after clearing the cache.
#[test]
fn test_clear_cache_keeps_engine_usable() {
    let mut engine = seeded_engine();
    engine.anonymize("SSN 123-45-6789").unwrap();
    engine.clear_cache();
    assert_eq!(engine.generator().cache_len(), 0);

    let report = engine.anonymize_with_report("SSN 123-45-6789").unwrap();
    assert!(is_valid_ssn(&report.replacements[0].replacement));
}

/// Tests non-consistent mode.
#[test]
fn test_non_consistent_mode() {
    let config = ProtectorConfig::new()
        .with_seed(TEST_SEED)
        .with_consistency(false);
    let mut engine = engine_with(config);

    let report = engine.anonymize_with_report("a@b.io a@b.io").unwrap();
    assert_eq!(report.count_found, 2);
    assert_eq!(engine.generator().cache_len(), 0);
    assert_splices_exact(&report);
}

/// Tests format preservation for cards.
#[test]
fn test_card_shape_preserved() {
    let mut engine = seeded_engine();
    let cases = [
        ("Card: 4111-1111-1111-1111", r"^\d{4}-\d{4}-\d{4}-\d{4}$"),
        ("Visa: 4111 1111 1111 1111", r"^\d{4} \d{4} \d{4} \d{4}$"),
        ("Card 4111111111111111", r"^\d{16}$"),
    ];

    for (text, shape) in cases {
        let report = engine.anonymize_with_report(text).unwrap();
        let replacement = &report.replacements[0].replacement;
        assert!(Regex::new(shape).unwrap().is_match(replacement), "{replacement}");
        assert!(is_luhn_valid(replacement), "{replacement}");
    }
}

/// Tests format preservation for phones.
#[test]
fn test_phone_shape_preserved() {
    let mut engine = seeded_engine();
    let cases = [
        ("Phone: (555) 123-4567", r"^\(\d{3}\) \d{3}-\d{4}$"),
        ("Mobile: 555.123.4567", r"^\d{3}\.\d{3}\.\d{4}$"),
        ("Contact: +1-555-123-4567", r"^\+1-\d{3}-\d{3}-\d{4}$"),
    ];

    for (text, shape) in cases {
        let report = engine.anonymize_with_report(text).unwrap();
        let replacement = &report.replacements[0].replacement;
        assert!(Regex::new(shape).unwrap().is_match(replacement), "{replacement}");
    }
}

/// Tests format preservation for dates.
#[test]
fn test_date_shape_preserved() {
    let mut engine = seeded_engine();
    let cases = [
        ("Born 1985-03-14", r"^\d{4}-\d{2}-\d{2}$"),
        ("DOB: 03/14/1985", r"^\d{2}/\d{2}/\d{4}$"),
        ("Joined on March 14, 1985", r"^[A-Z][a-z]+ \d{1,2}, \d{4}$"),
        ("Joined on March 14 1985", r"^[A-Z][a-z]+ \d{1,2} \d{4}$"),
        ("Joined on Mar 14 1985", r"^[A-Z][a-z]{2} \d{1,2} \d{4}$"),
    ];

    for (text, shape) in cases {
        let report = engine.anonymize_with_report(text).unwrap();
        let replacement = &report.replacements[0].replacement;
        assert!(Regex::new(shape).unwrap().is_match(replacement), "{replacement}");
    }
}

/// Tests that a backend span enclosing a local match is replaced as a whole.
#[test]
fn test_backend_span_enclosing_local_match() {
    let text = "Addr: Apt 4, 1600 Pennsylvania Avenue NW Washington DC";
    let address = Match::new(PiiCategory::PostalAddress, &text[6..], 6, text.len(), 0.7);
    let mut engine = seeded_engine().with_backend(Box::new(MockBackend::new(vec![address])));

    let report = engine.anonymize_with_report(text).unwrap();
    assert_eq!(report.count_found, 2);
    assert_eq!(report.replacements.len(), 2);
    assert_eq!(report.replacements[0].position, 6);
    assert_eq!(report.replacements[1].original, "1600 Pennsylvania Avenue");

    let anonymized = &report.anonymized_text;
    assert_eq!(*anonymized, format!("Addr: {}", report.replacements[0].replacement));
    assert!(!anonymized.contains("Apt 4"));
    assert!(!anonymized.contains("Pennsylvania"));
    assert!(!anonymized.contains("NW Washington DC"));
}

/// Tests that a backend span straddling a local match leaves nothing behind.
#[test]
fn test_backend_span_straddling_local_match() {
    let text = "mail a@b.io Ann Lee";
    let name = Match::new(PiiCategory::PersonName, "b.io Ann Lee", 7, text.len(), 0.7);
    let mut engine = seeded_engine().with_backend(Box::new(MockBackend::new(vec![name])));

    let report = engine.anonymize_with_report(text).unwrap();
    assert_eq!(report.count_found, 2);
    let expected = format!(
        "mail {}{}",
        report.replacements[0].replacement, report.replacements[1].replacement
    );
    assert_eq!(report.anonymized_text, expected);
    assert!(!report.anonymized_text.contains("Ann Lee"));
}

/// Tests empty input.
#[test]
fn test_empty_input() {
    let mut engine = seeded_engine();
    let report = engine.anonymize_with_report("").unwrap();

    assert_eq!(report.count_found, 0);
    assert_eq!(report.original_text, "");
    assert_eq!(report.anonymized_text, "");
    assert!(report.replacements.is_empty());
}

/// Tests that clean text passes through unchanged.
#[test]
fn test_clean_text_unchanged() {
    let mut engine = seeded_engine();
    for sample in pii_samples::CLEAN_TEXT {
        assert_eq!(engine.anonymize(sample).unwrap(), *sample);
    }
}

/// Tests locale-specific names from a backend.
#[test]
fn test_locale_names() {
    let config = ProtectorConfig::new()
        .with_seed(TEST_SEED)
        .with_locale("fr_FR")
        .with_backend("lexicon", serde_json::json!({"terms": ["Alice Martin"]}));
    let mut engine = engine_with(config);

    let report = engine.anonymize_with_report("Signed, Alice Martin").unwrap();
    assert_eq!(report.replacements[0].category, PiiCategory::PersonName);
    assert_eq!(report.replacements[0].replacement.split_whitespace().count(), 2);
    assert!(report.anonymized_text.starts_with("Signed, "));
}

/// Tests processing a file and writing the result.
#[test]
fn test_process_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    let output = dir.path().join("notes.anonymized.txt");
    std::fs::write(&input, pii_samples::MIXED_PII).unwrap();

    let mut engine = seeded_engine();
    let report = engine.process_file(&input, Some(output.as_path())).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, report.anonymized_text);
    assert_eq!(report.original_text, pii_samples::MIXED_PII);
}

/// Tests that a missing input file is an I/O error.
#[test]
fn test_process_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = seeded_engine();

    let err = engine.process_file(dir.path().join("missing.txt"), None).unwrap_err();
    assert!(matches!(err, AnonymizeError::Io(_)));
}

/// Tests batch processing with a shared cache.
#[test]
fn test_process_batch() {
    let mut engine = seeded_engine();
    let texts = ["SSN 123-45-6789", "nothing here", "again 123-45-6789"];
    let reports: Vec<_> = engine
        .process_batch(&texts)
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[1].count_found, 0);
    assert_eq!(
        reports[0].replacements[0].replacement,
        reports[2].replacements[0].replacement
    );
}

/// Tests report export.
#[test]
fn test_report_export() {
    let mut engine = seeded_engine();
    let report = engine
        .anonymize_with_report("Contact john@example.com or call 555-123-4567")
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&report.export(ReportFormat::Json).unwrap()).unwrap();
    assert_eq!(json["summary"]["pii_found"], 2);
    assert_eq!(json["replacements"][0]["type"], "email");
    assert_eq!(json["replacements"][1]["position"], 33);

    let text = report.export(ReportFormat::Text).unwrap();
    assert!(text.contains("  [phone] 555-123-4567 -> "));
}
