//! PII detection integration tests.

use std::sync::atomic::Ordering;

use protector_anonymize::{
    AnonymizationEngine, Match, PatternCatalog, PiiCategory, ProtectorConfig, SpanDetector,
};
use serde_json::json;

use crate::common::{engine_with, pii_samples, seeded_engine, FailingBackend, MockBackend};

fn detector() -> SpanDetector {
    SpanDetector::new(PatternCatalog::builtin().unwrap())
}

fn assert_detects(samples: &[&str], category: PiiCategory) {
    let detector = detector();
    for sample in samples {
        let matches = detector.detect(sample);
        assert!(
            matches.iter().any(|m| m.category == category),
            "No {category} detection in: {sample} (got {matches:?})"
        );
    }
}

fn assert_well_formed(text: &str, matches: &[Match]) {
    for m in matches {
        assert!(m.start < m.end);
        assert_eq!(&text[m.start..m.end], m.value, "offsets of {m:?}");
    }
    for pair in matches.windows(2) {
        assert!(pair[0].start <= pair[1].start, "not sorted: {pair:?}");
    }
}

/// Tests detecting email addresses.
#[test]
fn test_detect_emails() {
    assert_detects(pii_samples::EMAILS, PiiCategory::Email);
}

/// Tests detecting phone numbers.
#[test]
fn test_detect_phone_numbers() {
    assert_detects(pii_samples::PHONES, PiiCategory::Phone);
}

/// Tests detecting SSNs.
#[test]
fn test_detect_ssns() {
    assert_detects(pii_samples::SSNS, PiiCategory::NationalId);
}

/// Tests detecting credit card numbers.
#[test]
fn test_detect_credit_cards() {
    assert_detects(pii_samples::CREDIT_CARDS, PiiCategory::PaymentCard);
}

/// Tests detecting IP addresses.
#[test]
fn test_detect_ip_addresses() {
    assert_detects(pii_samples::IP_ADDRESSES, PiiCategory::IpAddress);
}

/// Tests detecting dates.
#[test]
fn test_detect_dates() {
    assert_detects(pii_samples::DATES, PiiCategory::Date);
}

/// Tests that clean text yields no matches.
#[test]
fn test_clean_text_has_no_pii() {
    let detector = detector();
    for sample in pii_samples::CLEAN_TEXT {
        let matches = detector.detect(sample);
        assert!(matches.is_empty(), "False positive in {sample}: {matches:?}");
    }
}

/// Tests mixed content: every category found, matches disjoint and offsets exact.
#[test]
fn test_mixed_pii_is_disjoint() {
    let text = pii_samples::MIXED_PII;
    let matches = detector().detect(text);

    assert_well_formed(text, &matches);
    for pair in matches.windows(2) {
        assert!(pair[0].end <= pair[1].start, "overlap: {pair:?}");
    }

    let categories: Vec<_> = matches.iter().map(|m| m.category.clone()).collect();
    for expected in [
        PiiCategory::NationalId,
        PiiCategory::Email,
        PiiCategory::Phone,
        PiiCategory::PaymentCard,
        PiiCategory::IpAddress,
    ] {
        assert!(categories.contains(&expected), "missing {expected}");
    }
}

/// Tests that a 16-digit Visa number is a card, not a bank account.
#[test]
fn test_card_has_priority_over_account_number() {
    let matches = detector().detect("Pay with 4111111111111111 today");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].category, PiiCategory::PaymentCard);
    assert_eq!(matches[0].value, "4111111111111111");
}

/// Tests that a lone SSN-shaped token gives exactly one match.
#[test]
fn test_lone_ssn() {
    let matches = detector().detect("123-45-6789");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].category, PiiCategory::NationalId);
}

/// Tests byte offsets in non-ASCII text.
#[test]
fn test_offsets_in_unicode_text() {
    let text = "Grüße an jürgen.m@example.de — Tel. 555-123-4567";
    let matches = detector().detect(text);

    assert_well_formed(text, &matches);
    assert!(matches.iter().any(|m| m.category == PiiCategory::Phone));
    let phone = matches.iter().find(|m| m.category == PiiCategory::Phone).unwrap();
    assert_eq!(phone.end, text.len());
}

/// Tests restricting detection to selected categories.
#[test]
fn test_enabled_categories_filter() {
    let engine = engine_with(ProtectorConfig::new().with_categories([PiiCategory::Email]));
    let matches = engine.detect(pii_samples::MIXED_PII).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].category, PiiCategory::Email);
}

/// Tests custom patterns from configuration and at runtime.
#[test]
fn test_custom_patterns() {
    let config = ProtectorConfig::new().with_custom_pattern("ticket", r"TCK-\d{4}", 0.9);
    let mut engine = engine_with(config);
    engine.add_custom_rule("badge", r"(?i)badge#\d+", 0.7).unwrap();

    let matches = engine.detect("TCK-1234 and BADGE#77").unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].category, PiiCategory::custom("ticket"));
    assert_eq!(matches[0].confidence, 0.9);
    assert_eq!(matches[1].category, PiiCategory::custom("badge"));
}

/// Tests that custom rules never shadow built-in matches.
#[test]
fn test_custom_rules_scan_last() {
    let mut engine = seeded_engine();
    engine.add_custom_rule("digits", r"\d{3}-\d{2}-\d{4}", 0.99).unwrap();

    let matches = engine.detect("SSN: 123-45-6789").unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].category, PiiCategory::NationalId);
}

/// Tests merging matches from the lexicon backend.
#[test]
fn test_lexicon_backend_merge() {
    let config = ProtectorConfig::new().with_backend("lexicon", json!({"terms": ["John Smith"]}));
    let engine = engine_with(config);

    let text = pii_samples::MIXED_PII;
    let matches = engine.detect(text).unwrap();
    assert_well_formed(text, &matches);

    let name = matches
        .iter()
        .find(|m| m.category == PiiCategory::PersonName)
        .expect("name from backend");
    assert_eq!(name.value, "John Smith");
    assert_eq!(name.confidence, 0.80);
}

/// Tests that the backend is invoked once per text and exact duplicates are skipped.
#[test]
fn test_backend_called_once_and_duplicates_skipped() {
    let text = "mail a@b.io";
    let backend = MockBackend::new(vec![
        Match::new(PiiCategory::Email, "a@b.io", 5, 11, 0.4),
        Match::new(PiiCategory::custom("word"), "mail", 0, 4, 0.3),
    ]);
    let calls = backend.call_counter();
    let mut engine = seeded_engine().with_backend(Box::new(backend));

    let report = engine.anonymize_with_report(text).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.count_found, 2);
    // Local match kept its confidence.
    assert_eq!(report.replacements[1].confidence, 0.99);
}

/// Tests that backend failures propagate without a regex-only fallback.
#[test]
fn test_backend_failure_propagates() {
    let mut engine = seeded_engine().with_backend(Box::new(FailingBackend));

    let err = engine.anonymize("mail a@b.io").unwrap_err();
    assert_eq!(err.code(), "ANON_BACKEND_ERROR");
    assert!(err.is_recoverable());
}

/// Tests rejection of malformed backend output.
#[test]
fn test_backend_output_validated() {
    let text = "héllo";
    // Byte 2 is inside 'é'.
    let backend = MockBackend::new(vec![Match::new(PiiCategory::PersonName, "h", 0, 2, 0.5)]);
    let engine = seeded_engine().with_backend(Box::new(backend));

    assert!(engine.detect(text).is_err());
}

/// Tests unknown backend selectors.
#[test]
fn test_unknown_backend_selector() {
    let config = ProtectorConfig::new().with_backend("presidio", json!({}));
    let err = AnonymizationEngine::new(config).unwrap_err();
    assert_eq!(err.code(), "ANON_UNKNOWN_BACKEND");
}
