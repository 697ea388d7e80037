//! Test fixtures.

use protector_anonymize::{AnonymizationEngine, ProtectorConfig};

/// Seed used by engines that need reproducible output.
pub const TEST_SEED: u64 = 0x5EED;

/// Creates an engine with the default configuration and a fixed seed.
pub fn seeded_engine() -> AnonymizationEngine {
    AnonymizationEngine::new(ProtectorConfig::new().with_seed(TEST_SEED))
        .expect("default configuration is valid")
}

/// Creates an engine from a configuration.
pub fn engine_with(config: ProtectorConfig) -> AnonymizationEngine {
    AnonymizationEngine::new(config).expect("test configuration is valid")
}

/// PII test samples.
pub mod pii_samples {
    /// Samples containing email addresses.
    pub const EMAILS: &[&str] = &[
        "Contact me at john.doe@example.com",
        "Send feedback to support@company.org",
        "Email: user+tag@subdomain.domain.co.uk",
    ];

    /// Samples containing phone numbers.
    pub const PHONES: &[&str] = &[
        "Call us at 555-123-4567",
        "Phone: (555) 123-4567",
        "Contact: +1-555-123-4567",
        "Mobile: 555.123.4567",
        "London office: +44 20 7946 0958",
    ];

    /// Samples containing SSNs.
    pub const SSNS: &[&str] = &[
        "SSN: 123-45-6789",
        "Social Security Number: 987-65-4321",
        "My SSN is 111-22-3333",
    ];

    /// Samples containing credit card numbers.
    pub const CREDIT_CARDS: &[&str] = &[
        "Card: 4111-1111-1111-1111",
        "Credit card number: 4111111111111111",
        "Visa: 4111 1111 1111 1111",
        "Mastercard 5500 0000 0000 0004",
    ];

    /// Samples containing IP addresses.
    pub const IP_ADDRESSES: &[&str] = &[
        "Server IP: 192.168.1.100",
        "Connect to 10.0.0.1",
        "IPv4 address: 172.16.0.1",
        "IPv6 host 2001:0db8:85a3:0000:0000:8a2e:0370:7334",
    ];

    /// Samples containing dates.
    pub const DATES: &[&str] = &[
        "Born 1985-03-14",
        "DOB: 03/14/1985",
        "Joined on March 14, 1985",
    ];

    /// Clean text samples (no PII).
    pub const CLEAN_TEXT: &[&str] = &[
        "The weather is nice today.",
        "Machine learning models can be trained on large datasets.",
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
    ];

    /// Mixed content with multiple PII types.
    pub const MIXED_PII: &str =
        "Customer John Smith (SSN: 123-45-6789) can be reached at john.smith@example.com or 555-123-4567. \
         Payment was processed with card 4111-1111-1111-1111 from IP 192.168.1.100.";
}
