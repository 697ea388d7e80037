//! PII pattern catalog.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{AnonymizeError, AnonymizeResult};
use protector_core::PiiCategory;

/// Built-in rule definitions, in scan order.
pub static BUILTIN_RULES: Lazy<Vec<RuleSpec>> = Lazy::new(builtin_rules);

/// A detection rule definition (uncompiled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Rule name.
    pub name: String,
    /// Category this rule detects.
    pub category: PiiCategory,
    /// Regular expression source.
    pub regex: String,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f64,
    /// Compile with case-insensitive matching.
    pub case_insensitive: bool,
}

impl RuleSpec {
    /// Creates a case-insensitive rule with the default confidence.
    pub fn new(name: impl Into<String>, category: PiiCategory, regex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category,
            regex: regex.into(),
            confidence: 0.8,
            case_insensitive: true,
        }
    }

    /// Sets confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Makes the rule case-sensitive.
    #[must_use]
    pub fn case_sensitive(mut self) -> Self {
        self.case_insensitive = false;
        self
    }
}

/// A compiled rule ready for matching.
#[derive(Debug, Clone)]
pub struct PatternRule {
    spec: RuleSpec,
    regex: Regex,
}

impl PatternRule {
    /// Compiles a rule, rejecting invalid patterns and out-of-range confidences.
    pub fn compile(spec: RuleSpec) -> AnonymizeResult<Self> {
        if !(0.0..=1.0).contains(&spec.confidence) {
            return Err(AnonymizeError::invalid_pattern(
                &spec.regex,
                format!("confidence {} is outside [0, 1]", spec.confidence),
            ));
        }

        let regex = RegexBuilder::new(&spec.regex)
            .case_insensitive(spec.case_insensitive)
            .build()
            .map_err(|e| AnonymizeError::invalid_pattern(&spec.regex, e.to_string()))?;

        Ok(Self { spec, regex })
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Returns the category this rule detects.
    #[must_use]
    pub fn category(&self) -> &PiiCategory {
        &self.spec.category
    }

    /// Returns the confidence score.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.spec.confidence
    }

    /// Returns the pattern source.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.spec.regex
    }

    /// Returns the rule definition.
    #[must_use]
    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    /// Returns the spans of all non-overlapping, non-empty matches in text.
    pub fn find_spans<'t>(&'t self, text: &'t str) -> impl Iterator<Item = (usize, usize)> + 't {
        self.regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), m.end()))
    }
}

/// Immutable table of detection rules grouped by category.
///
/// Category order is priority order: the detector scans groups in order and
/// earlier hits shadow later overlapping ones. Custom rules form the last
/// group.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    groups: Vec<(PiiCategory, Vec<PatternRule>)>,
    custom: Vec<PatternRule>,
}

impl PatternCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog with every built-in rule.
    pub fn builtin() -> AnonymizeResult<Self> {
        Self::with_categories(&[])
    }

    /// Creates a catalog restricted to the given built-in categories
    /// (empty = all). Custom categories in the list are ignored; custom rules
    /// are added with [`PatternCatalog::add_custom_rule`].
    pub fn with_categories(enabled: &[PiiCategory]) -> AnonymizeResult<Self> {
        let mut catalog = Self::new();
        for category in PiiCategory::BUILTIN {
            if enabled.is_empty() || enabled.contains(&category) {
                catalog.groups.push((category, Vec::new()));
            }
        }

        for spec in BUILTIN_RULES.iter() {
            if let Some((_, rules)) = catalog.groups.iter_mut().find(|(c, _)| *c == spec.category) {
                rules.push(PatternRule::compile(spec.clone())?);
            }
        }

        Ok(catalog)
    }

    /// Creates a catalog from explicit rule definitions. Groups are ordered by
    /// first appearance; custom-category rules go to the custom group.
    pub fn from_rules(rules: impl IntoIterator<Item = RuleSpec>) -> AnonymizeResult<Self> {
        let mut catalog = Self::new();
        for spec in rules {
            let rule = PatternRule::compile(spec)?;
            catalog.push(rule);
        }
        Ok(catalog)
    }

    fn push(&mut self, rule: PatternRule) {
        if rule.category().is_custom() {
            self.custom.push(rule);
            return;
        }
        match self.groups.iter_mut().find(|(c, _)| c == rule.category()) {
            Some((_, rules)) => rules.push(rule),
            None => self.groups.push((rule.category().clone(), vec![rule])),
        }
    }

    /// Appends a rule to the custom group. Rules are never removed.
    pub fn add_custom_rule(
        &mut self,
        label: impl Into<String>,
        pattern: &str,
        confidence: f64,
    ) -> AnonymizeResult<()> {
        let label = label.into();
        let spec = RuleSpec::new(
            format!("custom_{label}"),
            PiiCategory::Custom(label),
            pattern,
        )
        .with_confidence(confidence)
        .case_sensitive();

        self.custom.push(PatternRule::compile(spec)?);
        Ok(())
    }

    /// Returns the rules for a category, in authoring order.
    #[must_use]
    pub fn rules_for(&self, category: &PiiCategory) -> Vec<&PatternRule> {
        if category.is_custom() {
            return self
                .custom
                .iter()
                .filter(|r| r.category() == category)
                .collect();
        }
        self.groups
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, rules)| rules.iter().collect())
            .unwrap_or_default()
    }

    /// Returns the enabled categories.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<PiiCategory> {
        self.groups
            .iter()
            .map(|(c, _)| c.clone())
            .chain(self.custom.iter().map(|r| r.category().clone()))
            .collect()
    }

    /// Returns true if the category is enabled.
    #[must_use]
    pub fn is_enabled(&self, category: &PiiCategory) -> bool {
        if category.is_custom() {
            self.custom.iter().any(|r| r.category() == category)
        } else {
            self.groups.iter().any(|(c, _)| c == category)
        }
    }

    /// Iterates over all rules in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &PatternRule> {
        self.groups
            .iter()
            .flat_map(|(_, rules)| rules.iter())
            .chain(self.custom.iter())
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, r)| r.len()).sum::<usize>() + self.custom.len()
    }

    /// Returns true if the catalog has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn builtin_rules() -> Vec<RuleSpec> {
    vec![
        // Email
        RuleSpec::new(
            "email",
            PiiCategory::Email,
            r"\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b",
        )
        .with_confidence(0.99),
        // Phone (NANP, international, national trunk prefix)
        RuleSpec::new(
            "phone_nanp",
            PiiCategory::Phone,
            r"(?:\+1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b",
        )
        .with_confidence(0.95),
        RuleSpec::new(
            "phone_intl",
            PiiCategory::Phone,
            r"\+[1-9]\d{0,3}(?:[-.\s]?\d{2,4}){2,5}\b",
        )
        .with_confidence(0.90),
        RuleSpec::new("phone_trunk", PiiCategory::Phone, r"\b0[2-9]\d{7,8}\b").with_confidence(0.90),
        // National ID (US SSN shape)
        RuleSpec::new(
            "ssn",
            PiiCategory::NationalId,
            r"\b\d{3}[-\s]?\d{2}[-\s]?\d{4}\b",
        )
        .with_confidence(0.95),
        // Payment cards
        RuleSpec::new(
            "card_visa",
            PiiCategory::PaymentCard,
            r"\b4\d{3}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b",
        )
        .with_confidence(0.98),
        RuleSpec::new(
            "card_mastercard",
            PiiCategory::PaymentCard,
            r"\b5[1-5]\d{2}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b",
        )
        .with_confidence(0.98),
        RuleSpec::new(
            "card_amex",
            PiiCategory::PaymentCard,
            r"\b3[47]\d{2}[-\s]?\d{6}[-\s]?\d{5}\b",
        )
        .with_confidence(0.98),
        RuleSpec::new(
            "card_generic",
            PiiCategory::PaymentCard,
            r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b",
        )
        .with_confidence(0.85),
        // IP addresses
        RuleSpec::new(
            "ipv4",
            PiiCategory::IpAddress,
            r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b",
        )
        .with_confidence(0.99)
        .case_sensitive(),
        RuleSpec::new(
            "ipv6",
            PiiCategory::IpAddress,
            r"\b(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}\b",
        )
        .with_confidence(0.99)
        .case_sensitive(),
        // Dates
        RuleSpec::new("date_iso", PiiCategory::Date, r"\b\d{4}[-/]\d{2}[-/]\d{2}\b").with_confidence(0.90),
        RuleSpec::new(
            "date_us",
            PiiCategory::Date,
            r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b",
        )
        .with_confidence(0.85),
        RuleSpec::new(
            "date_written",
            PiiCategory::Date,
            r"\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}\b",
        )
        .with_confidence(0.90),
        // Postal address (capitalised street words)
        RuleSpec::new(
            "street_address",
            PiiCategory::PostalAddress,
            r"\b\d{1,5}\s+(?:[A-Z][A-Za-z0-9'-]*\.?\s+){1,4}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Way|Place|Pl|Terrace|Square|Sq)\b\.?",
        )
        .with_confidence(0.75)
        .case_sensitive(),
        // Travel and driving documents
        RuleSpec::new("passport", PiiCategory::Passport, r"\b[a-z]{1,2}\d{6,9}\b").with_confidence(0.70),
        RuleSpec::new(
            "driver_license",
            PiiCategory::DriverLicense,
            r"\b[a-z]{1,2}\d{5,8}\b",
        )
        .with_confidence(0.60),
        // Bank accounts
        RuleSpec::new(
            "iban",
            PiiCategory::BankAccount,
            r"\b[a-z]{2}\d{2}[a-z0-9]{4}\d{7}[a-z0-9]{0,16}\b",
        )
        .with_confidence(0.95),
        RuleSpec::new("account_number", PiiCategory::BankAccount, r"\b\d{8,17}\b").with_confidence(0.50),
    ]
}
