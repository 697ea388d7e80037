//! External detection backends.
//!
//! A backend is any detector beyond the pattern catalog (dictionaries, NER
//! models, remote services). The engine calls it once per text and merges its
//! matches with the local ones. Backends are created by name through a
//! [`BackendRegistry`] so that configuration can select one with a string
//! and a JSON options object.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{AnonymizeError, AnonymizeResult};
use protector_core::{Match, PiiCategory};

/// Detection backend contract.
pub trait DetectionBackend: Send + Sync {
    /// Returns the backend name.
    fn name(&self) -> &str;

    /// Detects PII in text. Returned matches must satisfy the [`Match`]
    /// invariants against `text`.
    fn detect(&self, text: &str) -> AnonymizeResult<Vec<Match>>;
}

/// Factory creating a backend from adapter-specific options.
pub type BackendFactory =
    Box<dyn Fn(&serde_json::Value) -> AnonymizeResult<Box<dyn DetectionBackend>> + Send + Sync>;

/// Named backend factories.
pub struct BackendRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Creates a registry with the built-in backends.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(LexiconBackend::NAME, |options| {
            Ok(Box::new(LexiconBackend::from_options(options)?) as Box<dyn DetectionBackend>)
        });
        registry
    }

    /// Registers a factory, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&serde_json::Value) -> AnonymizeResult<Box<dyn DetectionBackend>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Creates the backend registered under `name`.
    pub fn create(
        &self,
        name: &str,
        options: &serde_json::Value,
    ) -> AnonymizeResult<Box<dyn DetectionBackend>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| AnonymizeError::UnknownBackend(name.to_string()))?;
        factory(options)
    }

    /// Returns true if a factory is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Options for [`LexiconBackend`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconOptions {
    /// Terms to find.
    pub terms: Vec<String>,
    /// Category assigned to every hit.
    pub category: PiiCategory,
    /// Confidence assigned to every hit.
    pub confidence: f64,
    /// Match terms case-sensitively.
    pub case_sensitive: bool,
}

impl Default for LexiconOptions {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            category: PiiCategory::PersonName,
            confidence: 0.80,
            case_sensitive: false,
        }
    }
}

/// Dictionary backend: finds whole-word occurrences of a fixed term list.
#[derive(Debug, Clone)]
pub struct LexiconBackend {
    category: PiiCategory,
    confidence: f64,
    regex: Option<Regex>,
}

impl LexiconBackend {
    /// Registry name.
    pub const NAME: &'static str = "lexicon";

    /// Creates a backend from options.
    pub fn new(options: LexiconOptions) -> AnonymizeResult<Self> {
        if !(0.0..=1.0).contains(&options.confidence) {
            return Err(AnonymizeError::InvalidConfig(format!(
                "lexicon confidence {} is outside [0, 1]",
                options.confidence
            )));
        }

        let mut terms: Vec<&str> = options
            .terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        // Longest first so alternation prefers "Mary Ann" over "Mary".
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();

        let regex = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"\b(?:{alternation})\b");
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(!options.case_sensitive)
                .build()
                .map_err(|e| AnonymizeError::InvalidConfig(format!("lexicon terms: {e}")))?;
            Some(regex)
        };

        Ok(Self {
            category: options.category,
            confidence: options.confidence,
            regex,
        })
    }

    /// Creates a backend from a JSON options object (`null` = defaults).
    pub fn from_options(options: &serde_json::Value) -> AnonymizeResult<Self> {
        let options = if options.is_null() {
            LexiconOptions::default()
        } else {
            serde_json::from_value(options.clone())
                .map_err(|e| AnonymizeError::InvalidConfig(format!("lexicon options: {e}")))?
        };
        Self::new(options)
    }
}

impl DetectionBackend for LexiconBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn detect(&self, text: &str) -> AnonymizeResult<Vec<Match>> {
        let Some(regex) = &self.regex else {
            return Ok(Vec::new());
        };

        Ok(regex
            .find_iter(text)
            .map(|m| {
                Match::new(
                    self.category.clone(),
                    m.as_str(),
                    m.start(),
                    m.end(),
                    self.confidence,
                )
            })
            .collect())
    }
}

/// Checks backend output against the scanned text.
pub(crate) fn validate_matches(backend: &str, text: &str, matches: &[Match]) -> AnonymizeResult<()> {
    for m in matches {
        if !m.is_consistent_with(text) {
            return Err(AnonymizeError::backend(
                backend,
                format!(
                    "invalid match {:?} at [{}, {}) with confidence {}",
                    m.value, m.start, m.end, m.confidence
                ),
            ));
        }
    }
    Ok(())
}
