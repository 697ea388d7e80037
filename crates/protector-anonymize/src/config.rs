//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::locale::Locale;
use crate::{AnonymizeError, AnonymizeResult};
use protector_core::PiiCategory;

/// Anonymization engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectorConfig {
    /// Categories to detect (empty = all built-in categories).
    pub enabled_categories: Vec<PiiCategory>,
    /// Locale for synthetic names and addresses.
    pub locale: String,
    /// Map equal originals to equal replacements.
    pub consistent_replacements: bool,
    /// Base seed for synthetic draws.
    pub seed: Option<u64>,
    /// Attach an external detection backend.
    pub use_external_backend: bool,
    /// Registry name of the backend.
    pub backend_selector: Option<String>,
    /// Backend-specific options.
    pub backend_options: serde_json::Value,
    /// Custom patterns registered at construction.
    pub custom_patterns: Vec<CustomPattern>,
}

impl Default for ProtectorConfig {
    fn default() -> Self {
        Self {
            enabled_categories: Vec::new(),
            locale: default_locale(),
            consistent_replacements: true,
            seed: None,
            use_external_backend: false,
            backend_selector: None,
            backend_options: serde_json::Value::Null,
            custom_patterns: Vec::new(),
        }
    }
}

impl ProtectorConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts detection to the given categories.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = PiiCategory>) -> Self {
        self.enabled_categories = categories.into_iter().collect();
        self
    }

    /// Sets the locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Sets the base seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Toggles consistent replacements.
    #[must_use]
    pub fn with_consistency(mut self, consistent: bool) -> Self {
        self.consistent_replacements = consistent;
        self
    }

    /// Selects an external backend.
    #[must_use]
    pub fn with_backend(mut self, selector: impl Into<String>, options: serde_json::Value) -> Self {
        self.use_external_backend = true;
        self.backend_selector = Some(selector.into());
        self.backend_options = options;
        self
    }

    /// Adds a custom pattern.
    #[must_use]
    pub fn with_custom_pattern(
        mut self,
        label: impl Into<String>,
        pattern: impl Into<String>,
        confidence: f64,
    ) -> Self {
        self.custom_patterns.push(CustomPattern {
            label: label.into(),
            pattern: pattern.into(),
            confidence,
        });
        self
    }

    /// Parses the configured locale.
    pub fn parsed_locale(&self) -> AnonymizeResult<Locale> {
        self.locale.parse()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AnonymizeResult<()> {
        self.parsed_locale()?;

        if self.use_external_backend && self.backend_selector.is_none() {
            return Err(AnonymizeError::InvalidConfig(
                "use_external_backend is set but no backend_selector was given".to_string(),
            ));
        }

        for custom in &self.custom_patterns {
            if custom.label.trim().is_empty() {
                return Err(AnonymizeError::InvalidConfig(format!(
                    "custom pattern '{}' has an empty label",
                    custom.pattern
                )));
            }
        }

        Ok(())
    }
}

/// A caller-supplied pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPattern {
    /// Custom category label.
    pub label: String,
    /// Regular expression source, compiled as given.
    pub pattern: String,
    /// Confidence score (0.0 - 1.0).
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_locale() -> String {
    Locale::default().code().to_string()
}

fn default_confidence() -> f64 {
    0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProtectorConfig::default();
        assert!(config.enabled_categories.is_empty());
        assert_eq!(config.locale, "en_US");
        assert!(config.consistent_replacements);
        assert!(!config.use_external_backend);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ProtectorConfig = serde_json::from_str(
            r#"{
                "enabled_categories": ["email", "ssn"],
                "seed": 7,
                "custom_patterns": [{"label": "employee_id", "pattern": "EMP-\\d{6}"}]
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.enabled_categories,
            vec![PiiCategory::Email, PiiCategory::NationalId]
        );
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.locale, "en_US");
        assert_eq!(config.custom_patterns[0].confidence, 0.8);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ProtectorConfig::new().with_locale("tlh_QO");
        assert_eq!(config.validate().unwrap_err().code(), "ANON_INVALID_CONFIG");

        let mut config = ProtectorConfig::new();
        config.use_external_backend = true;
        assert!(config.validate().is_err());

        let config = ProtectorConfig::new().with_custom_pattern(" ", r"\d", 0.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = ProtectorConfig::new()
            .with_categories([PiiCategory::Email])
            .with_locale("de-DE")
            .with_seed(3)
            .with_consistency(false)
            .with_backend("lexicon", serde_json::json!({"terms": ["Ann"]}));

        assert_eq!(config.parsed_locale().unwrap(), Locale::DeDe);
        assert!(config.use_external_backend);
        assert_eq!(config.backend_selector.as_deref(), Some("lexicon"));
        assert!(config.validate().is_ok());
    }
}
