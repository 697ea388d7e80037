//! Main anonymization engine.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, warn};

use crate::backend::{validate_matches, BackendRegistry, DetectionBackend};
use crate::config::ProtectorConfig;
use crate::detector::SpanDetector;
use crate::generator::{SubstitutionGenerator, Synthesizer};
use crate::patterns::PatternCatalog;
use crate::report::{AnonymizationReport, Replacement};
use crate::{AnonymizeError, AnonymizeResult};
use protector_core::Match;

/// Detects PII, substitutes synthetic values and reports what changed.
///
/// The engine owns its pattern catalog and its replacement cache. Methods that
/// generate replacements take `&mut self`; callers that share an engine
/// across threads wrap it in a mutex.
pub struct AnonymizationEngine {
    detector: SpanDetector,
    generator: SubstitutionGenerator,
    backend: Option<Box<dyn DetectionBackend>>,
    config: ProtectorConfig,
}

impl AnonymizationEngine {
    /// Creates an engine, resolving backends from the built-in registry.
    pub fn new(config: ProtectorConfig) -> AnonymizeResult<Self> {
        Self::with_registry(config, &BackendRegistry::default())
    }

    /// Creates an engine, resolving backends from `registry`.
    pub fn with_registry(config: ProtectorConfig, registry: &BackendRegistry) -> AnonymizeResult<Self> {
        config.validate()?;
        let locale = config.parsed_locale()?;

        let mut catalog = PatternCatalog::with_categories(&config.enabled_categories)?;
        for custom in &config.custom_patterns {
            catalog.add_custom_rule(custom.label.as_str(), &custom.pattern, custom.confidence)?;
        }

        let backend = match (config.use_external_backend, config.backend_selector.as_deref()) {
            (true, Some(selector)) => Some(registry.create(selector, &config.backend_options)?),
            (true, None) => {
                return Err(AnonymizeError::InvalidConfig(
                    "no backend selector configured".to_string(),
                ))
            }
            (false, _) => None,
        };

        debug!(
            rules = catalog.len(),
            locale = %locale,
            consistent = config.consistent_replacements,
            backend = ?backend.as_ref().map(|b| b.name()),
            "Engine created"
        );

        Ok(Self {
            detector: SpanDetector::new(catalog),
            generator: SubstitutionGenerator::new(
                locale,
                config.consistent_replacements,
                config.seed,
            ),
            backend,
            config,
        })
    }

    /// Attaches a detection backend, replacing any configured one.
    #[must_use]
    pub fn with_backend(mut self, backend: Box<dyn DetectionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ProtectorConfig {
        &self.config
    }

    /// Returns the pattern catalog.
    #[must_use]
    pub fn catalog(&self) -> &PatternCatalog {
        self.detector.catalog()
    }

    /// Returns the replacement generator.
    #[must_use]
    pub fn generator(&self) -> &SubstitutionGenerator {
        &self.generator
    }

    /// Returns the attached backend's name.
    #[must_use]
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.name())
    }

    /// Adds a custom detection pattern.
    pub fn add_custom_rule(
        &mut self,
        label: impl Into<String>,
        pattern: &str,
        confidence: f64,
    ) -> AnonymizeResult<()> {
        self.detector.add_custom_rule(label, pattern, confidence)
    }

    /// Registers a synthesizer for a custom category label.
    pub fn register_synthesizer(
        &mut self,
        label: impl Into<String>,
        synthesizer: impl Synthesizer + 'static,
    ) {
        self.generator.register_synthesizer(label, synthesizer);
    }

    /// Drops every cached replacement.
    pub fn clear_cache(&mut self) {
        self.generator.clear_cache();
    }

    /// Detects PII, merging backend matches when a backend is attached.
    ///
    /// Returns matches sorted by start offset (ties: longer span first). Local
    /// matches are disjoint; backend matches may partially overlap them.
    pub fn detect(&self, text: &str) -> AnonymizeResult<Vec<Match>> {
        let mut matches = self.detector.detect(text);

        if let Some(backend) = &self.backend {
            let found = backend.detect(text)?;
            validate_matches(backend.name(), text, &found)?;

            let mut spans: HashSet<(usize, usize)> =
                matches.iter().map(|m| (m.start, m.end)).collect();
            let before = matches.len();
            for m in found {
                if spans.insert((m.start, m.end)) {
                    matches.push(m);
                }
            }
            debug!(
                backend = backend.name(),
                added = matches.len() - before,
                "Merged backend matches"
            );

            matches.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        }

        Ok(matches)
    }

    /// Anonymizes text.
    pub fn anonymize(&mut self, text: &str) -> AnonymizeResult<String> {
        Ok(self.anonymize_with_report(text)?.anonymized_text)
    }

    /// Anonymizes text and reports every replacement.
    pub fn anonymize_with_report(&mut self, text: &str) -> AnonymizeResult<AnonymizationReport> {
        let start = Instant::now();

        let matches = self.detect(text)?;
        if matches.is_empty() {
            return Ok(AnonymizationReport::unchanged(text, start.elapsed()));
        }

        let (anonymized_text, replacements) = self.apply_replacements(text, &matches);

        let report = AnonymizationReport {
            original_text: text.to_string(),
            anonymized_text,
            replacements,
            count_found: matches.len(),
            elapsed: start.elapsed(),
        };
        debug!(
            found = report.count_found,
            elapsed_ms = report.processing_time_ms(),
            "Anonymization complete"
        );
        Ok(report)
    }

    /// Rebuilds text left to right, replacing every byte covered by a match.
    ///
    /// Overlapping matches form one replaced region: each match writes its
    /// replacement over the part of its span not already replaced, so no
    /// byte inside the union of the spans survives. A match wholly inside an
    /// earlier one is still generated and reported.
    fn apply_replacements(&mut self, text: &str, matches: &[Match]) -> (String, Vec<Replacement>) {
        let mut ordered: Vec<&Match> = matches.iter().collect();
        ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut result = String::with_capacity(text.len());
        let mut replacements = Vec::with_capacity(ordered.len());
        // End of the text already emitted.
        let mut cursor = 0;

        for m in ordered {
            let replacement = self.generator.generate(&m.category, &m.value);
            let start = m.start.max(cursor);

            if m.end > start {
                if start > m.start {
                    warn!(
                        category = %m.category,
                        start = m.start,
                        end = m.end,
                        trimmed_start = start,
                        "Trimming overlapping match"
                    );
                }
                result.push_str(&text[cursor..start]);
                result.push_str(&replacement);
                cursor = m.end;
            } else {
                warn!(
                    category = %m.category,
                    start = m.start,
                    end = m.end,
                    "Match covered by a replaced region, not spliced"
                );
            }

            replacements.push(Replacement {
                category: m.category.clone(),
                original: m.value.clone(),
                replacement,
                position: m.start,
                confidence: m.confidence,
            });
        }

        result.push_str(&text[cursor..]);
        (result, replacements)
    }

    /// Anonymizes a UTF-8 file, optionally writing the result to `output`.
    pub fn process_file(
        &mut self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
    ) -> AnonymizeResult<AnonymizationReport> {
        let input = input.as_ref();
        let text = std::fs::read_to_string(input)?;
        let report = self.anonymize_with_report(&text)?;

        if let Some(output) = output {
            std::fs::write(output, &report.anonymized_text)?;
            debug!(input = %input.display(), output = %output.display(), "Wrote anonymized file");
        }

        Ok(report)
    }

    /// Anonymizes several texts in order, sharing the replacement cache.
    pub fn process_batch<S: AsRef<str>>(
        &mut self,
        texts: &[S],
    ) -> Vec<AnonymizeResult<AnonymizationReport>> {
        texts
            .iter()
            .map(|t| self.anonymize_with_report(t.as_ref()))
            .collect()
    }
}

impl std::fmt::Debug for AnonymizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnonymizationEngine")
            .field("detector", &self.detector)
            .field("generator", &self.generator)
            .field("backend", &self.backend_name())
            .finish_non_exhaustive()
    }
}
