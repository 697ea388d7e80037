//! Span detection and overlap resolution.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::patterns::PatternCatalog;
use crate::AnonymizeResult;
use protector_core::{Match, PiiCategory};

/// Applies a [`PatternCatalog`] to text and produces a disjoint match set.
///
/// Rules are scanned in catalog order. A hit that overlaps an already
/// accepted span is dropped, so earlier categories (and earlier rules within
/// a category) win.
#[derive(Debug, Clone)]
pub struct SpanDetector {
    catalog: PatternCatalog,
}

impl SpanDetector {
    /// Creates a detector over the given catalog.
    #[must_use]
    pub fn new(catalog: PatternCatalog) -> Self {
        Self { catalog }
    }

    /// Creates a detector with every built-in rule.
    pub fn builtin() -> AnonymizeResult<Self> {
        Ok(Self::new(PatternCatalog::builtin()?))
    }

    /// Returns the catalog.
    #[must_use]
    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Appends a custom rule to the catalog.
    pub fn add_custom_rule(
        &mut self,
        label: impl Into<String>,
        pattern: &str,
        confidence: f64,
    ) -> AnonymizeResult<()> {
        self.catalog.add_custom_rule(label, pattern, confidence)
    }

    /// Detects PII spans, sorted by start offset.
    pub fn detect(&self, text: &str) -> Vec<Match> {
        let mut accepted = AcceptedSpans::default();
        let mut matches = Vec::new();

        if text.is_empty() {
            return matches;
        }

        for rule in self.catalog.iter() {
            for (start, end) in rule.find_spans(text) {
                if let Some((other_start, other_end)) = accepted.overlapping(start, end) {
                    trace!(
                        rule = rule.name(),
                        start,
                        end,
                        other_start,
                        other_end,
                        "Dropping overlapping hit"
                    );
                    continue;
                }

                accepted.insert(start, end);
                matches.push(Match::new(
                    rule.category().clone(),
                    &text[start..end],
                    start,
                    end,
                    rule.confidence(),
                ));
            }
        }

        matches.sort_by_key(|m| m.start);
        debug!(found = matches.len(), text_len = text.len(), "Detection complete");
        matches
    }

    /// Returns true if any rule of the category matches.
    #[must_use]
    pub fn contains(&self, text: &str, category: &PiiCategory) -> bool {
        self.catalog
            .rules_for(category)
            .iter()
            .any(|rule| rule.find_spans(text).next().is_some())
    }
}

/// Disjoint accepted spans keyed by start offset.
#[derive(Debug, Default)]
struct AcceptedSpans {
    spans: BTreeMap<usize, usize>,
}

impl AcceptedSpans {
    /// Returns an accepted span intersecting `[start, end)`, if any.
    fn overlapping(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        // Spans are disjoint, so only the nearest span starting at or before
        // `start` and the first span starting after it can intersect.
        if let Some((&s, &e)) = self.spans.range(..=start).next_back() {
            if e > start {
                return Some((s, e));
            }
        }
        self.spans
            .range(start + 1..)
            .next()
            .filter(|(&s, _)| s < end)
            .map(|(&s, &e)| (s, e))
    }

    fn insert(&mut self, start: usize, end: usize) {
        self.spans.insert(start, end);
    }
}
