//! Span-based PII matches.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::pii::PiiCategory;

/// A located PII occurrence.
///
/// `start` and `end` are UTF-8 byte offsets into the scanned text, forming the
/// half-open span `[start, end)`; `value` is the text inside that span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Detected category.
    pub category: PiiCategory,
    /// Matched text.
    pub value: String,
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f64,
}

impl Match {
    /// Creates a match.
    pub fn new(
        category: PiiCategory,
        value: impl Into<String>,
        start: usize,
        end: usize,
        confidence: f64,
    ) -> Self {
        Self {
            category,
            value: value.into(),
            start,
            end,
            confidence,
        }
    }

    /// Creates a match for the span `[start, end)` of `text`, returning `None`
    /// if the span is empty, out of bounds or not on char boundaries.
    pub fn from_span(
        text: &str,
        category: PiiCategory,
        start: usize,
        end: usize,
        confidence: f64,
    ) -> Option<Self> {
        if start >= end {
            return None;
        }
        text.get(start..end)
            .map(|value| Self::new(category, value, start, end, confidence))
    }

    /// Returns the span as a range.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns the span length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns true if the two spans intersect. Spans that only touch at a
    /// boundary do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Match) -> bool {
        spans_overlap(self.range(), other.range())
    }

    /// Checks the match against the text it claims to come from.
    #[must_use]
    pub fn is_consistent_with(&self, text: &str) -> bool {
        !self.is_empty()
            && (0.0..=1.0).contains(&self.confidence)
            && text.get(self.range()) == Some(self.value.as_str())
    }
}

/// Half-open interval intersection test.
#[must_use]
pub fn spans_overlap(a: Range<usize>, b: Range<usize>) -> bool {
    !(a.end <= b.start || b.end <= a.start)
}
