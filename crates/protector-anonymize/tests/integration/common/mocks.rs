//! Mock detection backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use protector_anonymize::{AnonymizeError, AnonymizeResult, DetectionBackend, Match};

/// Backend returning a fixed match list and counting its calls.
#[derive(Debug, Default)]
pub struct MockBackend {
    matches: Vec<Match>,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Creates a backend returning `matches` on every call.
    pub fn new(matches: Vec<Match>) -> Self {
        Self {
            matches,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns a handle to the call counter.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl DetectionBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn detect(&self, _text: &str) -> AnonymizeResult<Vec<Match>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.matches.clone())
    }
}

/// Backend that always fails.
#[derive(Debug, Default)]
pub struct FailingBackend;

impl DetectionBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn detect(&self, _text: &str) -> AnonymizeResult<Vec<Match>> {
        Err(AnonymizeError::backend("failing", "service unavailable"))
    }
}
