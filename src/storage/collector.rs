//! Thread-safe aggregation of delivered results.

use crate::scanner::OnOpenPort;
use crate::types::OpenPort;
use std::sync::{Arc, Mutex, MutexGuard};

/// Collects every [`OpenPort`] a session delivers.
///
/// Clones share the same storage, so one clone can feed the scanner while
/// another is read for display or persistence.
#[derive(Debug, Clone, Default)]
pub struct ResultCollector {
    results: Arc<Mutex<Vec<OpenPort>>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, open: OpenPort) {
        self.lock().push(open);
    }

    /// A scanner callback that stores every result.
    pub fn callback(&self) -> OnOpenPort {
        let collector = self.clone();
        Arc::new(move |open| collector.push(open))
    }

    /// A scanner callback that passes each result to `listener` and then
    /// stores it.
    pub fn callback_with<F>(&self, listener: F) -> OnOpenPort
    where
        F: Fn(&OpenPort) + Send + Sync + 'static,
    {
        let collector = self.clone();
        Arc::new(move |open| {
            listener(&open);
            collector.push(open);
        })
    }

    /// Copy of everything delivered so far, in delivery order.
    pub fn snapshot(&self) -> Vec<OpenPort> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking listener must not take the stored results down with it.
    fn lock(&self) -> MutexGuard<'_, Vec<OpenPort>> {
        self.results.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
