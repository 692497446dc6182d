//! Durable failure log for undeliverable signals.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One undeliverable signal, kept with enough context to replay it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetter {
    pub url: String,
    /// The canonical JSON body as it was signed.
    pub body: String,
    pub attempts: u32,
    pub last_error: String,
    pub failed_at: DateTime<Utc>,
}

/// Sink persisting dead letters. Exhausted and permanently rejected
/// dispatches land here instead of being silently dropped.
pub trait DeadLetterSink: Send + Sync {
    fn store(&self, letter: DeadLetter);
}

/// In-memory sink.
#[derive(Default)]
pub struct InMemoryDeadLetterSink {
    letters: Mutex<Vec<DeadLetter>>,
}

impl InMemoryDeadLetterSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<DeadLetter> {
        std::mem::take(&mut self.letters.lock())
    }

    pub fn len(&self) -> usize {
        self.letters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.lock().is_empty()
    }
}

impl DeadLetterSink for InMemoryDeadLetterSink {
    fn store(&self, letter: DeadLetter) {
        self.letters.lock().push(letter);
    }
}
