//! Logger that keeps every line for later assertions.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use courier_core::Logger;

/// Captures diagnostic lines in memory. Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingLogger {
    /// Create an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every line recorded so far, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.buffer().clone()
    }

    /// Returns true if any recorded line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.buffer().iter().any(|line| line.contains(needle))
    }

    /// Number of recorded lines.
    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    /// Forget every recorded line.
    pub fn clear(&self) {
        self.buffer().clear();
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Logger for RecordingLogger {
    fn log(&self, text: &str) {
        self.buffer().push(text.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_buffer() {
        let logger = RecordingLogger::new();
        let clone = logger.clone();

        clone.log("first");
        logger.log("second");

        assert_eq!(logger.lines(), vec!["first", "second"]);
        assert_eq!(clone.len(), 2);
        assert!(logger.contains("sec"));
    }

    #[test]
    fn clear_empties_buffer() {
        let logger = RecordingLogger::new();
        logger.log("x");
        logger.clear();
        assert!(logger.is_empty());
    }
}
