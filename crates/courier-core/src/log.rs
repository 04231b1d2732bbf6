//! Diagnostic logger collaborator.

/// Fire-and-forget sink for human-readable diagnostic lines.
///
/// Transports report what they send and receive through this trait instead of
/// writing to a global logger, so tests can capture or silence the output.
pub trait Logger: Send + Sync + 'static {
    /// Record one diagnostic line. May contain embedded newlines.
    fn log(&self, text: &str);
}

/// Logger that forwards every line to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, text: &str) {
        tracing::debug!(target: "courier::transport", "{}", text);
    }
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _text: &str) {}
}

impl<L: Logger + ?Sized> Logger for std::sync::Arc<L> {
    fn log(&self, text: &str) {
        (**self).log(text);
    }
}
