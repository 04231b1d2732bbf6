//! Transport construction options.

use std::collections::BTreeMap;

/// Free-form options passed to a transport at construction.
///
/// Real transports read addresses, timeouts and the like from here. The
/// simulated transport keeps the options around so both kinds share a
/// constructor shape, but never consults them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    options: BTreeMap<String, String>,
}

impl TransportConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any previous value for `key`.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Look up an option.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Iterate over all options in key order.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true if no options are set.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
