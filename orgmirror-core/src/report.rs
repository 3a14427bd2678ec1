//! Injected reporting capability.
//!
//! Library code never prints. Everything an operator must see individually
//! (each failed clone, each rejected transfer) goes through a [`Reporter`].

use std::sync::Mutex;

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
    Success,
}

/// Sink for operator-facing messages.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    fn success(&self, message: &str);
}

/// Forwards every message to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn success(&self, message: &str) {
        tracing::info!(outcome = "success", "{message}");
    }
}

/// Keeps messages in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.lock().clone()
    }

    /// Messages recorded at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// `true` when any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lock()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    fn record(&self, level: Level, message: &str) {
        self.lock().push((level, message.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Level, String)>> {
        // A poisoned recorder still holds valid entries.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn warning(&self, message: &str) {
        self.record(Level::Warning, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }

    fn success(&self, message: &str) {
        self.record(Level::Success, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_keeps_order_and_levels() {
        let reporter = RecordingReporter::new();
        reporter.info("scanning");
        reporter.warning("orphaned acme/legacy");
        reporter.success("cloned acme/web");

        let entries = reporter.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1], (Level::Warning, "orphaned acme/legacy".to_string()));
        assert!(reporter.contains(Level::Success, "acme/web"));
        assert!(!reporter.contains(Level::Error, "acme/web"));
        assert_eq!(reporter.messages(Level::Info), vec!["scanning".to_string()]);
    }
}
