//! Reporter trait for dependency injection
//!
//! This trait allows the install pipeline to narrate progress without
//! being coupled to a specific terminal implementation.

/// Sink for user-facing progress narration.
pub trait Reporter: Send + Sync {
    /// Indicates a new section or phase has started.
    fn section(&self, title: &str);

    /// Updates the progress of a download.
    fn downloading(&self, file: &str, current: u64, total: Option<u64>);

    /// Marks a download as finished.
    fn downloaded(&self, file: &str, bytes: u64);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn downloading(&self, file: &str, current: u64, total: Option<u64>) {
        (**self).downloading(file, current, total);
    }
    fn downloaded(&self, file: &str, bytes: u64) {
        (**self).downloaded(file, bytes);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: &str, _: u64, _: Option<u64>) {}
    fn downloaded(&self, _: &str, _: u64) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
