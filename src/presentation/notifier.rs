//! View notifier that reports through tracing.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info, warn};

use crate::domain::errors::ErrorKind;
use crate::domain::ports::ViewNotifier;

/// Logs every view callback and counts re-renders.
#[derive(Debug, Default)]
pub struct LogViewNotifier {
    renders: AtomicUsize,
    errors: AtomicUsize,
}

impl LogViewNotifier {
    /// Creates the notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many times a re-render was requested.
    #[must_use]
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::Relaxed)
    }

    /// Returns how many errors were reported.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }
}

impl ViewNotifier for LogViewNotifier {
    fn on_items_changed(&self) {
        let n = self.renders.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(render = n, "Grid re-render requested");
    }

    fn on_loading_state_changed(&self, loading: bool) {
        if loading {
            info!("Loading more images...");
        } else {
            debug!("Loading indicator hidden");
        }
    }

    fn on_error(&self, kind: ErrorKind) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        warn!(kind = %kind, "Recoverable gallery error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_renders_and_errors() {
        let notifier = LogViewNotifier::new();

        notifier.on_items_changed();
        notifier.on_loading_state_changed(true);
        notifier.on_items_changed();
        notifier.on_error(ErrorKind::Network);

        assert_eq!(notifier.renders(), 2);
        assert_eq!(notifier.errors(), 1);
    }
}
