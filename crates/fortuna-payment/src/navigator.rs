//! Navigation seam for the terminal payment redirect.

use parking_lot::Mutex;

/// Executes the one-way navigation that ends the payment flow.
///
/// The orchestrator computes the redirect and delegates the actual
/// browsing-context side effect here, so every state transition stays
/// testable without a browser.
pub trait Navigator: Send + Sync {
    /// Navigate the browsing context to `url`.
    fn navigate(&self, url: &str);
}

/// Navigator that records navigations instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    urls: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Create a new recording navigator.
    pub fn new() -> Self {
        Self::default()
    }

    /// All URLs navigated to, in order.
    pub fn recorded(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.urls.lock().push(url.to_string());
    }
}

impl<N: Navigator + ?Sized> Navigator for std::sync::Arc<N> {
    fn navigate(&self, url: &str) {
        (**self).navigate(url);
    }
}
