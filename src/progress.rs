//! Progress events emitted while a document is processed.
//!
//! Register an implementation with
//! [`crate::config::ProcessingConfigBuilder::progress_callback`]. Every method
//! has a no-op default, so implementations override only what they display.
//!
//! ```rust
//! use edgequake_pdftext::{DecodeMethod, ProcessingConfig, ProcessingProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ProcessingProgressCallback for Printer {
//!     fn on_page_complete(&self, page: usize, total: usize, chars: usize, method: &DecodeMethod) {
//!         eprintln!("page {page}/{total}: {chars} chars via {}", method.label());
//!     }
//! }
//!
//! let config = ProcessingConfig::builder()
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::DecodeMethod;
use std::sync::Arc;

/// Receiver of per-page and per-document events.
///
/// Page numbers are 1-indexed; `total` is the number of selected pages.
pub trait ProcessingProgressCallback: Send + Sync {
    /// Before the first page.
    fn on_document_start(&self, total: usize) {
        let _ = total;
    }

    fn on_page_start(&self, page: usize, total: usize) {
        let _ = (page, total);
    }

    /// After a page was decoded and cleaned. `chars` counts the cleaned text.
    fn on_page_complete(&self, page: usize, total: usize, chars: usize, method: &DecodeMethod) {
        let _ = (page, total, chars, method);
    }

    /// A page with no bytes; it contributes nothing to the output.
    fn on_page_skipped(&self, page: usize, total: usize) {
        let _ = (page, total);
    }

    fn on_document_complete(&self, total: usize, processed: usize) {
        let _ = (total, processed);
    }

    fn on_translation_start(&self) {}

    /// `ok` is false when the model call failed and the untranslated text
    /// was kept.
    fn on_translation_complete(&self, ok: bool) {
        let _ = ok;
    }
}

/// Default callback: ignores every event.
pub struct NoopProgressCallback;

impl ProcessingProgressCallback for NoopProgressCallback {}

/// Shared handle stored in [`crate::config::ProcessingConfig`].
pub type ProgressCallback = Arc<dyn ProcessingProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        completed: AtomicUsize,
        skipped: AtomicUsize,
        methods: Mutex<Vec<String>>,
    }

    impl ProcessingProgressCallback for Recorder {
        fn on_page_complete(&self, _page: usize, _total: usize, _chars: usize, method: &DecodeMethod) {
            self.completed.fetch_add(1, Ordering::SeqCst);
            self.methods.lock().unwrap().push(method.label());
        }

        fn on_page_skipped(&self, _page: usize, _total: usize) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_accepts_every_event() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_document_start(2);
        cb.on_page_start(1, 2);
        cb.on_page_complete(1, 2, 10, &DecodeMethod::LossyUtf8);
        cb.on_page_skipped(2, 2);
        cb.on_document_complete(2, 1);
        cb.on_translation_start();
        cb.on_translation_complete(false);
    }

    #[test]
    fn overridden_methods_are_called() {
        let rec = Recorder::default();
        rec.on_page_complete(1, 3, 5, &DecodeMethod::LegacyScript { iscii: true });
        rec.on_page_skipped(2, 3);
        rec.on_page_complete(
            3,
            3,
            7,
            &DecodeMethod::Probed {
                encoding: "utf-8".into(),
            },
        );
        rec.on_translation_complete(true);

        assert_eq!(rec.completed.load(Ordering::SeqCst), 2);
        assert_eq!(rec.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(*rec.methods.lock().unwrap(), vec!["legacy+iscii", "utf-8"]);
    }
}
