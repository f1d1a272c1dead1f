//! Progress-callback trait for per-element translation events.
//!
//! Inject an [`Arc<dyn TranslationProgressCallback>`] via
//! [`crate::config::TranslationConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the document. Events arrive strictly in
//! page/element order because translation is sequential.
//!
//! # Example
//!
//! ```rust
//! use doc_translate::{TranslationConfig, TranslationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     translated: AtomicUsize,
//! }
//!
//! impl TranslationProgressCallback for CountingCallback {
//!     fn on_element_translated(&self, page: usize, index: usize, chars: usize) {
//!         self.translated.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {page} element {index}: {chars} chars");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { translated: AtomicUsize::new(0) });
//!
//! let config = TranslationConfig::builder()
//!     .source_lang("English")
//!     .target_lang("German")
//!     .progress_callback(counter as Arc<dyn TranslationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it extracts, translates and renders a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Page numbers are 0-indexed, matching
/// [`crate::layout::PageLayout::page_number`].
pub trait TranslationProgressCallback: Send + Sync {
    /// Called once after layout extraction.
    ///
    /// # Arguments
    /// * `total_pages`    - pages in the extracted layout
    /// * `total_elements` - elements across all pages
    fn on_layout_ready(&self, total_pages: usize, total_elements: usize) {
        let _ = (total_pages, total_elements);
    }

    /// Called before the first element of a page is translated.
    fn on_page_start(&self, page_number: usize, total_pages: usize) {
        let _ = (page_number, total_pages);
    }

    /// Called after each element has its translation attached, including
    /// elements with empty text and elements restored from a checkpoint.
    ///
    /// # Arguments
    /// * `chars` - character count of the translated text
    fn on_element_translated(&self, page_number: usize, element_index: usize, chars: usize) {
        let _ = (page_number, element_index, chars);
    }

    /// Called after the last element of a page.
    fn on_page_complete(&self, page_number: usize, total_pages: usize) {
        let _ = (page_number, total_pages);
    }

    /// Called once after the document has been written.
    ///
    /// # Arguments
    /// * `rendered_blocks`  - blocks appended to the output document
    /// * `skipped_elements` - elements whose type had no mapping
    fn on_conversion_complete(&self, rendered_blocks: usize, skipped_elements: usize) {
        let _ = (rendered_blocks, skipped_elements);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl TranslationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TranslationConfig`].
pub type ProgressCallback = Arc<dyn TranslationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        pages_started: AtomicUsize,
        elements: AtomicUsize,
        pages_completed: AtomicUsize,
        rendered: AtomicUsize,
    }

    impl TranslationProgressCallback for TrackingCallback {
        fn on_page_start(&self, _page: usize, _total: usize) {
            self.pages_started.fetch_add(1, Ordering::SeqCst);
        }

        fn on_element_translated(&self, _page: usize, _index: usize, _chars: usize) {
            self.elements.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page: usize, _total: usize) {
            self.pages_completed.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, rendered: usize, _skipped: usize) {
            self.rendered.store(rendered, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_layout_ready(2, 5);
        cb.on_page_start(0, 2);
        cb.on_element_translated(0, 0, 12);
        cb.on_page_complete(0, 2);
        cb.on_conversion_complete(5, 0);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_page_start(0, 1);
        tracker.on_element_translated(0, 0, 5);
        tracker.on_element_translated(0, 1, 9);
        tracker.on_page_complete(0, 1);
        tracker.on_conversion_complete(2, 0);

        assert_eq!(tracker.pages_started.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.elements.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.pages_completed.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.rendered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_layout_ready(1, 1);
        cb.on_element_translated(0, 0, 7);
    }
}
