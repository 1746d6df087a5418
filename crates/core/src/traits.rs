use crate::models::{Document, DocumentHit};
use std::sync::atomic::AtomicBool;

/// Per-document search step run by each fan-out worker.
pub trait DocumentMatcher: Send + Sync + 'static {
    /// `None` when the document has no occurrence of `term`, or when
    /// `cancelled` was set before the scan finished.
    fn search(
        &self,
        document: &Document,
        term: &str,
        snippet_radius: usize,
        cancelled: &AtomicBool,
    ) -> Option<DocumentHit>;
}
