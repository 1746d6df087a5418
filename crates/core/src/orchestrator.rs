use crate::cache::DocumentCache;
use crate::matcher::WholeWordMatcher;
use crate::models::{DocumentHit, LoadReport, SearchOptions, SearchResults, WorkerFailure};
use crate::traits::DocumentMatcher;
use crate::{ExtractionError, SearchError};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

type WorkerOutcome = (String, Result<Option<DocumentHit>, String>);

/// Raises the shared cancel flag when a search ends or is dropped, so
/// blocking scans still running for it stop at their next check.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

pub struct SearchCoordinator<M = WholeWordMatcher>
where
    M: DocumentMatcher,
{
    cache: Arc<DocumentCache>,
    matcher: Arc<M>,
    options: SearchOptions,
}

impl SearchCoordinator<WholeWordMatcher> {
    pub fn new(cache: Arc<DocumentCache>, options: SearchOptions) -> Self {
        Self::with_matcher(cache, WholeWordMatcher, options)
    }
}

impl Default for SearchCoordinator<WholeWordMatcher> {
    fn default() -> Self {
        Self::new(Arc::new(DocumentCache::default()), SearchOptions::default())
    }
}

impl<M> SearchCoordinator<M>
where
    M: DocumentMatcher,
{
    pub fn with_matcher(cache: Arc<DocumentCache>, matcher: M, options: SearchOptions) -> Self {
        Self {
            cache,
            matcher: Arc::new(matcher),
            options,
        }
    }

    pub fn cache(&self) -> &Arc<DocumentCache> {
        &self.cache
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn document_count(&self) -> usize {
        self.cache.len()
    }

    /// Rebuilds the cache from `folder` on the blocking pool. Searches already
    /// running keep the corpus they started with.
    pub async fn reload_corpus(&self, folder: impl AsRef<Path>) -> Result<LoadReport, ExtractionError> {
        let cache = Arc::clone(&self.cache);
        let folder = folder.as_ref().to_path_buf();

        tokio::task::spawn_blocking(move || cache.load(&folder))
            .await
            .map_err(|error| ExtractionError::LoadTask(error.to_string()))?
    }

    pub async fn search(&self, term: &str) -> Result<SearchResults, SearchError> {
        let term = term.trim();
        if term.is_empty() {
            debug!("blank search term, returning no results");
            return Ok(SearchResults::empty(term));
        }

        let corpus = self.cache.snapshot().ok_or(SearchError::NotLoaded)?;
        let shared_term: Arc<str> = Arc::from(term);
        let permits = Arc::new(Semaphore::new(self.options.max_workers.max(1)));
        let radius = self.options.snippet_radius;
        let cancelled = Arc::new(AtomicBool::new(false));
        let _cancel_guard = CancelOnDrop(Arc::clone(&cancelled));

        let mut tasks = JoinSet::new();
        let mut pending = BTreeSet::new();

        for document in corpus.documents() {
            pending.insert(document.id.clone());

            let document = Arc::clone(document);
            let matcher = Arc::clone(&self.matcher);
            let permits = Arc::clone(&permits);
            let term = Arc::clone(&shared_term);
            let cancelled = Arc::clone(&cancelled);

            tasks.spawn(async move {
                let id = document.id.clone();
                let permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(error) => return (id, Err(error.to_string())),
                };

                // The permit moves into the blocking closure: it is released
                // when the scan ends, not when this task is aborted.
                let outcome = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    if cancelled.load(Ordering::Relaxed) {
                        return None;
                    }
                    matcher.search(&document, &term, radius, &cancelled)
                })
                .await
                .map_err(worker_failure_reason);

                (id, outcome)
            });
        }

        let deadline = tokio::time::Instant::now() + self.options.search_timeout;
        let mut hits = Vec::new();
        let mut failures = Vec::new();

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((id, outcome)))) => {
                    pending.remove(&id);
                    collect_outcome((id, outcome), &mut hits, &mut failures);
                }
                Ok(Some(Err(error))) => {
                    warn!(reason = %error, "search task ended without a result");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        term = %term,
                        timeout = ?self.options.search_timeout,
                        unfinished = pending.len(),
                        "search deadline passed"
                    );
                    cancelled.store(true, Ordering::Relaxed);
                    tasks.abort_all();
                    for id in std::mem::take(&mut pending) {
                        failures.push(WorkerFailure {
                            document_id: id,
                            reason: "timed out".to_string(),
                        });
                    }
                    break;
                }
            }
        }

        for id in pending {
            failures.push(WorkerFailure {
                document_id: id,
                reason: "search task did not complete".to_string(),
            });
        }

        hits.sort_by(|left, right| self.options.ordering.compare(&left.document_id, &right.document_id));
        failures.sort_by(|left, right| left.document_id.cmp(&right.document_id));

        info!(
            term = %term,
            documents = corpus.len(),
            hits = hits.len(),
            failures = failures.len(),
            "search finished"
        );

        Ok(SearchResults {
            term: term.to_string(),
            hits,
            failures,
        })
    }

    /// Snippets for one cached document, in match order.
    pub fn get_snippets(&self, document_id: &str, term: &str) -> Result<Vec<String>, SearchError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let corpus = self.cache.snapshot().ok_or(SearchError::NotLoaded)?;
        let document = corpus
            .get(document_id)
            .ok_or_else(|| SearchError::NotFound(document_id.to_string()))?;

        Ok(self
            .matcher
            .search(document, term, self.options.snippet_radius, &AtomicBool::new(false))
            .map(|hit| hit.snippets)
            .unwrap_or_default())
    }
}

fn collect_outcome(
    (id, outcome): WorkerOutcome,
    hits: &mut Vec<DocumentHit>,
    failures: &mut Vec<WorkerFailure>,
) {
    match outcome {
        Ok(Some(hit)) => hits.push(hit),
        Ok(None) => {}
        Err(reason) => {
            warn!(document = %id, reason = %reason, "document search failed");
            failures.push(WorkerFailure {
                document_id: id,
                reason,
            });
        }
    }
}

fn worker_failure_reason(error: JoinError) -> String {
    if error.is_cancelled() {
        return "cancelled".to_string();
    }

    let panic = error.into_panic();
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("worker panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("worker panicked: {message}")
    } else {
        "worker panicked".to_string()
    }
}
