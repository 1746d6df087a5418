use crate::extractor::{OfficeTextExtractor, TextExtractor};
use crate::ingest::build_corpus;
use crate::models::{Document, LoadReport};
use crate::ExtractionError;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// One immutable load of a corpus directory.
#[derive(Debug, Clone)]
pub struct Corpus {
    folder: PathBuf,
    documents: BTreeMap<String, Arc<Document>>,
    loaded_at: DateTime<Utc>,
}

impl Corpus {
    pub fn from_documents(folder: impl Into<PathBuf>, documents: Vec<Document>) -> Self {
        let documents = documents
            .into_iter()
            .map(|document| (document.id.clone(), Arc::new(document)))
            .collect();

        Self {
            folder: folder.into(),
            documents,
            loaded_at: Utc::now(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Document>> {
        self.documents.get(id)
    }

    /// Documents in identifier order.
    pub fn documents(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Holds the current corpus. Readers take an `Arc` snapshot; a reload builds
/// the next corpus without holding the lock and swaps it in whole.
pub struct DocumentCache {
    extractor: Arc<dyn TextExtractor>,
    current: RwLock<Option<Arc<Corpus>>>,
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(Arc::new(OfficeTextExtractor))
    }
}

impl DocumentCache {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            extractor,
            current: RwLock::new(None),
        }
    }

    /// Rebuilds the cache from `folder`. On error the previous corpus stays
    /// in place.
    pub fn load(&self, folder: &Path) -> Result<LoadReport, ExtractionError> {
        let (corpus, report) = build_corpus(folder, self.extractor.as_ref())?;
        self.install(corpus);
        Ok(report)
    }

    pub fn install(&self, corpus: Corpus) {
        let documents = corpus.len();
        let previous = self.current.write().replace(Arc::new(corpus));
        info!(
            documents,
            replaced = previous.is_some(),
            "document cache swapped"
        );
    }

    pub fn snapshot(&self) -> Option<Arc<Corpus>> {
        self.current.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Document>> {
        self.snapshot()
            .and_then(|corpus| corpus.get(id).cloned())
    }

    pub fn all(&self) -> Vec<Arc<Document>> {
        self.snapshot()
            .map(|corpus| corpus.documents().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.snapshot().map(|corpus| corpus.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
