use crate::ordering::OrderingPolicy;
use crate::snippet::DEFAULT_SNIPPET_RADIUS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Classifies a path by extension; `None` for anything that is not a
    /// `.pdf` or `.docx` file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(|ext| ext.to_str())?;

        if extension.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else if extension.eq_ignore_ascii_case("docx") {
            Some(Self::Docx)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "WORD",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source_path: PathBuf,
    pub kind: DocumentKind,
    /// Extracted text in its original casing.
    pub text: String,
    pub checksum: String,
    pub modified_at: Option<DateTime<Utc>>,
    pub loaded_at: DateTime<Utc>,
}

/// Half-open `[start, end)` range of character offsets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Match {
    pub start: usize,
    pub end: usize,
}

impl Match {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    /// Clipped character window the text was cut from, before trimming.
    pub window_start: usize,
    pub window_end: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentHit {
    pub document_id: String,
    pub kind: DocumentKind,
    pub modified_at: Option<DateTime<Utc>>,
    pub count: usize,
    pub snippets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerFailure {
    pub document_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    pub term: String,
    pub hits: Vec<DocumentHit>,
    pub failures: Vec<WorkerFailure>,
}

impl SearchResults {
    pub fn empty(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn get(&self, document_id: &str) -> Option<&DocumentHit> {
        self.hits.iter().find(|hit| hit.document_id == document_id)
    }

    pub fn total_occurrences(&self) -> usize {
        self.hits.iter().map(|hit| hit.count).sum()
    }

    pub fn kind_breakdown(&self) -> BTreeMap<DocumentKind, usize> {
        let mut breakdown = BTreeMap::new();
        for hit in &self.hits {
            *breakdown.entry(hit.kind).or_insert(0) += 1;
        }
        breakdown
    }

    /// Document-to-count pairs in presentation order, as consumed by the
    /// frequency chart.
    pub fn frequency_series(&self) -> Vec<(String, usize)> {
        self.hits
            .iter()
            .map(|hit| (hit.document_id.clone(), hit.count))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub folder: PathBuf,
    pub loaded: usize,
    pub skipped: Vec<SkippedDocument>,
    pub ignored: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub snippet_radius: usize,
    pub max_workers: usize,
    pub search_timeout: Duration,
    pub ordering: OrderingPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            snippet_radius: DEFAULT_SNIPPET_RADIUS,
            max_workers: std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(4),
            search_timeout: Duration::from_secs(30),
            ordering: OrderingPolicy::default(),
        }
    }
}
