use crate::cache::Corpus;
use crate::extractor::TextExtractor;
use crate::models::{Document, DocumentKind, LoadReport, SkippedDocument};
use crate::ExtractionError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDocument {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub documents: Vec<DiscoveredDocument>,
    pub ignored: Vec<PathBuf>,
    /// Entries the directory walk could not read.
    pub unreadable: Vec<SkippedDocument>,
}

/// Lists the regular files directly inside `folder`, split into supported
/// documents and ignored entries. Subdirectories are not descended into.
pub fn discover_documents(folder: &Path) -> Result<Discovery, ExtractionError> {
    let metadata = fs::metadata(folder)?;
    if !metadata.is_dir() {
        return Err(ExtractionError::InvalidArgument(format!(
            "corpus path is not a directory: {}",
            folder.display()
        )));
    }

    let mut discovery = Discovery::default();

    for item in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match item {
            Ok(entry) => entry,
            Err(error) => {
                let path = error.path().unwrap_or(folder).to_path_buf();
                warn!(path = %path.display(), reason = %error, "directory entry could not be read");
                discovery.unreadable.push(SkippedDocument {
                    path,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match DocumentKind::from_path(entry.path()) {
            Some(kind) => discovery.documents.push(DiscoveredDocument {
                path: entry.path().to_path_buf(),
                kind,
            }),
            None => discovery.ignored.push(entry.path().to_path_buf()),
        }
    }

    Ok(discovery)
}

pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn load_document(
    path: &Path,
    kind: DocumentKind,
    extractor: &dyn TextExtractor,
) -> Result<Document, ExtractionError> {
    let id = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ExtractionError::MissingFileName(path.display().to_string()))?
        .to_string();

    let bytes = fs::read(path)?;
    let checksum = digest_bytes(&bytes);
    let modified_at = fs::metadata(path)?
        .modified()
        .ok()
        .map(DateTime::<Utc>::from);
    let text = extractor.extract(&bytes, kind)?;

    Ok(Document {
        id,
        source_path: path.to_path_buf(),
        kind,
        text,
        checksum,
        modified_at,
        loaded_at: Utc::now(),
    })
}

/// Extracts every supported document in `folder`. Documents that fail to
/// extract are reported and left out; only a missing or unreadable folder
/// fails the whole build.
pub fn build_corpus(
    folder: &Path,
    extractor: &dyn TextExtractor,
) -> Result<(Corpus, LoadReport), ExtractionError> {
    let discovery = discover_documents(folder)?;

    for ignored in &discovery.ignored {
        debug!(path = %ignored.display(), "ignoring unsupported file");
    }

    let mut documents = Vec::new();
    let mut skipped = discovery.unreadable;

    for discovered in discovery.documents {
        match load_document(&discovered.path, discovered.kind, extractor) {
            Ok(document) => documents.push(document),
            Err(error) => {
                warn!(path = %discovered.path.display(), reason = %error, "skipping document");
                skipped.push(SkippedDocument {
                    path: discovered.path,
                    reason: error.to_string(),
                });
            }
        }
    }

    let corpus = Corpus::from_documents(folder, documents);
    let report = LoadReport {
        folder: folder.to_path_buf(),
        loaded: corpus.len(),
        skipped,
        ignored: discovery.ignored.len(),
        loaded_at: corpus.loaded_at(),
    };

    if report.loaded == 0 {
        warn!(folder = %folder.display(), "corpus loaded with no documents");
    }
    info!(
        folder = %folder.display(),
        loaded = report.loaded,
        skipped = report.skipped.len(),
        ignored = report.ignored,
        "corpus built"
    );

    Ok((corpus, report))
}
