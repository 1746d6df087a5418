pub mod cache;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod matcher;
pub mod models;
pub mod orchestrator;
pub mod ordering;
pub mod snippet;
pub mod traits;

pub use cache::{Corpus, DocumentCache};
pub use error::{ExtractionError, SearchError};
pub use extractor::{
    docx_body_text, extract_docx_text, extract_pdf_text, join_pages, normalize_whitespace,
    OfficeTextExtractor, TextExtractor,
};
pub use ingest::{build_corpus, discover_documents, DiscoveredDocument, Discovery};
pub use matcher::{count_matches, find_matches, find_matches_until, WholeWordMatcher};
pub use models::{
    Document, DocumentHit, DocumentKind, LoadReport, Match, SearchOptions, SearchResults,
    SkippedDocument, Snippet, WorkerFailure,
};
pub use orchestrator::SearchCoordinator;
pub use ordering::{OrderingPolicy, DEFAULT_CATCH_ALL_PREFIX};
pub use snippet::{build_snippet, build_snippets, DEFAULT_SNIPPET_RADIUS};
pub use traits::DocumentMatcher;
