use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("docx archive error: {0}")]
    DocxArchive(#[from] zip::result::ZipError),

    #[error("docx xml error: {0}")]
    DocxXml(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("corpus load task failed: {0}")]
    LoadTask(String),
}

impl From<quick_xml::Error> for ExtractionError {
    fn from(error: quick_xml::Error) -> Self {
        Self::DocxXml(error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("corpus has not been loaded yet")]
    NotLoaded,
}
