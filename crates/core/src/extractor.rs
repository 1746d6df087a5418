use crate::error::ExtractionError;
use crate::models::DocumentKind;
use lopdf::Document;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::warn;

const DOCX_BODY_PART: &str = "word/document.xml";

/// Turns the raw bytes of one document into plain text. The caller reads the
/// file once and hands the same bytes to hashing and extraction.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractionError>;
}

/// Default extractor: `lopdf` for PDF, the WordprocessingML body for DOCX.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfficeTextExtractor;

impl TextExtractor for OfficeTextExtractor {
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractionError> {
        match kind {
            DocumentKind::Pdf => extract_pdf_text(bytes),
            DocumentKind::Docx => extract_docx_text(bytes),
        }
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenates page text in page order. Bytes that are not a readable PDF
/// are an error.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document =
        Document::load_mem(bytes).map_err(|error| ExtractionError::PdfParse(error.to_string()))?;

    Ok(join_pages(
        document
            .get_pages()
            .into_keys()
            .map(|page_no| (page_no, document.extract_text(&[page_no]))),
    ))
}

/// Joins per-page extraction results in the order given. A page that failed
/// contributes an empty string and does not abort the document.
pub fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = (u32, Result<String, lopdf::Error>)>,
{
    let pages = pages
        .into_iter()
        .map(|(page_no, text)| {
            text.unwrap_or_else(|error| {
                warn!(page = page_no, reason = %error, "page text could not be extracted");
                String::new()
            })
        })
        .collect::<Vec<_>>();

    normalize_whitespace(&pages.join(" "))
}

pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut body = archive.by_name(DOCX_BODY_PART)?;

    let mut xml = String::new();
    body.read_to_string(&mut xml)?;

    docx_body_text(&xml)
}

/// Pulls run text out of a `word/document.xml` part. Tabs become spaces,
/// breaks and paragraph ends become line breaks.
pub fn docx_body_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) if element.local_name().as_ref() == b"t" => {
                in_text_run = true;
            }
            Event::End(element) => match element.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(element) => match element.local_name().as_ref() {
                b"tab" => text.push(' '),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(content) if in_text_run => {
                text.push_str(&content.unescape()?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(normalize_whitespace(&text))
}
