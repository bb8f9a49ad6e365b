//! Plain-text extraction from uploaded resume documents.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Document format declared for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Docx,
}

impl FileType {
    /// `.pdf` names (any case) are PDFs; everything else is treated as DOCX.
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.to_ascii_lowercase().ends_with(".pdf") {
            FileType::Pdf
        } else {
            FileType::Docx
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            FileType::Pdf => "application/pdf",
            FileType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("Document contains no text")]
    Empty,

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, data: Bytes, file_type: FileType) -> Result<String, ExtractError>;
}

/// Default extractor. Parsing runs on the blocking pool; a panicking parser
/// surfaces as `ExtractError::Task`.
pub struct DocumentExtractor;

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract(&self, data: Bytes, file_type: FileType) -> Result<String, ExtractError> {
        tokio::task::spawn_blocking(move || extract_text(&data, file_type)).await?
    }
}

fn extract_text(data: &[u8], file_type: FileType) -> Result<String, ExtractError> {
    let raw = match file_type {
        FileType::Pdf => pdf_extract::extract_text_from_mem(data)
            .map_err(|e| ExtractError::Pdf(format!("{e:?}")))?,
        FileType::Docx => extract_docx(data)?,
    };
    let text = clean_text(&raw);
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

fn extract_docx(data: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(data).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = paragraph_child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

/// Drops zero-width spaces, collapses horizontal whitespace to one space and
/// line-break runs to a single `\n`, then trims.
pub fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().filter(|c| *c != '\u{200b}').peekable();
    while let Some(c) = chars.next() {
        if is_line_break(c) {
            while chars.peek().copied().is_some_and(is_line_break) {
                chars.next();
            }
            out.push('\n');
        } else if c.is_whitespace() {
            while chars
                .peek()
                .is_some_and(|n| n.is_whitespace() && !is_line_break(*n))
            {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}

fn is_line_break(c: char) -> bool {
    c == '\r' || c == '\n'
}
