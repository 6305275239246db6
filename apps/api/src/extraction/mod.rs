//! Text extraction for uploaded resumes and job descriptions.
//!
//! Best effort only: any unreadable or unsupported document yields an empty
//! string and a warning. Empty text is valid input for the matching engine.

use docx_rs::{
    read_docx, DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild, Table,
    TableCellContent, TableChild, TableRowChild,
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX read failed: {0}")]
    Docx(#[from] docx_rs::ReaderError),

    #[error("{0} parser panicked")]
    Panicked(&'static str),

    #[error("Text is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Chosen from the file extension, case-insensitively. `.doc` is tried as DOCX.
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".pdf") {
            DocumentKind::Pdf
        } else if lower.ends_with(".docx") || lower.ends_with(".doc") {
            DocumentKind::Docx
        } else {
            DocumentKind::PlainText
        }
    }
}

/// Extracts text from an uploaded document held in memory.
pub fn extract_text_from_bytes(file_name: &str, bytes: &[u8]) -> String {
    let kind = DocumentKind::from_file_name(file_name);
    let result = match kind {
        DocumentKind::Pdf => guard_panics("PDF", || {
            pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| ExtractionError::Pdf(e.to_string()))
        }),
        DocumentKind::Docx => guard_panics("DOCX", || extract_docx(bytes)),
        DocumentKind::PlainText => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(ExtractionError::from),
    };

    match result {
        Ok(text) => {
            debug!(file_name, ?kind, chars = text.len(), "Extracted document text");
            text
        }
        Err(e) => {
            warn!(file_name, ?kind, "Text extraction failed, using empty text: {e}");
            String::new()
        }
    }
}

/// Both parsers can panic on malformed input; treat that as a failed extraction.
fn guard_panics<F>(format: &'static str, extract: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, ExtractionError> + std::panic::UnwindSafe,
{
    std::panic::catch_unwind(extract).unwrap_or(Err(ExtractionError::Panicked(format)))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = read_docx(bytes)?;
    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => push_paragraph(paragraph, &mut lines),
            DocumentChild::Table(table) => push_table(table, &mut lines),
            _ => {}
        }
    }
    Ok(lines.join("\n"))
}

/// One line per non-blank paragraph.
fn push_paragraph(paragraph: &Paragraph, lines: &mut Vec<String>) {
    let mut buffer = String::new();
    for child in &paragraph.children {
        append_paragraph_child(child, &mut buffer);
    }
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }
}

fn append_paragraph_child(child: &ParagraphChild, buffer: &mut String) {
    match child {
        ParagraphChild::Run(run) => append_run(run, buffer),
        ParagraphChild::Insert(insert) => {
            for child in &insert.children {
                if let InsertChild::Run(run) = child {
                    append_run(run, buffer);
                }
            }
        }
        ParagraphChild::Hyperlink(hyperlink) => {
            for inner in &hyperlink.children {
                append_paragraph_child(inner, buffer);
            }
        }
        _ => {}
    }
}

fn append_run(run: &Run, buffer: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(text) => buffer.push_str(&text.text),
            RunChild::Break(_) => buffer.push('\n'),
            RunChild::Tab(_) => buffer.push('\t'),
            _ => {}
        }
    }
}

/// Table cells are read row by row, one line per cell paragraph.
fn push_table(table: &Table, lines: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => push_paragraph(paragraph, lines),
                    TableCellContent::Table(inner) => push_table(inner, lines),
                    _ => {}
                }
            }
        }
    }
}
