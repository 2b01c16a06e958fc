//! DOCX text extraction using docx-rs
//!
//! Collects the text runs of every paragraph; tables and other document
//! children are skipped. Paragraphs become blank-line-separated blocks so
//! the chunker sees real paragraph boundaries.

use crate::errors::IngestError;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use tracing::debug;

pub fn extract_text(filename: &str, data: &[u8]) -> Result<String, IngestError> {
    let doc = docx_rs::read_docx(data).map_err(|e| IngestError::Parse {
        name: filename.to_string(),
        message: format!("Failed to read DOCX: {}", e),
    })?;

    let mut paragraphs: Vec<String> = Vec::new();

    for child in doc.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut paragraph_text = String::new();
            for child in paragraph.children {
                if let ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let RunChild::Text(text) = child {
                            paragraph_text.push_str(&text.text);
                        }
                    }
                }
            }
            if !paragraph_text.trim().is_empty() {
                paragraphs.push(paragraph_text);
            }
        }
    }

    debug!(filename, paragraph_count = paragraphs.len(), "Extracted DOCX text");
    Ok(paragraphs.join("\n\n"))
}
