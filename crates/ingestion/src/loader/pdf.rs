//! PDF text extraction using lopdf
//!
//! Walks each page's content stream and collects the text shown by the
//! Tj/TJ/quote operators between BT and ET. This covers plainly encoded
//! text; image-only or exotically encoded PDFs yield nothing and are
//! reported as empty documents by the loader.

use crate::errors::IngestError;
use tracing::{debug, warn};

pub fn extract_text(filename: &str, data: &[u8]) -> Result<String, IngestError> {
    let doc = lopdf::Document::load_mem(data).map_err(|e| IngestError::Parse {
        name: filename.to_string(),
        message: format!("Failed to load PDF: {}", e),
    })?;

    let pages = doc.get_pages();
    debug!(filename, page_count = pages.len(), "Extracting PDF text");

    let mut text = String::new();
    for (page_num, page_id) in pages {
        match doc.get_page_content(page_id) {
            Ok(content) => {
                let page_text = text_from_content_stream(&content);
                if !page_text.trim().is_empty() {
                    text.push_str(&page_text);
                    text.push('\n');
                }
            }
            Err(e) => {
                warn!(filename, page = page_num, error = %e, "Skipping unreadable page");
            }
        }
    }

    Ok(text)
}

/// Collect shown text from one content stream.
fn text_from_content_stream(content: &[u8]) -> String {
    let stream = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_object = false;

    for line in stream.lines() {
        let line = line.trim();
        match line {
            "BT" => in_text_object = true,
            "ET" => {
                in_text_object = false;
                if !text.ends_with(' ') && !text.is_empty() {
                    text.push(' ');
                }
            }
            _ if in_text_object => {
                if let Some(shown) = text_from_operator(line) {
                    text.push_str(&shown);
                }
            }
            _ => {}
        }
    }

    text
}

/// Extract the string arguments of a text-showing operator line.
fn text_from_operator(line: &str) -> Option<String> {
    let is_show = line.ends_with("Tj")
        || line.ends_with("TJ")
        || line.ends_with('\'')
        || line.ends_with('"');
    if !is_show {
        return None;
    }

    // Collect every parenthesized string on the line; TJ carries an array
    // of strings interleaved with kerning numbers.
    let mut result = String::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in line.chars() {
        if in_string {
            if escaped {
                current.push(decode_escape(ch));
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == ')' {
                in_string = false;
                result.push_str(&current);
                current.clear();
            } else {
                current.push(ch);
            }
        } else if ch == '(' {
            in_string = true;
        }
    }

    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}

fn decode_escape(ch: char) -> char {
    match ch {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tj_operator() {
        let content = b"BT\n(Hello World) Tj\nET\n";
        assert_eq!(text_from_content_stream(content).trim(), "Hello World");
    }

    #[test]
    fn test_tj_array_operator() {
        let content = b"BT\n[(Hel) -20 (lo)] TJ\nET\n";
        assert_eq!(text_from_content_stream(content).trim(), "Hello");
    }

    #[test]
    fn test_escapes_decoded() {
        let line = r"(with \(parens\) and \\ backslash) Tj";
        assert_eq!(
            text_from_operator(line).unwrap(),
            r"with (parens) and \ backslash"
        );
    }

    #[test]
    fn test_text_outside_bt_et_ignored() {
        let content = b"(not shown) Tj\nBT\n(shown) Tj\nET\n";
        assert_eq!(text_from_content_stream(content).trim(), "shown");
    }

    #[test]
    fn test_invalid_pdf_is_parse_error() {
        let err = extract_text("bad.pdf", b"not a pdf").unwrap_err();
        assert!(matches!(err, IngestError::Parse { .. }));
    }
}
