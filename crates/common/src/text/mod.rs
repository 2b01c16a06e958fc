//! Text sanitization
//!
//! The vector store's metadata layer and some loaders are intolerant of
//! binary and control bytes, so every chunk passes through [`sanitize`]
//! before embedding. The sanitized string is what gets embedded AND what
//! gets stored as metadata text; the two must be identical.

use regex_lite::Regex;
use std::sync::OnceLock;

fn newline_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

fn space_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" {2,}").unwrap())
}

/// Sanitize text for embedding and storage.
///
/// Keeps printable ASCII plus newline, drops every other control or
/// non-ASCII character, collapses runs of 3+ newlines to 2 and runs of 2+
/// spaces to 1, and trims surrounding whitespace. Pure and idempotent:
/// `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let filtered: String = text
        .chars()
        .filter(|&c| c.is_ascii() && (!c.is_ascii_control() || c == '\n'))
        .collect();

    let collapsed = newline_run_re().replace_all(&filtered, "\n\n");
    let collapsed = space_run_re().replace_all(&collapsed, " ");

    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_control_characters_except_newline() {
        let input = "hello\x00\x08 world\x1f\ttabbed\nnext";
        let out = sanitize(input);
        assert_eq!(out, "hello worldtabbed\nnext");
    }

    #[test]
    fn test_strips_non_ascii() {
        assert_eq!(sanitize("caf\u{e9} r\u{e9}sum\u{e9}"), "caf rsum");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(sanitize("a    b"), "a b");
        assert_eq!(sanitize("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(sanitize("para one\n\n\n\npara two"), "para one\n\npara two");
    }

    #[test]
    fn test_trims() {
        assert_eq!(sanitize("  padded  "), "padded");
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize(" \n \n "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "plain text",
            "  lots\n\n\n\nof   space  ",
            "ctrl\x07chars\u{feff}",
            "",
            "multi\nline\n\ninput with  doubles",
        ];
        for s in samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {:?}", s);
        }
    }
}
