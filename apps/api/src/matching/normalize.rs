//! Canonicalizes extracted text before any matching happens.

/// Unifies line endings, collapses runs of blank lines to a single blank
/// line, and trims the result.
///
/// CRLF is folded until none remains, so `"\r\r\n"` ends up as `"\n"` and
/// the function stays idempotent.
pub fn normalize_text(text: &str) -> String {
    let mut unified = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\n' {
            while unified.ends_with('\r') {
                unified.pop();
            }
        }
        unified.push(ch);
    }

    let mut collapsed = String::with_capacity(unified.len());
    let mut newline_run = 0usize;
    for ch in unified.chars() {
        if ch == '\n' {
            newline_run += 1;
            if newline_run > 2 {
                continue;
            }
        } else {
            newline_run = 0;
        }
        collapsed.push(ch);
    }

    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crlf_becomes_lf() {
        assert_eq!(normalize_text("a\r\nb\r\nc"), "a\nb\nc");
    }

    #[test]
    fn test_blank_line_runs_collapse_to_one() {
        assert_eq!(normalize_text("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\r\n\r\n\r\nb"), "a\n\nb");
    }

    #[test]
    fn test_single_newline_untouched() {
        assert_eq!(normalize_text("a\nb"), "a\nb");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(normalize_text("  \n\n  Senior Engineer\n\t "), "Senior Engineer");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \r\n \n"), "");
    }

    #[test]
    fn test_is_idempotent() {
        let inputs = [
            "",
            "plain",
            "a\r\r\nb",
            "a\r\r\r\n\r\n\nb",
            "\n\n\nx\n\n\n\ny\r\n",
            "line\n \n\n \nline",
            "●  Python\r\n- SQL\r\n\r\n\r\n1. Docker  ",
        ];
        for input in inputs {
            let once = normalize_text(input);
            assert_eq!(normalize_text(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_lone_carriage_return_kept() {
        assert_eq!(normalize_text("a\rb"), "a\rb");
    }
}
