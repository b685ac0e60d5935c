//! Template tokenizer.
//!
//! `Hello <%= name %>!` = `[Text("Hello "), Expr("=", " name "), Text("!")]`
//!
//! Tags are `<%marker code %>` where the marker is one optional character of
//! `=`, `/`, `|` or `#`. Code is kept raw; classification into start, middle
//! and end tokens looks at the words only:
//!
//! - last word `do` or a trailing `->` opens a construct
//! - first word `else`, `catch`, `rescue` or `after` continues one
//! - first word `end` closes one
//!
//! `<%%` escapes to a literal `<%` and `<%# … %>` is a dropped comment.
use crate::Token;

/// A tokenizer-level failure, wrapped into [`Error`][crate::Error] with the
/// compile-time file name by [`compile`][crate::compile].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenizeError {
    pub line: usize,
    pub message: String,
}

impl std::error::Error for TokenizeError {}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Split template source into [`Token`]s.
///
/// `line` is the line number of the first character. With `trim`, a tag
/// alone on its line swallows the surrounding whitespace and the trailing
/// newline.
pub fn tokenize(source: &str, line: usize, trim: bool) -> Result<Vec<Token>, TokenizeError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    // pending text, owned since `<%%` escapes and trimming rewrite it
    let mut text = String::new();
    let mut text_line = line;
    let mut line = line;
    // line of the last emitted tag's `%>`, trim never fires twice on a line
    let mut last_tag_line = None;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' && bytes.get(i + 1) == Some(&b'%') {
            if bytes.get(i + 2) == Some(&b'%') {
                if text.is_empty() {
                    text_line = line;
                }
                text.push_str("<%");
                i += 3;
                continue;
            }

            let tag_line = line;
            let (marker, code_start) = match bytes.get(i + 2) {
                Some(b'=') => ("=", i + 3),
                Some(b'/') => ("/", i + 3),
                Some(b'|') => ("|", i + 3),
                Some(b'#') => ("#", i + 3),
                _ => ("", i + 2),
            };

            let mut end = code_start;
            loop {
                match bytes.get(end) {
                    Some(b'%') if bytes.get(end + 1) == Some(&b'>') => break,
                    Some(b'\n') => {
                        line += 1;
                        end += 1;
                    }
                    Some(_) => end += 1,
                    None => {
                        return Err(TokenizeError {
                            line: tag_line,
                            message: "missing token '%>'".to_owned(),
                        });
                    }
                }
            }
            let close_line = line;
            let mut next = end + 2;

            if trim && last_tag_line != Some(tag_line) && blank_line_around(&text, bytes, next) {
                truncate_blank_suffix(&mut text);
                while matches!(bytes.get(next), Some(b' ' | b'\t')) {
                    next += 1;
                }
                if bytes.get(next) == Some(&b'\n') {
                    next += 1;
                    line += 1;
                }
            }

            if !text.is_empty() {
                tokens.push(Token::Text { line: text_line, text: std::mem::take(&mut text) });
            }
            if marker != "#" {
                tokens.push(classify(tag_line, marker, &source[code_start..end]));
            }
            last_tag_line = Some(close_line);
            i = next;
        } else {
            if text.is_empty() {
                text_line = line;
            }
            let start = i;
            while i < bytes.len() && !(bytes[i] == b'<' && bytes.get(i + 1) == Some(&b'%')) {
                if bytes[i] == b'\n' {
                    line += 1;
                }
                i += 1;
            }
            text.push_str(&source[start..i]);
        }
    }

    if !text.is_empty() {
        tokens.push(Token::Text { line: text_line, text });
    }

    Ok(tokens)
}

fn classify(line: usize, marker: &str, code: &str) -> Token {
    let trimmed = code.trim();
    let first = trimmed.split_whitespace().next().unwrap_or("");
    let last = trimmed.split_whitespace().last().unwrap_or("");
    let marker = marker.to_owned();
    let code = code.to_owned();
    if first == "end" {
        Token::EndExpr { line, marker, code }
    } else if matches!(first, "else" | "catch" | "rescue" | "after") {
        Token::MiddleExpr { line, marker, code }
    } else if last == "do" || trimmed.ends_with("->") {
        Token::StartExpr { line, marker, code }
    } else {
        Token::Expr { line, marker, code }
    }
}

/// Whether the pending text ends at a line start and only whitespace then a
/// newline (or end of input) follows the tag.
fn blank_line_around(text: &str, bytes: &[u8], mut next: usize) -> bool {
    let before = match text.rfind('\n') {
        Some(at) => &text[at + 1..],
        None => text,
    };
    if !before.bytes().all(|byte| matches!(byte, b' ' | b'\t')) {
        return false;
    }
    while matches!(bytes.get(next), Some(b' ' | b'\t')) {
        next += 1;
    }
    matches!(bytes.get(next), Some(b'\n') | None)
}

fn truncate_blank_suffix(text: &mut String) {
    let keep = match text.rfind('\n') {
        Some(at) => at + 1,
        None => 0,
    };
    text.truncate(keep);
}
