//! Expression lexer.
//!
//! Newlines are emitted as tokens since they separate statements inside
//! do-block bodies, and every lexeme carries its line for error reporting.
use std::fmt;

use crate::{ParseError, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Int(i64),
    Str(String),
    Atom(String),
    /// Identifier or word keyword, `do`, `and`, etc included.
    Ident(String),
    /// Operator or punctuation.
    Punct(&'static str),
    Newline,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Lexeme {
    pub tok: Tok,
    pub line: usize,
}

/// Two-char operators, checked before single chars.
const PUNCT2: [&str; 10] = ["==", "!=", "<=", ">=", "<>", "++", "--", "<-", "->", "|>"];

const PUNCT1: [&str; 14] = ["+", "-", "*", "/", "<", ">", "=", ".", ",", ";", "(", ")", "[", "]"];

pub(crate) fn lex(source: &str, line: usize) -> Result<Vec<Lexeme>> {
    let bytes = source.as_bytes();
    let mut out = Vec::new();
    let mut line = line;
    let mut i = 0;

    'scan: while i < bytes.len() {
        let byte = bytes[i];
        match byte {
            b' ' | b'\t' | b'\r' => i += 1,
            b'\n' => {
                out.push(Lexeme { tok: Tok::Newline, line });
                line += 1;
                i += 1;
            }
            b'0'..=b'9' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let value = source[start..i]
                    .parse()
                    .map_err(|_| ParseError::new(line, "invalid integer literal"))?;
                out.push(Lexeme { tok: Tok::Int(value), line });
            }
            b'"' => {
                let start_line = line;
                let mut value = String::new();
                let mut chars = source[i + 1..].char_indices();
                loop {
                    let Some((at, ch)) = chars.next() else {
                        return Err(ParseError::new(start_line, "missing closing quote in string"));
                    };
                    match ch {
                        '"' => {
                            i += 1 + at + 1;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, '\\')) => value.push('\\'),
                            Some((_, '"')) => value.push('"'),
                            Some((_, other)) => {
                                return Err(ParseError::new(
                                    line,
                                    format!("unknown escape '\\{other}' in string"),
                                ));
                            }
                            None => {
                                return Err(ParseError::new(start_line, "missing closing quote in string"));
                            }
                        },
                        '\n' => {
                            line += 1;
                            value.push('\n');
                        }
                        other => value.push(other),
                    }
                }
                out.push(Lexeme { tok: Tok::Str(value), line: start_line });
            }
            b':' if matches!(bytes.get(i + 1), Some(next) if is_ident_start(*next)) => {
                let (name, next) = scan_ident(source, i + 1);
                out.push(Lexeme { tok: Tok::Atom(name), line });
                i = next;
            }
            _ if is_ident_start(byte) => {
                let (name, next) = scan_ident(source, i);
                out.push(Lexeme { tok: Tok::Ident(name), line });
                i = next;
            }
            _ => {
                for punct in PUNCT2 {
                    if source[i..].starts_with(punct) {
                        out.push(Lexeme { tok: Tok::Punct(punct), line });
                        i += 2;
                        continue 'scan;
                    }
                }
                for punct in PUNCT1 {
                    if source[i..].starts_with(punct) {
                        out.push(Lexeme { tok: Tok::Punct(punct), line });
                        i += 1;
                        continue 'scan;
                    }
                }
                let ch = source[i..].chars().next().unwrap_or('?');
                return Err(ParseError::new(line, format!("unexpected character {ch:?}")));
            }
        }
    }

    Ok(out)
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

/// Scan an identifier, allowing a single trailing `?` or `!`.
fn scan_ident(source: &str, start: usize) -> (String, usize) {
    let bytes = source.as_bytes();
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    if matches!(bytes.get(i), Some(b'?' | b'!')) {
        i += 1;
    }
    (source[start..i].to_owned(), i)
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Int(value) => write!(f, "{value}"),
            Tok::Str(value) => write!(f, "{value:?}"),
            Tok::Atom(name) => write!(f, ":{name}"),
            Tok::Ident(name) => f.write_str(name),
            Tok::Punct(punct) => f.write_str(punct),
            Tok::Newline => f.write_str("newline"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{lex, Tok};

    fn toks(source: &str) -> Vec<Tok> {
        lex(source, 1).unwrap().into_iter().map(|lexeme| lexeme.tok).collect()
    }

    #[test]
    fn operators_and_words() {
        assert_eq!(
            toks("a <> to_string(1)"),
            vec![
                Tok::Ident("a".into()),
                Tok::Punct("<>"),
                Tok::Ident("to_string".into()),
                Tok::Punct("("),
                Tok::Int(1),
                Tok::Punct(")"),
            ],
        );
    }

    #[test]
    fn atoms_and_strings() {
        assert_eq!(
            toks(r#":ok "a\nb" done?"#),
            vec![
                Tok::Atom("ok".into()),
                Tok::Str("a\nb".into()),
                Tok::Ident("done?".into()),
            ],
        );
    }

    #[test]
    fn lines_follow_newlines() {
        let lexemes = lex("a\nb", 3).unwrap();
        assert_eq!(lexemes[0].line, 3);
        assert_eq!(lexemes[1].tok, Tok::Newline);
        assert_eq!(lexemes[2].line, 4);
    }

    #[test]
    fn unexpected_character() {
        let err = lex("a @ b", 2).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.message, "unexpected character '@'");
    }

    #[test]
    fn unterminated_string() {
        let err = lex("\"abc", 1).unwrap_err();
        assert_eq!(err.message, "missing closing quote in string");
    }
}
