//! The compiler state machine.
//!
//! Consumes the token stream left to right, folding text and expressions
//! into the engine's buffer. Control constructs are handled by rebuilding
//! their full source: a start tag opens a frame holding the source seen so
//! far, each middle tag binds the branch buffer to a placeholder key and
//! appends the placeholder plus the tag's code, and the end tag parses the
//! whole reconstructed source as one unit before substituting the bound
//! buffers back into the tree. The scope stack is the recursion, one frame
//! per open construct.
use weft_expr::Ast;

use crate::placeholder::{insert_placeholders, placeholder_source};
use crate::{Engine, Error, Result, Token};

pub(crate) struct Compiler<'a, E> {
    engine: &'a E,
    file: &'a str,
}

/// One open control construct.
struct Frame {
    /// Reconstructed source, start tag code through the latest appended tag.
    source: String,
    /// Pending branch buffers, indexed by placeholder key.
    placeholders: Vec<Ast>,
    /// Line of the start tag, where the reconstructed source is parsed at.
    start_line: usize,
    /// Line after the latest append, drives newline padding.
    line: usize,
}

impl Frame {
    fn open(line: usize, code: &str) -> Frame {
        Frame {
            source: code.to_owned(),
            placeholders: Vec::new(),
            start_line: line,
            line,
        }
    }

    /// Bind `buffer` to a fresh placeholder key and append the placeholder
    /// and the tag code at `line`, padding with newlines so errors from the
    /// reconstructed source keep their template line numbers.
    fn wrap(&mut self, line: usize, code: &str, buffer: Ast) {
        let key = self.placeholders.len();
        self.placeholders.push(buffer);
        self.source.push_str(&placeholder_source(key));
        for _ in self.line..line {
            self.source.push('\n');
        }
        self.source.push_str(code);
        self.line = line;
    }
}

impl<'a, E: Engine> Compiler<'a, E> {
    pub fn new(engine: &'a E, file: &'a str) -> Compiler<'a, E> {
        Compiler { engine, file }
    }

    pub fn compile(&self, tokens: &[Token]) -> Result<Ast> {
        let (buffer, rest) = self.generate(tokens, None)?;
        debug_assert!(rest.is_empty(), "tokens remain after the root scope");
        Ok(self.engine.handle_body(buffer))
    }

    /// Consume tokens into a buffer until the stream, or the construct open
    /// in `frame`, ends. Returns the unconsumed remainder alongside either
    /// the buffer (no frame) or the parsed, substituted construct tree.
    fn generate<'t>(
        &self,
        mut tokens: &'t [Token],
        mut frame: Option<Frame>,
    ) -> Result<(Ast, &'t [Token])> {
        let mut buffer = self.engine.init();

        while let Some((token, rest)) = tokens.split_first() {
            tokens = rest;
            match token {
                Token::Text { text, .. } => {
                    buffer = self.engine.handle_text(buffer, text);
                }
                Token::Expr { line, marker, code } => {
                    let expr = self.parse(code, *line)?;
                    buffer = self.engine.handle_expr(buffer, marker, expr);
                }
                Token::StartExpr { line, marker, code } => {
                    let mut inner = Frame::open(*line, code);
                    tokens = look_ahead_text(tokens, &mut inner);
                    let (body, rest) = self.generate(tokens, Some(inner))?;
                    buffer = self.engine.handle_expr(buffer, marker, body);
                    tokens = rest;
                }
                Token::MiddleExpr { line, marker, code } => {
                    self.reject_marker(marker, code, *line)?;
                    match frame.as_mut() {
                        Some(frame) => {
                            frame.wrap(*line, code, buffer);
                            buffer = self.engine.init();
                            tokens = look_ahead_text(tokens, frame);
                        }
                        None => {
                            return Err(self.error(*line, format!("unexpected token {code}")));
                        }
                    }
                }
                Token::EndExpr { line, marker, code } => {
                    self.reject_marker(marker, code, *line)?;
                    match frame.take() {
                        Some(mut frame) => {
                            frame.wrap(*line, code, buffer);
                            let tree = self.parse(&frame.source, frame.start_line)?;
                            return Ok((insert_placeholders(tree, &frame.placeholders), tokens));
                        }
                        None => {
                            return Err(self.error(*line, format!("unexpected token {code}")));
                        }
                    }
                }
            }
        }

        match frame {
            None => Ok((buffer, tokens)),
            Some(frame) => Err(self.error(
                frame.line,
                "unexpected end of string, expected a closing 'end' tag".to_owned(),
            )),
        }
    }

    /// Modifiers are illegal on continuation and closing tags.
    fn reject_marker(&self, marker: &str, code: &str, line: usize) -> Result<()> {
        if marker.is_empty() {
            Ok(())
        } else {
            Err(self.error(line, format!("unexpected token {marker} on <%{marker}{code}%>")))
        }
    }

    fn parse(&self, code: &str, line: usize) -> Result<Ast> {
        weft_expr::parse(code, line)
            .map_err(|err| self.error(err.line, err.message))
    }

    fn error(&self, line: usize, message: String) -> Error {
        Error { file: self.file.to_owned(), line, message }
    }
}

/// Fold whitespace-only text and the middle tag after it into the frame
/// source, consuming both tokens. Formatting around `else` and friends then
/// never reaches the engine: the whitespace-only branch has no placeholder
/// and parses as an empty body. A middle tag carrying a marker is left in
/// the stream so the structural error still surfaces. A no-op everywhere
/// else.
fn look_ahead_text<'t>(tokens: &'t [Token], frame: &mut Frame) -> &'t [Token] {
    match tokens {
        [Token::Text { text, .. }, Token::MiddleExpr { line, marker, code }, rest @ ..]
            if is_blank(text) && marker.is_empty() =>
        {
            frame.line += text.bytes().filter(|byte| *byte == b'\n').count();
            frame.source.push_str(text);
            for _ in frame.line..*line {
                frame.source.push('\n');
            }
            frame.source.push_str(code);
            frame.line = *line;
            look_ahead_text(rest, frame)
        }
        _ => tokens,
    }
}

fn is_blank(text: &str) -> bool {
    text.bytes().all(|byte| matches!(byte, b' ' | b'\t' | b'\r' | b'\n'))
}

#[cfg(test)]
mod test {
    use super::{is_blank, look_ahead_text, Frame};
    use crate::Token;

    fn middle() -> Token {
        Token::MiddleExpr { line: 2, marker: String::new(), code: " else ".into() }
    }

    #[test]
    fn blank_text_and_the_middle_tag_fold_together() {
        let tokens = vec![
            Token::Text { line: 1, text: " \n".into() },
            middle(),
            Token::Text { line: 2, text: "B".into() },
        ];
        let mut frame = Frame::open(1, " if x do ");
        let rest = look_ahead_text(&tokens, &mut frame);
        assert_eq!(rest, &tokens[2..]);
        assert_eq!(frame.source, " if x do  \n else ");
        assert_eq!(frame.line, 2);
    }

    #[test]
    fn folding_is_idempotent() {
        let tokens = vec![middle()];
        let mut frame = Frame::open(1, " if x do  \n else ");
        frame.line = 2;
        let rest = look_ahead_text(&tokens, &mut frame);
        assert_eq!(rest, &tokens[..]);
        assert_eq!(frame.source, " if x do  \n else ");
    }

    #[test]
    fn marked_middle_tags_are_not_folded() {
        let tokens = vec![
            Token::Text { line: 1, text: " ".into() },
            Token::MiddleExpr { line: 1, marker: "=".into(), code: " else ".into() },
        ];
        let mut frame = Frame::open(1, " if x do ");
        let rest = look_ahead_text(&tokens, &mut frame);
        assert_eq!(rest, &tokens[..]);
        assert_eq!(frame.source, " if x do ");
    }

    #[test]
    fn meaningful_text_stays_in_the_stream() {
        let tokens = vec![
            Token::Text { line: 1, text: "A".into() },
            middle(),
        ];
        let mut frame = Frame::open(1, " if x do ");
        let rest = look_ahead_text(&tokens, &mut frame);
        assert_eq!(rest, &tokens[..]);
        assert!(!is_blank("A"));
    }
}
