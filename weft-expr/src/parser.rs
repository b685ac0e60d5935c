//! Recursive descent parser for the expression dialect.
//!
//! The grammar is expression-only: operators by precedence, calls with or
//! without parentheses in head position, and do-blocks that attach to the
//! preceding call as a trailing keyword list:
//!
//! ```text
//! if logged_in? do greet(user) else "guest" end
//! ```
//!
//! parses to `if(logged_in?, [do: greet(user), else: "guest"])`.
use crate::lexer::{lex, Lexeme, Tok};
use crate::{Ast, Lit, Meta, ParseError, Result};

/// Words that open, continue or close a do-block. They are rejected in
/// expression position.
const BLOCK_WORDS: [&str; 6] = ["do", "else", "catch", "rescue", "after", "end"];

/// Section words that may continue an open do-block.
const SECTION_WORDS: [&str; 4] = ["else", "catch", "rescue", "after"];

/// Parse expression source into an [`Ast`].
///
/// `line` is the line of the first character, used for node metadata and
/// errors. Multiple expressions separated by `;` or newlines parse into a
/// `__block__` call; empty source parses into the atom `nil`.
pub fn parse(source: &str, line: usize) -> Result<Ast> {
    let lexemes = lex(source, line)?;
    let mut parser = Parser { lexemes, index: 0, line };
    parser.parse_body(&[])
}

struct Parser {
    lexemes: Vec<Lexeme>,
    index: usize,
    /// Line of the most recently consumed lexeme, reported on early end of
    /// input.
    line: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.lexemes.get(self.index).map(|lexeme| &lexeme.tok)
    }

    fn peek_line(&self) -> usize {
        self.lexemes.get(self.index).map_or(self.line, |lexeme| lexeme.line)
    }

    fn advance(&mut self) {
        if let Some(lexeme) = self.lexemes.get(self.index) {
            self.line = lexeme.line;
            self.index += 1;
        }
    }

    fn peek_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(name)) if name == word)
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(tok) => ParseError::new(self.peek_line(), format!("unexpected token '{tok}'")),
            None => ParseError::new(self.line, "unexpected end of expression"),
        }
    }

    /// Parse statements until end of input or one of `terminators`, which is
    /// left unconsumed.
    fn parse_body(&mut self, terminators: &[&str]) -> Result<Ast> {
        let mut stmts = Vec::new();
        let line = self.peek_line();
        loop {
            while matches!(self.peek(), Some(Tok::Newline | Tok::Punct(";"))) {
                self.advance();
            }
            match self.peek() {
                None => break,
                Some(Tok::Ident(name)) if terminators.contains(&name.as_str()) => break,
                _ => {}
            }
            stmts.push(self.parse_expr()?);
            match self.peek() {
                None | Some(Tok::Newline | Tok::Punct(";")) => {}
                Some(Tok::Ident(name)) if terminators.contains(&name.as_str()) => {}
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(match stmts.len() {
            0 => Ast::atom("nil"),
            1 => stmts.pop().unwrap_or_else(|| unreachable!()),
            _ => Ast::Call { name: "__block__".into(), meta: Meta { line }, args: stmts },
        })
    }

    fn parse_expr(&mut self) -> Result<Ast> {
        let expr = self.parse_binary(0)?;
        if self.peek_word("do") {
            self.attach_do_block(expr)
        } else {
            Ok(expr)
        }
    }

    fn parse_binary(&mut self, min: u8) -> Result<Ast> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, prec, right)) = self.peek().and_then(binary_op) {
            if prec < min {
                break;
            }
            let line = self.peek_line();
            self.advance();
            let rhs = self.parse_binary(if right { prec } else { prec + 1 })?;
            lhs = Ast::call(op, line, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Ast> {
        let line = self.peek_line();
        match self.peek() {
            Some(Tok::Punct("-")) => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Ast::call("-", line, vec![expr]))
            }
            Some(Tok::Ident(name)) if name == "not" => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Ast::call("not", line, vec![expr]))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Ast> {
        let mut expr = self.parse_primary()?;
        while matches!(self.peek(), Some(Tok::Punct("."))) {
            let line = self.peek_line();
            self.advance();
            let field = match self.peek() {
                Some(Tok::Ident(name)) if !BLOCK_WORDS.contains(&name.as_str()) => name.clone(),
                _ => return Err(self.unexpected()),
            };
            self.advance();
            expr = Ast::call(".", line, vec![expr, Ast::atom(field)]);
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Ast> {
        let line = self.peek_line();
        let tok = match self.peek() {
            Some(tok) => tok.clone(),
            None => return Err(self.unexpected()),
        };
        match tok {
            Tok::Int(value) => {
                self.advance();
                Ok(Ast::int(value))
            }
            Tok::Str(value) => {
                self.advance();
                Ok(Ast::str(value))
            }
            Tok::Atom(name) => {
                self.advance();
                Ok(Ast::atom(name))
            }
            Tok::Punct("(") => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(inner)
            }
            Tok::Punct("[") => {
                self.advance();
                let mut items = Vec::new();
                if !matches!(self.peek(), Some(Tok::Punct("]"))) {
                    loop {
                        items.push(self.parse_expr()?);
                        match self.peek() {
                            Some(Tok::Punct(",")) => self.advance(),
                            _ => break,
                        }
                    }
                }
                self.expect_punct("]")?;
                Ok(Ast::List(items))
            }
            Tok::Ident(name) if BLOCK_WORDS.contains(&name.as_str()) => Err(self.unexpected()),
            Tok::Ident(name) => {
                self.advance();
                if matches!(self.peek(), Some(Tok::Punct("("))) {
                    self.advance();
                    let mut args = Vec::new();
                    if !matches!(self.peek(), Some(Tok::Punct(")"))) {
                        loop {
                            args.push(self.parse_expr()?);
                            match self.peek() {
                                Some(Tok::Punct(",")) => self.advance(),
                                _ => break,
                            }
                        }
                    }
                    self.expect_punct(")")?;
                    Ok(Ast::Call { name, meta: Meta { line }, args })
                } else if self.at_argument_start() {
                    // paren-free call in head position, `if cond do`
                    let mut args = vec![self.parse_binary(0)?];
                    while matches!(self.peek(), Some(Tok::Punct(","))) {
                        self.advance();
                        args.push(self.parse_binary(0)?);
                    }
                    Ok(Ast::Call { name, meta: Meta { line }, args })
                } else {
                    Ok(Ast::ident(name))
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Whether the next lexeme can begin a paren-free call argument.
    fn at_argument_start(&self) -> bool {
        match self.peek() {
            Some(Tok::Int(_) | Tok::Str(_) | Tok::Atom(_)) => true,
            Some(Tok::Punct("[")) => true,
            Some(Tok::Ident(name)) => {
                name == "not" || (!BLOCK_WORDS.contains(&name.as_str()) && name != "and" && name != "or")
            }
            _ => false,
        }
    }

    /// Attach a pending `do … end` to `head`.
    ///
    /// The block belongs to the call the expression is headed by, so
    /// operator applications hand it down to their rightmost operand:
    /// `x = if y do … end` attaches to the `if`, not to the `=`.
    fn attach_do_block(&mut self, head: Ast) -> Result<Ast> {
        match head {
            Ast::Call { name, meta, mut args } if is_operator(&name) && !args.is_empty() => {
                let operand = args.pop().unwrap_or_else(|| unreachable!());
                args.push(self.attach_do_block(operand)?);
                Ok(Ast::Call { name, meta, args })
            }
            Ast::Call { name, meta, mut args } => {
                args.push(self.parse_do_sections()?);
                Ok(Ast::Call { name, meta, args })
            }
            Ast::Lit(Lit::Ident(name)) => {
                let line = self.peek_line();
                let block = self.parse_do_sections()?;
                Ok(Ast::Call { name, meta: Meta { line }, args: vec![block] })
            }
            _ => Err(ParseError::new(self.peek_line(), "unexpected token 'do'")),
        }
    }

    /// Consume `do … end` into the section keyword list.
    fn parse_do_sections(&mut self) -> Result<Ast> {
        self.advance();
        let mut sections = Vec::new();
        let mut word = "do".to_owned();
        loop {
            let body = self.parse_body(&SECTION_WORDS_WITH_END)?;
            sections.push(Ast::pair(Ast::Lit(Lit::Atom(word)), body));
            match self.peek() {
                Some(Tok::Ident(name)) if name == "end" => {
                    self.advance();
                    break;
                }
                Some(Tok::Ident(name)) if SECTION_WORDS.contains(&name.as_str()) => {
                    word = name.clone();
                    self.advance();
                }
                None => {
                    return Err(ParseError::new(self.line, "missing 'end' for 'do' block"));
                }
                Some(_) => unreachable!("body stops at a block word or end of input"),
            }
        }
        Ok(Ast::List(sections))
    }

    fn expect_punct(&mut self, punct: &str) -> Result<()> {
        match self.peek() {
            Some(Tok::Punct(found)) if *found == punct => {
                self.advance();
                Ok(())
            }
            _ => Err(self.unexpected()),
        }
    }
}

const SECTION_WORDS_WITH_END: [&str; 5] = ["else", "catch", "rescue", "after", "end"];

/// Operator names produced by [`Parser::parse_binary`] and
/// [`Parser::parse_unary`].
fn is_operator(name: &str) -> bool {
    matches!(
        name,
        "=" | "<-"
            | "or"
            | "and"
            | "not"
            | "=="
            | "!="
            | "<"
            | ">"
            | "<="
            | ">="
            | "|>"
            | "++"
            | "--"
            | "<>"
            | "+"
            | "-"
            | "*"
            | "/"
    )
}

fn binary_op(tok: &Tok) -> Option<(&'static str, u8, bool)> {
    let op = match tok {
        Tok::Punct(punct) => *punct,
        Tok::Ident(name) if name == "and" => "and",
        Tok::Ident(name) if name == "or" => "or",
        _ => return None,
    };
    // (precedence, right associative), loosest first
    let (prec, right) = match op {
        "=" => (1, true),
        "<-" => (2, true),
        "or" => (3, false),
        "and" => (4, false),
        "==" | "!=" | "<" | ">" | "<=" | ">=" => (5, false),
        "|>" => (6, false),
        "++" | "--" | "<>" => (7, true),
        "+" | "-" => (8, false),
        "*" | "/" => (9, false),
        _ => return None,
    };
    Some((op, prec, right))
}

#[cfg(test)]
mod test {
    use super::parse;
    use crate::{Ast, Lit};

    #[test]
    fn literals() {
        assert_eq!(parse("42", 1).unwrap(), Ast::int(42));
        assert_eq!(parse("\"hi\"", 1).unwrap(), Ast::str("hi"));
        assert_eq!(parse(":ok", 1).unwrap(), Ast::atom("ok"));
        assert_eq!(parse("name", 1).unwrap(), Ast::ident("name"));
        assert_eq!(parse("", 1).unwrap(), Ast::atom("nil"));
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse("1 + 2 * 3", 1).unwrap(),
            Ast::call("+", 1, vec![Ast::int(1), Ast::call("*", 1, vec![Ast::int(2), Ast::int(3)])]),
        );
        assert_eq!(
            parse("a <> b <> c", 1).unwrap(),
            Ast::call(
                "<>",
                1,
                vec![
                    Ast::ident("a"),
                    Ast::call("<>", 1, vec![Ast::ident("b"), Ast::ident("c")]),
                ],
            ),
        );
    }

    #[test]
    fn calls() {
        assert_eq!(
            parse("greet(user, 2)", 1).unwrap(),
            Ast::call("greet", 1, vec![Ast::ident("user"), Ast::int(2)]),
        );
        // paren-free head call
        assert_eq!(
            parse("to_string name", 1).unwrap(),
            Ast::call("to_string", 1, vec![Ast::ident("name")]),
        );
    }

    #[test]
    fn dot_access() {
        assert_eq!(
            parse("user.name", 1).unwrap(),
            Ast::call(".", 1, vec![Ast::ident("user"), Ast::atom("name")]),
        );
    }

    #[test]
    fn do_block_with_else() {
        let ast = parse("if x do :a else :b end", 1).unwrap();
        assert_eq!(
            ast,
            Ast::call(
                "if",
                1,
                vec![
                    Ast::ident("x"),
                    Ast::List(vec![
                        Ast::pair(Ast::atom("do"), Ast::atom("a")),
                        Ast::pair(Ast::atom("else"), Ast::atom("b")),
                    ]),
                ],
            ),
        );
    }

    #[test]
    fn for_with_generator() {
        let ast = parse("for x <- items do x end", 1).unwrap();
        assert_eq!(
            ast,
            Ast::call(
                "for",
                1,
                vec![
                    Ast::call("<-", 1, vec![Ast::ident("x"), Ast::ident("items")]),
                    Ast::List(vec![Ast::pair(Ast::atom("do"), Ast::ident("x"))]),
                ],
            ),
        );
    }

    #[test]
    fn do_block_attaches_through_operators() {
        let ast = parse("x = if y do :a end", 1).unwrap();
        assert_eq!(
            ast,
            Ast::call(
                "=",
                1,
                vec![
                    Ast::ident("x"),
                    Ast::call(
                        "if",
                        1,
                        vec![
                            Ast::ident("y"),
                            Ast::List(vec![Ast::pair(Ast::atom("do"), Ast::atom("a"))]),
                        ],
                    ),
                ],
            ),
        );
    }

    #[test]
    fn do_block_needs_a_call_head() {
        let err = parse("1 + 2 do :a end", 1).unwrap_err();
        assert_eq!(err.message, "unexpected token 'do'");
    }

    #[test]
    fn block_of_statements() {
        let ast = parse("a = 1\nb = 2", 1).unwrap();
        let Ast::Call { name, args, .. } = ast else { panic!("expected __block__") };
        assert_eq!(name, "__block__");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn empty_do_body_is_nil() {
        let ast = parse("if x do end", 1).unwrap();
        assert_eq!(
            ast,
            Ast::call(
                "if",
                1,
                vec![
                    Ast::ident("x"),
                    Ast::List(vec![Ast::pair(Ast::atom("do"), Ast::atom("nil"))]),
                ],
            ),
        );
    }

    #[test]
    fn error_lines_respect_padding() {
        // two padding newlines push the offending token to line 6
        let err = parse("if x do :a\n\nelse ,\nend", 4).unwrap_err();
        assert_eq!(err.line, 6);
        assert_eq!(err.message, "unexpected token ','");
    }

    #[test]
    fn missing_end() {
        let err = parse("if x do :a", 1).unwrap_err();
        assert_eq!(err.message, "missing 'end' for 'do' block");
    }

    #[test]
    fn stray_end() {
        let err = parse("end", 3).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.message, "unexpected token 'end'");
    }

    #[test]
    fn adjacent_expressions_need_a_separator() {
        let err = parse("1 2", 1).unwrap_err();
        assert_eq!(err.message, "unexpected token '2'");
    }

    #[test]
    fn variables_survive_literal_roles() {
        // `not` is unary, `and`/`or` stay operators after an operand
        assert_eq!(
            parse("not a and b", 1).unwrap(),
            Ast::call(
                "and",
                1,
                vec![Ast::call("not", 1, vec![Ast::ident("a")]), Ast::ident("b")],
            ),
        );
    }

    #[test]
    fn lit_display() {
        assert_eq!(Lit::Atom("ok".into()).to_string(), ":ok");
        assert_eq!(parse("1 + 2 * 3", 1).unwrap().to_string(), "(1 + (2 * 3))");
    }
}
