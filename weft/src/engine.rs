use weft_expr::Ast;

/// A template rendering engine.
///
/// The engine owns the buffer, the accumulator value that text and
/// expression results fold into. The compiler threads buffers through these
/// four operations and never inspects their shape, so any tree the engine
/// chooses to build is a valid buffer.
pub trait Engine {
    /// A fresh, empty buffer.
    fn init(&self) -> Ast;

    /// Fold literal text into the buffer.
    fn handle_text(&self, buffer: Ast, text: &str) -> Ast;

    /// Fold an expression into the buffer.
    ///
    /// `marker` is the tag marker, `"="` for expressions whose result is
    /// emitted and empty for expressions evaluated for effect only.
    fn handle_expr(&self, buffer: Ast, marker: &str, expr: Ast) -> Ast;

    /// Finish a buffer into the compiled artifact.
    fn handle_body(&self, buffer: Ast) -> Ast;
}

/// The reference [`Engine`].
///
/// Builds a string expression: text and emitted results chain through `<>`
/// concatenations, effect-only expressions run inside a `__block__` before
/// the buffer they precede.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatEngine;

impl Engine for ConcatEngine {
    fn init(&self) -> Ast {
        Ast::str("")
    }

    fn handle_text(&self, buffer: Ast, text: &str) -> Ast {
        concat(buffer, Ast::str(text))
    }

    fn handle_expr(&self, buffer: Ast, marker: &str, expr: Ast) -> Ast {
        match marker {
            "=" => concat(buffer, Ast::call("to_string", 0, vec![expr])),
            // empty and the reserved `/` and `|` markers evaluate for
            // effect only
            _ => Ast::call("__block__", 0, vec![expr, buffer]),
        }
    }

    fn handle_body(&self, buffer: Ast) -> Ast {
        buffer
    }
}

fn concat(lhs: Ast, rhs: Ast) -> Ast {
    Ast::call("<>", 0, vec![lhs, rhs])
}
