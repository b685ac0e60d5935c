//! Compiler for embedded-expression templates.
//!
//! Templates interleave text with expression tags:
//!
//! ```text
//! Hello <%= name %>!
//! <% if admin? do %>admin<% else %>guest<% end %>
//! ```
//!
//! [`compile`] tokenizes the source, folds text and expressions into a
//! buffer through a pluggable [`Engine`], and returns the finished
//! artifact, an expression tree ready for evaluation or code generation.
//! Control constructs (`if … do`/`else`/`end` and friends) may span tags;
//! the compiler reconstructs their full source, parses it as one unit with
//! [`weft_expr`], and splices the per-branch buffers back into the parsed
//! tree. Compilation is a pure transform: identical source and options
//! always produce an identical artifact or an identical [`Error`].
//!
//! ```
//! let artifact = weft::compile("Hello <%= name %>!").unwrap();
//! assert_eq!(
//!     artifact.to_string(),
//!     r#"((("" <> "Hello ") <> to_string(name)) <> "!")"#,
//! );
//! ```
mod token;
mod tokenizer;
mod engine;
mod placeholder;
mod compiler;
mod options;
mod error;

pub use engine::{ConcatEngine, Engine};
pub use error::{Error, Result};
pub use options::Options;
pub use token::Token;
pub use tokenizer::{tokenize, TokenizeError};

pub use weft_expr::{Ast, Lit, Meta};

use compiler::Compiler;

/// Compile template source with default [`Options`].
pub fn compile(source: &str) -> Result<Ast> {
    compile_with(source, Options::default())
}

/// Compile template source into an artifact.
pub fn compile_with<E: Engine>(source: &str, options: Options<E>) -> Result<Ast> {
    let tokens = tokenize(source, options.line, options.trim).map_err(|err| Error {
        file: options.file.clone(),
        line: err.line,
        message: err.message,
    })?;
    Compiler::new(&options.engine, &options.file).compile(&tokens)
}
