//! The expression dialect used inside [`weft`][1] templates.
//!
//! [`parse`] turns expression source into an [`Ast`], a deliberately small
//! tree of four shapes: calls, pairings, sequences and literals. The dialect
//! covers literals, operators, calls and `do … end` blocks:
//!
//! ```
//! let ast = weft_expr::parse("if admin? do :allow else :deny end", 1).unwrap();
//! assert_eq!(ast.to_string(), "if(admin?, [:do: :allow, :else: :deny])");
//! ```
//!
//! The template compiler reconstructs the full source of a control construct
//! (start tag through `end` tag) and parses it here as one unit, so the
//! grammar's only job is to give those constructs a faithful tree shape.
//!
//! Maps, anonymous functions and `->` clause heads are not part of the
//! dialect and fail with a [`ParseError`].
//!
//! [1]: <https://docs.rs/weft>
mod ast;
mod lexer;
mod parser;
mod error;

pub use ast::{Ast, Lit, Meta};
pub use error::{ParseError, Result};
pub use parser::parse;
