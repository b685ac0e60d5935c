//! Placeholder bookkeeping for control constructs.
//!
//! The source of a construct is only parseable as one unit, start tag
//! through `end` tag, but the buffer for each branch is a tree, not source
//! text. The compiler reserves each branch position with a uniquely keyed
//! call, `__weft__(0);`, parses the whole construct, then substitutes the
//! recorded buffers back in here.
use weft_expr::{Ast, Lit};

pub(crate) const PLACEHOLDER: &str = "__weft__";

/// Source text reserving the position of the buffer bound to `key`. The
/// trailing `;` separates the placeholder from the construct word after it.
pub(crate) fn placeholder_source(key: usize) -> String {
    format!("{PLACEHOLDER}({key});")
}

/// Replace every placeholder call in `ast` with its bound buffer.
///
/// Total over the tree: call, pair and sequence nodes recurse, literals pass
/// through. Keys are assigned by the compiler as the table grows, so a
/// missing key is an invariant violation, not a template error.
pub(crate) fn insert_placeholders(ast: Ast, table: &[Ast]) -> Ast {
    match ast {
        Ast::Call { name, meta, args } => {
            if name == PLACEHOLDER {
                if let [Ast::Lit(Lit::Int(key))] = args.as_slice() {
                    let key = *key as usize;
                    return match table.get(key) {
                        Some(buffer) => buffer.clone(),
                        None => panic!("placeholder key {key} missing from table"),
                    };
                }
            }
            let args = args.into_iter().map(|arg| insert_placeholders(arg, table)).collect();
            Ast::Call { name, meta, args }
        }
        Ast::Pair(left, right) => Ast::pair(
            insert_placeholders(*left, table),
            insert_placeholders(*right, table),
        ),
        Ast::List(items) => {
            Ast::List(items.into_iter().map(|item| insert_placeholders(item, table)).collect())
        }
        lit @ Ast::Lit(_) => lit,
    }
}
