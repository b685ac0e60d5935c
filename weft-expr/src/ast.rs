use std::fmt;

/// Node metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Meta {
    /// Source line the node starts at, `0` for synthesized nodes.
    pub line: usize,
}

/// An atomic value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lit {
    /// `42`
    Int(i64),
    /// `"text"`
    Str(String),
    /// `:name`
    Atom(String),
    /// `name`, a variable reference.
    Ident(String),
}

/// An expression tree.
///
/// The variant set is closed: every node is a call, a pairing, a sequence,
/// or an atomic literal. Consumers can walk a tree with a total match over
/// these four shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ast {
    /// Call or operator application: `name`, metadata and arguments.
    ///
    /// Binary operators use their symbol as the name, e.g. `<>` with two
    /// arguments. Do-blocks are carried as a trailing [`Ast::List`] of
    /// section pairs.
    Call {
        name: String,
        meta: Meta,
        args: Vec<Ast>,
    },
    /// Two-part pairing, e.g. a `do:` section and its body.
    Pair(Box<Ast>, Box<Ast>),
    /// Ordered sequence of nodes.
    List(Vec<Ast>),
    /// Atomic leaf.
    Lit(Lit),
}

impl Ast {
    /// Create a [`Ast::Call`] node.
    pub fn call(name: impl Into<String>, line: usize, args: Vec<Ast>) -> Ast {
        Ast::Call { name: name.into(), meta: Meta { line }, args }
    }

    /// Create an integer leaf.
    pub fn int(value: i64) -> Ast {
        Ast::Lit(Lit::Int(value))
    }

    /// Create a string leaf.
    pub fn str(value: impl Into<String>) -> Ast {
        Ast::Lit(Lit::Str(value.into()))
    }

    /// Create an atom leaf.
    pub fn atom(name: impl Into<String>) -> Ast {
        Ast::Lit(Lit::Atom(name.into()))
    }

    /// Create a variable leaf.
    pub fn ident(name: impl Into<String>) -> Ast {
        Ast::Lit(Lit::Ident(name.into()))
    }

    /// Create a pairing node.
    pub fn pair(left: Ast, right: Ast) -> Ast {
        Ast::Pair(left.into(), right.into())
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Int(value) => write!(f, "{value}"),
            Lit::Str(value) => write!(f, "{value:?}"),
            Lit::Atom(name) => write!(f, ":{name}"),
            Lit::Ident(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Call { name, args, .. } => match args.as_slice() {
                [lhs, rhs] if !name.chars().any(|ch| ch.is_alphanumeric() || ch == '_') => {
                    write!(f, "({lhs} {name} {rhs})")
                }
                args => {
                    write!(f, "{name}(")?;
                    for (at, arg) in args.iter().enumerate() {
                        if at > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(")")
                }
            },
            Ast::Pair(left, right) => write!(f, "{left}: {right}"),
            Ast::List(items) => {
                f.write_str("[")?;
                for (at, item) in items.iter().enumerate() {
                    if at > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Ast::Lit(lit) => lit.fmt(f),
        }
    }
}
