/// One lexical unit emitted by the [tokenizer][crate::tokenize].
///
/// Every variant carries the 1-based line its tag or text starts at. The
/// `marker` is the character after `<%` indicating output semantics, `"="`
/// for visible output, empty for side effect only. Middle and end tags must
/// carry an empty marker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    /// Raw literal content between tags.
    Text { line: usize, text: String },
    /// A standalone expression tag, `<%= name %>`.
    Expr { line: usize, marker: String, code: String },
    /// Opens a control construct, `<% if cond do %>`.
    StartExpr { line: usize, marker: String, code: String },
    /// Continues a construct, `<% else %>`.
    MiddleExpr { line: usize, marker: String, code: String },
    /// Closes a construct, `<% end %>`.
    EndExpr { line: usize, marker: String, code: String },
}

impl Token {
    /// Line the token starts at.
    pub fn line(&self) -> usize {
        match self {
            Token::Text { line, .. }
            | Token::Expr { line, .. }
            | Token::StartExpr { line, .. }
            | Token::MiddleExpr { line, .. }
            | Token::EndExpr { line, .. } => *line,
        }
    }
}
