//! Parser error type.

use crate::lexer::{LexError, Token, TokenKind};
use crate::source::Location;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("unexpected end of input")]
    Incomplete,
    #[error("{location}: expected {expected}, found {found}")]
    Unexpected {
        location: Location,
        expected: String,
        found: String,
    },
}

pub(crate) fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Operator(op) => format!("`{op}`"),
        TokenKind::Word(w) => format!("word `{w}`"),
        TokenKind::IoNumber(n) => format!("io number `{n}`"),
        TokenKind::Reserved(kw) => format!("`{kw}`"),
        TokenKind::Newline => "newline".to_string(),
        TokenKind::EndOfInput => "end of input".to_string(),
    }
}

pub(crate) fn unexpected(tok: &Token, expected: impl Into<String>) -> Error {
    Error::Unexpected {
        location: tok.location.clone(),
        expected: expected.into(),
        found: describe(&tok.kind),
    }
}
