//! `FromStr` convenience implementations, mirroring the small set the teacher
//! exposes in `yash_syntax::parser::from_str` for tests and embedders that
//! want to parse a fragment without assembling a [`Config`]/[`Lexer`] pair by
//! hand.

use super::error;
use super::{Config, Error, Parser};
use crate::lexer::{LexOutcome, Lexer, TokenKind};
use crate::syntax::{CommandList, Word};
use std::str::FromStr;

impl FromStr for CommandList {
    type Err = Error;

    /// Parses a complete script with no aliases defined.
    fn from_str(s: &str) -> Result<Self, Error> {
        let config = Config::default();
        let lexer = Lexer::from_str_unattributed(s);
        let mut parser = Parser::new(lexer, &config);
        parser.parse_program()
    }
}

impl FromStr for Word {
    type Err = Error;

    /// Parses a single word, ignoring whatever text (if any) follows it.
    fn from_str(s: &str) -> Result<Self, Error> {
        let mut lexer = Lexer::from_str_unattributed(s);
        match lexer.next_token(false) {
            LexOutcome::Token(t) => match t.kind {
                TokenKind::Word(w) => Ok(w),
                _ => Err(error::unexpected(&t, "a word")),
            },
            LexOutcome::NeedMoreInput => Err(Error::Incomplete),
            LexOutcome::Error(e) => Err(Error::Lex(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_list_from_str() {
        let list: CommandList = "echo hi".parse().unwrap();
        assert_eq!(list.to_string(), "echo hi");
    }

    #[test]
    fn word_from_str() {
        let word: Word = "foo$bar".parse().unwrap();
        assert_eq!(word.to_string(), "foo$bar");
    }
}
