//! Token types produced by the [`super::Lexer`].

use crate::source::Location;
use crate::syntax::Word;
use std::fmt;
use std::str::FromStr;

/// The closed set of shell operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
    AndAnd,
    OrOr,
    SemiSemi,
    SemiAmp,
    LessLess,
    LessLessDash,
    GreaterGreater,
    LessGreater,
    LessAmp,
    GreaterAmp,
    GreaterPipe,
    Pipe,
    Amp,
    Semi,
    LParen,
    RParen,
    Less,
    Greater,
}

impl Operator {
    /// All operators paired with their spelling, ordered so that a
    /// longest-prefix-first scan finds multi-character operators before their single-character
    /// prefixes.
    pub const TABLE: &'static [(&'static str, Operator)] = &[
        ("&&", Operator::AndAnd),
        ("||", Operator::OrOr),
        (";;", Operator::SemiSemi),
        (";&", Operator::SemiAmp),
        ("<<-", Operator::LessLessDash),
        ("<<", Operator::LessLess),
        (">>", Operator::GreaterGreater),
        ("<>", Operator::LessGreater),
        ("<&", Operator::LessAmp),
        (">&", Operator::GreaterAmp),
        (">|", Operator::GreaterPipe),
        ("|", Operator::Pipe),
        ("&", Operator::Amp),
        (";", Operator::Semi),
        ("(", Operator::LParen),
            (")", Operator::RParen),
        ("<", Operator::Less),
        (">", Operator::Greater),
    ];
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (spelling, _) = Operator::TABLE
        .iter()
        .find(|(_, op)| op == self)
        .expect("every Operator variant appears in TABLE");
        write!(f, "{spelling}")
    }
}

/// The closed set of reserved words.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Keyword {
    If,
    Then,
    Elif,
    Else,
    Fi,
    While,
    Until,
    For,
    Do,
    Done,
    Case,
    In,
    Esac,
    LBrace,
    RBrace,
    Bang,
}

impl Keyword {
    pub const ALL: &'static [(&'static str, Keyword)] = &[
        ("if", Keyword::If),
        ("then", Keyword::Then),
        ("elif", Keyword::Elif),
        ("else", Keyword::Else),
        ("fi", Keyword::Fi),
        ("while", Keyword::While),
        ("until", Keyword::Until),
        ("for", Keyword::For),
        ("do", Keyword::Do),
        ("done", Keyword::Done),
        ("case", Keyword::Case),
        ("in", Keyword::In),
        ("esac", Keyword::Esac),
        ("{", Keyword::LBrace),
            ("}", Keyword::RBrace),
        ("!", Keyword::Bang),
    ];
}

impl FromStr for Keyword {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        Keyword::ALL
        .iter()
        .find(|(spelling, _)| *spelling == s)
        .map(|(_, kw)| *kw)
        .ok_or(())
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (spelling, _) = Keyword::ALL
        .iter()
        .find(|(_, kw)| kw == self)
        .expect("every Keyword variant appears in ALL");
        write!(f, "{spelling}")
    }
}

/// The kind of a lexical token.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Operator(Operator),
    Word(Word),
    /// A bare decimal digit sequence immediately followed by `<` or `>`
    ///.
    IoNumber(i32),
    Reserved(Keyword),
    Newline,
    EndOfInput,
}

/// A lexical token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

impl Token {
    /// Returns the token as an operator, if it is one.
    pub fn as_operator(&self) -> Option<Operator> {
        match self.kind {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_reserved(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Reserved(kw) => Some(kw),
            _ => None,
        }
    }

    pub fn as_word(&self) -> Option<&Word> {
        match &self.kind {
            TokenKind::Word(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_newline(&self) -> bool {
        matches!(self.kind, TokenKind::Newline)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfInput)
    }
}
