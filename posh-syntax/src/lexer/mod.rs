//! Lexer: turns a character stream into [`Token`]s under POSIX quoting rules.
//!
//! The lexer owns the textual payload of every token it produces; AST nodes
//! built by the [`crate::parser`] only ever borrow that payload by copying it
//! into [`crate::syntax::Word`] structures, never by reference, so the
//! lexer's internal buffer can be dropped once parsing of a script is
//! complete.
//!
//! Heredoc bodies are the one place where scanning is deferred: a `<<`/`<<-`
//! operator only reserves a slot (see [`Lexer::queue_here_doc`]); the body
//! text is read from the lines that follow the next unquoted newline.

mod heredoc;
mod scan;
mod token;

pub use token::{Keyword, Operator, Token, TokenKind};
pub(crate) use heredoc::PendingHereDoc;

use crate::source::{Code, Location, Position, Source};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A lexer error with its location.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {message}")]
pub struct LexError {
    pub location: Location,
    pub message: String,
}

/// Result of requesting the next token.
pub enum LexOutcome {
    Token(Token),
    /// The lexer is in the middle of a quoted region or an unterminated
    /// heredoc and needs more input before it can produce a token. This is
    /// not an error: an interactive driver should feed another line and
    /// retry.
    NeedMoreInput,
    Error(LexError),
}

pub(crate) enum Internal {
    NeedMoreInput,
    Error(LexError),
}

impl From<LexError> for Internal {
    fn from(e: LexError) -> Self {
        Internal::Error(e)
    }
}

pub(crate) type Scan<T> = Result<T, Internal>;

/// Turns source text into a stream of [`Token`]s.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    code: Rc<Code>,
    pending_here_docs: VecDeque<PendingHereDoc>,
}

impl Lexer {
    /// Creates a lexer over `source_text`, attributing every location it
    /// produces to `source`.
    pub fn new(source_text: &str, source: Source) -> Self {
        let code = Rc::new(Code {
            value: Rc::from(source_text),
            line: 1,
            source: Rc::new(source),
        });
        Lexer {
            chars: source_text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            code,
            pending_here_docs: VecDeque::new(),
        }
    }

    /// Creates a lexer with no meaningful source attribution, for use by
    /// `FromStr` implementations and tests.
    pub fn from_str_unattributed(source_text: &str) -> Self {
        Self::new(source_text, Source::Unknown)
    }

    /// Appends more source text, e.g. after receiving [`LexOutcome::NeedMoreInput`]
    /// from an interactive input source. The append takes effect at the
    /// current end of the buffer.
    pub fn feed(&mut self, more: &str) {
        self.chars.extend(more.chars());
    }

    /// Registers a here-document redirection that was just parsed so its
    /// body is read from the following lines.
    pub(crate) fn queue_here_doc(&mut self, pending: PendingHereDoc) {
        self.pending_here_docs.push_back(pending);
    }

    pub(crate) fn has_pending_here_docs(&self) -> bool {
        !self.pending_here_docs.is_empty()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn mark(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn loc_from(&self, start: Position) -> Location {
        Location {
            code: self.code.clone(),
            start,
            end: self.mark(),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn err(&self, start: Position, message: impl Into<String>) -> Internal {
        Internal::Error(LexError {
            location: self.loc_from(start),
            message: message.into(),
        })
    }

    /// Requests the next token. `command_position` should be `true` when the
    /// token is expected at the start of a command: start of input, right
    /// after a separator operator, or a keyword that introduces a nested
    /// command list (`then`, `else`, `do`, etc). The [`crate::parser`] tracks
    /// this context and passes it in; the lexer does not infer grammar state
    /// on its own.
    pub fn next_token(&mut self, command_position: bool) -> LexOutcome {
        let start = self.pos;
        match scan::scan_token(self, command_position) {
            Ok(tok) => LexOutcome::Token(tok),
            Err(Internal::NeedMoreInput) => {
                self.pos = start;
                LexOutcome::NeedMoreInput
            }
            Err(Internal::Error(e)) => LexOutcome::Error(e),
        }
    }
}

impl fmt::Debug for Lexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("pos", &self.pos)
            .field("line", &self.line)
            .field("column", &self.column)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::from_str_unattributed(src);
        let mut out = Vec::new();
        let mut command_position = true;
        loop {
            match lexer.next_token(command_position) {
                LexOutcome::Token(t) => {
                    command_position = matches!(
                        t.kind,
                        TokenKind::Operator(
                            Operator::Semi
                                | Operator::Amp
                                | Operator::AndAnd
                                | Operator::OrOr
                                | Operator::Pipe
                                | Operator::LParen
                        ) | TokenKind::Newline
                    );
                    let is_eof = t.is_eof();
                    out.push(t.kind);
                    if is_eof {
                        break;
                    }
                }
                LexOutcome::NeedMoreInput => panic!("unexpected NeedMoreInput"),
                LexOutcome::Error(e) => panic!("lex error: {e}"),
            }
        }
        out
    }

    #[test]
    fn simple_words() {
        let toks = tokens("echo hi");
        assert_eq!(toks.len(), 3);
        assert!(matches!(toks[0], TokenKind::Word(_)));
        assert!(matches!(toks[1], TokenKind::Word(_)));
        assert!(matches!(toks[2], TokenKind::EndOfInput));
    }

    #[test]
    fn operators() {
        let toks = tokens("a && b || c");
        assert!(matches!(toks[1], TokenKind::Operator(Operator::AndAnd)));
        assert!(matches!(toks[3], TokenKind::Operator(Operator::OrOr)));
    }

    #[test]
    fn io_number() {
        let toks = tokens("2>file");
        assert!(matches!(toks[0], TokenKind::IoNumber(2)));
        assert!(matches!(toks[1], TokenKind::Operator(Operator::Greater)));
    }

    #[test]
    fn reserved_word_in_command_position() {
        let toks = tokens("if true; then echo x; fi");
        assert!(matches!(toks[0], TokenKind::Reserved(Keyword::If)));
        assert!(matches!(toks[2], TokenKind::Reserved(Keyword::Then)));
        assert!(matches!(toks.last().unwrap(), TokenKind::EndOfInput));
    }

    #[test]
    fn line_continuation_is_removed() {
        let toks = tokens("ec\\\nho hi");
        assert!(matches!(&toks[0], TokenKind::Word(w) if w.to_string() == "echo"));
    }
}
