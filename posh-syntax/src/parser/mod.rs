//! Recursive-descent parser: turns a [`crate::lexer::Lexer`]'s token stream
//! into a [`crate::syntax::CommandList`].
//!
//! The parser drives the lexer with one token of lookahead, explicitly
//! telling it at every fetch whether a reserved word is expected at that
//! position.
//! Alias substitution happens here, not in
//! the lexer: a word fetched in command position is looked up in the
//! configured [`crate::alias::Glossary`] and, if found, its replacement text
//! is lexed and spliced back onto the front of the token stream before
//! parsing continues.

mod compound;
mod error;
mod from_str;

pub use error::Error;

use crate::alias::AliasTable;
use crate::lexer::{Keyword, Lexer, LexOutcome, Operator, PendingHereDoc, Token, TokenKind};
use crate::syntax::{
    AndOrList, AndOrOp, Assign, CaseAction, CaseItem, Command, CompoundCommand, CommandList,
    HereDocCell, Item, Pipeline, RedirOp, RedirTarget, Redirection, Separator, SimpleCommand,
    Word, WordPart, WordPartKind,
};
use std::collections::VecDeque;
use std::rc::Rc;

/// Pluggable parsing policy: currently just the
/// alias glossary consulted for command-position words.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub aliases: AliasTable,
}

struct PendingEntry {
    token: Token,
    /// Set on the last token spliced in for an alias expansion, so the
    /// parser knows when that alias is no longer "in progress" and may be
    /// re-triggered (needed for e.g. a loop calling itself by alias name).
    alias_end: Option<String>,
}

pub struct Parser<'a> {
    lexer: Lexer,
    config: &'a Config,
    pending: VecDeque<PendingEntry>,
    expanding: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer, config: &'a Config) -> Self {
        Parser {
            lexer,
            config,
            pending: VecDeque::new(),
            expanding: Vec::new(),
        }
    }

    /// Parses a complete script.
    pub fn parse_program(&mut self) -> Result<CommandList, Error> {
        let list = self.parse_command_list(|_| false)?;
        let tok = self.peek(true)?;
        if !tok.is_eof() {
            return Err(error::unexpected(&tok, "end of input"));
        }
        Ok(list)
    }

    fn raw_next(&mut self, command_position: bool) -> Result<Token, Error> {
        if let Some(entry) = self.pending.pop_front() {
            if let Some(name) = entry.alias_end {
                self.expanding.retain(|n| n != &name);
            }
            return Ok(entry.token);
        }
        match self.lexer.next_token(command_position) {
            LexOutcome::Token(t) => Ok(t),
            LexOutcome::NeedMoreInput => Err(Error::Incomplete),
            LexOutcome::Error(e) => Err(Error::Lex(e)),
        }
    }

    /// Fetches the next token, substituting aliases when `command_position`
    /// is set and the word fetched names one.
    fn advance(&mut self, command_position: bool) -> Result<Token, Error> {
        loop {
            let tok = self.raw_next(command_position)?;
            if command_position {
                if let TokenKind::Word(w) = &tok.kind {
                    if let Some(lit) = w.as_raw_literal() {
                        if !self.expanding.iter().any(|n| n == &lit) {
                            if let Some(alias) = self.config.aliases.lookup(&lit) {
                                self.push_alias_expansion(lit, alias.replacement.clone());
                                continue;
                            }
                        }
                    }
                }
            }
            return Ok(tok);
        }
    }

    fn peek(&mut self, command_position: bool) -> Result<Token, Error> {
        let tok = self.advance(command_position)?;
        self.pending.push_front(PendingEntry {
                token: tok.clone(),
                alias_end: None,
            });
        Ok(tok)
    }

    fn peek_n(&mut self, n: usize, command_position: bool) -> Result<Vec<Token>, Error> {
        let mut toks = Vec::with_capacity(n);
        for _ in 0..n {
            toks.push(self.advance(command_position)?);
        }
        for t in toks.iter().rev() {
            self.pending.push_front(PendingEntry {
                    token: t.clone(),
                    alias_end: None,
                });
        }
        Ok(toks)
    }

    fn push_alias_expansion(&mut self, name: String, replacement: String) {
        self.expanding.push(name.clone());
        let mut sub_lexer = Lexer::from_str_unattributed(&replacement);
        let mut toks = Vec::new();
        let mut command_position = true;
        loop {
            match sub_lexer.next_token(command_position) {
                LexOutcome::Token(t) => {
                    if t.is_eof() {
                        break;
                    }
                    command_position = matches!(t.kind, TokenKind::Newline)
                    || matches!(
                        t.kind,
                        TokenKind::Operator(
                            Operator::Semi
                            | Operator::Amp
                            | Operator::AndAnd
                            | Operator::OrOr
                            | Operator::Pipe
                            | Operator::LParen
                        )
                    );
                    toks.push(t);
                }
                // Malformed or incomplete alias text: stop splicing rather
                // than fail the whole parse.
                LexOutcome::NeedMoreInput | LexOutcome::Error(_) => break,
            }
        }
        if toks.is_empty() {
            self.expanding.retain(|n| n != &name);
            return;
        }
        let last = toks.len() - 1;
        for (i, t) in toks.into_iter().enumerate().rev() {
            self.pending.push_front(PendingEntry {
                    token: t,
                    alias_end: if i == last { Some(name.clone()) } else { None },
                });
        }
    }

    fn skip_newlines(&mut self) -> Result<(), Error> {
        loop {
            let tok = self.peek(true)?;
            if tok.is_newline() {
                self.advance(true)?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn expect_reserved(&mut self, kw: Keyword) -> Result<Token, Error> {
        let tok = self.advance(true)?;
        if tok.as_reserved() == Some(kw) {
            Ok(tok)
        } else {
            Err(error::unexpected(&tok, format!("`{kw}`")))
        }
    }

    fn expect_operator(&mut self, op: Operator) -> Result<Token, Error> {
        let tok = self.advance(false)?;
        if tok.as_operator() == Some(op) {
            Ok(tok)
        } else {
            Err(error::unexpected(&tok, format!("`{op}`")))
        }
    }

    /// Parses a sequence of items up to (but not including) a token that
    /// satisfies `is_terminator`, or end of input.
    fn parse_command_list(
        &mut self,
        is_terminator: impl Fn(&TokenKind) -> bool,
    ) -> Result<CommandList, Error> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines()?;
            let tok = self.peek(true)?;
            if tok.is_eof() || is_terminator(&tok.kind) {
                break;
            }
            let and_or = self.parse_and_or()?;
            let next = self.peek(true)?;
            let sep = match &next.kind {
                TokenKind::Operator(Operator::Semi) => {
                    self.advance(true)?;
                    Separator::Sequential
                }
                TokenKind::Operator(Operator::Amp) => {
                    self.advance(true)?;
                    Separator::Background
                }
                _ => Separator::End,
            };
            items.push(Item {
                    and_or: Rc::new(and_or),
                    sep,
                });
        }
        Ok(CommandList(items))
    }

    fn parse_and_or(&mut self) -> Result<AndOrList, Error> {
        let first = self.parse_pipeline()?;
        let mut rest = Vec::new();
        loop {
            let tok = self.peek(true)?;
            let op = match tok.kind {
                TokenKind::Operator(Operator::AndAnd) => AndOrOp::And,
                TokenKind::Operator(Operator::OrOr) => AndOrOp::Or,
                _ => break,
            };
            self.advance(true)?;
            self.skip_newlines()?;
            let p = self.parse_pipeline()?;
            rest.push((op, p));
        }
        Ok(AndOrList { first, rest })
    }

    fn parse_pipeline(&mut self) -> Result<Pipeline, Error> {
        let negated = if self.peek(true)?.as_reserved() == Some(Keyword::Bang) {
            self.advance(true)?;
            true
        } else {
            false
        };
        let mut commands = vec![Rc::new(self.parse_command()?)];
        loop {
            if self.peek(true)?.as_operator() == Some(Operator::Pipe) {
                self.advance(true)?;
                self.skip_newlines()?;
                commands.push(Rc::new(self.parse_command()?));
            } else {
                break;
            }
        }
        Ok(Pipeline { commands, negated })
    }

    fn parse_command(&mut self) -> Result<Command, Error> {
        let tok = self.peek(true)?;
        match &tok.kind {
            TokenKind::Reserved(
                Keyword::LBrace | Keyword::If | Keyword::While | Keyword::Until | Keyword::For
                | Keyword::Case,
            )
            | TokenKind::Operator(Operator::LParen) => {
                Ok(Command::Compound(self.parse_compound_command()?))
            }
            TokenKind::Word(w) => {
                if let Some(name) = w.as_raw_literal() {
                    if is_valid_name(&name) && self.peek_is_function_def()? {
                        return Ok(Command::Function(self.parse_function_def(name)?));
                    }
                }
                Ok(Command::Simple(self.parse_simple_command()?))
            }
            _ => Ok(Command::Simple(self.parse_simple_command()?)),
        }
    }

    fn peek_is_function_def(&mut self) -> Result<bool, Error> {
        let toks = self.peek_n(3, false)?;
        Ok(toks.len() == 3
            && toks[1].as_operator() == Some(Operator::LParen)
            && toks[2].as_operator() == Some(Operator::RParen))
    }

    fn parse_function_def(&mut self, name: String) -> Result<crate::syntax::FunctionDef, Error> {
        let name_tok = self.advance(true)?;
        let location = name_tok.location.clone();
        self.advance(false)?; // (
            self.advance(false)?; // )
        self.skip_newlines()?;
        let body = self.parse_compound_command()?;
        Ok(crate::syntax::FunctionDef {
                name,
                body: Rc::new(body),
                location,
            })
    }

    fn parse_compound_command(&mut self) -> Result<CompoundCommand, Error> {
        let tok = self.peek(true)?;
        let location = tok.location.clone();
        let kind = match &tok.kind {
            TokenKind::Reserved(Keyword::LBrace) => compound::parse_brace_group(self)?,
            TokenKind::Operator(Operator::LParen) => compound::parse_subshell(self)?,
            TokenKind::Reserved(Keyword::If) => compound::parse_if(self)?,
            TokenKind::Reserved(Keyword::While) => compound::parse_while(self)?,
            TokenKind::Reserved(Keyword::Until) => compound::parse_until(self)?,
            TokenKind::Reserved(Keyword::For) => compound::parse_for(self)?,
            TokenKind::Reserved(Keyword::Case) => compound::parse_case(self)?,
            _ => return Err(error::unexpected(&tok, "a compound command")),
        };
        let redirs = self.parse_redirections()?;
        Ok(CompoundCommand {
                kind,
                redirs,
                location,
            })
    }

    fn parse_simple_command(&mut self) -> Result<SimpleCommand, Error> {
        let start = self.peek(true)?.location.clone();
        let mut assigns = Vec::new();
        let mut words = Vec::new();
        let mut redirs = Vec::new();
        let mut seen_word = false;
        loop {
            let cmd_pos = !seen_word;
            let tok = self.peek(cmd_pos)?;
            match &tok.kind {
                TokenKind::IoNumber(n) => {
                    let n = *n;
                    self.advance(cmd_pos)?;
                    redirs.push(self.parse_redirection(Some(n))?);
                }
                TokenKind::Operator(op) if is_redir_operator(*op) => {
                    redirs.push(self.parse_redirection(None)?);
                }
                TokenKind::Word(w) => {
                    if !seen_word {
                        if let Some(a) = try_parse_assignment(w) {
                            self.advance(cmd_pos)?;
                            assigns.push(a);
                            continue;
                        }
                    }
                    let t = self.advance(cmd_pos)?;
                    if let TokenKind::Word(w) = t.kind {
                        words.push(w);
                        seen_word = true;
                    }
                }
                _ => {
                    if assigns.is_empty() && words.is_empty() && redirs.is_empty() {
                        return Err(error::unexpected(&tok, "a command"));
                    }
                    break;
                }
            }
        }
        Ok(SimpleCommand {
                assigns,
                words,
                redirs,
                location: start,
            })
    }

    fn parse_redirections(&mut self) -> Result<Vec<Redirection>, Error> {
        let mut redirs = Vec::new();
        loop {
            let tok = self.peek(false)?;
            match &tok.kind {
                TokenKind::IoNumber(n) => {
                    let n = *n;
                    self.advance(false)?;
                    redirs.push(self.parse_redirection(Some(n))?);
                }
                TokenKind::Operator(op) if is_redir_operator(*op) => {
                    redirs.push(self.parse_redirection(None)?);
                }
                _ => break,
            }
        }
        Ok(redirs)
    }

    fn parse_redirection(&mut self, io_number: Option<i32>) -> Result<Redirection, Error> {
        let op_tok = self.advance(false)?;
        let op = match op_tok.as_operator() {
            Some(Operator::Less) => RedirOp::In,
            Some(Operator::Greater) => RedirOp::Out,
            Some(Operator::GreaterGreater) => RedirOp::Append,
            Some(Operator::LessGreater) => RedirOp::InOut,
            Some(Operator::GreaterPipe) => RedirOp::Clobber,
            Some(Operator::LessAmp) => RedirOp::DupIn,
            Some(Operator::GreaterAmp) => RedirOp::DupOut,
            Some(Operator::LessLess) => RedirOp::HereDoc,
            Some(Operator::LessLessDash) => RedirOp::HereDocStrip,
            _ => return Err(error::unexpected(&op_tok, "a redirection operator")),
        };
        let location = op_tok.location;
        match op {
            RedirOp::HereDoc | RedirOp::HereDocStrip => {
                let word_tok = self.advance(false)?;
                let word = match word_tok.kind {
                    TokenKind::Word(w) => w,
                    _ => return Err(error::unexpected(&word_tok, "a here-document delimiter")),
                };
                let quoted = word.parts.iter().any(|p| p.quoted);
                let delimiter = delimiter_text(&word);
                let cell = Rc::new(HereDocCell::default());
                let strip_tabs = op == RedirOp::HereDocStrip;
                self.lexer.queue_here_doc(PendingHereDoc::new(
                        delimiter.clone(),
                        quoted,
                        strip_tabs,
                        cell.clone(),
                    ));
                Ok(Redirection {
                        io_number,
                        op,
                        target: RedirTarget::HereDoc {
                            delimiter,
                            quoted,
                            strip_tabs,
                            cell,
                        },
                        location,
                    })
            }
            RedirOp::DupIn | RedirOp::DupOut => {
                let word_tok = self.advance(false)?;
                match word_tok.kind {
                    TokenKind::Word(w) => {
                        if let Some(lit) = w.as_raw_literal() {
                            if lit == "-" {
                                return Ok(Redirection {
                                        io_number,
                                        op,
                                        target: RedirTarget::Close,
                                        location,
                                    });
                            }
                            if let Ok(n) = lit.parse::<i32>() {
                                return Ok(Redirection {
                                        io_number,
                                        op,
                                        target: RedirTarget::Fd(n),
                                        location,
                                    });
                            }
                        }
                        Ok(Redirection {
                                io_number,
                                op,
                                target: RedirTarget::File(w),
                                location,
                            })
                    }
                    _ => Err(error::unexpected(&word_tok, "a file descriptor or filename")),
                }
            }
            _ => {
                let word_tok = self.advance(false)?;
                match word_tok.kind {
                    TokenKind::Word(w) => Ok(Redirection {
                            io_number,
                            op,
                            target: RedirTarget::File(w),
                            location,
                        }),
                    _ => Err(error::unexpected(&word_tok, "a filename")),
                }
            }
        }
    }
}

fn is_redir_operator(op: Operator) -> bool {
    matches!(
        op,
        Operator::Less
        | Operator::Greater
        | Operator::LessLess
        | Operator::LessLessDash
        | Operator::GreaterGreater
        | Operator::LessGreater
        | Operator::LessAmp
        | Operator::GreaterAmp
        | Operator::GreaterPipe
    )
}

/// Concatenates the literal text of a word for use as a here-document
/// delimiter: quote characters are removed but no expansion is recognized,
/// since none is valid in that position.
fn delimiter_text(w: &Word) -> String {
    let mut s = String::new();
    for p in &w.parts {
        match &p.kind {
            WordPartKind::Literal(t) | WordPartKind::SingleQuoted(t) => s.push_str(t),
            WordPartKind::DoubleQuoted(inner) => {
                for ip in inner {
                    if let WordPartKind::Literal(t) = &ip.kind {
                        s.push_str(t);
                    }
                }
            }
            _ => {}
        }
    }
    s
}

pub(crate) fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Recognizes `NAME=value` at the start of a simple command: the name must come from an unquoted literal
/// prefix of the word's first part.
fn try_parse_assignment(w: &Word) -> Option<Assign> {
    let first = w.parts.first()?;
    let WordPartKind::Literal(s) = &first.kind else {
        return None;
    };
    if first.quoted {
        return None;
    }
    let eq = s.find('=')?;
    let name = &s[..eq];
    if name.is_empty() || !is_valid_name(name) {
        return None;
    }
    let rest = &s[eq + 1..];
    let mut value_parts = Vec::new();
    if !rest.is_empty() {
        value_parts.push(WordPart {
                kind: WordPartKind::Literal(rest.to_string()),
                quoted: false,
                location: first.location.clone(),
            });
    }
    value_parts.extend(w.parts[1..].iter().cloned());
    let value = Word {
        parts: value_parts,
        location: w.location.clone(),
    };
    Some(Assign {
            name: name.to_string(),
            value,
            location: w.location.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    fn parse(src: &str) -> CommandList {
        let config = Config::default();
        let lexer = Lexer::from_str_unattributed(src);
        let mut parser = Parser::new(lexer, &config);
        parser.parse_program().unwrap()
    }

    #[test]
    fn simple_command_round_trips() {
        let list = parse("echo hi there");
        assert_eq!(list.0.len(), 1);
        assert_eq!(list.to_string(), "echo hi there");
    }

    #[test]
    fn pipeline_and_and_or() {
        let list = parse("a | b && c || d");
        assert_eq!(list.to_string(), "a | b && c || d");
    }

    #[test]
    fn if_statement() {
        let list = parse("if true; then echo y; else echo n; fi");
        assert_eq!(list.0.len(), 1);
    }

    #[test]
    fn for_loop_without_in() {
        let list = parse("for x; do echo $x; done");
        let item = &list.0[0];
        let cmd = &item.and_or.first.commands[0];
        match cmd.as_ref() {
            Command::Compound(cc) => match &cc.kind {
                crate::syntax::CompoundKind::For { var, words, .. } => {
                    assert_eq!(var, "x");
                    assert!(words.is_none());
                }
                _ => panic!("expected for loop"),
            },
            _ => panic!("expected compound command"),
        }
    }

    #[test]
    fn assignment_prefix() {
        let list = parse("FOO=bar echo $FOO");
        let item = &list.0[0];
        match item.and_or.first.commands[0].as_ref() {
            Command::Simple(sc) => {
                assert_eq!(sc.assigns.len(), 1);
                assert_eq!(sc.assigns[0].name, "FOO");
                assert_eq!(sc.words.len(), 1);
            }
            _ => panic!("expected simple command"),
        }
    }

    #[test]
    fn function_definition() {
        let list = parse("greet() { echo hi; }");
        match list.0[0].and_or.first.commands[0].as_ref() {
            Command::Function(f) => assert_eq!(f.name, "greet"),
            _ => panic!("expected function definition"),
        }
    }

    #[test]
    fn here_doc_body_is_filled() {
        let list = parse("cat <<EOF\nhello $USER\nEOF\n");
        match list.0[0].and_or.first.commands[0].as_ref() {
            Command::Simple(sc) => {
                let redir = &sc.redirs[0];
                if let RedirTarget::HereDoc { cell, .. } = &redir.target {
                    let body = cell.0.borrow();
                    assert!(body.is_some());
                } else {
                    panic!("expected heredoc target");
                }
            }
            _ => panic!("expected simple command"),
        }
    }

    #[test]
    fn alias_substitution() {
        let mut config = Config::default();
        config.aliases.define("ll", "ls -l ");
        let lexer = Lexer::from_str_unattributed("ll /tmp");
        let mut parser = Parser::new(lexer, &config);
        let list = parser.parse_program().unwrap();
        match list.0[0].and_or.first.commands[0].as_ref() {
            Command::Simple(sc) => {
                assert_eq!(sc.words[0].to_string(), "ls");
                assert_eq!(sc.words[1].to_string(), "-l");
                assert_eq!(sc.words[2].to_string(), "/tmp");
            }
            _ => panic!("expected simple command"),
        }
    }

    fn parse_err(src: &str) -> Error {
        let config = Config::default();
        let lexer = Lexer::from_str_unattributed(src);
        let mut parser = Parser::new(lexer, &config);
        parser.parse_program().unwrap_err()
    }

    #[test]
    fn stray_close_paren_is_a_parse_error() {
        assert_matches::assert_matches!(parse_err(")"), Error::Unexpected { .. });
    }

    #[test]
    fn stray_close_brace_is_a_parse_error() {
        assert_matches::assert_matches!(parse_err("}"), Error::Unexpected { .. });
    }

    #[test]
    fn misplaced_reserved_word_is_a_parse_error_not_a_hang() {
        assert_matches::assert_matches!(parse_err("echo hi; fi"), Error::Unexpected { .. });
    }
}
