//! Compound-command productions: brace group, subshell, `if`,
//! `while`, `until`, `for`, `case`. Each function assumes the matching
//! opening reserved word or operator is the next token and is called only
//! from [`super::Parser::parse_compound_command`]'s dispatch on that token,
//! mirroring the one-function-per-construct split the teacher uses
//! (`grouping.rs`, `if.rs`, `while_loop.rs`, `for_loop.rs`, `case.rs`).

use super::error;
use super::{Error, Parser};
use crate::lexer::{Keyword, Operator, TokenKind};
use crate::syntax::{CaseAction, CaseItem, CompoundKind, Elif};

pub(super) fn parse_brace_group(p: &mut Parser) -> Result<CompoundKind, Error> {
    p.expect_reserved(Keyword::LBrace)?;
    let body = p.parse_command_list(|k| matches!(k, TokenKind::Reserved(Keyword::RBrace)))?;
    p.expect_reserved(Keyword::RBrace)?;
    Ok(CompoundKind::BraceGroup(body))
}

pub(super) fn parse_subshell(p: &mut Parser) -> Result<CompoundKind, Error> {
    p.expect_operator(Operator::LParen)?;
    let body = p.parse_command_list(|k| matches!(k, TokenKind::Operator(Operator::RParen)))?;
    p.expect_operator(Operator::RParen)?;
    Ok(CompoundKind::Subshell(body))
}

/// `do compound_list done`, shared by `while` and `until`.
fn parse_do_clause(p: &mut Parser) -> Result<crate::syntax::CommandList, Error> {
    p.expect_reserved(Keyword::Do)?;
    let body = p.parse_command_list(|k| matches!(k, TokenKind::Reserved(Keyword::Done)))?;
    p.expect_reserved(Keyword::Done)?;
    Ok(body)
}

pub(super) fn parse_while(p: &mut Parser) -> Result<CompoundKind, Error> {
    p.expect_reserved(Keyword::While)?;
    let condition = p.parse_command_list(|k| matches!(k, TokenKind::Reserved(Keyword::Do)))?;
    let body = parse_do_clause(p)?;
    Ok(CompoundKind::While { condition, body })
}

pub(super) fn parse_until(p: &mut Parser) -> Result<CompoundKind, Error> {
    p.expect_reserved(Keyword::Until)?;
    let condition = p.parse_command_list(|k| matches!(k, TokenKind::Reserved(Keyword::Do)))?;
    let body = parse_do_clause(p)?;
    Ok(CompoundKind::Until { condition, body })
}

pub(super) fn parse_if(p: &mut Parser) -> Result<CompoundKind, Error> {
    p.expect_reserved(Keyword::If)?;
    let condition = p.parse_command_list(|k| matches!(k, TokenKind::Reserved(Keyword::Then)))?;
    p.expect_reserved(Keyword::Then)?;
    let body = p.parse_command_list(is_if_clause_terminator)?;

    let mut elifs = Vec::new();
    loop {
        let tok = p.peek(true)?;
        if tok.as_reserved() != Some(Keyword::Elif) {
            break;
        }
        p.advance(true)?;
        let econd = p.parse_command_list(|k| matches!(k, TokenKind::Reserved(Keyword::Then)))?;
        p.expect_reserved(Keyword::Then)?;
        let ebody = p.parse_command_list(is_if_clause_terminator)?;
        elifs.push(Elif {
                condition: econd,
                body: ebody,
            });
    }

    let tok = p.peek(true)?;
    let r#else = if tok.as_reserved() == Some(Keyword::Else) {
        p.advance(true)?;
        Some(p.parse_command_list(|k| matches!(k, TokenKind::Reserved(Keyword::Fi)))?)
    } else {
        None
    };

    p.expect_reserved(Keyword::Fi)?;
    Ok(CompoundKind::If {
            condition,
            body,
            elifs,
            r#else,
        })
}

fn is_if_clause_terminator(k: &TokenKind) -> bool {
    matches!(
        k,
        TokenKind::Reserved(Keyword::Elif | Keyword::Else | Keyword::Fi)
    )
}

pub(super) fn parse_for(p: &mut Parser) -> Result<CompoundKind, Error> {
    p.expect_reserved(Keyword::For)?;
    let name_tok = p.advance(true)?;
    let var = match &name_tok.kind {
        TokenKind::Word(w) => match w.as_raw_literal() {
            Some(lit) if super::is_valid_name(&lit) => lit,
            _ => return Err(error::unexpected(&name_tok, "a name")),
        },
        _ => return Err(error::unexpected(&name_tok, "a name")),
    };
    p.skip_newlines()?;

    let tok = p.peek(true)?;
    let words = match &tok.kind {
        TokenKind::Reserved(Keyword::In) => {
            p.advance(true)?;
            let mut words = Vec::new();
            loop {
                let t = p.peek(false)?;
                match &t.kind {
                    TokenKind::Word(_) => {
                        let t = p.advance(false)?;
                        if let TokenKind::Word(w) = t.kind {
                            words.push(w);
                        }
                    }
                    _ => break,
                }
            }
            let sep = p.peek(true)?;
            if sep.as_operator() == Some(Operator::Semi) {
                p.advance(true)?;
            }
            Some(words)
        }
        TokenKind::Operator(Operator::Semi) => {
            p.advance(true)?;
            None
        }
        _ => None,
    };
    p.skip_newlines()?;
    let body = parse_do_clause(p)?;
    Ok(CompoundKind::For { var, words, body })
}

pub(super) fn parse_case(p: &mut Parser) -> Result<CompoundKind, Error> {
    p.expect_reserved(Keyword::Case)?;
    let word_tok = p.advance(false)?;
    let word = match word_tok.kind {
        TokenKind::Word(w) => w,
        _ => return Err(error::unexpected(&word_tok, "a word")),
    };
    p.skip_newlines()?;
    p.expect_reserved(Keyword::In)?;
    p.skip_newlines()?;

    let mut items = Vec::new();
    loop {
        let tok = p.peek(true)?;
        if tok.as_reserved() == Some(Keyword::Esac) {
            break;
        }
        if tok.as_operator() == Some(Operator::LParen) {
            p.advance(true)?;
        }
        let mut patterns = Vec::new();
        loop {
            let t = p.advance(false)?;
            match t.kind {
                TokenKind::Word(w) => patterns.push(w),
                _ => return Err(error::unexpected(&t, "a case pattern")),
            }
            let sep = p.peek(false)?;
            if sep.as_operator() == Some(Operator::Pipe) {
                p.advance(false)?;
                continue;
            }
            break;
        }
        p.expect_operator(Operator::RParen)?;
        p.skip_newlines()?;
        let body = p.parse_command_list(is_case_item_terminator)?;
        let action_tok = p.peek(true)?;
        let action = match action_tok.kind {
            TokenKind::Operator(Operator::SemiSemi) => {
                p.advance(true)?;
                CaseAction::Break
            }
            TokenKind::Operator(Operator::SemiAmp) => {
                p.advance(true)?;
                CaseAction::FallThrough
            }
            _ => CaseAction::Break,
        };
        items.push(CaseItem {
                patterns,
                body,
                action,
            });
        p.skip_newlines()?;
    }
    p.expect_reserved(Keyword::Esac)?;
    Ok(CompoundKind::Case { word, items })
}

fn is_case_item_terminator(k: &TokenKind) -> bool {
    matches!(
        k,
        TokenKind::Operator(Operator::SemiSemi | Operator::SemiAmp) | TokenKind::Reserved(Keyword::Esac)
    )
}

#[cfg(test)]
mod tests {
    use crate::parser::{Config, Parser};
    use crate::lexer::Lexer;
    use crate::syntax::{CommandList, Command, CompoundKind};

    fn parse(src: &str) -> CommandList {
        let config = Config::default();
        let lexer = Lexer::from_str_unattributed(src);
        let mut parser = Parser::new(lexer, &config);
        parser.parse_program().unwrap()
    }

    fn first_compound(list: &CommandList) -> &CompoundKind {
        match list.0[0].and_or.first.commands[0].as_ref() {
            Command::Compound(cc) => &cc.kind,
            _ => panic!("expected compound command"),
        }
    }

    #[test]
    fn while_loop() {
        let list = parse("while true; do echo x; done");
        assert!(matches!(first_compound(&list), CompoundKind::While { .. }));
    }

    #[test]
    fn until_loop() {
        let list = parse("until false; do echo x; done");
        assert!(matches!(first_compound(&list), CompoundKind::Until { .. }));
    }

    #[test]
    fn if_elif_else() {
        let list = parse("if a; then b; elif c; then d; else e; fi");
        match first_compound(&list) {
            CompoundKind::If {
                elifs, r#else: Some(_), ..
            } => assert_eq!(elifs.len(), 1),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn for_with_in() {
        let list = parse("for x in a b c; do echo $x; done");
        match first_compound(&list) {
            CompoundKind::For { var, words, .. } => {
                assert_eq!(var, "x");
                assert_eq!(words.as_ref().unwrap().len(), 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn case_fallthrough() {
        let list = parse("case $x in a) echo a;& b) echo b;; esac");
        match first_compound(&list) {
            CompoundKind::Case { items, .. } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].action, crate::syntax::CaseAction::FallThrough);
                assert_eq!(items[1].action, crate::syntax::CaseAction::Break);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn subshell_and_brace_group() {
        let list = parse("(echo a); { echo b; }");
        assert!(matches!(
                list.0[0].and_or.first.commands[0].as_ref(),
                Command::Compound(cc) if matches!(cc.kind, CompoundKind::Subshell(_))
            ));
    }
}
