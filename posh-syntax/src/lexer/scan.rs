//! Token- and word-level scanning.
//!
//! This is the one place that walks the character buffer directly; every
//! other part of the lexer (and all of the parser) only ever sees the
//! [`super::Token`]s this module produces.

use super::heredoc::drain_here_docs;
use super::token::{Keyword, Operator, Token, TokenKind};
use super::{Internal, Lexer, Scan};
use crate::source::Position;
use crate::syntax::{
    Modifier, Param, Switch, SwitchKind, Trim, TrimGreed, TrimSide, Word, WordPart, WordPartKind,
};
use std::rc::Rc;
use std::str::FromStr;

pub(super) fn scan_token(lexer: &mut Lexer, command_position: bool) -> Scan<Token> {
    loop {
        skip_blanks(lexer);
        match lexer.peek(0) {
            None => {
                if lexer.has_pending_here_docs() {
                    return Err(Internal::NeedMoreInput);
                }
                let start = lexer.mark();
                return Ok(Token {
                        kind: TokenKind::EndOfInput,
                        location: lexer.loc_from(start),
                    });
            }
            Some('#') => {
                skip_comment(lexer);
                continue;
            }
            Some('\n') => {
                let start = lexer.mark();
                lexer.advance();
                if lexer.has_pending_here_docs() {
                    drain_here_docs(lexer)?;
                }
                return Ok(Token {
                        kind: TokenKind::Newline,
                        location: lexer.loc_from(start),
                    });
            }
            _ => break,
        }
    }

    if let Some(tok) = try_match_operator(lexer) {
        return Ok(tok);
    }
    if let Some(tok) = try_io_number(lexer) {
        return Ok(tok);
    }
    scan_word(lexer, command_position)
}

fn skip_blanks(lexer: &mut Lexer) {
    while matches!(lexer.peek(0), Some(' ') | Some('\t')) {
        lexer.advance();
    }
}

fn skip_comment(lexer: &mut Lexer) {
    while let Some(c) = lexer.peek(0) {
        if c == '\n' {
            break;
        }
        lexer.advance();
    }
}

fn is_word_end(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\n' | '&' | '|' | ';' | '(' | ')' | '<' | '>'
    )
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_special_param_char(c: char) -> bool {
    matches!(c, '@' | '*' | '#' | '?' | '-' | '$' | '!')
}

fn try_match_operator(lexer: &mut Lexer) -> Option<Token> {
    let start = lexer.mark();
    for (spelling, op) in Operator::TABLE {
        let matches_here = spelling
        .chars()
        .enumerate()
        .all(|(i, c)| lexer.peek(i) == Some(c));
        if matches_here {
            for _ in 0..spelling.chars().count() {
                lexer.advance();
            }
            let location = lexer.loc_from(start);
            return Some(Token {
                    kind: TokenKind::Operator(*op),
                    location,
                });
        }
    }
    None
}

/// Recognizes the `io_number` tie-break: a run of decimal digits immediately
/// followed (no intervening blank) by `<` or `>`.
fn try_io_number(lexer: &mut Lexer) -> Option<Token> {
    let mut len = 0;
    while matches!(lexer.peek(len), Some(c) if c.is_ascii_digit()) {
        len += 1;
    }
    if len == 0 {
        return None;
    }
    match lexer.peek(len) {
        Some('<') | Some('>') => {
            let start = lexer.mark();
            let mut digits = String::new();
            for _ in 0..len {
                digits.push(lexer.advance().expect("peeked digit"));
            }
            let location = lexer.loc_from(start);
            let n: i32 = digits.parse().ok()?;
            Some(Token {
                    kind: TokenKind::IoNumber(n),
                    location,
                })
        }
        _ => None,
    }
}

fn flush_literal(parts: &mut Vec<WordPart>, literal: &mut String, literal_start: &mut Position, lexer: &Lexer) {
    if !literal.is_empty() {
        let text = std::mem::take(literal);
        let location = lexer.loc_from(*literal_start);
        parts.push(WordPart {
                kind: WordPartKind::Literal(text),
                quoted: false,
                location,
            });
    }
    *literal_start = lexer.mark();
}

/// Scans the parts of a word. When `in_braces` is set, the terminator is an
/// unescaped `}` at nesting depth zero (for `${...}` switch/trim operands)
/// instead of the usual blank/operator/newline set, and nested `{`/`}`
/// pairs are tracked so a pattern containing braces doesn't end the scan
/// early.
fn scan_word_parts(lexer: &mut Lexer, in_braces: bool) -> Scan<Vec<WordPart>> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut literal_start = lexer.mark();
    let mut brace_depth = 0i32;

    loop {
        match lexer.peek(0) {
            None => {
                if in_braces {
                    return Err(Internal::NeedMoreInput);
                }
                break;
            }
            Some('}') if in_braces && brace_depth == 0 => break,
            Some('{') if in_braces => {
                lexer.advance();
                literal.push('{');
                brace_depth += 1;
            }
            Some('}') if in_braces => {
                lexer.advance();
                literal.push('}');
                brace_depth -= 1;
            }
            Some(c) if !in_braces && is_word_end(c) => break,
            Some('\\') => {
                if lexer.peek(1) == Some('\n') {
                    lexer.advance();
                    lexer.advance();
                } else {
                    lexer.advance();
                    if let Some(c) = lexer.advance() {
                        literal.push(c);
                    }
                }
            }
            Some('\'') => {
                flush_literal(&mut parts, &mut literal, &mut literal_start, lexer);
                parts.push(scan_single_quote(lexer)?);
            }
            Some('"') => {
                flush_literal(&mut parts, &mut literal, &mut literal_start, lexer);
                parts.push(scan_double_quote(lexer)?);
            }
            Some('`') => {
                flush_literal(&mut parts, &mut literal, &mut literal_start, lexer);
                parts.push(scan_backquote(lexer)?);
            }
            Some('$') => {
                flush_literal(&mut parts, &mut literal, &mut literal_start, lexer);
                match scan_dollar(lexer)? {
                    DollarResult::Part(p) => parts.push(p),
                    DollarResult::Literal(c) => literal.push(c),
                }
            }
            Some('~') if !in_braces && parts.is_empty() && literal.is_empty() => {
                parts.push(scan_tilde(lexer));
            }
            Some(c) => {
                lexer.advance();
                literal.push(c);
            }
        }
    }

    flush_literal(&mut parts, &mut literal, &mut literal_start, lexer);
    Ok(parts)
}

fn scan_word(lexer: &mut Lexer, command_position: bool) -> Scan<Token> {
    let start = lexer.mark();
    let parts = scan_word_parts(lexer, false)?;
    let location = lexer.loc_from(start);
    let word = Word {
        parts,
        location: location.clone(),
    };

    if command_position {
        if let Some(lit) = word.as_raw_literal() {
            if let Ok(kw) = Keyword::from_str(&lit) {
                return Ok(Token {
                        kind: TokenKind::Reserved(kw),
                        location,
                    });
            }
        }
    }
    Ok(Token {
            kind: TokenKind::Word(word),
            location,
        })
}

fn scan_single_quote(lexer: &mut Lexer) -> Scan<WordPart> {
    let start = lexer.mark();
    lexer.advance(); // opening '
    let mut s = String::new();
    loop {
        match lexer.advance() {
            Some('\'') => break,
            Some(c) => s.push(c),
            None => return Err(Internal::NeedMoreInput),
        }
    }
    let location = lexer.loc_from(start);
    Ok(WordPart {
            kind: WordPartKind::SingleQuoted(s),
            quoted: true,
            location,
        })
}

fn scan_double_quote(lexer: &mut Lexer) -> Scan<WordPart> {
    let start = lexer.mark();
    lexer.advance(); // opening "
    let inner = scan_double_quoted_body(lexer, true)?;
    let location = lexer.loc_from(start);
    Ok(WordPart {
            kind: WordPartKind::DoubleQuoted(inner),
            quoted: true,
            location,
        })
}

/// Scans the content between (but not including) a pair of double quotes,
/// recognizing `$`, `` ` `` and the backslash-escapes of `$ \` \" \\`
/// newline, and nothing else. When `stop_at_quote` is false, scanning runs
/// to end of input instead of looking for a closing `"` — this is also how
/// a here-document body is expanded.
pub(crate) fn scan_double_quoted_body(lexer: &mut Lexer, stop_at_quote: bool) -> Scan<Vec<WordPart>> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut literal_start = lexer.mark();
    loop {
        match lexer.peek(0) {
            None => {
                if stop_at_quote {
                    return Err(Internal::NeedMoreInput);
                }
                break;
            }
            Some('"') if stop_at_quote => {
                lexer.advance();
                break;
            }
            Some('\\') => match lexer.peek(1) {
                Some('$') | Some('`') | Some('\\') => {
                    lexer.advance();
                    let c = lexer.advance().expect("peeked");
                    literal.push(c);
                }
                Some('"') if stop_at_quote => {
                    lexer.advance();
                    lexer.advance();
                    literal.push('"');
                }
                Some('\n') => {
                    lexer.advance();
                    lexer.advance();
                }
                _ => {
                    lexer.advance();
                    literal.push('\\');
                }
            },
            Some('$') => {
                flush_literal(&mut parts, &mut literal, &mut literal_start, lexer);
                match scan_dollar(lexer)? {
                    DollarResult::Part(mut p) => {
                        p.quoted = true;
                        parts.push(p);
                    }
                    DollarResult::Literal(c) => literal.push(c),
                }
            }
            Some('`') => {
                flush_literal(&mut parts, &mut literal, &mut literal_start, lexer);
                let mut p = scan_backquote(lexer)?;
                p.quoted = true;
                parts.push(p);
            }
            Some(c) => {
                lexer.advance();
                literal.push(c);
            }
        }
    }
    flush_literal(&mut parts, &mut literal, &mut literal_start, lexer);
    Ok(parts)
}

fn skip_single_quote_raw(lexer: &mut Lexer) -> Scan<()> {
    lexer.advance();
    loop {
        match lexer.advance() {
            Some('\'') => return Ok(()),
            Some(_) => {}
            None => return Err(Internal::NeedMoreInput),
        }
    }
}

fn skip_double_quote_raw(lexer: &mut Lexer) -> Scan<()> {
    lexer.advance();
    loop {
        match lexer.peek(0) {
            None => return Err(Internal::NeedMoreInput),
            Some('"') => {
                lexer.advance();
                return Ok(());
            }
            Some('\\') => {
                lexer.advance();
                lexer.advance();
            }
            Some(_) => {
                lexer.advance();
            }
        }
    }
}

fn scan_backquote(lexer: &mut Lexer) -> Scan<WordPart> {
    let start = lexer.mark();
    lexer.advance(); // opening `
    let content_start = lexer.pos;
    loop {
        match lexer.peek(0) {
            None => return Err(Internal::NeedMoreInput),
            Some('`') => break,
            Some('\\') => match lexer.peek(1) {
                Some('$') | Some('`') | Some('\\') | Some('\n') => {
                    lexer.advance();
                    lexer.advance();
                }
                _ => {
                    lexer.advance();
                }
            },
            Some(_) => {
                lexer.advance();
            }
        }
    }
    let content_end = lexer.pos;
    lexer.advance(); // closing `
    let content: String = lexer.chars[content_start..content_end].iter().collect();
    let location = lexer.loc_from(start);
    Ok(WordPart {
            kind: WordPartKind::CommandSubst {
                content: Rc::from(content.as_str()),
                backquoted: true,
            },
            quoted: false,
            location,
        })
}

enum DollarResult {
    Part(WordPart),
    Literal(char),
}

fn scan_dollar(lexer: &mut Lexer) -> Scan<DollarResult> {
    let start = lexer.mark();
    lexer.advance(); // consume $
    match lexer.peek(0) {
        Some('{') => Ok(DollarResult::Part(scan_param_braced(lexer, start)?)),
        Some('(') if lexer.peek(1) == Some('(') => {
            Ok(DollarResult::Part(scan_arithmetic(lexer, start)?))
        }
        Some('(') => Ok(DollarResult::Part(scan_command_subst(lexer, start)?)),
        Some(c) if c.is_ascii_digit() => {
            lexer.advance();
            let location = lexer.loc_from(start);
            Ok(DollarResult::Part(WordPart {
                        kind: WordPartKind::Parameter {
                            param: Param::parse(&c.to_string()),
                            modifier: Modifier::None,
                        },
                        quoted: false,
                        location,
                    }))
        }
        Some(c) if is_special_param_char(c) => {
            lexer.advance();
            let location = lexer.loc_from(start);
            Ok(DollarResult::Part(WordPart {
                        kind: WordPartKind::Parameter {
                            param: Param::parse(&c.to_string()),
                            modifier: Modifier::None,
                        },
                        quoted: false,
                        location,
                    }))
        }
        Some(c) if is_name_start(c) => {
            let mut name = String::new();
            while let Some(c) = lexer.peek(0) {
                if is_name_continue(c) {
                    name.push(c);
                    lexer.advance();
                } else {
                    break;
                }
            }
            let location = lexer.loc_from(start);
            Ok(DollarResult::Part(WordPart {
                        kind: WordPartKind::Parameter {
                            param: Param::parse(&name),
                            modifier: Modifier::None,
                        },
                        quoted: false,
                        location,
                    }))
        }
        _ => Ok(DollarResult::Literal('$')),
    }
}

fn read_param_name(lexer: &mut Lexer) -> Scan<String> {
    match lexer.peek(0) {
        Some(c) if c.is_ascii_digit() => {
            let mut s = String::new();
            while let Some(c) = lexer.peek(0) {
                if c.is_ascii_digit() {
                    s.push(c);
                    lexer.advance();
                } else {
                    break;
                }
            }
            Ok(s)
        }
        Some(c) if is_special_param_char(c) => {
            lexer.advance();
            Ok(c.to_string())
        }
        Some(c) if is_name_start(c) => {
            let mut s = String::new();
            while let Some(c) = lexer.peek(0) {
                if is_name_continue(c) {
                    s.push(c);
                    lexer.advance();
                } else {
                    break;
                }
            }
            Ok(s)
        }
        None => Err(Internal::NeedMoreInput),
        Some(_) => Err(lexer.err(lexer.mark(), "invalid parameter name")),
    }
}

fn read_switch_kind(lexer: &mut Lexer) -> Scan<SwitchKind> {
    let start = lexer.mark();
    match lexer.advance() {
        Some('-') => Ok(SwitchKind::UseDefault),
        Some('=') => Ok(SwitchKind::AssignDefault),
        Some('?') => Ok(SwitchKind::IndicateError),
        Some('+') => Ok(SwitchKind::UseAlternate),
        _ => Err(lexer.err(start, "invalid parameter expansion switch")),
    }
}

fn scan_param_braced(lexer: &mut Lexer, start: Position) -> Scan<WordPart> {
    lexer.advance(); // consume {
    let modifier;
    let param;
    if lexer.peek(0) == Some('#') && lexer.peek(1) != Some('}') {
        lexer.advance();
        let name = read_param_name(lexer)?;
        param = Param::parse(&name);
        modifier = Modifier::Length;
    } else {
        let name = read_param_name(lexer)?;
        param = Param::parse(&name);
        modifier = match lexer.peek(0) {
            Some('}') => Modifier::None,
            Some(':') => {
                lexer.advance();
                let kind = read_switch_kind(lexer)?;
                let parts = scan_word_parts(lexer, true)?;
                let word = Word {
                    parts,
                    location: lexer.loc_from(start),
                };
                Modifier::Switch(Switch {
                        kind,
                        colon: true,
                        word,
                    })
            }
            Some('-') | Some('=') | Some('?') | Some('+') => {
                let kind = read_switch_kind(lexer)?;
                let parts = scan_word_parts(lexer, true)?;
                let word = Word {
                    parts,
                    location: lexer.loc_from(start),
                };
                Modifier::Switch(Switch {
                        kind,
                        colon: false,
                        word,
                    })
            }
            Some('#') => {
                lexer.advance();
                let greed = if lexer.peek(0) == Some('#') {
                    lexer.advance();
                    TrimGreed::Longest
                } else {
                    TrimGreed::Shortest
                };
                let parts = scan_word_parts(lexer, true)?;
                let pattern = Word {
                    parts,
                    location: lexer.loc_from(start),
                };
                Modifier::Trim(Trim {
                        side: TrimSide::Prefix,
                        greed,
                        pattern,
                    })
            }
            Some('%') => {
                lexer.advance();
                let greed = if lexer.peek(0) == Some('%') {
                    lexer.advance();
                    TrimGreed::Longest
                } else {
                    TrimGreed::Shortest
                };
                let parts = scan_word_parts(lexer, true)?;
                let pattern = Word {
                    parts,
                    location: lexer.loc_from(start),
                };
                Modifier::Trim(Trim {
                        side: TrimSide::Suffix,
                        greed,
                        pattern,
                    })
            }
            None => return Err(Internal::NeedMoreInput),
            Some(_) => return Err(lexer.err(start, "invalid parameter expansion")),
        };
    }
    match lexer.peek(0) {
        Some('}') => {
            lexer.advance();
        }
        None => return Err(Internal::NeedMoreInput),
        Some(_) => return Err(lexer.err(start, "unterminated parameter expansion")),
    }
    let location = lexer.loc_from(start);
    Ok(WordPart {
            kind: WordPartKind::Parameter { param, modifier },
            quoted: false,
            location,
        })
}

fn scan_command_subst(lexer: &mut Lexer, start: Position) -> Scan<WordPart> {
    lexer.advance(); // consume (
    let content_start = lexer.pos;
    let mut depth = 1i32;
    loop {
        match lexer.peek(0) {
            None => return Err(Internal::NeedMoreInput),
            Some('(') => {
                lexer.advance();
                depth += 1;
            }
            Some(')') => {
                if depth == 1 {
                    let content_end = lexer.pos;
                    lexer.advance();
                    let content: String = lexer.chars[content_start..content_end].iter().collect();
                    let location = lexer.loc_from(start);
                    return Ok(WordPart {
                            kind: WordPartKind::CommandSubst {
                                content: Rc::from(content.as_str()),
                                backquoted: false,
                            },
                            quoted: false,
                            location,
                        });
                }
                lexer.advance();
                depth -= 1;
            }
            Some('\'') => skip_single_quote_raw(lexer)?,
            Some('"') => skip_double_quote_raw(lexer)?,
            Some('\\') => {
                lexer.advance();
                lexer.advance();
            }
            Some(_) => {
                lexer.advance();
            }
        }
    }
}

fn scan_arithmetic(lexer: &mut Lexer, start: Position) -> Scan<WordPart> {
    lexer.advance(); // first (
    lexer.advance(); // second (
    let content_start = lexer.pos;
    let mut depth = 1i32;
    loop {
        match lexer.peek(0) {
            None => return Err(Internal::NeedMoreInput),
            Some('(') => {
                lexer.advance();
                depth += 1;
            }
            Some(')') => {
                if depth == 1 && lexer.peek(1) == Some(')') {
                    let content_end = lexer.pos;
                    lexer.advance();
                    lexer.advance();
                    let content: String = lexer.chars[content_start..content_end].iter().collect();
                    let location = lexer.loc_from(start);
                    return Ok(WordPart {
                            kind: WordPartKind::Arithmetic {
                                content: Rc::from(content.as_str()),
                            },
                            quoted: false,
                            location,
                        });
                }
                lexer.advance();
                depth -= 1;
            }
            Some('\'') => skip_single_quote_raw(lexer)?,
            Some('"') => skip_double_quote_raw(lexer)?,
            Some(_) => {
                lexer.advance();
            }
        }
    }
}

fn scan_tilde(lexer: &mut Lexer) -> WordPart {
    let start = lexer.mark();
    lexer.advance(); // consume ~
    let mut name = String::new();
    while let Some(c) = lexer.peek(0) {
        if c == '/' || is_word_end(c) {
            break;
        }
        name.push(c);
        lexer.advance();
    }
    let location = lexer.loc_from(start);
    WordPart {
        kind: WordPartKind::Tilde(name),
        quoted: false,
        location,
    }
}
