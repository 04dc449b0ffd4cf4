//! Here-document queueing and body expansion.
//!
//! A `<<`/`<<-` redirection only reserves a slot while the operator line is
//! being scanned; [`super::scan::scan_token`] drains the queue once it
//! reaches the next unquoted newline, reading raw lines until one matches
//! the delimiter and filling in the shared [`crate::syntax::HereDocCell`].

use super::scan::scan_double_quoted_body;
use super::{Internal, Lexer, Scan};
use crate::source::Position;
use crate::syntax::{Word, WordPart, WordPartKind};
use std::rc::Rc;

/// A here-document redirection waiting for its body.
pub(crate) struct PendingHereDoc {
    pub delimiter: String,
    /// Whether the delimiter was quoted in the source; suppresses expansion
    /// of the body.
    pub quoted: bool,
    pub strip_tabs: bool,
    pub cell: Rc<crate::syntax::HereDocCell>,
}

impl PendingHereDoc {
    pub fn new(
        delimiter: String,
        quoted: bool,
        strip_tabs: bool,
        cell: Rc<crate::syntax::HereDocCell>,
    ) -> Self {
        PendingHereDoc {
            delimiter,
            quoted,
            strip_tabs,
            cell,
        }
    }
}

/// Reads one line of raw source (the trailing newline is consumed but not
    /// included). Returns `NeedMoreInput` if EOF is reached before a newline,
/// since the heredoc cannot be closed until a delimiter line is seen.
fn read_raw_line(lexer: &mut Lexer) -> Scan<String> {
    let mut line = String::new();
    loop {
        match lexer.advance() {
            Some('\n') => return Ok(line),
            Some(c) => line.push(c),
            None => return Err(Internal::NeedMoreInput),
        }
    }
}

pub(crate) fn drain_here_docs(lexer: &mut Lexer) -> Scan<()> {
    while let Some(pending) = lexer.pending_here_docs.pop_front() {
        let mut body = String::new();
        loop {
            let line = read_raw_line(lexer)?;
            let stripped = if pending.strip_tabs {
                line.trim_start_matches('\t')
            } else {
                line.as_str()
            };
            if stripped == pending.delimiter {
                break;
            }
            body.push_str(stripped);
            body.push('\n');
        }
        let word = expand_here_doc_text(&body, pending.quoted)?;
        *pending.cell.0.borrow_mut() = Some(word);
    }
    Ok(())
}

/// Expands a here-document body the way POSIX specifies: as if the text
/// were double-quoted (parameter, command and arithmetic substitution
    /// apply; `"` and `'` are not themselves special).
fn expand_here_doc_text(text: &str, quoted: bool) -> Scan<Word> {
    let mut sub_lexer = Lexer::from_str_unattributed(text);
    let start = Position { line: 1, column: 1 };
    if quoted {
        let location = sub_lexer.loc_from(start);
        return Ok(Word {
                parts: vec![WordPart {
                        kind: WordPartKind::Literal(text.to_string()),
                        quoted: true,
                        location: location.clone(),
                    }],
                location,
            });
    }
    let parts = scan_double_quoted_body(&mut sub_lexer, false)?;
    let location = sub_lexer.loc_from(start);
    Ok(Word { parts, location })
}
