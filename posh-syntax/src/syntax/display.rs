//! `Display` implementations that re-serialize an AST into shell source text.
//!
//! Every implementation here produces single-line source with here-document
//! contents omitted from the inline rendering (they are appended after the
//! next newline by [`super::pretty::fmt_tree`] instead, matching the way a
//! real heredoc reads on screen).

use super::*;
use std::fmt;

impl fmt::Display for SpecialParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.colon {
            write!(f, ":")?;
        }
        let c = match self.kind {
            SwitchKind::UseDefault => '-',
            SwitchKind::AssignDefault => '=',
            SwitchKind::IndicateError => '?',
            SwitchKind::UseAlternate => '+',
        };
        write!(f, "{c}{}", self.word)
    }
}

impl fmt::Display for Trim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match (self.side, self.greed) {
            (TrimSide::Prefix, TrimGreed::Shortest) => "#",
            (TrimSide::Prefix, TrimGreed::Longest) => "##",
            (TrimSide::Suffix, TrimGreed::Shortest) => "%",
            (TrimSide::Suffix, TrimGreed::Longest) => "%%",
        };
        write!(f, "{marker}{}", self.pattern)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::None => Ok(()),
            Modifier::Length => Ok(()),
            Modifier::Switch(s) => s.fmt(f),
            Modifier::Trim(t) => t.fmt(f),
        }
    }
}

impl fmt::Display for WordPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WordPartKind::Literal(s) => write!(f, "{s}"),
            WordPartKind::SingleQuoted(s) => write!(f, "'{s}'"),
            WordPartKind::DoubleQuoted(parts) => {
                write!(f, "\"")?;
                for p in parts {
                    p.fmt(f)?;
                }
                write!(f, "\"")
            }
            WordPartKind::Parameter { param, modifier } => {
                if matches!(modifier, Modifier::None) {
                    write!(f, "${param}")
                } else if matches!(modifier, Modifier::Length) {
                    write!(f, "${{#{param}}}")
                } else {
                    write!(f, "${{{param}{modifier}}}")
                }
            }
            WordPartKind::CommandSubst {
                content,
                backquoted,
            } => {
                if *backquoted {
                    write!(f, "`{content}`")
                } else {
                    write!(f, "$({content})")
                }
            }
            WordPartKind::Arithmetic { content } => write!(f, "$(({content}))"),
            WordPartKind::Tilde(name) => write!(f, "~{name}"),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            part.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl fmt::Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RedirOp::In => "<",
            RedirOp::Out => ">",
            RedirOp::Append => ">>",
            RedirOp::InOut => "<>",
            RedirOp::Clobber => ">|",
            RedirOp::DupIn => "<&",
            RedirOp::DupOut => ">&",
            RedirOp::HereDoc => "<<",
            RedirOp::HereDocStrip => "<<-",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for Redirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.io_number {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.op)?;
        match &self.target {
            RedirTarget::File(w) => write!(f, "{w}"),
            RedirTarget::Fd(n) => write!(f, "{n}"),
            RedirTarget::Close => write!(f, "-"),
            RedirTarget::HereDoc { delimiter, .. } => write!(f, "{delimiter}"),
        }
    }
}

fn fmt_redirs(redirs: &[Redirection], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for r in redirs {
        write!(f, " {r}")?;
    }
    Ok(())
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for a in &self.assigns {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{a}")?;
            first = false;
        }
        for w in &self.words {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{w}")?;
            first = false;
        }
        if !first {
            fmt_redirs(&self.redirs, f)?;
        } else {
            // only redirections: print without a leading space
            let mut first = true;
            for r in &self.redirs {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{r}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseAction::Break => write!(f, ";;"),
            CaseAction::FallThrough => write!(f, ";&"),
        }
    }
}

impl fmt::Display for CaseItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.patterns.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ") {} {}", self.body, self.action)
    }
}

impl fmt::Display for CompoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundKind::Subshell(body) => write!(f, "({body})"),
            CompoundKind::BraceGroup(body) => write!(f, "{{ {body}; }}"),
            CompoundKind::If {
                condition,
                body,
                elifs,
                r#else,
            } => {
                write!(f, "if {condition}; then {body}; ")?;
                for e in elifs {
                    write!(f, "elif {}; then {}; ", e.condition, e.body)?;
                }
                if let Some(e) = r#else {
                    write!(f, "else {e}; ")?;
                }
                write!(f, "fi")
            }
            CompoundKind::While { condition, body } => {
                write!(f, "while {condition}; do {body}; done")
            }
            CompoundKind::Until { condition, body } => {
                write!(f, "until {condition}; do {body}; done")
            }
            CompoundKind::For { var, words, body } => {
                write!(f, "for {var}")?;
                if let Some(words) = words {
                    write!(f, " in")?;
                    for w in words {
                        write!(f, " {w}")?;
                    }
                }
                write!(f, "; do {body}; done")
            }
            CompoundKind::Case { word, items } => {
                write!(f, "case {word} in ")?;
                for item in items {
                    write!(f, "{item} ")?;
                }
                write!(f, "esac")
            }
        }
    }
}

impl fmt::Display for CompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        fmt_redirs(&self.redirs, f)
    }
}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}() {}", self.name, self.body)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple(c) => c.fmt(f),
            Command::Compound(c) => c.fmt(f),
            Command::Function(c) => c.fmt(f),
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "! ")?;
        }
        for (i, c) in self.commands.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for AndOrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AndOrOp::And => write!(f, "&&"),
            AndOrOp::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for AndOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (op, p) in &self.rest {
            write!(f, " {op} {p}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separator::Sequential => write!(f, ";"),
            Separator::Background => write!(f, "&"),
            Separator::End => Ok(()),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.and_or, self.sep)
    }
}

impl fmt::Display for CommandList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}
