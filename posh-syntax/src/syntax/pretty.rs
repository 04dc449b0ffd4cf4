//! Multi-line, indented AST dump.
//!
//! Spec §9 asks for exactly one tree-pretty-printer to replace the original
//! implementation's several evolving `gprint.c` debug dumpers. This is that
//! one implementation. Unlike the [`super::display`] `Display` impls (which
    //! produce single-line, re-parseable source and omit here-document bodies),
//! `fmt_tree` is for humans debugging a parse: it indents by nesting depth
//! and includes heredoc contents inline.

use super::*;
use std::fmt::Write as _;

/// Renders `list` as an indented multi-line tree, for debugging.
pub fn fmt_tree(list: &CommandList) -> String {
    let mut out = String::new();
    for item in &list.0 {
        fmt_and_or(&item.and_or, 0, &mut out);
        let _ = writeln!(out, "{}", item.sep);
    }
    out
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(" ");
    }
}

fn fmt_and_or(list: &AndOrList, depth: usize, out: &mut String) {
    indent(depth, out);
    let _ = writeln!(out, "and-or:");
    fmt_pipeline(&list.first, depth + 1, out);
    for (op, p) in &list.rest {
        indent(depth + 1, out);
        let _ = writeln!(out, "{op}");
        fmt_pipeline(p, depth + 1, out);
    }
}

fn fmt_pipeline(p: &Pipeline, depth: usize, out: &mut String) {
    indent(depth, out);
    let _ = writeln!(out, "pipeline (negated={}):", p.negated);
    for c in &p.commands {
        fmt_command(c, depth + 1, out);
    }
}

fn fmt_command(c: &Command, depth: usize, out: &mut String) {
    match c {
        Command::Simple(sc) => {
            indent(depth, out);
            let _ = writeln!(out, "simple-command: {sc}");
            for r in &sc.redirs {
                fmt_heredoc_body(r, depth + 1, out);
            }
        }
        Command::Compound(cc) => {
            indent(depth, out);
            let _ = writeln!(out, "compound:");
            fmt_compound(&cc.kind, depth + 1, out);
            for r in &cc.redirs {
                fmt_heredoc_body(r, depth + 1, out);
            }
        }
        Command::Function(fd) => {
            indent(depth, out);
            let _ = writeln!(out, "function {}:", fd.name);
            fmt_compound(&fd.body.kind, depth + 1, out);
        }
    }
}

fn fmt_heredoc_body(r: &Redirection, depth: usize, out: &mut String) {
    if let RedirTarget::HereDoc { delimiter, cell, .. } = &r.target {
        indent(depth, out);
        let _ = writeln!(out, "heredoc {delimiter}:");
        if let Some(body) = &*cell.0.borrow() {
            indent(depth + 1, out);
            let _ = writeln!(out, "{body}");
        }
    }
}

fn fmt_compound(kind: &CompoundKind, depth: usize, out: &mut String) {
    match kind {
        CompoundKind::Subshell(body) => {
            indent(depth, out);
            let _ = writeln!(out, "subshell:");
            fmt_list(body, depth + 1, out);
        }
        CompoundKind::BraceGroup(body) => {
            indent(depth, out);
            let _ = writeln!(out, "brace-group:");
            fmt_list(body, depth + 1, out);
        }
        CompoundKind::If {
            condition,
            body,
            elifs,
            r#else,
        } => {
            indent(depth, out);
            let _ = writeln!(out, "if:");
            fmt_list(condition, depth + 1, out);
            indent(depth, out);
            let _ = writeln!(out, "then:");
            fmt_list(body, depth + 1, out);
            for e in elifs {
                indent(depth, out);
                let _ = writeln!(out, "elif:");
                fmt_list(&e.condition, depth + 1, out);
                indent(depth, out);
                let _ = writeln!(out, "then:");
                fmt_list(&e.body, depth + 1, out);
            }
            if let Some(e) = r#else {
                indent(depth, out);
                let _ = writeln!(out, "else:");
                fmt_list(e, depth + 1, out);
            }
        }
        CompoundKind::While { condition, body } => {
            indent(depth, out);
            let _ = writeln!(out, "while:");
            fmt_list(condition, depth + 1, out);
            indent(depth, out);
            let _ = writeln!(out, "do:");
            fmt_list(body, depth + 1, out);
        }
        CompoundKind::Until { condition, body } => {
            indent(depth, out);
            let _ = writeln!(out, "until:");
            fmt_list(condition, depth + 1, out);
            indent(depth, out);
            let _ = writeln!(out, "do:");
            fmt_list(body, depth + 1, out);
        }
        CompoundKind::For { var, words, body } => {
            indent(depth, out);
            let _ = writeln!(out, "for {var}:");
            if let Some(words) = words {
                indent(depth + 1, out);
                let rendered: Vec<String> = words.iter().map(|w| w.to_string()).collect();
                let _ = writeln!(out, "in {}", rendered.join(" "));
            }
            fmt_list(body, depth + 1, out);
        }
        CompoundKind::Case { word, items } => {
            indent(depth, out);
            let _ = writeln!(out, "case {word}:");
            for item in items {
                indent(depth + 1, out);
                let patterns: Vec<String> = item.patterns.iter().map(|p| p.to_string()).collect();
                let _ = writeln!(out, "{} ({}):", patterns.join("|"), item.action);
                fmt_list(&item.body, depth + 2, out);
            }
        }
    }
}

fn fmt_list(list: &CommandList, depth: usize, out: &mut String) {
    for item in &list.0 {
        fmt_and_or(&item.and_or, depth, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn renders_simple_command() {
        let list = CommandList::from_str("echo hi").unwrap();
        let tree = fmt_tree(&list);
        assert!(tree.contains("simple-command: echo hi"));
    }
}
