//! The expander: "transforms word tokens into one or more
//! expanded field strings, performing (in order) tilde, parameter, command,
//! and arithmetic expansions, then field splitting on IFS, then pathname
//! expansion, then quote removal."
//!
//! Grounded on `yash-semantics/src/expansion/*`'s stage split (`initial`,
    //! `param`, `split`, `glob`, `tilde`, `command_subst`), collapsed into one
//! module tree here since the teacher's version is itself already organized
//! this way (no duplicated-draft problem to resolve, unlike the executor).

mod glob;
mod param;
mod split;
mod tilde;

use crate::error::ExpansionError;
use posh_env::callbacks::ArithmeticEvaluator;
use posh_env::{Opt, OptionSet, PositionalParams, VariableStore};
use posh_syntax::source::Location;
use posh_syntax::syntax::{Word, WordPart, WordPartKind};
use std::rc::Rc;

pub use glob::Globber;
pub use tilde::TildeResolver;
pub use param::expand_parameter;

/// A fragment of an in-progress field: text plus whether it came from a
/// quoted context.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub quoted: bool,
}

/// One field before IFS splitting has been applied. `atomic` is set for
/// fields produced by exploding an unquoted `$@`/`"$@"`, which spec §4.3
/// step 5 says undergo "no further splitting... even if the parameter list
/// is empty" — i.e. once `$@` has exploded into per-parameter fields, those
/// fields are final.
#[derive(Clone, Debug, Default)]
pub struct PreField {
    pub chunks: Vec<Chunk>,
    pub atomic: bool,
    /// Set whenever a quoted construct contributed to this field, even if it
    /// contributed zero characters (e.g. `""`, `` `${x:+}` `` quoted, or an
        /// unset parameter expanded inside double quotes). Field splitting must
    /// keep such a field even when its text ends up empty, since an
    /// all-whitespace *unquoted* field is the only case that should vanish
    /// entirely.
    pub quoted_forced: bool,
}

impl PreField {
    fn push_text(&mut self, text: impl Into<String>, quoted: bool) {
        let text = text.into();
        if quoted {
            self.quoted_forced = true;
        }
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.chunks.last_mut() {
            if last.quoted == quoted {
                last.text.push_str(&text);
                return;
            }
        }
        self.chunks.push(Chunk { text, quoted });
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for chunk in &self.chunks {
            out.push_str(&chunk.text);
        }
        out
    }
}

/// Invokes the shell recursively on a command-substitution's body, returning
/// its captured, trailing-newline-stripped stdout. The
/// executor implements this; the expander cannot run a command itself.
pub trait CommandSubstRunner {
    fn run_command_subst(&mut self, source: &str) -> Result<String, ExpansionError>;
}

/// Everything the expander needs from the live shell state; a
/// thin read/callback view over an [`posh_env::ExecutionFrame`]'s resources
/// plus the out-of-scope tilde/arithmetic/command-subst seams.
pub struct Expander<'a> {
    pub variables: &'a mut VariableStore,
    pub positional: &'a PositionalParams,
    pub options: OptionSet,
    pub last_exit_status: i32,
    pub shell_pid: i32,
    pub last_background_pid: Option<i32>,
    pub cwd: &'a str,
    pub tilde: &'a dyn TildeResolver,
    pub globber: &'a dyn Globber,
    pub arithmetic: &'a dyn ArithmeticEvaluator,
    pub command_subst: &'a mut dyn CommandSubstRunner,
}

impl<'a> Expander<'a> {
    fn ifs(&self) -> String {
        self.variables
        .get_value("IFS")
        .map(str::to_string)
        .unwrap_or_else(|| " \t\n".to_string())
    }

    /// Expands one word into zero or more [`PreField`]s: tilde, parameter,
    /// command, and arithmetic expansion, but not yet
    /// split or globbed.
    pub fn expand_word_to_prefields(&mut self, word: &Word) -> Result<Vec<PreField>, ExpansionError> {
        let mut fields = vec![PreField::default()];
        for part in &word.parts {
            self.expand_part(part, &mut fields)?;
        }
        Ok(fields)
    }

    fn expand_part(&mut self, part: &WordPart, fields: &mut Vec<PreField>) -> Result<(), ExpansionError> {
        match &part.kind {
            WordPartKind::Literal(s) => {
                fields.last_mut().unwrap().push_text(s.clone(), part.quoted);
            }
            WordPartKind::SingleQuoted(s) => {
                fields.last_mut().unwrap().push_text(s.clone(), true);
            }
            WordPartKind::Tilde(user) => {
                let resolved = self
                .tilde
                .resolve_tilde(if user.is_empty() { None } else { Some(user) });
                match resolved {
                    Some(path) => fields.last_mut().unwrap().push_text(path.to_string(), part.quoted),
                    None => {
                        let mut literal = String::from("~");
                        literal.push_str(user);
                        fields.last_mut().unwrap().push_text(literal, part.quoted);
                    }
                }
            }
            WordPartKind::DoubleQuoted(inner) => {
                if inner.is_empty() {
                    fields.last_mut().unwrap().push_text("", true);
                }
                for p in inner {
                    let mut forced = p.clone();
                    forced.quoted = true;
                    self.expand_part(&forced, fields)?;
                }
            }
            WordPartKind::Parameter { param, modifier } => {
                param::expand_parameter(self, param, modifier, part.quoted, &part.location, fields)?;
            }
            WordPartKind::CommandSubst { content, .. } => {
                let output = self.command_subst.run_command_subst(content)?;
                fields.last_mut().unwrap().push_text(output, part.quoted);
            }
            WordPartKind::Arithmetic { content } => {
                let value = self
                .arithmetic
                .eval_arithmetic(content, self.variables)
                .map_err(|err| ExpansionError::ArithmeticError {
                        message: err.0,
                        location: part.location.clone(),
                    })?;
                fields.last_mut().unwrap().push_text(value.to_string(), part.quoted);
            }
        }
        Ok(())
    }

    /// Expands a word the way an assignment value, a case pattern, or a
    /// redirection target does: tilde/parameter/command/arithmetic
    /// expansion and quote removal, but no field splitting and no pathname
    /// expansion (spec §4.3: "The `word` operand is itself expanded
        /// recursively (no splitting, no pathname expansion)" — the same rule
        /// applies to these other single-field contexts).
    pub fn expand_word_single(&mut self, word: &Word) -> Result<String, ExpansionError> {
        let prefields = self.expand_word_to_prefields(word)?;
        let mut out = String::new();
        for field in &prefields {
            for chunk in &field.chunks {
                out.push_str(&chunk.text);
            }
        }
        Ok(out)
    }

    /// Expands a word the way a case pattern or a `${name#pattern}`-style
    /// trim operand is expanded: the same single-field expansion as
    /// [`Self::expand_word_single`], but keeping each character's quotedness
    /// so [`crate::pattern`] can tell a literal `*` from a glob wildcard
    /// (spec §4.3 "strip shortest/longest matching prefix (glob pattern)",
        /// §4.4 Case "match against the head using glob semantics").
    pub fn expand_word_pattern(&mut self, word: &Word) -> Result<Vec<(char, bool)>, ExpansionError> {
        let prefields = self.expand_word_to_prefields(word)?;
        let mut out = Vec::new();
        for field in &prefields {
            for chunk in &field.chunks {
                out.extend(chunk.text.chars().map(|c| (c, chunk.quoted)));
            }
        }
        Ok(out)
    }

    /// Full field expansion of one word: tilde/parameter/command/arithmetic,
    /// then IFS splitting, then pathname expansion.
    pub fn expand_word(&mut self, word: &Word) -> Result<Vec<String>, ExpansionError> {
        let prefields = self.expand_word_to_prefields(word)?;
        let ifs = self.ifs();
        let split = split::split_fields(prefields, &ifs);
        Ok(glob::glob_expand(
                split,
                self.globber,
                self.cwd,
                self.options.contains(Opt::NoGlob),
            ))
    }

    /// Expands a whole word list.
    pub fn expand_words(&mut self, words: &[Word]) -> Result<Vec<String>, ExpansionError> {
        let mut out = Vec::new();
        for word in words {
            out.extend(self.expand_word(word)?);
        }
        Ok(out)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::{PositionalParams, VariableStore};
    use std::str::FromStr;

    struct NoTilde;
    impl TildeResolver for NoTilde {
        fn resolve_tilde(&self, _user: Option<&str>) -> Option<Rc<str>> {
            None
        }
    }
    struct NoGlob;
    impl Globber for NoGlob {
        fn glob(&self, _pattern: &str, _cwd: &str) -> Option<Vec<String>> {
            None
        }
    }
    struct NoArith;
    impl ArithmeticEvaluator for NoArith {
        fn eval_arithmetic(&self, expr: &str, _vars: &VariableStore) -> Result<i64, posh_env::callbacks::ArithmeticError> {
            expr.parse().map_err(|_| posh_env::callbacks::ArithmeticError("bad expr".to_string()))
        }
    }
    struct NoSubst;
    impl CommandSubstRunner for NoSubst {
        fn run_command_subst(&mut self, _source: &str) -> Result<String, ExpansionError> {
            Ok(String::new())
        }
    }

    fn expand(word_src: &str, vars: &mut VariableStore, positional: &PositionalParams) -> Vec<String> {
        let word = Word::from_str(word_src).unwrap();
        let tilde = NoTilde;
        let globber = NoGlob;
        let arith = NoArith;
        let mut subst = NoSubst;
        let mut expander = Expander {
            variables: vars,
            positional,
            options: OptionSet::new(),
            last_exit_status: 0,
            shell_pid: 1,
            last_background_pid: None,
            cwd: "/",
            tilde: &tilde,
            globber: &globber,
            arithmetic: &arith,
            command_subst: &mut subst,
        };
        expander.expand_word(&word).unwrap()
    }

    #[test]
    fn literal_word_is_one_field() {
        let mut vars = VariableStore::new();
        let pos = PositionalParams::new("sh", vec![]);
        assert_eq!(expand("hello", &mut vars, &pos), vec!["hello"]);
    }

    #[test]
    fn parameter_default_switch() {
        let mut vars = VariableStore::new();
        let pos = PositionalParams::new("sh", vec![]);
        assert_eq!(expand("${x:-fallback}", &mut vars, &pos), vec!["fallback"]);
    }

    #[test]
    fn unquoted_expansion_splits_on_ifs() {
        let mut vars = VariableStore::new();
        vars.assign("x", "a b c").unwrap();
        let pos = PositionalParams::new("sh", vec![]);
        assert_eq!(expand("$x", &mut vars, &pos), vec!["a", "b", "c"]);
    }

    #[test]
    fn single_quoted_word_never_splits() {
        let mut vars = VariableStore::new();
        let pos = PositionalParams::new("sh", vec![]);
        assert_eq!(expand("'a b c'", &mut vars, &pos), vec!["a b c"]);
    }
}
