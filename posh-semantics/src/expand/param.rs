//! Parameter expansion: "for each parameter part, look up
//! `name`... Apply the modifier."
//!
//! Grounded on `yash-semantics/src/expansion/initial/param.rs`'s switch/trim
//! dispatch, reworked around this crate's [`super::PreField`] accumulator
//! instead of the teacher's `Phrase` attach-point type.

use super::{Chunk, Expander, PreField};
use crate::error::ExpansionError;
use crate::pattern;
use posh_env::{dash_string, Opt};
use posh_syntax::source::Location;
use posh_syntax::syntax::{Modifier, Param, ParamName, Switch, SwitchKind, Trim, TrimGreed, TrimSide};
use std::rc::Rc;

/// What a parameter reference resolves to before any modifier is applied.
enum Lookup {
    /// An ordinary scalar: a variable, a positional parameter, or one of the
    /// non-array special parameters (`# ? - $ ! 0`).
    Scalar(Option<Rc<str>>),
    /// `$@`: one field per positional parameter, never re-split.
    At(Vec<Rc<str>>),
    /// `$*`: one field per positional parameter when unquoted (subject to
        /// further IFS splitting), or joined on first-IFS-char when quoted.
    Star(Vec<Rc<str>>),
}

fn lookup(expander: &Expander, name: &ParamName) -> Lookup {
    match name {
        ParamName::Variable(n) => Lookup::Scalar(expander.variables.get(n).map(|v| v.value.clone())),
        ParamName::Positional(n) => Lookup::Scalar(expander.positional.get(*n).map(Rc::from)),
        ParamName::Special(sp) => match sp {
            posh_syntax::syntax::SpecialParam::At => Lookup::At(expander.positional.all().to_vec()),
            posh_syntax::syntax::SpecialParam::Asterisk => Lookup::Star(expander.positional.all().to_vec()),
            posh_syntax::syntax::SpecialParam::Number => {
                Lookup::Scalar(Some(Rc::from(expander.positional.count().to_string())))
            }
            posh_syntax::syntax::SpecialParam::Question => {
                Lookup::Scalar(Some(Rc::from(expander.last_exit_status.to_string())))
            }
            posh_syntax::syntax::SpecialParam::Hyphen => {
                Lookup::Scalar(Some(Rc::from(dash_string(expander.options))))
            }
            posh_syntax::syntax::SpecialParam::Dollar => {
                Lookup::Scalar(Some(Rc::from(expander.shell_pid.to_string())))
            }
            posh_syntax::syntax::SpecialParam::Exclamation => Lookup::Scalar(Some(Rc::from(
                        expander
                        .last_background_pid
                        .map(|p| p.to_string())
                        .unwrap_or_default(),
                    ))),
            posh_syntax::syntax::SpecialParam::Zero => Lookup::Scalar(Some(Rc::from(expander.positional.arg0()))),
        },
    }
}

fn is_assignable(name: &ParamName) -> bool {
    matches!(name, ParamName::Variable(_))
}

/// The first character of `IFS` used to join `"$*"` (space if `IFS` is
    /// unset, empty if `IFS` is set but empty).
fn star_join_char(expander: &Expander) -> String {
    match expander.variables.get_value("IFS") {
        None => " ".to_string(),
        Some("") => String::new(),
        Some(s) => s.chars().next().unwrap().to_string(),
    }
}

/// Appends each element of `vals` to `fields` as its own field, the first
/// merged onto whatever is already accumulated in the current field. When
/// `atomic` is set the resulting fields are exempt from further IFS
/// splitting.
fn push_array(fields: &mut Vec<PreField>, vals: &[Rc<str>], quoted: bool, atomic: bool) {
    if vals.is_empty() {
        if fields.len() == 1 && fields[0].chunks.is_empty() && !fields[0].quoted_forced {
            fields.clear();
        }
        return;
    }
    {
        let current = fields.last_mut().unwrap();
        current.push_text(vals[0].to_string(), quoted);
        current.atomic = current.atomic || atomic;
    }
    for v in &vals[1..] {
        fields.push(PreField {
                chunks: vec![Chunk {
                        text: v.to_string(),
                        quoted,
                    }],
                atomic,
                quoted_forced: quoted,
            });
    }
}

/// A flattened text view of a [`Lookup`], used where a modifier needs "the
/// current value" regardless of scalar/array shape (switch conditions and
    /// trim/length operate on this).
fn flatten(expander: &Expander, l: &Lookup) -> Option<String> {
    match l {
        Lookup::Scalar(v) => v.as_ref().map(|s| s.to_string()),
        Lookup::At(vals) | Lookup::Star(vals) => {
            if vals.is_empty() {
                None
            } else {
                Some(vals.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(" "))
            }
        }
    }
}

/// Expands one parameter reference, pushing its result
/// onto `fields`.
pub fn expand_parameter(
    expander: &mut Expander,
    param: &Param,
    modifier: &Modifier,
    quoted: bool,
    location: &Location,
    fields: &mut Vec<PreField>,
) -> Result<(), ExpansionError> {
    let found = lookup(expander, &param.name);
    let is_unset = matches!(&found, Lookup::Scalar(None));
    let is_empty = match &found {
        Lookup::Scalar(v) => v.as_deref().map(str::is_empty).unwrap_or(true),
        Lookup::At(vals) | Lookup::Star(vals) => vals.is_empty(),
    };

    let check_nounset = |expander: &Expander, unset: bool| -> Result<(), ExpansionError> {
        if unset && expander.options.contains(Opt::NoUnset) {
            return Err(ExpansionError::UnboundVariable {
                    name: param.id.clone(),
                    location: location.clone(),
                });
        }
        Ok(())
    };

    match modifier {
        Modifier::None => {
            check_nounset(expander, is_unset)?;
            match found {
                Lookup::Scalar(v) => {
                    fields
                    .last_mut()
                    .unwrap()
                    .push_text(v.as_deref().unwrap_or("").to_string(), quoted);
                }
                Lookup::At(vals) => push_array(fields, &vals, quoted, true),
                Lookup::Star(vals) => {
                    if quoted {
                        let sep = star_join_char(expander);
                        let joined = vals.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(&sep);
                        fields.last_mut().unwrap().push_text(joined, true);
                    } else {
                        push_array(fields, &vals, false, false);
                    }
                }
            }
            Ok(())
        }
        Modifier::Length => {
            check_nounset(expander, is_unset)?;
            let text = flatten(expander, &found).unwrap_or_default();
            fields
            .last_mut()
            .unwrap()
            .push_text(text.chars().count().to_string(), quoted);
            Ok(())
        }
        Modifier::Switch(sw) => expand_switch(expander, param, sw, is_unset, is_empty, quoted, location, fields),
        Modifier::Trim(trim) => {
            check_nounset(expander, is_unset)?;
            let text = flatten(expander, &found).unwrap_or_default();
            expand_trim(expander, &text, trim, quoted, fields)
        }
    }
}

fn expand_switch(
    expander: &mut Expander,
    param: &Param,
    sw: &Switch,
    is_unset: bool,
    is_empty: bool,
    quoted: bool,
    location: &Location,
    fields: &mut Vec<PreField>,
) -> Result<(), ExpansionError> {
    let triggers = if sw.colon { is_unset || is_empty } else { is_unset };

    match sw.kind {
        SwitchKind::UseDefault => {
            if triggers {
                let word = expander.expand_word_single(&sw.word)?;
                fields.last_mut().unwrap().push_text(word, quoted);
            } else {
                expand_parameter(expander, param, &Modifier::None, quoted, location, fields)?;
            }
            Ok(())
        }
        SwitchKind::AssignDefault => {
            if triggers {
                if !is_assignable(&param.name) {
                    return Err(ExpansionError::BadSubstitution {
                            name: param.id.clone(),
                            message: "cannot assign to this parameter".to_string(),
                            location: location.clone(),
                        });
                }
                let word = expander.expand_word_single(&sw.word)?;
                let name = match &param.name {
                    ParamName::Variable(n) => n.clone(),
                    _ => unreachable!("checked by is_assignable"),
                };
                expander
                .variables
                .assign(name, word.clone())
                .map_err(|_| ExpansionError::ReadOnlyAssignment {
                        name: param.id.clone(),
                        location: location.clone(),
                    })?;
                fields.last_mut().unwrap().push_text(word, quoted);
            } else {
                expand_parameter(expander, param, &Modifier::None, quoted, location, fields)?;
            }
            Ok(())
        }
        SwitchKind::IndicateError => {
            if triggers {
                let message = expander.expand_word_single(&sw.word)?;
                Err(ExpansionError::IndicatedError {
                        name: param.id.clone(),
                        message: if message.is_empty() { None } else { Some(message) },
                        location: location.clone(),
                    })
            } else {
                expand_parameter(expander, param, &Modifier::None, quoted, location, fields)
            }
        }
        SwitchKind::UseAlternate => {
            if triggers {
                Ok(())
            } else {
                let word = expander.expand_word_single(&sw.word)?;
                fields.last_mut().unwrap().push_text(word, quoted);
                Ok(())
            }
        }
    }
}

fn expand_trim(
    expander: &mut Expander,
    text: &str,
    trim: &Trim,
    quoted: bool,
    fields: &mut Vec<PreField>,
) -> Result<(), ExpansionError> {
    let pattern_chars = expander.expand_word_pattern(&trim.pattern)?;
    let side = match trim.side {
        TrimSide::Prefix => pattern::Side::Prefix,
        TrimSide::Suffix => pattern::Side::Suffix,
    };
    let greedy = matches!(trim.greed, TrimGreed::Longest);
    let result = match pattern::trim_match(text, &pattern_chars, side, greedy) {
        Some(len) => match trim.side {
            TrimSide::Prefix => text.chars().skip(len).collect::<String>(),
            TrimSide::Suffix => text.chars().take(text.chars().count() - len).collect::<String>(),
        },
        None => text.to_string(),
    };
    fields.last_mut().unwrap().push_text(result, quoted);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::tilde::NullTildeResolver;
    use crate::expand::{CommandSubstRunner, Globber};
    use posh_env::callbacks::ArithmeticEvaluator;
    use posh_env::{PositionalParams, VariableStore};
    use std::str::FromStr;

    struct NullGlobber;
    impl Globber for NullGlobber {
        fn glob(&self, _pattern: &str, _cwd: &str) -> Option<Vec<String>> {
            None
        }
    }
    struct NullArith;
    impl ArithmeticEvaluator for NullArith {
        fn eval_arithmetic(
            &self,
            expr: &str,
            _vars: &VariableStore,
        ) -> Result<i64, posh_env::callbacks::ArithmeticError> {
            expr.parse()
            .map_err(|_| posh_env::callbacks::ArithmeticError("bad expr".into()))
        }
    }
    struct NullSubst;
    impl CommandSubstRunner for NullSubst {
        fn run_command_subst(&mut self, _source: &str) -> Result<String, ExpansionError> {
            Ok(String::new())
        }
    }

    fn run(word_src: &str, vars: &mut VariableStore, positional: &PositionalParams) -> Result<Vec<String>, ExpansionError> {
        let word = posh_syntax::syntax::Word::from_str(word_src).unwrap();
        let tilde = NullTildeResolver;
        let globber = NullGlobber;
        let arith = NullArith;
        let mut subst = NullSubst;
        let mut expander = Expander {
            variables: vars,
            positional,
            options: posh_env::OptionSet::new(),
            last_exit_status: 0,
            shell_pid: 100,
            last_background_pid: None,
            cwd: "/",
            tilde: &tilde,
            globber: &globber,
            arithmetic: &arith,
            command_subst: &mut subst,
        };
        expander.expand_word(&word)
    }

    #[test]
    fn length_modifier_counts_chars() {
        let mut vars = VariableStore::new();
        vars.assign("x", "hello").unwrap();
        let pos = PositionalParams::new("sh", vec![]);
        assert_eq!(run("${#x}", &mut vars, &pos).unwrap(), vec!["5"]);
    }

    #[test]
    fn trim_shortest_prefix() {
        let mut vars = VariableStore::new();
        vars.assign("x", "a/b/c").unwrap();
        let pos = PositionalParams::new("sh", vec![]);
        assert_eq!(run("${x#*/}", &mut vars, &pos).unwrap(), vec!["b/c"]);
    }

    #[test]
    fn trim_longest_suffix() {
        let mut vars = VariableStore::new();
        vars.assign("x", "a.tar.gz").unwrap();
        let pos = PositionalParams::new("sh", vec![]);
        assert_eq!(run("${x%%.*}", &mut vars, &pos).unwrap(), vec!["a"]);
    }

    #[test]
    fn assign_default_persists() {
        let mut vars = VariableStore::new();
        let pos = PositionalParams::new("sh", vec![]);
        assert_eq!(run("${x:=fallback}", &mut vars, &pos).unwrap(), vec!["fallback"]);
        assert_eq!(vars.get_value("x"), Some("fallback"));
    }

    #[test]
    fn use_alternate_only_when_set() {
        let mut vars = VariableStore::new();
        vars.assign("x", "1").unwrap();
        let pos = PositionalParams::new("sh", vec![]);
        assert_eq!(run("${x:+alt}", &mut vars, &pos).unwrap(), vec!["alt"]);
        assert_eq!(run("${y:+alt}", &mut vars, &pos).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn quoted_at_preserves_each_positional() {
        let mut vars = VariableStore::new();
        let pos = PositionalParams::new("sh", vec![Rc::from("a b"), Rc::from("c")]);
        assert_eq!(run("\"$@\"", &mut vars, &pos).unwrap(), vec!["a b", "c"]);
    }

    #[test]
    fn quoted_star_joins_with_first_ifs_char() {
        let mut vars = VariableStore::new();
        vars.assign("IFS", ":").unwrap();
        let pos = PositionalParams::new("sh", vec![Rc::from("a"), Rc::from("b")]);
        assert_eq!(run("\"$*\"", &mut vars, &pos).unwrap(), vec!["a:b"]);
    }

    #[test]
    fn empty_at_expands_to_zero_fields() {
        let mut vars = VariableStore::new();
        let pos = PositionalParams::new("sh", vec![]);
        assert_eq!(run("\"$@\"", &mut vars, &pos).unwrap(), Vec::<String>::new());
    }
}
