//! Pathname expansion: on each unquoted field containing a glob
//! metacharacter, invoke the glob callback; if it returns a non-empty list,
//! replace the field with its result (sorted ascending). If it returns
//! empty, or the `noglob` option is set, keep the field literal.
//!
//! Grounded on `yash-semantics/src/expansion/glob.rs`'s callback seam, but
//! the matcher body itself stays out of scope: this module only decides
//! *which* fields are glob candidates and how to fold the callback's answer
//! back into the field list, never how a pattern matches a directory entry.

use super::split::SplitField;

pub use posh_env::callbacks::Globber;

/// A [`Globber`] that never matches anything, so every pattern is kept
/// literal. Useful for embedders that don't support filesystem globbing and
/// for tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullGlobber;

impl Globber for NullGlobber {
    fn glob(&self, _pattern: &str, _cwd: &str) -> Option<Vec<String>> {
        None
    }
}

fn has_glob_metacharacters(field: &SplitField) -> bool {
    field
        .chars
        .iter()
        .any(|&(c, quoted)| !quoted && matches!(c, '*' | '?' | '['))
}

/// Applies pathname expansion to every split field, in order. `cwd` is
/// threaded through so a relative glob resolves against the frame's current
/// working directory rather than the process's.
pub fn glob_expand(
    fields: Vec<SplitField>,
    globber: &dyn Globber,
    cwd: &str,
    noglob: bool,
) -> Vec<String> {
    let mut out = Vec::new();
    for field in fields {
        if noglob || !has_glob_metacharacters(&field) {
            out.push(field.text());
            continue;
        }
        let pattern = field.text();
        match globber.glob(&pattern, cwd) {
            Some(mut matches) if !matches.is_empty() => {
                matches.sort();
                out.extend(matches);
            }
            _ => out.push(pattern),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<&'static str>);
    impl Globber for Fixed {
        fn glob(&self, _pattern: &str, _cwd: &str) -> Option<Vec<String>> {
            Some(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    fn field(text: &str, quoted: bool) -> SplitField {
        SplitField {
            chars: text.chars().map(|c| (c, quoted)).collect(),
        }
    }

    #[test]
    fn literal_field_without_metacharacters_is_kept() {
        let globber = Fixed(vec!["a.txt", "b.txt"]);
        let out = glob_expand(vec![field("plain", false)], &globber, "/", false);
        assert_eq!(out, vec!["plain"]);
    }

    #[test]
    fn matching_field_is_replaced_and_sorted() {
        let globber = Fixed(vec!["b.txt", "a.txt"]);
        let out = glob_expand(vec![field("*.txt", false)], &globber, "/", false);
        assert_eq!(out, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn quoted_metacharacter_is_not_a_glob_candidate() {
        let globber = Fixed(vec!["anything"]);
        let out = glob_expand(vec![field("*", true)], &globber, "/", false);
        assert_eq!(out, vec!["*"]);
    }

    #[test]
    fn noglob_option_suppresses_expansion() {
        let globber = Fixed(vec!["a.txt"]);
        let out = glob_expand(vec![field("*.txt", false)], &globber, "/", true);
        assert_eq!(out, vec!["*.txt"]);
    }

    #[test]
    fn empty_match_keeps_literal() {
        struct Empty;
        impl Globber for Empty {
            fn glob(&self, _pattern: &str, _cwd: &str) -> Option<Vec<String>> {
                Some(vec![])
            }
        }
        let out = glob_expand(vec![field("*.none", false)], &Empty, "/", false);
        assert_eq!(out, vec!["*.none"]);
    }
}
