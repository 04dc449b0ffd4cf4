//! Shell option flags: `set -e`/`set -u`/`set -o pipefail`/`set -o noglob`,
//! kept as an in-memory set that the executor and expander consult.
//!
//! Grounded on `yash-env/src/option.rs`'s `enumset`-based `Option`/
//! `OptionSet`, narrowed to the flags the executor and expander actually
//! consult; the option parser (`getopt`) stays out of scope here, so there
//! is no `long_name()`/CLI-flag table, only the in-memory set and the `$-`
//! rendering.

use enumset::{EnumSet, EnumSetType};

/// A single shell option.
#[derive(Debug, EnumSetType)]
pub enum Opt {
    /// `set -e`: terminate on an untested non-zero exit.
    ErrExit,
    /// `set -u`: expanding an unset variable is an `ExpansionError`.
    NoUnset,
    /// `set -o pipefail`: pipeline exit status is the rightmost non-zero
    /// stage's.
    PipeFail,
    /// `set -o noglob`: suppress pathname expansion.
    NoGlob,
}

pub type OptionSet = EnumSet<Opt>;

impl Opt {
    /// The single letter POSIX associates with this option, used both for
    /// `$-` rendering and for matching against a `set -xyz` letter string.
    pub fn letter(self) -> char {
        match self {
            Opt::ErrExit => 'e',
            Opt::NoUnset => 'u',
            Opt::PipeFail => 'o', // no single-letter form; reported via `-o` only
            Opt::NoGlob => 'f',
        }
    }
}

/// Renders the options set as the `$-` special parameter value:
/// a string of each enabled option's single-letter flag, `PipeFail` omitted
/// since it has no single-letter form and POSIX does not require `$-` to
/// surface `-o`-only options.
pub fn dash_string(opts: OptionSet) -> String {
    let mut s = String::new();
    for opt in opts.iter() {
        if opt != Opt::PipeFail {
            s.push(opt.letter());
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_string_lists_enabled_letters() {
        let mut opts = OptionSet::new();
        opts.insert(Opt::ErrExit);
        opts.insert(Opt::NoUnset);
        let s = dash_string(opts);
        assert!(s.contains('e'));
        assert!(s.contains('u'));
        assert!(!s.contains('f'));
    }
}
