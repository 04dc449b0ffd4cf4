//! `TrapStore`: "Mapping from signal identifier (including
    //! pseudo-signals EXIT, DEBUG) to an action: Default, Ignore, or
//! Handler(source-text). The exit-trap handler is stored separately so it
//! can be run at frame pop."
//!
//! Grounded on `yash-env/src/trap.rs` (`Condition`, `Action`) and
//! `yash-env/src/trap/cond.rs`/`cond/signal.rs`, whose `Condition` wraps
//! `nix::sys::signal::Signal` since `yash-env` dispatches real signal
//! delivery. Named signals (beyond `EXIT`/`DEBUG`) stay in scope here as
//! *trap table entries*, but signal delivery itself is an out-of-scope
//! platform mechanism, so `Signal` here is a small closed enum with no
//! `nix`/`libc` dependency.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// The POSIX signals a script may `trap`. Not exhaustive of every signal a
/// real kernel defines; this is the set the core's trap table needs to
/// round-trip by name.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Signal {
    Hup,
    Int,
    Quit,
    Ill,
    Abrt,
    Fpe,
    Kill,
    Segv,
    Pipe,
    Alrm,
    Term,
    Usr1,
    Usr2,
    Chld,
    Cont,
    Stop,
    Tstp,
    Ttin,
    Ttou,
}

/// A condition a trap can be registered against: a real signal, or one of
/// the two pseudo-signals the spec names explicitly.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Condition {
    /// Runs once, when the frame that owns the trap table pops.
    Exit,
    /// Runs before every simple command, if set (POSIX `DEBUG` trap).
    Debug,
    Signal(Signal),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Exit => write!(f, "EXIT"),
            Condition::Debug => write!(f, "DEBUG"),
            Condition::Signal(sig) => write!(f, "{sig}"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{0}: not a valid trap condition")]
pub struct ParseConditionError(pub String);

impl FromStr for Condition {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EXIT" | "0" => Ok(Condition::Exit),
            "DEBUG" => Ok(Condition::Debug),
            _ => s
            .parse::<Signal>()
            .map(Condition::Signal)
            .map_err(|_| ParseConditionError(s.to_string())),
        }
    }
}

/// What happens when a [`Condition`] is met.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Action {
    #[default]
    Default,
    Ignore,
    /// Source text to run in a `Trap` frame.
    Handler(Rc<str>),
}

#[derive(Clone, Debug, Default)]
pub struct TrapStore {
    actions: std::collections::HashMap<Condition, Action>,
}

impl TrapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cond: Condition) -> Action {
        self.actions.get(&cond).cloned().unwrap_or_default()
    }

    /// Sets the action for `cond`; setting it back to `Default` removes the
    /// entry rather than storing a no-op, keeping `iter` a faithful list of
    /// explicitly configured traps.
    pub fn set(&mut self, cond: Condition, action: Action) {
        if matches!(action, Action::Default) {
            self.actions.remove(&cond);
        } else {
            self.actions.insert(cond, action);
        }
    }

    /// The `EXIT` handler, if any, run at frame pop.
    pub fn exit_handler(&self) -> Option<Rc<str>> {
        match self.get(Condition::Exit) {
            Action::Handler(src) => Some(src),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Condition, &Action)> {
        self.actions.iter()
    }

    /// Resets every trap that is not `Ignore` back to `Default`, as a
    /// `Subshell` frame's policy row requires (spec §4.4: "traps: COPY
        /// (reset non-ignored)").
    pub fn reset_non_ignored(&mut self) {
        self.actions.retain(|_, action| matches!(action, Action::Ignore));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unset() {
        let traps = TrapStore::new();
        assert_eq!(traps.get(Condition::Exit), Action::Default);
    }

    #[test]
    fn set_and_get_handler() {
        let mut traps = TrapStore::new();
        traps.set(Condition::Exit, Action::Handler(Rc::from("echo bye")));
        assert_eq!(traps.exit_handler().as_deref(), Some("echo bye"));
    }

    #[test]
    fn reset_non_ignored_keeps_ignore() {
        let mut traps = TrapStore::new();
        traps.set(Condition::Signal(Signal::Int), Action::Ignore);
        traps.set(Condition::Signal(Signal::Term), Action::Handler(Rc::from("true")));
        traps.reset_non_ignored();
        assert_eq!(traps.get(Condition::Signal(Signal::Int)), Action::Ignore);
        assert_eq!(traps.get(Condition::Signal(Signal::Term)), Action::Default);
    }

    #[test]
    fn condition_round_trips_through_display_and_from_str() {
        assert_eq!("EXIT".parse::<Condition>().unwrap(), Condition::Exit);
        assert_eq!(Condition::Signal(Signal::Int).to_string(), "INT");
        assert_eq!("INT".parse::<Condition>().unwrap(), Condition::Signal(Signal::Int));
    }
}
