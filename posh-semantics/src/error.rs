//! Error taxonomy: `ExpansionError`, `RedirectionError`,
//! `CommandNotFound`/`NotExecutable`, `RuntimeError`, `ControlFlowError`.
//! `LexError`/`ParseError` live in `posh-syntax`; this crate only adds the
//! errors that originate during expansion and execution.
//!
//! Grounded on `yash-semantics/src/expansion/errors.rs` and
//! `yash-semantics/src/redir.rs`'s error enums, both `thiserror`-backed like
//! every `yash-*` crate.

use posh_syntax::source::Location;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ExpansionError {
    #[error("{location}: {name}: unbound variable")]
    UnboundVariable { name: String, location: Location },
    #[error("{location}: {name}: {message}")]
    BadSubstitution {
        name: String,
        message: String,
        location: Location,
    },
    #[error("{location}: {message}")]
    ArithmeticError { message: String, location: Location },
    #[error("{location}: {name}: {}", message.as_deref().unwrap_or("parameter null or not set"))]
    IndicatedError {
        name: String,
        message: Option<String>,
        location: Location,
    },
    #[error("{location}: {name}: is read-only")]
    ReadOnlyAssignment { name: String, location: Location },
}

impl ExpansionError {
    pub fn location(&self) -> &Location {
        match self {
            ExpansionError::UnboundVariable { location, .. }
            | ExpansionError::BadSubstitution { location, .. }
            | ExpansionError::ArithmeticError { location, .. }
            | ExpansionError::IndicatedError { location, .. }
            | ExpansionError::ReadOnlyAssignment { location, .. } => location,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{location}: cannot open redirection target: {message}")]
pub struct RedirectionError {
    pub message: String,
    pub location: Location,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("{0}: command not found")]
    NotFound(String),
    #[error("{0}: not executable")]
    NotExecutable(String),
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct RuntimeError(pub String);

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ControlFlowError {
    #[error("break: not in a loop")]
    BreakOutsideLoop,
    #[error("continue: not in a loop")]
    ContinueOutsideLoop,
    #[error("return: not in a function or dot-script")]
    ReturnOutsideFunction,
}

/// The one error type the executor and expander actually propagate as `Err`;
/// everything else (command-not-found, non-zero builtin exit, etc.) is
/// folded into an exit status on the happy path, per spec §7 "all
/// expansion, redirection, and command errors set `$?` and become the
/// current command's exit status."
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
    #[error(transparent)]
    Redirection(#[from] RedirectionError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    ControlFlow(#[from] ControlFlowError),
}
