//! Callback trait seams: the interactive line editor, the top-level
//! read-eval-print driver, built-in command implementations, the file-glob
//! matcher and arithmetic evaluator, and platform wrappers for
//! fork/spawn/wait are all external collaborators, invoked through the
//! narrow interfaces defined here rather than implemented by this crate.
//!
//! Grounded on the seam `yash-env/src/system.rs`'s `System` trait and
//! `yash-env/src/builtin.rs`'s dispatch draw between the environment and the
//! platform/builtin layers, narrowed to the handful of operations this
//! crate's executor actually needs to call through. `yash-env`'s `System`
//! trait is much larger (terminal control, process groups, signal masks)
//! because it owns real job control, which is out of scope here.

use crate::fd::Fd;
use crate::job::Pid;
use crate::variable::VariableStore;
use std::rc::Rc;

/// `resolve_tilde(user?) -> path | None`.
pub trait TildeResolver {
    fn resolve_tilde(&self, user: Option<&str>) -> Option<Rc<str>>;
}

/// `glob(pattern, cwd) -> ordered list of paths | None`; an empty `Vec` and
/// `None` are both treated by the expander as "no match": if it returns a
/// non-empty list, the field is replaced by the matches, otherwise the
/// field is kept literal.
pub trait Globber {
    fn glob(&self, pattern: &str, cwd: &str) -> Option<Vec<String>>;
}

/// `eval_arithmetic(expr, var_lookup) -> int64 | Error`.
pub trait ArithmeticEvaluator {
    fn eval_arithmetic(&self, expr: &str, vars: &VariableStore) -> Result<i64, ArithmeticError>;
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("arithmetic error: {0}")]
pub struct ArithmeticError(pub String);

/// `resolve_command(name, PATH) -> absolute-path | None`.
pub trait CommandResolver {
    fn resolve_command(&self, name: &str, path: &str) -> Option<String>;
}

/// Outcome of dispatching to `builtin(name, args, frame)`: either
/// the name names a builtin, in which case it ran and produced an exit
/// status, or it doesn't and the executor should fall through to `PATH`
/// search.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuiltinOutcome {
    Ran(i32),
    NotABuiltin,
}

/// Dispatches a command name to a built-in utility implementation, if one
/// exists. Builtins get mutable access to the current frame's resources
/// through `frame` so that, e.g., `cd` can update `cwd` or `export` can mark
/// a variable.
pub trait BuiltinDispatch {
    fn builtin(&mut self, name: &str, args: &[Rc<str>], frame: &crate::frame::ExecutionFrame) -> BuiltinOutcome;

    /// Whether `name` is one of the *special* built-ins (spec §4.4: "If it
        /// names a special built-in, invoke it in the current frame
        /// (assignments persist)"), which get persisting assignments and are
    /// still invoked even after a `command` fd/redirection error, per
    /// POSIX's special-builtin rules.
    fn is_special(&self, name: &str) -> bool;
}

/// Redirection target resolution, process spawning, and waiting (spec §6:
    /// "spawn(argv, envp, fds) -> pid | Error and wait(pid) -> status").
/// Grouped with the fd-manipulation primitives spec §4.4 steps 4/7 need to
/// apply and restore redirections, since all of these are platform
/// wrappers out of scope for this crate's own logic.
///
/// [`Self::fork`]/[`Self::exit_child`] back the frame-forking step spec
/// §4.4 step 1 describes ("If policy says forks, call fork") for frame
/// kinds that execute AST nodes rather than an external program image
/// (`Subshell`, `PipelineCommand`, `BackgroundJob`); [`Self::spawn`] is used
/// instead when a simple command resolves to an external utility. Grounded
/// on `yash-env/src/system.rs`'s `System::new_child_process` seam (the
    /// teacher's `Subshell` builder wraps that rather than a raw POSIX `fork`,
    /// for the same reason: the shell keeps running Rust code, not an `exec`d
    /// image, after the fork).
pub trait Spawner {
    fn spawn(&mut self, argv: &[Rc<str>], envp: &[(Rc<str>, Rc<str>)]) -> Result<Pid, SpawnError>;
    fn wait(&mut self, pid: Pid) -> WaitOutcome;

    /// Forks the current process. The parent gets back its child's pid; the
    /// child gets `ForkOutcome::Child` and goes on to execute the
    /// forking frame's body before calling [`Self::exit_child`].
    fn fork(&mut self) -> Result<ForkOutcome, SpawnError>;
    /// Terminates the current (forked child) process with `status`. Never
    /// returns; implementations genuinely running as a separate OS process
    /// call `_exit`, while in-process test doubles may longjmp/panic with a
    /// sentinel the test harness catches.
    fn exit_child(&mut self, status: i32) -> !;

    fn open(&mut self, path: &str, flags: OpenFlags) -> Result<Fd, SystemError>;
    fn dup(&mut self, fd: Fd) -> Result<Fd, SystemError>;
    fn dup2(&mut self, src: Fd, dst: Fd) -> Result<(), SystemError>;
    fn close(&mut self, fd: Fd) -> Result<(), SystemError>;
    fn pipe(&mut self) -> Result<(Fd, Fd), SystemError>;

    /// Raw `read(2)`/`write(2)`. The executor uses these only for its own
    /// plumbing (collecting command-substitution stdout through a pipe,
        /// feeding a here-document body into one) rather than for any user-
    /// facing I/O builtin, which is out of scope for this crate.
    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize, SystemError>;
    fn write(&mut self, fd: Fd, buf: &[u8]) -> Result<usize, SystemError>;
}

/// Outcome of [`Spawner::fork`], mirroring the shape of
/// `nix::unistd::ForkResult` without taking on the `nix` dependency, since
/// `fork`'s actual mechanism is the platform wrapper's job, not this
/// crate's.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ForkOutcome {
    Parent(Pid),
    Child,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
    pub exclusive: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WaitOutcome {
    Exited(i32),
    Signaled(i32),
    StillRunning,
}

impl WaitOutcome {
    /// Translates a wait outcome to the exit-code convention spec §6 fixes:
    /// "128 + n" for signal termination, the raw code otherwise.
    pub fn exit_status(self) -> Option<i32> {
        match self {
            WaitOutcome::Exited(code) => Some(code),
            WaitOutcome::Signaled(sig) => Some(128 + sig),
            WaitOutcome::StillRunning => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("cannot spawn {argv0:?}: {message}")]
pub struct SpawnError {
    pub argv0: String,
    pub message: String,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct SystemError {
    pub message: String,
}
