//! The executor: walks a [`CommandList`] against an
//! [`posh_env::ExecutionFrame`]/[`posh_env::Stack`], realizing the
//! policy-driven frame lifecycle ("Entering a frame" steps 1-9) and the
//! control-flow propagation rules of §4.5.
//!
//! Grounded on `yash-semantics/src/command.rs` and `command_impl.rs`,
//! collapsed into this one module tree per the decision recorded in
//! `DESIGN.md` ("two parallel executor drafts... implement one coherent
    //! version"). Unlike the teacher, this executor is synchronous throughout
//! (see `DESIGN.md`'s "synchronous vs async executor" decision): frame
//! entry/exit, redirections, and command dispatch are all plain function
//! calls, and a `Subshell`/`PipelineCommand`/`BackgroundJob` frame's "forks
//! process" step is a direct [`posh_env::callbacks::Spawner::fork`] call
//! rather than a boxed async task.

mod compound;
mod redir;
mod simple_command;

use crate::error::ExpansionError;
use crate::expand::{CommandSubstRunner, Expander};
use posh_env::callbacks::{
    ArithmeticEvaluator, BuiltinDispatch, CommandResolver, ForkOutcome, Globber, Spawner,
    TildeResolver,
};
use posh_env::{
    Action, ControlFlow, ExecResult, ExecutionFrame, FrameKind, Job, JobStore, Pid, Resource,
    Stack,
};
use posh_syntax::source::Location;
use posh_syntax::syntax::{
    AndOrList, AndOrOp, Command, CommandList, Redirection, Separator, Word,
};
use std::rc::Rc;
use std::str::FromStr;

pub use simple_command::BuiltinOutcome;

/// The live shell state an executor threads through a run: the
/// frame stack plus the out-of-scope collaborators everything
/// here defers to rather than implements.
pub struct Runtime<'a> {
    pub stack: Stack,
    pub tilde: &'a dyn TildeResolver,
    pub globber: &'a dyn Globber,
    pub arithmetic: &'a dyn ArithmeticEvaluator,
    pub resolver: &'a dyn CommandResolver,
    pub builtins: &'a mut dyn BuiltinDispatch,
    pub spawner: &'a mut dyn Spawner,
    pub jobs: JobStore,
    pub shell_pid: Pid,
}

impl<'a> Runtime<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        root: ExecutionFrame,
        tilde: &'a dyn TildeResolver,
        globber: &'a dyn Globber,
        arithmetic: &'a dyn ArithmeticEvaluator,
        resolver: &'a dyn CommandResolver,
        builtins: &'a mut dyn BuiltinDispatch,
        spawner: &'a mut dyn Spawner,
        shell_pid: Pid,
    ) -> Self {
        Runtime {
            stack: Stack::new(root),
            tilde,
            globber,
            arithmetic,
            resolver,
            builtins,
            spawner,
            jobs: JobStore::new(),
            shell_pid,
        }
    }

    /// Runs a whole script at the top level and returns the process exit
    /// status the embedding driver should terminate with.
    pub fn run_script(&mut self, list: &CommandList) -> i32 {
        let result = self.run_command_list(list);
        self.run_exit_trap_if_owned();
        result.exit_status & 0xff
    }

    /// `.` (dot-script): runs `list` in a `DotScript` frame, optionally
    /// overriding positional parameters for the duration (spec §4.4 policy
        /// row "positional: SHARE (override+restore)"). Exposed for the
    /// out-of-scope `.` builtin to call back into.
    pub fn run_dot_script(&mut self, list: &CommandList, args: Option<&[Rc<str>]>) -> ExecResult {
        self.stack.push(FrameKind::DotScript);
        if let Some(new_args) = args {
            let positional = self.stack.top().resources.positional.clone();
            let saved = positional.borrow().clone();
            self.stack.top_mut().saved_positional_params =
            Some(posh_env::Shared::new(std::cell::RefCell::new(saved)));
            positional.borrow_mut().set(new_args.to_vec());
        }
        let result = self.run_command_list(list);
        let result = self.finish_frame(result);
        if let Some(saved) = self.stack.top().saved_positional_params.clone() {
            let positional = self.stack.top().resources.positional.clone();
            let restored = saved.borrow().clone();
            *positional.borrow_mut() = restored;
        }
        self.stack.pop();
        result
    }

    /// `eval`: re-parses and runs `source` in the current scope. Exposed for the out-of-scope `eval`
    /// builtin.
    pub fn run_eval(&mut self, source: &str) -> ExecResult {
        let list = match CommandList::from_str(source) {
            Ok(list) => list,
            Err(_) => return ExecResult::normal(2),
        };
        self.stack.push(FrameKind::Eval);
        let result = self.run_command_list(&list);
        let result = self.finish_frame(result);
        self.stack.pop();
        result
    }

    /// Runs a parsed trap handler body in a `Trap` frame, used for both `EXIT`/`DEBUG` and named-signal traps.
    pub fn run_trap_source(&mut self, source: &str) -> ExecResult {
        let Ok(list) = CommandList::from_str(source) else {
            return ExecResult::normal(2);
        };
        self.stack.push(FrameKind::Trap);
        let result = self.run_command_list(&list);
        let result = self.finish_frame(result);
        self.stack.pop();
        result
    }

    /// Sequential execution of a `CommandList`'s items.
    pub fn run_command_list(&mut self, list: &CommandList) -> ExecResult {
        let mut result = ExecResult::normal(self.stack.top().last_exit_status);
        for item in &list.0 {
            result = match item.sep {
                Separator::Background => self.run_background(&item.and_or),
                Separator::Sequential | Separator::End => self.run_and_or_list(&item.and_or),
            };
            self.stack.top_mut().last_exit_status = result.exit_status;
            if !result.is_normal() {
                return result;
            }
        }
        result
    }

    /// `&&`/`||` short-circuiting.
    fn run_and_or_list(&mut self, list: &AndOrList) -> ExecResult {
        let tested = !list.rest.is_empty();
        if tested {
            self.stack.enter_tested_context();
        }
        let mut result = self.run_pipeline(&list.first);
        if tested {
            self.stack.exit_tested_context();
        }
        if !result.is_normal() {
            return result;
        }
        let mut status = result.exit_status;
        for (i, (op, pipeline)) in list.rest.iter().enumerate() {
            let run_this = match op {
                AndOrOp::And => status == 0,
                AndOrOp::Or => status != 0,
            };
            if !run_this {
                continue;
            }
            let is_last = i == list.rest.len() - 1;
            if !is_last {
                self.stack.enter_tested_context();
            }
            result = self.run_pipeline(pipeline);
            if !is_last {
                self.stack.exit_tested_context();
            }
            status = result.exit_status;
            if !result.is_normal() {
                return result;
            }
        }
        ExecResult::normal(status)
    }

    /// Pipeline execution. A single-stage, non-negated pipeline
    /// is the common case (a plain simple or compound command) and runs
    /// directly in the current frame with no fork, matching the
    /// optimization real shells apply; anything with two or more stages
    /// forks a `PipelineCommand` child per stage.
    fn run_pipeline(&mut self, pipeline: &posh_syntax::syntax::Pipeline) -> ExecResult {
        let result = if pipeline.commands.len() == 1 {
            self.run_command(&pipeline.commands[0])
        } else {
            self.run_piped_commands(&pipeline.commands)
        };
        if !result.is_normal() {
            return result;
        }
        let exit_status = if pipeline.negated {
            i32::from(result.exit_status == 0)
        } else {
            result.exit_status
        };
        self.apply_errexit(ExecResult::normal(exit_status))
    }

    fn run_piped_commands(&mut self, commands: &[Rc<Command>]) -> ExecResult {
        let n = commands.len();
        let mut pipes = Vec::with_capacity(n - 1);
        for _ in 0..n - 1 {
            match self.spawner.pipe() {
                Ok(p) => pipes.push(p),
                Err(e) => return ExecResult::normal(self.status_for_system_error(&e.message)),
            }
        }

        self.stack.push(FrameKind::Pipeline);
        let mut pids = Vec::with_capacity(n);
        for (i, command) in commands.iter().enumerate() {
            match self.spawner.fork() {
                Ok(ForkOutcome::Parent(pid)) => pids.push(pid),
                Ok(ForkOutcome::Child) => {
                    self.run_pipeline_stage_child(i, n, &pipes, command);
                }
                Err(_) => {
                    self.stack.pop();
                    return ExecResult::normal(1);
                }
            }
        }
        for (r, w) in &pipes {
            let _ = self.spawner.close(*r);
            let _ = self.spawner.close(*w);
        }
        let mut statuses = Vec::with_capacity(n);
        for pid in pids {
            statuses.push(self.spawner.wait(pid).exit_status().unwrap_or(0));
        }
        self.stack.pop();

        let pipefail = self
        .stack
        .top()
        .resources
        .options
        .borrow()
        .contains(posh_env::Opt::PipeFail);
        let exit_status = if pipefail {
            statuses.iter().rev().find(|&&s| s != 0).copied().unwrap_or(0)
        } else {
            *statuses.last().unwrap_or(&0)
        };
        ExecResult::normal(exit_status)
    }

    /// Runs one pipeline stage as a forked child. Never returns: the
    /// child always terminates via [`Spawner::exit_child`].
    fn run_pipeline_stage_child(
        &mut self,
        index: usize,
        n: usize,
        pipes: &[(posh_env::Fd, posh_env::Fd)],
        command: &Rc<Command>,
    ) -> ! {
        self.stack.push(FrameKind::PipelineCommand);
        if index > 0 {
            let (read_end, _) = pipes[index - 1];
            let _ = self.spawner.dup2(read_end, 0);
        }
        if index + 1 < n {
            let (_, write_end) = pipes[index];
            let _ = self.spawner.dup2(write_end, 1);
        }
        for (r, w) in pipes {
            let _ = self.spawner.close(*r);
            let _ = self.spawner.close(*w);
        }
        let result = self.run_command(command);
        let result = self.finish_frame(result);
        self.spawner.exit_child(result.exit_status & 0xff);
    }

    fn run_background(&mut self, and_or: &Rc<AndOrList>) -> ExecResult {
        let command_line = and_or.to_string();
        match self.spawner.fork() {
            Ok(ForkOutcome::Parent(pid)) => {
                self.jobs.add(Job::new(vec![pid], command_line));
                self.stack.top_mut().last_background_pid = Some(pid);
                ExecResult::normal(0)
            }
            Ok(ForkOutcome::Child) => {
                self.stack.push(FrameKind::BackgroundJob);
                let result = self.run_and_or_list(and_or);
                let result = self.finish_frame(result);
                self.spawner.exit_child(result.exit_status & 0xff);
            }
            Err(_) => ExecResult::normal(1),
        }
    }

    pub(crate) fn run_command(&mut self, command: &Rc<Command>) -> ExecResult {
        match command.as_ref() {
            Command::Simple(cmd) => self.run_simple_command(cmd),
            Command::Compound(cmd) => self.run_compound_command(cmd),
            Command::Function(def) => self.define_function(def),
        }
    }

    fn define_function(&mut self, def: &posh_syntax::syntax::FunctionDef) -> ExecResult {
        self.stack
        .top()
        .resources
        .functions
        .borrow_mut()
        .define(Rc::new(def.clone()));
        ExecResult::normal(0)
    }

    /// `(` subshell `)`.
    fn run_subshell(&mut self, body: &CommandList, redirs: &[Redirection]) -> ExecResult {
        match self.spawner.fork() {
            Ok(ForkOutcome::Parent(pid)) => {
                let outcome = self.spawner.wait(pid);
                ExecResult::normal(outcome.exit_status().unwrap_or(0))
            }
            Ok(ForkOutcome::Child) => {
                self.stack.push(FrameKind::Subshell);
                let fd_mark = self.stack.top().resources.fds.borrow().shadow_mark();
                let result = match self.apply_redirections(redirs) {
                    Ok(()) => self.run_command_list(body),
                    Err(_) => ExecResult::normal(1),
                };
                self.restore_redirections(fd_mark);
                let result = self.finish_frame(result);
                self.spawner.exit_child(result.exit_status & 0xff);
            }
            Err(_) => ExecResult::normal(1),
        }
    }

    /// Runs `body` inside a fresh non-forking child frame, applying and
    /// restoring `redirs` around it.
    fn run_in_frame(
        &mut self,
        kind: FrameKind,
        redirs: &[Redirection],
        body: impl FnOnce(&mut Self) -> ExecResult,
    ) -> ExecResult {
        self.stack.push(kind);
        let fd_mark = self.stack.top().resources.fds.borrow().shadow_mark();
        let result = match self.apply_redirections(redirs) {
            Ok(()) => body(self),
            Err(_) => ExecResult::normal(1),
        };
        self.restore_redirections(fd_mark);
        let result = self.finish_frame(result);
        self.stack.pop();
        result
    }

    /// Applies `redirs` around `body` without pushing a new frame, for
    /// constructs that carry redirections but are not themselves a frame
    /// type in spec §4.4's table (`if`, `case`).
    fn with_redirs(
        &mut self,
        redirs: &[Redirection],
        body: impl FnOnce(&mut Self) -> ExecResult,
    ) -> ExecResult {
        let fd_mark = self.stack.top().resources.fds.borrow().shadow_mark();
        let result = match self.apply_redirections(redirs) {
            Ok(()) => body(self),
            Err(_) => ExecResult::normal(1),
        };
        self.restore_redirections(fd_mark);
        result
    }

    /// Shared frame-pop epilogue: absorb `Return` if
    /// this frame is a return target, run its `EXIT` trap if it owns the
    /// trap table, and record the final exit status on the about-to-be
    /// popped frame so `Stack::pop`'s `exit_affects_parent` propagation
    /// picks it up.
    fn finish_frame(&mut self, mut result: ExecResult) -> ExecResult {
        if self.stack.top().policy.is_return_target && result.flow == ControlFlow::Return {
            result = ExecResult::normal(result.exit_status);
        }
        self.run_exit_trap_if_owned();
        self.stack.top_mut().last_exit_status = result.exit_status;
        result
    }

    /// Runs the current frame's `EXIT` trap if this frame type owns an
    /// independent trap table rather than sharing its parent's; a `SHARE`d trap
    /// table belongs to an ancestor and fires when that ancestor pops, not
    /// on every intermediate frame that merely shares it.
    fn run_exit_trap_if_owned(&mut self) {
        if matches!(self.stack.top().policy.traps, Resource::Share) {
            return;
        }
        let handler = self
        .stack
        .top()
        .resources
        .traps
        .borrow()
        .exit_handler();
        if let Some(src) = handler {
            self.run_trap_source(&src);
        }
    }

    /// Runs the `DEBUG` trap, if set, before a simple command.
    /// Skipped while already inside a trap handler's own body, so a
    /// `DEBUG` trap whose source contains simple commands does not refire
    /// on itself.
    fn run_debug_trap_if_set(&mut self) {
        if self.stack.top().in_trap_handler {
            return;
        }
        let action = self
        .stack
        .top()
        .resources
        .traps
        .borrow()
        .get(posh_env::Condition::Debug);
        if let Action::Handler(src) = action {
            self.run_trap_source(&src);
        }
    }

    fn apply_errexit(&mut self, result: ExecResult) -> ExecResult {
        if result.is_normal()
        && result.exit_status != 0
        && self
        .stack
        .top()
        .resources
        .options
        .borrow()
        .contains(posh_env::Opt::ErrExit)
        && !self.stack.errexit_suppressed()
        {
            return ExecResult {
                exit_status: result.exit_status,
                flow: ControlFlow::Exit,
                flow_depth: 0,
            };
        }
        result
    }

    fn status_for_system_error(&self, _message: &str) -> i32 {
        1
    }

    /// Runs `f` against a freshly assembled [`Expander`] over the current
    /// frame's resources. The expander's borrows
    /// (`variables`/`positional`/`cwd`) come from cloned `Rc`s, not from
    /// `self` directly, which is what lets `command_subst: self` coexist
    /// with them: by the time that field is written, every other borrow
    /// taken from `self` (the `Copy` callback references) has already
    /// ended.
    fn with_expander<T>(
        &mut self,
        f: impl FnOnce(&mut Expander) -> Result<T, ExpansionError>,
    ) -> Result<T, ExpansionError> {
        let options = *self.stack.top().resources.options.borrow();
        let last_exit_status = self.stack.top().last_exit_status;
        let last_background_pid = self.stack.top().last_background_pid;
        let variables_rc = self.stack.top().resources.variables.clone();
        let positional_rc = self.stack.top().resources.positional.clone();
        let cwd_rc = self.stack.top().resources.cwd.clone();
        let shell_pid = self.shell_pid;
        let tilde = self.tilde;
        let globber = self.globber;
        let arithmetic = self.arithmetic;

        let mut vars_guard = variables_rc.borrow_mut();
        let pos_guard = positional_rc.borrow();
        let cwd_guard = cwd_rc.borrow();
        let mut expander = Expander {
            variables: &mut vars_guard,
            positional: &pos_guard,
            options,
            last_exit_status,
            shell_pid,
            last_background_pid,
            cwd: &cwd_guard,
            tilde,
            globber,
            arithmetic,
            command_subst: self,
        };
        f(&mut expander)
    }

    pub(crate) fn expand_word_single(&mut self, word: &Word) -> Result<String, ExpansionError> {
        self.with_expander(|e| e.expand_word_single(word))
    }

    pub(crate) fn expand_word_pattern(
        &mut self,
        word: &Word,
    ) -> Result<Vec<(char, bool)>, ExpansionError> {
        self.with_expander(|e| e.expand_word_pattern(word))
    }

    pub(crate) fn expand_word(&mut self, word: &Word) -> Result<Vec<String>, ExpansionError> {
        self.with_expander(|e| e.expand_word(word))
    }

    pub(crate) fn expand_words(&mut self, words: &[Word]) -> Result<Vec<String>, ExpansionError> {
        self.with_expander(|e| e.expand_words(words))
    }
}

/// Command substitution recurses back into the executor on a fresh
/// subshell: fork, redirect the child's stdout into a
/// pipe, run the substitution's body there, and have the parent collect
/// and trim the captured bytes.
impl<'a> CommandSubstRunner for Runtime<'a> {
    fn run_command_subst(&mut self, source: &str) -> Result<String, ExpansionError> {
        let list = CommandList::from_str(source).unwrap_or_default();
        let (read_fd, write_fd) = self.spawner.pipe().map_err(|e| bad_substitution(source, e.message))?;
        match self.spawner.fork().map_err(|e| bad_substitution(source, e.message))? {
            ForkOutcome::Parent(pid) => {
                let _ = self.spawner.close(write_fd);
                let mut captured = Vec::new();
                let mut chunk = [0u8; 4096];
                loop {
                    match self.spawner.read(read_fd, &mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => captured.extend_from_slice(&chunk[..n]),
                    }
                }
                let _ = self.spawner.close(read_fd);
                let _ = self.spawner.wait(pid);
                let mut text = String::from_utf8_lossy(&captured).into_owned();
                while text.ends_with('\n') {
                    text.pop();
                }
                Ok(text)
            }
            ForkOutcome::Child => {
                let _ = self.spawner.close(read_fd);
                let _ = self.spawner.dup2(write_fd, 1);
                let _ = self.spawner.close(write_fd);
                self.stack.push(FrameKind::Subshell);
                let result = self.run_command_list(&list);
                let result = self.finish_frame(result);
                self.spawner.exit_child(result.exit_status & 0xff);
            }
        }
    }
}

fn bad_substitution(source: &str, message: String) -> ExpansionError {
    ExpansionError::BadSubstitution {
        name: format!("$({source})"),
        message,
        location: Location::dummy(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::callbacks::{
        ArithmeticError, BuiltinOutcome as EnvBuiltinOutcome, OpenFlags, SpawnError, SystemError,
        WaitOutcome,
    };
    use posh_env::{ExecutionFrame, PositionalParams, VariableStore};
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct NoTilde;
    impl posh_env::callbacks::TildeResolver for NoTilde {
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
        fn eval_arithmetic(&self, expr: &str, _vars: &VariableStore) -> Result<i64, ArithmeticError> {
            expr.trim().parse().map_err(|_| ArithmeticError("bad expr".into()))
        }
    }
    struct NoResolver;
    impl CommandResolver for NoResolver {
        fn resolve_command(&self, name: &str, _path: &str) -> Option<String> {
            if name == "true" || name == "false" {
                Some(name.to_string())
            } else {
                None
            }
        }
    }
    struct NoBuiltins;
    impl BuiltinDispatch for NoBuiltins {
        fn builtin(
            &mut self,
            _name: &str,
            _args: &[Rc<str>],
            _frame: &ExecutionFrame,
        ) -> EnvBuiltinOutcome {
            EnvBuiltinOutcome::NotABuiltin
        }
        fn is_special(&self, _name: &str) -> bool {
            false
        }
    }

    /// An in-process test double for [`Spawner`]: `fork` never actually
    /// duplicates the process (there is nothing to isolate inside a unit
        /// test), so `spawn`/`wait` just recognize `true`/`false` as the only
    /// two "external" programs this harness understands.
    #[derive(Default)]
    struct FakeSpawner {
        fds: RefCell<HashMap<posh_env::Fd, Vec<u8>>>,
        next_fd: RefCell<posh_env::Fd>,
    }

    impl FakeSpawner {
        fn new() -> Self {
            FakeSpawner {
                fds: RefCell::new(HashMap::new()),
                next_fd: RefCell::new(10),
            }
        }
    }

    impl Spawner for FakeSpawner {
        fn spawn(&mut self, argv: &[Rc<str>], _envp: &[(Rc<str>, Rc<str>)]) -> Result<Pid, SpawnError> {
            match argv.first().map(|s| &**s) {
                Some("true") => Ok(1),
                Some("false") => Ok(2),
                _ => Err(SpawnError {
                        argv0: argv.first().map(|s| s.to_string()).unwrap_or_default(),
                        message: "no such file".into(),
                    }),
            }
        }

        fn wait(&mut self, pid: Pid) -> WaitOutcome {
            WaitOutcome::Exited(if pid == 2 { 1 } else { 0 })
        }

        fn fork(&mut self) -> Result<ForkOutcome, SpawnError> {
            // The test harness never actually forks; every "child" body runs
            // in-line as if it were the parent, which is sufficient for
            // exercising control flow in tests that don't depend on real
            // process isolation (subshell variable scoping is what
                // `frame.rs`'s own tests already cover).
            Ok(ForkOutcome::Parent(0))
        }

        fn exit_child(&mut self, _status: i32) -> ! {
            panic!("exit_child called in a test that never really forks");
        }

        fn open(&mut self, _path: &str, _flags: OpenFlags) -> Result<posh_env::Fd, SystemError> {
            let mut next = self.next_fd.borrow_mut();
            let fd = *next;
            *next += 1;
            Ok(fd)
        }

        fn dup(&mut self, fd: posh_env::Fd) -> Result<posh_env::Fd, SystemError> {
            Ok(fd)
        }

        fn dup2(&mut self, _src: posh_env::Fd, _dst: posh_env::Fd) -> Result<(), SystemError> {
            Ok(())
        }

        fn close(&mut self, _fd: posh_env::Fd) -> Result<(), SystemError> {
            Ok(())
        }

        fn pipe(&mut self) -> Result<(posh_env::Fd, posh_env::Fd), SystemError> {
            let mut next = self.next_fd.borrow_mut();
            let r = *next;
            *next += 1;
            let w = *next;
            *next += 1;
            Ok((r, w))
        }

        fn read(&mut self, fd: posh_env::Fd, buf: &mut [u8]) -> Result<usize, SystemError> {
            let mut fds = self.fds.borrow_mut();
            let data = fds.entry(fd).or_default();
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            data.drain(..n);
            Ok(n)
        }

        fn write(&mut self, fd: posh_env::Fd, buf: &[u8]) -> Result<usize, SystemError> {
            self.fds.borrow_mut().entry(fd).or_default().extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    fn root_frame() -> ExecutionFrame {
        let mut vars = VariableStore::new();
        vars.assign("PATH", "/bin").unwrap();
        vars.assign("IFS", " \t\n").unwrap();
        ExecutionFrame::root(vars, PositionalParams::new("sh", vec![]), "/".into(), 0o022)
    }

    fn run(source: &str) -> i32 {
        let tilde = NoTilde;
        let globber = NoGlob;
        let arith = NoArith;
        let resolver = NoResolver;
        let mut builtins = NoBuiltins;
        let mut spawner = FakeSpawner::new();
        let mut rt = Runtime::new(
            root_frame(),
            &tilde,
            &globber,
            &arith,
            &resolver,
            &mut builtins,
            &mut spawner,
            42,
        );
        let list = CommandList::from_str(source).unwrap();
        rt.run_script(&list)
    }

    #[test]
    fn sequential_list_runs_in_order_and_last_status_wins() {
        assert_eq!(run("true; false; true"), 0);
        assert_eq!(run("true; false"), 1);
    }

    #[test]
    fn and_or_short_circuits() {
        assert_eq!(run("false && true"), 1);
        assert_eq!(run("true || false"), 0);
    }

    #[test]
    fn if_else_picks_the_right_branch() {
        assert_eq!(run("if false; then true; else false; fi"), 1);
        assert_eq!(run("if true; then true; fi"), 0);
    }

    #[test]
    fn for_loop_binds_each_word() {
        assert_eq!(run("for x in a b c; do true; done"), 0);
    }

    #[test]
    fn negated_pipeline_inverts_status() {
        assert_eq!(run("! true"), 1);
        assert_eq!(run("! false"), 0);
    }

    #[test]
    fn break_with_no_enclosing_loop_is_an_error() {
        assert_eq!(run("break"), 1);
    }

    #[test]
    fn while_loop_honors_break() {
        assert_eq!(run("while true; do break; done"), 0);
    }

    #[test]
    fn break_depth_exceeding_loop_nesting_stops_all_and_resets_status() {
        // `break 2` inside a single loop has no second loop to re-raise
        // into; it must stop just that one loop and reset `$?` to 0 rather
        // than aborting the rest of the command list, so `false` after the
        // loop still runs.
        assert_eq!(run("for x in 1 2 3; do break 2; done; false"), 1);
    }

    #[test]
    fn continue_depth_exceeding_loop_nesting_stops_all_and_resets_status() {
        assert_eq!(run("for x in 1 2 3; do continue 2; done; false"), 1);
    }
}
