//! Simple-command execution:
//! expand assignments and words, then dispatch to a function, a special or
//! regular built-in, or an external utility, with the assignment-scoping
//! rules each of those four paths requires.
//!
//! Grounded on `yash-semantics/src/command/simple_command.rs`, minus the
//! teacher's own built-in bodies (out of scope here; see
    //! [`posh_env::callbacks::BuiltinDispatch`]).

use super::Runtime;
use posh_env::{ControlFlow, ExecResult, FrameKind, Variable};
use posh_syntax::syntax::SimpleCommand;
use std::rc::Rc;

pub use posh_env::callbacks::BuiltinOutcome;

fn parse_level(args: &[Rc<str>]) -> u32 {
    args.first()
    .and_then(|s| s.parse::<u32>().ok())
    .filter(|n| *n > 0)
    .unwrap_or(1)
}

impl<'a> Runtime<'a> {
    pub(super) fn run_simple_command(&mut self, cmd: &SimpleCommand) -> ExecResult {
        if cmd.is_empty() {
            return ExecResult::normal(0);
        }
        self.run_debug_trap_if_set();
        self.with_redirs(&cmd.redirs, |rt| rt.run_simple_command_body(cmd))
    }

    fn run_simple_command_body(&mut self, cmd: &SimpleCommand) -> ExecResult {
        let mut assigns = Vec::with_capacity(cmd.assigns.len());
        for assign in &cmd.assigns {
            match self.expand_word_single(&assign.value) {
                Ok(value) => assigns.push((assign.name.clone(), value)),
                Err(_) => return ExecResult::normal(1),
            }
        }

        let fields = match self.expand_words(&cmd.words) {
            Ok(fields) => fields,
            Err(_) => return ExecResult::normal(1),
        };

        if fields.is_empty() {
            for (name, value) in &assigns {
                if self.assign_persistent(name, value).is_err() {
                    return ExecResult::normal(1);
                }
            }
            return ExecResult::normal(0);
        }

        let name = fields[0].clone();
        let rest: Vec<Rc<str>> = fields[1..].iter().map(|s| Rc::from(s.as_str())).collect();

        match name.as_str() {
            "break" => return self.do_break(&rest),
            "continue" => return self.do_continue(&rest),
            "return" => return self.do_return(&rest),
            "exit" => return self.do_exit(&rest),
            _ => {}
        }

        if let Some(def) = self.function_for(&name) {
            return self.run_function_call(def, &rest);
        }

        if self.builtins.is_special(&name) {
            for (n, v) in &assigns {
                if self.assign_persistent(n, v).is_err() {
                    return ExecResult::normal(1);
                }
            }
            return match self.dispatch_builtin(&name, &rest) {
                BuiltinOutcome::Ran(status) => ExecResult::normal(status),
                BuiltinOutcome::NotABuiltin => ExecResult::normal(127),
            };
        }

        let saved = self.apply_temp_assigns(&assigns);
        match self.dispatch_builtin(&name, &rest) {
            BuiltinOutcome::Ran(status) => {
                self.restore_temp_assigns(saved);
                ExecResult::normal(status)
            }
            BuiltinOutcome::NotABuiltin => {
                self.restore_temp_assigns(saved);
                self.run_external(&name, &rest, &assigns)
            }
        }
    }

    fn dispatch_builtin(&mut self, name: &str, args: &[Rc<str>]) -> BuiltinOutcome {
        self.builtins.builtin(name, args, self.stack.top())
    }

    fn function_for(&self, name: &str) -> Option<Rc<posh_syntax::syntax::FunctionDef>> {
        self.stack.top().resources.functions.borrow().get(name)
    }

    /// Calls a shell function.
    /// `$0` is left as the caller's, only `$1..` change.
    pub(super) fn run_function_call(
        &mut self,
        def: Rc<posh_syntax::syntax::FunctionDef>,
        args: &[Rc<str>],
    ) -> ExecResult {
        let arg0: Rc<str> = Rc::from(self.stack.top().resources.positional.borrow().arg0());
        self.stack.push(FrameKind::Function);
        {
            let positional = self.stack.top().resources.positional.clone();
            let mut p = positional.borrow_mut();
            p.set_arg0(arg0);
            p.set(args.to_vec());
        }
        let body = def.body.clone();
        let result = self.run_compound_command(&body);
        let result = self.finish_frame(result);
        self.stack.pop();
        result
    }

    fn assign_persistent(&mut self, name: &str, value: &str) -> Result<(), posh_env::ReadOnlyError> {
        self.stack
        .top()
        .resources
        .variables
        .borrow_mut()
        .assign(name.to_string(), value.to_string())
    }

    /// Applies `assigns` to the current frame's variables, returning what
    /// each name held before so [`Self::restore_temp_assigns`] can undo it
    ///.
    fn apply_temp_assigns(&mut self, assigns: &[(String, String)]) -> Vec<(String, Option<Variable>)> {
        let variables = self.stack.top().resources.variables.clone();
        let mut saved = Vec::with_capacity(assigns.len());
        let mut vars = variables.borrow_mut();
        for (name, value) in assigns {
            saved.push((name.clone(), vars.get(name).cloned()));
            let _ = vars.assign(name.clone(), value.clone());
        }
        saved
    }

    fn restore_temp_assigns(&mut self, saved: Vec<(String, Option<Variable>)>) {
        let variables = self.stack.top().resources.variables.clone();
        let mut vars = variables.borrow_mut();
        for (name, prior) in saved {
            match prior {
                Some(var) => vars.set(name, var),
                None => {
                    let _ = vars.unset(&name);
                }
            }
        }
    }

    /// PATH search and spawn for an external utility. The preceding assignment
    /// list goes into the child's environment only, never touching this
    /// frame's `VariableStore`.
    fn run_external(&mut self, name: &str, args: &[Rc<str>], assigns: &[(String, String)]) -> ExecResult {
        let path = self
        .stack
        .top()
        .resources
        .variables
        .borrow()
        .get_value("PATH")
        .unwrap_or("")
        .to_string();
        let Some(program) = self.resolver.resolve_command(name, &path) else {
            return ExecResult::normal(127);
        };

        let mut envp: Vec<(Rc<str>, Rc<str>)> =
        self.stack.top().resources.variables.borrow().envp().to_vec();
        for (k, v) in assigns {
            envp.retain(|(ek, _)| &**ek != k);
            envp.push((Rc::from(k.as_str()), Rc::from(v.as_str())));
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(Rc::from(program.as_str()));
        argv.extend(args.iter().cloned());

        match self.spawner.spawn(&argv, &envp) {
            Ok(pid) => ExecResult::normal(self.spawner.wait(pid).exit_status().unwrap_or(126)),
            Err(_) => ExecResult::normal(126),
        }
    }

    fn do_break(&mut self, args: &[Rc<str>]) -> ExecResult {
        if self.stack.nearest_loop_index().is_none() {
            return ExecResult::normal(1);
        }
        ExecResult {
            exit_status: self.stack.top().last_exit_status,
            flow: ControlFlow::Break,
            flow_depth: parse_level(args),
        }
    }

    fn do_continue(&mut self, args: &[Rc<str>]) -> ExecResult {
        if self.stack.nearest_loop_index().is_none() {
            return ExecResult::normal(1);
        }
        ExecResult {
            exit_status: self.stack.top().last_exit_status,
            flow: ControlFlow::Continue,
            flow_depth: parse_level(args),
        }
    }

    fn do_return(&mut self, args: &[Rc<str>]) -> ExecResult {
        let status = args
        .first()
        .and_then(|s| s.parse::<i32>().ok())
        .unwrap_or(self.stack.top().last_exit_status);
        if self.stack.nearest_return_target_index().is_none() {
            return ExecResult::normal(1);
        }
        ExecResult {
            exit_status: status,
            flow: ControlFlow::Return,
            flow_depth: 0,
        }
    }

    fn do_exit(&mut self, args: &[Rc<str>]) -> ExecResult {
        let status = args
        .first()
        .and_then(|s| s.parse::<i32>().ok())
        .unwrap_or(self.stack.top().last_exit_status);
        ExecResult {
            exit_status: status & 0xff,
            flow: ControlFlow::Exit,
            flow_depth: 0,
        }
    }
}
