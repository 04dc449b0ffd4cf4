//! `ExecutionFrame` and `Stack`.
//!
//! There is no single teacher file this is a port of: `yash-env` spreads the
//! same concerns across `variable.rs`'s internal `Context` stack (variable
    //! scoping), `stack.rs`'s lightweight `Frame`/`Stack` (control-flow and
    //! errexit-suppression markers), and ad hoc arguments threaded through
//! `yash-semantics::command`'s functions (redirections, positional
    //! overrides). This module unifies all of that into the single
//! policy-driven frame spec §3/§4.4 describes, since that unification is
//! exactly what `SPEC_FULL.md` §4 ("two parallel executor drafts... implement
    //! one coherent version") asks for. `stack.rs`'s `Frame::Condition` marker is
//! kept in spirit as `Stack`'s `errexit_suppress_depth` counter (see
    //! `DESIGN.md`'s "`set -e` semantics" decision).

use crate::fd::FdTable;
use crate::function::FunctionTable;
use crate::job::Pid;
use crate::option::OptionSet;
use crate::policy::{self, Policy, Resource};
use crate::positional::PositionalParams;
use crate::trap::TrapStore;
use crate::variable::VariableStore;
use posh_syntax::alias::AliasTable;
use std::cell::RefCell;
use std::rc::Rc;

/// A resource shared between frames per policy: `Share` frames clone the
/// `Rc`, `Own`/`Copy` frames get a fresh `Rc` around new or cloned data.
pub type Shared<T> = Rc<RefCell<T>>;

fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

fn apply_resource<T: Clone + Default>(mode: Resource, parent: &Shared<T>) -> Shared<T> {
    match mode {
        Resource::Own => shared(T::default()),
        Resource::Copy => shared(parent.borrow().clone()),
        Resource::Share => parent.clone(),
    }
}

/// The frame types enumerated in spec §4.4.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FrameKind {
    TopLevel,
    Subshell,
    BraceGroup,
    Function,
    Loop,
    DotScript,
    Trap,
    Pipeline,
    PipelineCommand,
    BackgroundJob,
    Eval,
}

/// The nine per-resource slots spec §3 lists under `ExecutionFrame`.
#[derive(Clone)]
pub struct Resources {
    pub variables: Shared<VariableStore>,
    pub positional: Shared<PositionalParams>,
    pub fds: Shared<FdTable>,
    pub traps: Shared<TrapStore>,
    pub options: Shared<OptionSet>,
    pub cwd: Shared<String>,
    pub umask: Shared<u32>,
    pub functions: Shared<FunctionTable>,
    pub aliases: Shared<AliasTable>,
}

impl Resources {
    /// Builds the root set of resources, each owned outright (the `TopLevel`
        /// frame has no parent to copy or share from).
    pub fn new_root(
        variables: VariableStore,
        positional: PositionalParams,
        cwd: String,
        umask: u32,
    ) -> Self {
        Resources {
            variables: shared(variables),
            positional: shared(positional),
            fds: shared(FdTable::new()),
            traps: shared(TrapStore::new()),
            options: shared(OptionSet::new()),
            cwd: shared(cwd),
            umask: shared(umask),
            functions: shared(FunctionTable::new()),
            aliases: shared(AliasTable::new()),
        }
    }

    fn derive(parent: &Resources, policy: &Policy) -> Self {
        let traps = apply_resource(policy.traps, &parent.traps);
        if policy.reset_traps_non_ignored {
            traps.borrow_mut().reset_non_ignored();
        }
        Resources {
            variables: apply_resource(policy.variables, &parent.variables),
            positional: apply_resource(policy.positional, &parent.positional),
            fds: apply_resource(policy.fds, &parent.fds),
            traps,
            options: apply_resource(policy.options, &parent.options),
            cwd: apply_resource(policy.cwd, &parent.cwd),
            umask: apply_resource(policy.umask, &parent.umask),
            functions: apply_resource(policy.functions, &parent.functions),
            aliases: apply_resource(policy.aliases, &parent.aliases),
        }
    }
}

/// How execution of a frame's body ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlFlow {
    Normal,
    Return,
    Break,
    Continue,
    /// `exit` was invoked: "sets a 'process exit requested' marker on the
    /// top frame and aborts further AST traversal".
    Exit,
}

/// The value the executor threads through frame execution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExecResult {
    pub exit_status: i32,
    pub flow: ControlFlow,
    pub flow_depth: u32,
}

impl ExecResult {
    pub fn normal(exit_status: i32) -> Self {
        ExecResult {
            exit_status,
            flow: ControlFlow::Normal,
            flow_depth: 0,
        }
    }

    pub fn is_normal(self) -> bool {
        matches!(self.flow, ControlFlow::Normal)
    }
}

/// One level of the executor's scope stack.
pub struct ExecutionFrame {
    pub kind: FrameKind,
    pub policy: &'static Policy,
    pub resources: Resources,

    pub loop_depth: u32,
    pub last_exit_status: i32,
    pub last_background_pid: Option<Pid>,
    pub in_trap_handler: bool,

    /// Positional parameters this frame temporarily overrode, restored when
    /// the frame pops.
    pub saved_positional_params: Option<Shared<PositionalParams>>,

    /// Name of the script currently being sourced/executed, if known (spec
        /// §3 "source-tracking fields").
    pub source_name: Option<Rc<str>>,
    pub source_line: u32,
}

impl ExecutionFrame {
    /// Creates the root `TopLevel` frame.
    pub fn root(variables: VariableStore, positional: PositionalParams, cwd: String, umask: u32) -> Self {
        ExecutionFrame {
            kind: FrameKind::TopLevel,
            policy: policy::policy_for(FrameKind::TopLevel),
            resources: Resources::new_root(variables, positional, cwd, umask),
            loop_depth: 0,
            last_exit_status: 0,
            last_background_pid: None,
            in_trap_handler: false,
            saved_positional_params: None,
            source_name: None,
            source_line: 0,
        }
    }

    /// Creates a child frame of `kind`, applying its policy row to `parent`'s
    /// resources.
    pub fn child(parent: &ExecutionFrame, kind: FrameKind) -> Self {
        let policy = policy::policy_for(kind);
        let loop_depth = if policy.is_loop {
            parent.loop_depth + 1
        } else {
            parent.loop_depth
        };
        ExecutionFrame {
            kind,
            policy,
            resources: Resources::derive(&parent.resources, policy),
            loop_depth,
            last_exit_status: parent.last_exit_status,
            last_background_pid: parent.last_background_pid,
            in_trap_handler: parent.in_trap_handler || kind == FrameKind::Trap,
            saved_positional_params: None,
            source_name: parent.source_name.clone(),
            source_line: parent.source_line,
        }
    }
}

/// The executor's live stack of frames, plus the transient errexit-suppression
/// counter spec §9 asks to resolve via "a `Frame::Condition`-style 'errexit
/// suppressed' marker" (see `DESIGN.md`).
pub struct Stack {
    frames: Vec<ExecutionFrame>,
    errexit_suppress_depth: u32,
}

impl Stack {
    pub fn new(root: ExecutionFrame) -> Self {
        Stack {
            frames: vec![root],
            errexit_suppress_depth: 0,
        }
    }

    pub fn top(&self) -> &ExecutionFrame {
        self.frames.last().expect("stack always has a root frame")
    }

    pub fn top_mut(&mut self) -> &mut ExecutionFrame {
        self.frames.last_mut().expect("stack always has a root frame")
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, kind: FrameKind) {
        let child = ExecutionFrame::child(self.top(), kind);
        self.frames.push(child);
    }

    /// Pops the current frame, propagating its exit status and background
    /// pid to the new top per policy. Never pops the
    /// root `TopLevel` frame.
    pub fn pop(&mut self) -> Option<ExecutionFrame> {
        if self.frames.len() <= 1 {
            return None;
        }
        let popped = self.frames.pop().unwrap();
        if popped.policy.exit_affects_parent {
            let parent = self.top_mut();
            parent.last_exit_status = popped.last_exit_status;
        }
        Some(popped)
    }

    /// Marks the executor as having entered a context where the current
    /// command's exit status is tested.
    pub fn enter_tested_context(&mut self) {
        self.errexit_suppress_depth += 1;
    }

    pub fn exit_tested_context(&mut self) {
        self.errexit_suppress_depth = self.errexit_suppress_depth.saturating_sub(1);
    }

    pub fn errexit_suppressed(&self) -> bool {
        self.errexit_suppress_depth > 0
    }

    /// The index of the innermost loop frame, for `break`/`continue` (spec
        /// §4.5: "absorbed by the nearest enclosing Loop frame").
    pub fn nearest_loop_index(&self) -> Option<usize> {
        self.frames.iter().rposition(|f| f.policy.is_loop)
    }

    /// The index of the innermost return-target frame (`Function` or
        /// `DotScript`), for `return`.
    pub fn nearest_return_target_index(&self) -> Option<usize> {
        self.frames.iter().rposition(|f| f.policy.is_return_target)
    }

    /// Whether a Loop frame encloses the current top frame, i.e. whether
    /// the top frame (assumed to itself be a Loop) is nested inside another
    /// one. Used to tell an outermost loop from a nested one when a
    /// `break`/`continue` depth outlives every loop it can reach (spec §8:
    /// "`break n` where `n > m` stops all and sets `$?=0`").
    pub fn has_enclosing_loop(&self) -> bool {
        let without_top = self.frames.len().saturating_sub(1);
        self.frames[..without_top].iter().any(|f| f.policy.is_loop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> ExecutionFrame {
        ExecutionFrame::root(VariableStore::new(), PositionalParams::new("sh", vec![]), "/".into(), 0o022)
    }

    #[test]
    fn subshell_copy_diverges_from_parent() {
        let root = root();
        root.resources.variables.borrow_mut().assign("x", "1").unwrap();
        let child = ExecutionFrame::child(&root, FrameKind::Subshell);
        child.resources.variables.borrow_mut().assign("x", "2").unwrap();
        assert_eq!(root.resources.variables.borrow().get_value("x"), Some("1"));
        assert_eq!(child.resources.variables.borrow().get_value("x"), Some("2"));
    }

    #[test]
    fn brace_group_share_is_visible_to_parent() {
        let root = root();
        let child = ExecutionFrame::child(&root, FrameKind::BraceGroup);
        child.resources.variables.borrow_mut().assign("x", "1").unwrap();
        assert_eq!(root.resources.variables.borrow().get_value("x"), Some("1"));
    }

    #[test]
    fn function_frame_gets_fresh_positional_params() {
        let root = root();
        root.resources.positional.borrow_mut().set(vec![Rc::from("outer")]);
        let child = ExecutionFrame::child(&root, FrameKind::Function);
        assert!(child.resources.positional.borrow().is_empty());
        assert_eq!(root.resources.positional.borrow().count(), 1);
    }

    #[test]
    fn stack_pop_propagates_exit_status_only_when_policy_says_so() {
        let mut stack = Stack::new(root());
        stack.push(FrameKind::BraceGroup);
        stack.top_mut().last_exit_status = 7;
        stack.pop();
        assert_eq!(stack.top().last_exit_status, 7);

        stack.push(FrameKind::Subshell);
        stack.top_mut().last_exit_status = 9;
        stack.pop();
        assert_eq!(stack.top().last_exit_status, 7);
    }

    #[test]
    fn nearest_loop_and_return_target_lookup() {
        let mut stack = Stack::new(root());
        stack.push(FrameKind::Function);
        stack.push(FrameKind::Loop);
        stack.push(FrameKind::BraceGroup);
        assert_eq!(stack.nearest_loop_index(), Some(2));
        assert_eq!(stack.nearest_return_target_index(), Some(1));
    }

    #[test]
    fn has_enclosing_loop_is_false_for_an_outermost_loop() {
        let mut stack = Stack::new(root());
        stack.push(FrameKind::Loop);
        assert!(!stack.has_enclosing_loop());
    }

    #[test]
    fn has_enclosing_loop_is_true_for_a_nested_loop() {
        let mut stack = Stack::new(root());
        stack.push(FrameKind::Loop);
        stack.push(FrameKind::Loop);
        assert!(stack.has_enclosing_loop());
    }
}
