//! The static policy table: each frame kind maps to an immutable policy row.
//! Every row specifies, per resource, one of OWN (new empty), COPY (clone
//! parent's), SHARE (borrow parent's), plus a handful of behavioral flags.
//! `ExecutionFrame` construction takes a `Policy` table reference, which is
//! a `const`/`static` data table, not user-configurable at runtime.
//!
//! There is no single equivalent in `yash-env` — its scoping is spread
//! across `variable.rs`'s `Context` stack, `stack.rs`'s `Frame` enum, and ad
//! hoc logic in `yash-semantics::command` rather than one explicit table —
//! so this module is new code, grounded in the behavior those pieces
//! implement rather than in one source file.

use crate::frame::FrameKind;

/// How a frame's resource relates to its parent's.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resource {
    /// Starts empty, independent of the parent.
    Own,
    /// Starts as a clone of the parent's, then diverges independently.
    Copy,
    /// Borrows the parent's; mutations are visible to the parent after pop.
    Share,
}

/// One row of the policy table: the per-resource ownership mode plus the
/// behavioral flags that go with it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Policy {
    pub variables: Resource,
    pub positional: Resource,
    pub fds: Resource,
    pub traps: Resource,
    pub options: Resource,
    pub cwd: Resource,
    pub umask: Resource,
    pub functions: Resource,
    pub aliases: Resource,

    /// `COPY` traps additionally reset every non-`Ignore`d action to
    /// `Default`, true only for `Subshell`/`BackgroundJob`.
    pub reset_traps_non_ignored: bool,
    /// Whether entering this frame forks an OS process.
    pub forks: bool,
    /// Whether this frame type is a loop target for `break`/`continue`
    ///.
    pub is_loop: bool,
    /// Whether this frame type absorbs a `Return` flow.
    pub is_return_target: bool,
    /// Whether the frame's exit status is propagated to its parent on pop,
    /// as opposed to only being visible through `wait`.
    pub exit_affects_parent: bool,
}

const fn row(
    variables: Resource,
    positional: Resource,
    fds: Resource,
    traps: Resource,
    options: Resource,
    cwd: Resource,
    umask: Resource,
    functions: Resource,
    aliases: Resource,
    reset_traps_non_ignored: bool,
    forks: bool,
    is_loop: bool,
    is_return_target: bool,
    exit_affects_parent: bool,
) -> Policy {
    Policy {
        variables,
        positional,
        fds,
        traps,
        options,
        cwd,
        umask,
        functions,
        aliases,
        reset_traps_non_ignored,
        forks,
        is_loop,
        is_return_target,
        exit_affects_parent,
    }
}

use Resource::{Copy as C, Own as O, Share as S};

/// Row for `TopLevel`: everything is `Own`, nothing to propagate to (there
/// is no parent). Required since every `Stack` needs a root frame, even
/// though nothing ever pushes a fresh `TopLevel` frame mid-script.
const TOP_LEVEL: Policy = row(O, O, O, O, O, O, O, O, O, false, false, false, false, false);

const SUBSHELL: Policy = row(C, C, C, C, C, C, C, C, C, true, true, false, false, false);
const BRACE_GROUP: Policy = row(S, S, S, S, S, S, S, S, S, false, false, false, false, true);
const FUNCTION: Policy = row(S, O, S, S, S, S, S, S, S, false, false, false, true, true);
const LOOP: Policy = row(S, S, S, S, S, S, S, S, S, false, false, true, false, true);
const DOT_SCRIPT: Policy = row(S, S, S, S, S, S, S, S, S, false, false, false, true, true);
const TRAP: Policy = row(S, S, S, S, S, S, S, S, S, false, false, false, false, true);
const PIPELINE: Policy = row(S, S, S, S, S, S, S, S, S, false, false, false, false, true);
/// Behaves like `Subshell` but inherits pipe ends from the orchestrating
/// `Pipeline` frame: same resource row as `Subshell`.
const PIPELINE_COMMAND: Policy = row(C, C, C, C, C, C, C, C, C, true, true, false, false, false);
const BACKGROUND_JOB: Policy = row(C, C, C, C, C, C, C, C, C, true, true, false, false, false);
/// `Eval` re-parses and executes text in the current scope (`eval`
/// builtin), so every resource is shared like `BraceGroup`.
const EVAL: Policy = row(S, S, S, S, S, S, S, S, S, false, false, false, false, true);

pub fn policy_for(kind: FrameKind) -> &'static Policy {
    match kind {
        FrameKind::TopLevel => &TOP_LEVEL,
        FrameKind::Subshell => &SUBSHELL,
        FrameKind::BraceGroup => &BRACE_GROUP,
        FrameKind::Function => &FUNCTION,
        FrameKind::Loop => &LOOP,
        FrameKind::DotScript => &DOT_SCRIPT,
        FrameKind::Trap => &TRAP,
        FrameKind::Pipeline => &PIPELINE,
        FrameKind::PipelineCommand => &PIPELINE_COMMAND,
        FrameKind::BackgroundJob => &BACKGROUND_JOB,
        FrameKind::Eval => &EVAL,
    }
}

/// All eleven rows, indexable by [`FrameKind`] for callers that want the
/// whole table rather than a single lookup (e.g. pretty-printing it in a
    /// debug build).
pub static POLICY_TABLE: [(FrameKind, Policy); 11] = [
    (FrameKind::TopLevel, TOP_LEVEL),
    (FrameKind::Subshell, SUBSHELL),
    (FrameKind::BraceGroup, BRACE_GROUP),
    (FrameKind::Function, FUNCTION),
    (FrameKind::Loop, LOOP),
    (FrameKind::DotScript, DOT_SCRIPT),
    (FrameKind::Trap, TRAP),
    (FrameKind::Pipeline, PIPELINE),
    (FrameKind::PipelineCommand, PIPELINE_COMMAND),
    (FrameKind::BackgroundJob, BACKGROUND_JOB),
    (FrameKind::Eval, EVAL),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_frame_owns_positional_but_shares_variables() {
        let p = policy_for(FrameKind::Function);
        assert_eq!(p.positional, Resource::Own);
        assert_eq!(p.variables, Resource::Share);
        assert!(p.is_return_target);
    }

    #[test]
    fn subshell_forks_and_resets_non_ignored_traps() {
        let p = policy_for(FrameKind::Subshell);
        assert!(p.forks);
        assert!(p.reset_traps_non_ignored);
        assert!(!p.exit_affects_parent);
    }

    #[test]
    fn loop_frame_is_loop_target_and_shares_everything() {
        let p = policy_for(FrameKind::Loop);
        assert!(p.is_loop);
        assert_eq!(p.variables, Resource::Share);
    }

    #[test]
    fn table_has_one_row_per_frame_kind() {
        assert_eq!(POLICY_TABLE.len(), 11);
    }
}
