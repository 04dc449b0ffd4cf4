//! Shell execution environment: the data an [`ExecutionFrame`](frame::ExecutionFrame)
//! scopes per spec §3/§4.4 — variables, positional parameters, jobs, traps,
//! options, functions, file descriptors — plus the static policy table that
//! drives frame composition, and the narrow callback trait seams (§6) the
//! executor in `posh-semantics` invokes for anything platform- or
//! builtin-specific.

pub mod callbacks;
pub mod fd;
pub mod frame;
pub mod function;
pub mod job;
pub mod option;
pub mod policy;
pub mod positional;
pub mod trap;
pub mod variable;

pub use fd::{Fd, FdTable};
pub use frame::{ControlFlow, ExecResult, ExecutionFrame, FrameKind, Resources, Shared, Stack};
pub use function::FunctionTable;
pub use job::{Job, JobId, JobStatus, JobStore, Pid};
pub use option::{dash_string, Opt, OptionSet};
pub use policy::{policy_for, Policy, Resource, POLICY_TABLE};
pub use positional::PositionalParams;
pub use trap::{Action, Condition, Signal, TrapStore};
pub use variable::{ReadOnlyError, Variable, VariableStore};
