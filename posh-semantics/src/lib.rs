//! Semantics of the shell language: word expansion and command execution.
//!
//! This crate is the third stage of the pipeline described in the project
//! specification. [`expand`] turns a [`posh_syntax::syntax::Word`] into one
//! or more expanded field strings. [`exec`] walks a
//! [`posh_syntax::syntax::CommandList`], realizing its semantics through the
//! [`posh_env::ExecutionFrame`]/[`posh_env::Stack`] the execution frame and
//! policy table of `posh-env` define.
//!
//! Everything this crate needs from the outside world — tilde resolution,
//! pathname globbing, arithmetic evaluation, command search, builtin
//! dispatch, and process spawning — arrives through the callback traits
//! `posh-env` defines in [`posh_env::callbacks`]; this crate never
//! touches the filesystem or an OS process table directly.

pub mod error;
pub mod exec;
pub mod expand;
pub mod pattern;

pub use error::Error;
