//! POSIX shell script syntax: lexer, parser and abstract syntax tree.
//!
//! This crate implements the two front-end stages of a POSIX-conformant shell
//! interpreter described in the project specification: the [`lexer`], which
//! turns source text into a stream of [`lexer::Token`]s under POSIX's
//! context-sensitive quoting rules, and the [`parser`], which turns that
//! token stream into a typed [`syntax`] tree.
//!
//! The [`source`] module carries the location information that both stages
//! attach to everything they produce, so that diagnostics and the
//! [`syntax::pretty`] round-trip printer can point back at the original
//! script text.
//!
//! Aliases are resolved before the parser sees a command word; see
//! [`alias`].
//!
//! [`diagnostic`] renders a [`lexer::LexError`] or [`parser::Error`] for a
//! human to read; its source-snippet rendering is behind the optional
//! `annotate` feature.

pub mod alias;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod syntax;
