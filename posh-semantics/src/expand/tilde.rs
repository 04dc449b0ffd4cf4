//! Tilde expansion: "an unquoted leading `~` or `~name`
//! resolves to home directory via an injected resolver callback; failure
//! leaves the text literal."
//!
//! Grounded on `yash-semantics/src/expansion/initial/tilde.rs`'s resolver
//! seam, narrowed to the one callback spec §6 names
//! (`resolve_tilde(user?) -> path | None`); the teacher additionally
//! distinguishes "tilde prefix may only appear at certain word positions"
//! bookkeeping that belongs to the parser, which `posh_syntax::lexer`
//! already resolved when it produced a [`posh_syntax::syntax::WordPartKind::Tilde`]
//! part in the first place.

use std::rc::Rc;

pub use posh_env::callbacks::TildeResolver;

/// A [`TildeResolver`] that never resolves anything, leaving every `~` as a
/// literal. Useful for embedders that don't support home-directory lookup
/// and for tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTildeResolver;

impl TildeResolver for NullTildeResolver {
    fn resolve_tilde(&self, _user: Option<&str>) -> Option<Rc<str>> {
        None
    }
}
