//! File-descriptor table resource.
//!
//! The actual `open`/`dup2`/`close`/`pipe` syscalls are platform wrappers
//! out of scope; `FdTable` only tracks *which* descriptors this
//! frame considers open and the shadow stack needed to undo a redirection
//! when its frame pops. Grounded on the bookkeeping half of
//! `yash-env/src/system/virtual.rs`'s open-file-description table, minus
//! the in-process virtual filesystem that file backs (out of scope here:
    //! the real open happens in the injected [`crate::callbacks::System`]).

use std::collections::BTreeSet;

pub type Fd = i32;

/// One saved redirection, to be undone when its frame pops: `target` is the
/// fd that was redirected, and `previous` is what it pointed to before (a fd
    /// it was duplicated from via `dup`, or `None` if it was not open at all).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Shadow {
    target: Fd,
    previous: Option<Fd>,
}

#[derive(Clone, Debug, Default)]
pub struct FdTable {
    open: BTreeSet<Fd>,
    shadows: Vec<Shadow>,
}

impl FdTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, fd: Fd) -> bool {
        self.open.contains(&fd)
    }

    pub fn mark_open(&mut self, fd: Fd) {
        self.open.insert(fd);
    }

    pub fn mark_closed(&mut self, fd: Fd) {
        self.open.remove(&fd);
    }

    pub fn iter_open(&self) -> impl Iterator<Item = Fd> + '_ {
        self.open.iter().copied()
    }

    /// Records that `target` is about to be redirected, remembering what it
    /// pointed to (a fd obtained by duplicating the old target via the
        /// `System` callback, or `None` if it was closed) so it can be restored.
    pub fn push_shadow(&mut self, target: Fd, previous: Option<Fd>) {
        self.shadows.push(Shadow { target, previous });
    }

    /// Undoes the most recently applied redirections in reverse order,
    /// returning the `(target, previous)` pairs the caller should replay
    /// against the `System` callback (`dup2(previous, target)` or
        /// `close(target)` when `previous` is `None`).
    pub fn pop_shadows_to(&mut self, mark: usize) -> Vec<(Fd, Option<Fd>)> {
        let mut undone = Vec::new();
        while self.shadows.len() > mark {
            let s = self.shadows.pop().unwrap();
            undone.push((s.target, s.previous));
        }
        undone
    }

    /// A mark to later pass to [`Self::pop_shadows_to`], taken before
    /// applying a command's redirections.
    pub fn shadow_mark(&self) -> usize {
        self.shadows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_stack_unwinds_in_reverse() {
        let mut fds = FdTable::new();
        let mark = fds.shadow_mark();
        fds.push_shadow(1, Some(10));
        fds.push_shadow(2, None);
        let undone = fds.pop_shadows_to(mark);
        assert_eq!(undone, vec![(2, None), (1, Some(10))]);
        assert_eq!(fds.shadow_mark(), mark);
    }
}
