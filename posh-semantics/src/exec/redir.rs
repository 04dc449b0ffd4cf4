//! Redirection application and restoration. Grounded on `yash-semantics/src/redir.rs`'s `RedirGuard`,
//! collapsed here into a pair of plain methods since this crate's frame
//! system already owns the fd shadow stack (`posh_env::FdTable`) the
//! teacher's guard type otherwise has to track itself.

use super::Runtime;
use crate::error::RedirectionError;
use posh_env::callbacks::OpenFlags;
use posh_env::{Fd, Shared};
use posh_syntax::source::Location;
use posh_syntax::syntax::{RedirOp, RedirTarget, Redirection};

fn open_flags_for(op: RedirOp) -> OpenFlags {
    match op {
        RedirOp::In => OpenFlags {
            read: true,
            ..OpenFlags::default()
        },
        RedirOp::Out => OpenFlags {
            write: true,
            create: true,
            truncate: true,
            ..OpenFlags::default()
        },
        RedirOp::Append => OpenFlags {
            write: true,
            create: true,
            append: true,
            ..OpenFlags::default()
        },
        RedirOp::InOut => OpenFlags {
            read: true,
            write: true,
            create: true,
            ..OpenFlags::default()
        },
        RedirOp::Clobber => OpenFlags {
            write: true,
            create: true,
            truncate: true,
            ..OpenFlags::default()
        },
        RedirOp::DupIn | RedirOp::DupOut | RedirOp::HereDoc | RedirOp::HereDocStrip => {
            OpenFlags::default()
        }
    }
}

impl<'a> Runtime<'a> {
    pub(super) fn apply_redirections(&mut self, redirs: &[Redirection]) -> Result<(), RedirectionError> {
        for redir in redirs {
            self.apply_one_redirection(redir)?;
        }
        Ok(())
    }

    fn apply_one_redirection(&mut self, redir: &Redirection) -> Result<(), RedirectionError> {
        let target = redir.fd();
        match &redir.target {
            RedirTarget::File(word) => {
                let path = self
                .expand_word_single(word)
                .map_err(|e| RedirectionError {
                        message: e.to_string(),
                        location: redir.location.clone(),
                    })?;
                let flags = open_flags_for(redir.op);
                let new_fd = self.spawner.open(&path, flags).map_err(|e| RedirectionError {
                        message: e.message,
                        location: redir.location.clone(),
                    })?;
                let result = self.redirect_fd_to(target, new_fd, &redir.location);
                let _ = self.spawner.close(new_fd);
                result
            }
            RedirTarget::Fd(src) => self.redirect_fd_to(target, *src, &redir.location),
            RedirTarget::Close => {
                self.shadow_current(target);
                let _ = self.spawner.close(target);
                self.fd_table().borrow_mut().mark_closed(target);
                Ok(())
            }
            RedirTarget::HereDoc { cell, .. } => {
                let body = cell.0.borrow().clone();
                let text = match body {
                    Some(word) => self.expand_word_single(&word).map_err(|e| RedirectionError {
                            message: e.to_string(),
                            location: redir.location.clone(),
                        })?,
                    None => String::new(),
                };
                let (read_fd, write_fd) = self.spawner.pipe().map_err(|e| RedirectionError {
                        message: e.message,
                        location: redir.location.clone(),
                    })?;
                let _ = self.spawner.write(write_fd, text.as_bytes());
                let _ = self.spawner.close(write_fd);
                let result = self.redirect_fd_to(target, read_fd, &redir.location);
                let _ = self.spawner.close(read_fd);
                result
            }
        }
    }

    /// Undoes every shadow recorded since `mark`, most-recently-applied
    /// first.
    pub(super) fn restore_redirections(&mut self, mark: usize) {
        let undone = self.fd_table().borrow_mut().pop_shadows_to(mark);
        for (target, previous) in undone {
            match previous {
                Some(prev) => {
                    let _ = self.spawner.dup2(prev, target);
                    let _ = self.spawner.close(prev);
                    self.fd_table().borrow_mut().mark_open(target);
                }
                None => {
                    let _ = self.spawner.close(target);
                    self.fd_table().borrow_mut().mark_closed(target);
                }
            }
        }
    }

    fn fd_table(&self) -> Shared<posh_env::FdTable> {
        self.stack.top().resources.fds.clone()
    }

    fn shadow_current(&mut self, target: Fd) {
        let fds = self.fd_table();
        let is_open = fds.borrow().is_open(target);
        let previous = if is_open { self.spawner.dup(target).ok() } else { None };
        fds.borrow_mut().push_shadow(target, previous);
    }

    fn redirect_fd_to(&mut self, target: Fd, source: Fd, location: &Location) -> Result<(), RedirectionError> {
        self.shadow_current(target);
        self.spawner.dup2(source, target).map_err(|e| RedirectionError {
                message: e.message,
                location: location.clone(),
            })?;
        self.fd_table().borrow_mut().mark_open(target);
        Ok(())
    }
}
