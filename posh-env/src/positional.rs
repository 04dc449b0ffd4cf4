//! `PositionalParams`: "An ordered sequence (arg0, arg1, …);
//! queries expose `$0`, `$#`, `$1…$N`, `$*`, `$@`. `$?`, `$$`, `$!` are read
//! from the executor's counters, not from this store."
//!
//! Grounded on `yash-env/src/variable.rs`'s positional-parameter handling,
//! which stores them as a `Vec<Variable>` inside a `Context::Regular`; here
//! they are pulled out into their own small type since this crate's
//! `ExecutionFrame` (not `VariableStore`) is what owns scoping.

use std::rc::Rc;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionalParams {
    arg0: Rc<str>,
    params: Vec<Rc<str>>,
}

impl PositionalParams {
    pub fn new(arg0: impl Into<Rc<str>>, params: Vec<Rc<str>>) -> Self {
        PositionalParams {
            arg0: arg0.into(),
            params,
        }
    }

    /// `$0`.
    pub fn arg0(&self) -> &str {
        &self.arg0
    }

    pub fn set_arg0(&mut self, arg0: impl Into<Rc<str>>) {
        self.arg0 = arg0.into();
    }

    /// `$#`.
    pub fn count(&self) -> usize {
        self.params.len()
    }

    /// `$N` for `n` in `1..=count()`; `None` outside that range (and for
        /// `n == 0`, which callers should resolve through `arg0` instead).
    pub fn get(&self, n: usize) -> Option<&str> {
        if n == 0 {
            return None;
        }
        self.params.get(n - 1).map(|s| &**s)
    }

    /// The fields backing `$*`/`$@`, in order.
    pub fn all(&self) -> &[Rc<str>] {
        &self.params
    }

    pub fn set(&mut self, params: Vec<Rc<str>>) {
        self.params = params;
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_is_one_based() {
        let p = PositionalParams::new("sh", vec![Rc::from("a"), Rc::from("b")]);
        assert_eq!(p.arg0(), "sh");
        assert_eq!(p.count(), 2);
        assert_eq!(p.get(1), Some("a"));
        assert_eq!(p.get(2), Some("b"));
        assert_eq!(p.get(0), None);
        assert_eq!(p.get(3), None);
    }
}
