//! Compound-command dispatch: `(...)`, `{...}`, `if`, `while`/`until`, `for`,
//! `case`. Only `Subshell`/`BraceGroup`/`Loop` are frame types; `if` and
//! `case` carry redirections but execute directly in the current frame
//! (see [`super::Runtime::with_redirs`]).

use super::Runtime;
use crate::pattern;
use posh_env::{ControlFlow, ExecResult, FrameKind};
use posh_syntax::syntax::{CaseAction, CaseItem, CompoundCommand, CompoundKind, Elif, Redirection, Word};

impl<'a> Runtime<'a> {
    pub(super) fn run_compound_command(&mut self, cmd: &CompoundCommand) -> ExecResult {
        match &cmd.kind {
            CompoundKind::Subshell(body) => self.run_subshell(body, &cmd.redirs),
            CompoundKind::BraceGroup(body) => {
                self.run_in_frame(FrameKind::BraceGroup, &cmd.redirs, |rt| rt.run_command_list(body))
            }
            CompoundKind::If {
                condition,
                body,
                elifs,
                r#else,
            } => self.run_if(condition, body, elifs, r#else, &cmd.redirs),
            CompoundKind::While { condition, body } => self.run_loop(condition, body, &cmd.redirs, false),
            CompoundKind::Until { condition, body } => self.run_loop(condition, body, &cmd.redirs, true),
            CompoundKind::For { var, words, body } => {
                self.run_for(var, words.as_deref(), body, &cmd.redirs)
            }
            CompoundKind::Case { word, items } => self.run_case(word, items, &cmd.redirs),
        }
    }

    fn run_if(
        &mut self,
        condition: &posh_syntax::syntax::CommandList,
        body: &posh_syntax::syntax::CommandList,
        elifs: &[Elif],
        else_body: &Option<posh_syntax::syntax::CommandList>,
        redirs: &[Redirection],
    ) -> ExecResult {
        self.with_redirs(redirs, |rt| {
                rt.stack.enter_tested_context();
                let cond_result = rt.run_command_list(condition);
                rt.stack.exit_tested_context();
                if !cond_result.is_normal() {
                    return cond_result;
                }
                if cond_result.exit_status == 0 {
                    return rt.run_command_list(body);
                }
                for elif in elifs {
                    rt.stack.enter_tested_context();
                    let result = rt.run_command_list(&elif.condition);
                    rt.stack.exit_tested_context();
                    if !result.is_normal() {
                        return result;
                    }
                    if result.exit_status == 0 {
                        return rt.run_command_list(&elif.body);
                    }
                }
                match else_body {
                    Some(else_list) => rt.run_command_list(else_list),
                    None => ExecResult::normal(0),
                }
            })
    }

    /// `while`/`until`.
    fn run_loop(
        &mut self,
        condition: &posh_syntax::syntax::CommandList,
        body: &posh_syntax::syntax::CommandList,
        redirs: &[Redirection],
        until: bool,
    ) -> ExecResult {
        self.run_in_frame(FrameKind::Loop, redirs, |rt| {
                let mut status = rt.stack.top().last_exit_status;
                loop {
                    rt.stack.enter_tested_context();
                    let cond_result = rt.run_command_list(condition);
                    rt.stack.exit_tested_context();
                    if !cond_result.is_normal() {
                        return cond_result;
                    }
                    let keep_going = (cond_result.exit_status == 0) != until;
                    if !keep_going {
                        return ExecResult::normal(status);
                    }
                    let body_result = rt.run_command_list(body);
                    status = body_result.exit_status;
                    match rt.absorb_loop_flow(body_result) {
                        LoopStep::Continue => continue,
                        LoopStep::Stop(result) => return result,
                    }
                }
            })
    }

    /// `for var in words; do ...; done` (or, with `words == None`, over the
    /// positional parameters).
    fn run_for(
        &mut self,
        var: &str,
        words: Option<&[Word]>,
        body: &posh_syntax::syntax::CommandList,
        redirs: &[Redirection],
    ) -> ExecResult {
        self.run_in_frame(FrameKind::Loop, redirs, |rt| {
                let items: Vec<String> = match words {
                    Some(ws) => match rt.expand_words(ws) {
                        Ok(items) => items,
                        Err(_) => return ExecResult::normal(1),
                    },
                    None => rt
                    .stack
                    .top()
                    .resources
                    .positional
                    .borrow()
                    .all()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                };
                let mut status = rt.stack.top().last_exit_status;
                for item in items {
                    let assign_result = rt
                    .stack
                    .top()
                    .resources
                    .variables
                    .borrow_mut()
                    .assign(var.to_string(), item);
                    if assign_result.is_err() {
                        return ExecResult::normal(1);
                    }
                    let body_result = rt.run_command_list(body);
                    status = body_result.exit_status;
                    match rt.absorb_loop_flow(body_result) {
                        LoopStep::Continue => continue,
                        LoopStep::Stop(result) => return result,
                    }
                }
                ExecResult::normal(status)
            })
    }

    /// Interprets one loop iteration's result against `break`/`continue`
    /// depth. A depth greater than the number of enclosing loops stops all
    /// of them and resets `$?` to 0 (spec §8), rather than re-raising past
    /// the outermost one.
    fn absorb_loop_flow(&self, result: ExecResult) -> LoopStep {
        match result.flow {
            ControlFlow::Normal => LoopStep::Continue,
            ControlFlow::Break => {
                if result.flow_depth <= 1 {
                    LoopStep::Stop(ExecResult::normal(result.exit_status))
                } else if self.stack.has_enclosing_loop() {
                    LoopStep::Stop(ExecResult {
                            exit_status: result.exit_status,
                            flow: ControlFlow::Break,
                            flow_depth: result.flow_depth - 1,
                        })
                } else {
                    LoopStep::Stop(ExecResult::normal(0))
                }
            }
            ControlFlow::Continue => {
                if result.flow_depth <= 1 {
                    LoopStep::Continue
                } else if self.stack.has_enclosing_loop() {
                    LoopStep::Stop(ExecResult {
                            exit_status: result.exit_status,
                            flow: ControlFlow::Continue,
                            flow_depth: result.flow_depth - 1,
                        })
                } else {
                    LoopStep::Stop(ExecResult::normal(0))
                }
            }
            ControlFlow::Return | ControlFlow::Exit => LoopStep::Stop(result),
        }
    }

    /// `case word in pattern) body ;; ...`.
    fn run_case(&mut self, word: &Word, items: &[CaseItem], redirs: &[Redirection]) -> ExecResult {
        self.with_redirs(redirs, |rt| {
            let head = match rt.expand_word_single(word) {
                Ok(head) => head,
                Err(_) => return ExecResult::normal(1),
            };
            let mut index = 0;
            let mut fallthrough = false;
            while index < items.len() {
                let item = &items[index];
                let matched = if fallthrough {
                    true
                } else {
                    let mut any = false;
                    for pattern_word in &item.patterns {
                        let pattern = match rt.expand_word_pattern(pattern_word) {
                            Ok(p) => p,
                            Err(_) => return ExecResult::normal(1),
                        };
                        if pattern::full_match(&head, &pattern) {
                            any = true;
                            break;
                        }
                    }
                    any
                };
                if !matched {
                    fallthrough = false;
                    index += 1;
                    continue;
                }
                let result = rt.run_command_list(&item.body);
                if !result.is_normal() {
                    return result;
                }
                match item.action {
                    CaseAction::Break => return result,
                    CaseAction::FallThrough => {
                        fallthrough = true;
                        index += 1;
                    }
                }
            }
            ExecResult::normal(rt.stack.top().last_exit_status)
        })
    }
}

enum LoopStep {
    Continue,
    Stop(ExecResult),
}
