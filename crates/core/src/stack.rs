//! Conditional-state stack for block directives.
//!
//! One frame per open `IFDEF`, innermost on top. The stack is a plain value:
//! the rewriter threads it through a structure and inspects what comes back,
//! so nothing survives between runs.

use crate::ast::Loc;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    /// Outcome of the `IFDEF` test, flipped by `ELSE`.
    condition: bool,
    opened_at: Loc,
}

/// What to do with blocks still open at the end of a structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnterminatedPolicy {
    /// Report the innermost open `IFDEF` as [`Error::UnterminatedBlock`].
    #[default]
    Error,
    /// Leave the remainder of the structure governed by the open block.
    Allow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CondStack {
    frames: Vec<Frame>,
}

impl CondStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// An item is live when no block is open or the innermost condition
    /// holds. Enclosing blocks are not consulted.
    pub fn is_live(&self) -> bool {
        self.frames.last().map_or(true, |frame| frame.condition)
    }

    /// `IFDEF`: open a block whose condition is `defined`.
    pub fn push(&mut self, defined: bool, loc: &Loc) {
        self.frames.push(Frame {
            condition: defined,
            opened_at: loc.clone(),
        });
    }

    /// `ELSE`: flip the innermost condition.
    pub fn negate_top(&mut self, loc: &Loc) -> Result<()> {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.condition = !frame.condition;
                Ok(())
            }
            None => Err(Error::UnmatchedDirective {
                loc: loc.clone(),
                directive: "ELSE".into(),
            }),
        }
    }

    /// `END`: close the innermost block.
    pub fn pop(&mut self, loc: &Loc) -> Result<()> {
        match self.frames.pop() {
            Some(_) => Ok(()),
            None => Err(Error::UnmatchedDirective {
                loc: loc.clone(),
                directive: "END".into(),
            }),
        }
    }

    /// Check the stack at the end of a structure.
    pub fn finish(self, policy: UnterminatedPolicy) -> Result<()> {
        match (self.frames.last(), policy) {
            (Some(frame), UnterminatedPolicy::Error) => Err(Error::UnterminatedBlock {
                loc: frame.opened_at.clone(),
                depth: self.frames.len(),
            }),
            _ => Ok(()),
        }
    }
}
