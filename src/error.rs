//! Error taxonomy for the rewrite engine.

use std::fmt;

use thiserror::Error;

use crate::range::Range;

impl fmt::Display for Range {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}, {})", self.begin, self.end)
  }
}

/// Errors surfaced by a public [`crate::rewriter::TreeRewriter`] edit call.
///
/// Every variant but [`RewriteError::RangeOutOfBounds`] corresponds to one of
/// the four conflict kinds a [`crate::policy::PolicyEnforcer`] may escalate
/// to `raise`. On any of these, the tree is left exactly as it was before the
/// call that triggered the error.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RewriteError {
  #[error("range {range} is outside the buffer's range {buffer}")]
  RangeOutOfBounds { range: Range, buffer: Range },

  #[error("range {range} already has replacement {other_replacement:?}, new replacement is {replacement:?}")]
  DifferentReplacements {
    range:             Range,
    replacement:       String,
    other_replacement: String,
  },

  #[error("deletion at {range} crosses deletion at {conflict}")]
  CrossingDeletions { range: Range, conflict: Range },

  #[error("insertion at {range} crosses action at {conflict}")]
  CrossingInsertions { range: Range, conflict: Range },

  #[error("replacement at {range} swallows insertions at {conflict:?}")]
  SwallowedInsertions { range: Range, conflict: Vec<Range> },
}

pub type Result<T> = std::result::Result<T, RewriteError>;
