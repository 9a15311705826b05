//! Conflict policy: what to do when two edits disagree.
//!
//! The combine algorithm in [`crate::action`] can hit four distinct conflict
//! conditions while merging a new leaf action into the tree. Each is reported
//! to a caller-supplied [`PolicyEnforcer`], which decides whether to let it
//! pass silently, warn and proceed, or abort the edit with an error.

use serde::{Deserialize, Serialize};

use crate::error::RewriteError;
use crate::range::Range;

/// The four conflict conditions the combine algorithm can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
  DifferentReplacements,
  CrossingDeletions,
  CrossingInsertions,
  SwallowedInsertions,
}

/// The diagnostic payload handed to the enforcer for one conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictPayload {
  DifferentReplacements {
    range:             Range,
    replacement:       String,
    other_replacement: String,
  },
  CrossingDeletions {
    range:    Range,
    conflict: Range,
  },
  CrossingInsertions {
    range:    Range,
    conflict: Range,
  },
  SwallowedInsertions {
    range:    Range,
    conflict: Vec<Range>,
  },
}

impl ConflictPayload {
  pub fn kind(&self) -> ConflictKind {
    match self {
      Self::DifferentReplacements { .. } => ConflictKind::DifferentReplacements,
      Self::CrossingDeletions { .. } => ConflictKind::CrossingDeletions,
      Self::CrossingInsertions { .. } => ConflictKind::CrossingInsertions,
      Self::SwallowedInsertions { .. } => ConflictKind::SwallowedInsertions,
    }
  }

  fn into_error(self) -> RewriteError {
    match self {
      Self::DifferentReplacements {
        range,
        replacement,
        other_replacement,
      } => RewriteError::DifferentReplacements {
        range,
        replacement,
        other_replacement,
      },
      Self::CrossingDeletions { range, conflict } => {
        RewriteError::CrossingDeletions { range, conflict }
      },
      Self::CrossingInsertions { range, conflict } => {
        RewriteError::CrossingInsertions { range, conflict }
      },
      Self::SwallowedInsertions { range, conflict } => {
        RewriteError::SwallowedInsertions { range, conflict }
      },
    }
  }
}

/// How a single conflict kind should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
  /// Proceed silently.
  Accept,
  /// Proceed, emitting a diagnostic.
  Warn,
  /// Abort the edit call with a [`RewriteError`].
  Raise,
}

/// Per-kind conflict policy, deserializable from a caller's config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PolicyConfig {
  #[serde(default = "Policy::default_accept")]
  pub crossing_deletions: Policy,
  #[serde(default = "Policy::default_raise")]
  pub crossing_insertions: Policy,
  #[serde(default = "Policy::default_raise")]
  pub different_replacements: Policy,
  #[serde(default = "Policy::default_raise")]
  pub swallowed_insertions: Policy,
}

impl Policy {
  fn default_accept() -> Self {
    Self::Accept
  }

  fn default_raise() -> Self {
    Self::Raise
  }
}

impl Default for PolicyConfig {
  fn default() -> Self {
    Self {
      crossing_deletions:     Policy::Accept,
      crossing_insertions:    Policy::Raise,
      different_replacements: Policy::Raise,
      swallowed_insertions:   Policy::Raise,
    }
  }
}

impl PolicyConfig {
  fn policy_for(&self, kind: ConflictKind) -> Policy {
    match kind {
      ConflictKind::CrossingDeletions => self.crossing_deletions,
      ConflictKind::CrossingInsertions => self.crossing_insertions,
      ConflictKind::DifferentReplacements => self.different_replacements,
      ConflictKind::SwallowedInsertions => self.swallowed_insertions,
    }
  }
}

/// Consulted by the combine algorithm on every conflict.
///
/// The default implementation for [`PolicyConfig`] below covers the common
/// case of a static per-kind policy; callers that want a dynamic sink (to
/// collect warnings into a UI panel, say) can implement this trait directly.
pub trait PolicyEnforcer {
  fn policy_for(&self, kind: ConflictKind) -> Policy;

  /// Called when the policy for `kind` is [`Policy::Warn`]. The default
  /// routes the message through `tracing`.
  fn warn(&self, payload: &ConflictPayload) {
    tracing::warn!(kind = ?payload.kind(), ?payload, "rewrite conflict");
  }
}

impl PolicyEnforcer for PolicyConfig {
  fn policy_for(&self, kind: ConflictKind) -> Policy {
    PolicyConfig::policy_for(self, kind)
  }
}

/// Consult `enforcer` about `payload`, producing `Ok(())` if the edit should
/// proceed or `Err` if it must abort.
pub fn enforce(
  enforcer: &dyn PolicyEnforcer,
  payload: ConflictPayload,
) -> Result<(), RewriteError> {
  match enforcer.policy_for(payload.kind()) {
    Policy::Accept => {
      tracing::trace!(kind = ?payload.kind(), "rewrite conflict accepted");
      Ok(())
    },
    Policy::Warn => {
      enforcer.warn(&payload);
      Ok(())
    },
    Policy::Raise => Err(payload.into_error()),
  }
}
