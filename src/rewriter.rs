//! The public edit API: [`TreeRewriter`] owns the buffer, the root
//! [`Action`], and the policy enforcer, and accumulates edit calls by
//! combining fresh leaves into the root.

use tracing::instrument;

use crate::action::Action;
use crate::applier;
use crate::buffer::SourceBuffer;
use crate::error::{RewriteError, Result};
use crate::policy::PolicyEnforcer;
use crate::range::Range;

/// Accumulates local edits over one source buffer into a conflict-checked
/// rewrite plan.
///
/// One `TreeRewriter` is owned by one logical caller (typically one AST
/// traversal). Every mutating call either swaps in a new root on success or
/// leaves the tree exactly as it was: the new root is always built
/// functionally from the old one before being stored, so an error never
/// leaves the tree half-updated.
pub struct TreeRewriter<B: SourceBuffer, E: PolicyEnforcer> {
  buffer:   B,
  root:     Action,
  enforcer: E,
}

impl<B: SourceBuffer, E: PolicyEnforcer> TreeRewriter<B, E> {
  pub fn new(buffer: B, enforcer: E) -> Self {
    let root = Action::root(buffer.full_range());
    Self { buffer, root, enforcer }
  }

  /// The original, unmodified buffer text.
  pub fn source(&self) -> &str {
    self.buffer.source_text()
  }

  /// The current root of the action tree, for introspection and tests.
  pub fn root(&self) -> &Action {
    &self.root
  }

  fn validate(&self, range: Range) -> Result<()> {
    let buffer = self.buffer.full_range();
    if range.within(buffer) {
      Ok(())
    } else {
      Err(RewriteError::RangeOutOfBounds { range, buffer })
    }
  }

  fn combine(&mut self, leaf: Action) -> Result<()> {
    self.root = self.root.combine(leaf, &self.enforcer)?;
    Ok(())
  }

  /// Prepend `text` immediately before `range.begin`.
  #[instrument(level = "debug", skip(self, text))]
  pub fn insert_before(&mut self, range: Range, text: impl Into<String>) -> Result<()> {
    self.validate(range)?;
    self.combine(Action::new_insert_before(range, text.into()))
  }

  /// Append `text` immediately after `range.end`.
  #[instrument(level = "debug", skip(self, text))]
  pub fn insert_after(&mut self, range: Range, text: impl Into<String>) -> Result<()> {
    self.validate(range)?;
    self.combine(Action::new_insert_after(range, text.into()))
  }

  /// Replace the whole of `range` with `text`.
  #[instrument(level = "debug", skip(self, text))]
  pub fn replace(&mut self, range: Range, text: impl Into<String>) -> Result<()> {
    self.validate(range)?;
    self.combine(Action::new_replacement(range, text.into()))
  }

  /// Delete `range` entirely. Equivalent to `replace(range, "")`.
  #[instrument(level = "debug", skip(self))]
  pub fn remove(&mut self, range: Range) -> Result<()> {
    self.replace(range, String::new())
  }

  /// Wrap `range` with `before` prepended and `after` appended, at the
  /// zero-length boundary ranges `range.begin_only()` / `range.end_only()`.
  #[instrument(level = "debug", skip(self, before, after))]
  pub fn wrap(&mut self, range: Range, before: impl Into<String>, after: impl Into<String>) -> Result<()> {
    self.insert_before(range.begin_only(), before)?;
    self.insert_after(range.end_only(), after)
  }

  /// Flatten the tree and splice it over the source buffer, producing the
  /// rewritten text. Pure: callable repeatedly, never fails.
  pub fn process(&self) -> String {
    let replacements = self.root.ordered_replacements();
    applier::apply(self.buffer.source_text(), &replacements)
  }
}
