//! The Action Tree: the combine/merge/flatten algorithm at the heart of the
//! rewrite engine.
//!
//! An [`Action`] is an immutable node describing what happens at one
//! [`Range`] of the buffer: text inserted before it, a whole-range
//! replacement, text inserted after it, and a sorted, pairwise-disjoint list
//! of children strictly contained within it. Edits accumulate by repeatedly
//! *combining* a fresh leaf action into the tree's root; `combine` never
//! mutates in place, it returns a new tree sharing whatever subtrees did not
//! need to change.

use crate::error::{RewriteError, Result};
use crate::policy::{enforce, ConflictPayload, PolicyEnforcer};
use crate::range::Range;

/// One node of the rewrite tree.
///
/// See the module docs for the invariants `combine` preserves: children are
/// strictly contained by their parent, siblings are pairwise disjoint and
/// sorted by `range.begin`, and a node with a `replacement` has no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
  pub range:         Range,
  pub insert_before: String,
  pub replacement:   Option<String>,
  pub insert_after:  String,
  pub children:      Vec<Action>,
}

impl Action {
  pub(crate) fn root(range: Range) -> Self {
    Self {
      range,
      insert_before: String::new(),
      replacement: None,
      insert_after: String::new(),
      children: Vec::new(),
    }
  }

  pub(crate) fn new_insert_before(range: Range, text: String) -> Self {
    Self { insert_before: text, ..Self::root(range) }
  }

  pub(crate) fn new_insert_after(range: Range, text: String) -> Self {
    Self { insert_after: text, ..Self::root(range) }
  }

  pub(crate) fn new_replacement(range: Range, text: String) -> Self {
    Self { replacement: Some(text), ..Self::root(range) }
  }

  /// Whether this node contributes nothing at all: no insertions, no
  /// replacement, no children. Combining such a leaf into a tree is a no-op.
  fn is_empty(&self) -> bool {
    let replacement_is_empty = match &self.replacement {
      None => true,
      // An empty-string replacement over a non-empty range is a real
      // deletion; only over an already-empty range is it a true no-op.
      Some(r) => r.is_empty() && self.range.is_empty(),
    };
    self.insert_before.is_empty() && self.insert_after.is_empty() && replacement_is_empty && self.children.is_empty()
  }

  /// Whether this single node carries insertable content (as opposed to a
  /// pure deletion or a structural container with no content of its own).
  /// An explicit empty-string replacement (from `remove`/`replace(.., "")`)
  /// does not count.
  fn is_insertion(&self) -> bool {
    !self.insert_before.is_empty()
      || !self.insert_after.is_empty()
      || self.replacement.as_deref().is_some_and(|r| !r.is_empty())
  }

  /// Whether this node or anything beneath it carries insertable content.
  /// Used to decide whether discarding a subtree needs the caller's say-so.
  fn contains_insertion(&self) -> bool {
    self.is_insertion() || self.children.iter().any(Action::contains_insertion)
  }

  /// Fold a fresh leaf `action` into `self`, consulting `enforcer` on any
  /// conflict. Returns the new tree; `self` is left untouched, so callers
  /// can discard the result on error and keep the tree in its prior state.
  pub fn combine(&self, action: Action, enforcer: &dyn PolicyEnforcer) -> Result<Action> {
    if action.is_empty() {
      return Ok(self.clone());
    }
    if action.range == self.range {
      self.merge(action, enforcer)
    } else {
      self.place_in_hierarchy(action, enforcer)
    }
  }

  fn merge(&self, action: Action, enforcer: &dyn PolicyEnforcer) -> Result<Action> {
    debug_assert_eq!(self.range, action.range);

    let replacement = match (&self.replacement, &action.replacement) {
      (Some(old), Some(new)) if old != new => {
        enforce(enforcer, ConflictPayload::DifferentReplacements {
          range:             self.range,
          replacement:       new.clone(),
          other_replacement: old.clone(),
        })?;
        Some(new.clone())
      },
      (_, Some(new)) => Some(new.clone()),
      (old, None) => old.clone(),
    };

    // The new edit wraps outside whatever was already inserted.
    let insert_before = format!("{}{}", action.insert_before, self.insert_before);
    let insert_after = format!("{}{}", self.insert_after, action.insert_after);

    let children = if replacement.is_some() {
      let swallowed: Vec<Range> = self
        .children
        .iter()
        .filter(|c| c.contains_insertion())
        .map(|c| c.range)
        .collect();
      if !swallowed.is_empty() {
        enforce(enforcer, ConflictPayload::SwallowedInsertions { range: self.range, conflict: swallowed })?;
      }
      Vec::new()
    } else {
      let mut base = Action { children: self.children.clone(), ..Action::root(self.range) };
      for grandchild in action.children {
        base = base.combine(grandchild, enforcer)?;
      }
      base.children
    };

    Ok(Action { range: self.range, insert_before, replacement, insert_after, children })
  }

  fn place_in_hierarchy(&self, action: Action, enforcer: &dyn PolicyEnforcer) -> Result<Action> {
    let children = &self.children;

    let left = children.partition_point(|c| c.range.end <= action.range.begin);
    let right_raw = children.partition_point(|c| c.range.begin < action.range.end);
    // An empty child coinciding exactly with an empty action range is
    // counted as left-disjoint by the left probe and right-disjoint by the
    // right probe; recognise it as the same node instead of two siblings.
    let (left, right) = if left > right_raw {
      debug_assert_eq!(left, right_raw + 1);
      (right_raw, right_raw + 1)
    } else {
      (left, right_raw)
    };

    if left == right {
      let mut children = self.children.clone();
      children.insert(left, action);
      return Ok(Action { children, ..self.shell() });
    }

    if right - left == 1 {
      let sibling = &children[left];
      if sibling.range == action.range || sibling.range.contains(action.range) {
        let combined = sibling.combine(action, enforcer)?;
        let mut children = self.children.clone();
        children[left] = combined;
        return Ok(Action { children, ..self.shell() });
      }
    }

    if children[left..right].iter().all(|c| action.range.contains(c.range)) {
      let mut children = self.children.clone();
      let absorbed: Vec<Action> = children.splice(left..right, std::iter::empty()).collect();
      let mut wrapped = Action {
        range:         action.range,
        insert_before: action.insert_before,
        replacement:   action.replacement,
        insert_after:  action.insert_after,
        children:      absorbed,
      };
      for original_child in action.children {
        wrapped = wrapped.combine(original_child, enforcer)?;
      }
      children.insert(left, wrapped);
      return Ok(Action { children, ..self.shell() });
    }

    let mut children = self.children.clone();
    let overlapping: Vec<Action> = children.splice(left..right, std::iter::empty()).collect();

    let crosses_insertion = action.contains_insertion() || overlapping.iter().any(Action::contains_insertion);
    for child in &overlapping {
      let payload = if crosses_insertion {
        ConflictPayload::CrossingInsertions { range: action.range, conflict: child.range }
      } else {
        ConflictPayload::CrossingDeletions { range: action.range, conflict: child.range }
      };
      enforce(enforcer, payload)?;
    }

    let mut fusing = overlapping;
    fusing.push(action);
    let fused = fuse(fusing);

    let reduced = Action { children, ..self.shell() };
    reduced.combine(fused, enforcer)
  }

  /// `self` with an empty `children` vector, used as a base for variants
  /// that only touch `children`.
  fn shell(&self) -> Action {
    Action {
      range:         self.range,
      insert_before: self.insert_before.clone(),
      replacement:   self.replacement.clone(),
      insert_after:  self.insert_after.clone(),
      children:      Vec::new(),
    }
  }

  /// Flatten the tree into the ordered `(range, text)` patches the applier
  /// needs, in ascending `range.begin` order.
  pub fn ordered_replacements(&self) -> Vec<(Range, String)> {
    let mut out = Vec::new();
    self.collect_replacements(&mut out);
    out
  }

  fn collect_replacements(&self, out: &mut Vec<(Range, String)>) {
    if !self.insert_before.is_empty() {
      out.push((self.range.begin_only(), self.insert_before.clone()));
    }

    if let Some(replacement) = &self.replacement {
      out.push((self.range, replacement.clone()));
    } else {
      for child in &self.children {
        child.collect_replacements(out);
      }
    }

    if !self.insert_after.is_empty() {
      out.push((self.range.end_only(), self.insert_after.clone()));
    }
  }
}

/// Join several colliding nodes (an incoming action plus the children it
/// crosses) into a single node spanning their union. Used for both
/// `crossing_deletions` (the common case, always yields a plain deletion)
/// and an accepted/warned `crossing_insertions` (rare: only reached when a
/// caller explicitly configures that policy away from the default `raise`).
/// Interior structure of the fused nodes cannot be preserved once their
/// boundaries cross, so children are dropped; callers are warned of any
/// lost insertions before `fuse` is ever invoked.
fn fuse(mut nodes: Vec<Action>) -> Action {
  debug_assert!(!nodes.is_empty());
  nodes.sort_by_key(|n| n.range.begin);

  let range = nodes
    .iter()
    .map(|n| n.range)
    .reduce(Range::join)
    .expect("fuse requires at least one node");

  let mut insert_before = String::new();
  let mut insert_after = String::new();
  let mut replacement = None;

  for node in nodes {
    insert_before.push_str(&node.insert_before);
    insert_after.push_str(&node.insert_after);
    if node.replacement.is_some() {
      replacement = node.replacement;
    }
  }

  Action { range, insert_before, replacement, insert_after, children: Vec::new() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::policy::PolicyConfig;

  fn enforcer() -> PolicyConfig {
    PolicyConfig::default()
  }

  #[test]
  fn combining_empty_leaf_is_noop() {
    let root = Action::root(Range::new(0, 3));
    let leaf = Action::new_insert_before(Range::new(0, 0), String::new());
    let combined = root.combine(leaf, &enforcer()).unwrap();
    assert_eq!(combined, root);
  }

  #[test]
  fn empty_replacement_over_empty_range_is_noop() {
    let root = Action::root(Range::new(0, 3));
    let leaf = Action::new_replacement(Range::point(1), String::new());
    let combined = root.combine(leaf, &enforcer()).unwrap();
    assert_eq!(combined, root);
  }

  #[test]
  fn empty_replacement_over_nonempty_range_is_a_real_deletion() {
    let root = Action::root(Range::new(0, 3));
    let leaf = Action::new_replacement(Range::new(0, 3), String::new());
    let combined = root.combine(leaf, &enforcer()).unwrap();
    assert_eq!(combined.replacement, Some(String::new()));
  }

  #[test]
  fn merge_wraps_new_insertions_outside_old() {
    let root = Action::root(Range::new(0, 3));
    let a = root.combine(Action::new_insert_before(Range::new(0, 3), "1".into()), &enforcer()).unwrap();
    let b = a.combine(Action::new_insert_before(Range::new(0, 3), "2".into()), &enforcer()).unwrap();
    assert_eq!(b.insert_before, "21");
  }

  #[test]
  fn sibling_insertion_becomes_child() {
    let root = Action::root(Range::new(0, 3));
    let combined = root
      .combine(Action::new_insert_before(Range::new(1, 1), "x".into()), &enforcer())
      .unwrap();
    assert_eq!(combined.children.len(), 1);
    assert_eq!(combined.children[0].range, Range::new(1, 1));
  }
}
