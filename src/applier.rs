//! Splices a flattened list of `(range, text)` patches into the original
//! source text.

use crate::range::Range;

/// Apply `replacements` (as produced by [`crate::action::Action::ordered_replacements`])
/// to `source`, producing the rewritten text.
///
/// `replacements` must be sorted by ascending `range.begin` and must not
/// overlap; both hold by construction for anything flattened out of a valid
/// Action Tree. Ranges are byte offsets and are expected to fall on UTF-8
/// character boundaries, same as the ranges a caller fed into the rewriter.
pub fn apply(source: &str, replacements: &[(Range, String)]) -> String {
  let mut out = String::with_capacity(source.len());
  let mut cursor = 0usize;

  for (range, text) in replacements {
    out.push_str(&source[cursor..range.begin]);
    out.push_str(text);
    cursor = range.end;
  }

  out.push_str(&source[cursor..]);
  out
}
