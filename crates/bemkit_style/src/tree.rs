use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

use crate::style::{Style, StyleValue};

/// Declarations of one flat rule, in author order.
pub type Declarations = IndexMap<String, String>;

/// Nested styles flattened to `prelude -> selector -> declarations`.
///
/// The empty prelude groups the rules outside any at-rule. Group and rule
/// order follow first contribution order, so serializing the tree reproduces
/// the author's cascade.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StyleTree {
  groups: IndexMap<String, IndexMap<String, Declarations>>,
}

impl StyleTree {
  /// Flattens `style` anchored at `selector`, with no surrounding at-rule.
  pub fn build(style: &Style, selector: &str) -> Self {
    let mut tree = StyleTree::default();
    tree.expand(style, selector, "");
    tree
  }

  /// One recursion step: collect this node's declarations under the current
  /// (prelude, selector), then descend into nested blocks in author order.
  fn expand(&mut self, style: &Style, selector: &str, prelude: &str) {
    let mut declarations = Declarations::default();
    for (key, value) in style.iter() {
      if let StyleValue::Decl(decl) = value {
        declarations.insert(key.to_string(), decl.clone());
      }
    }
    if !declarations.is_empty() {
      // Distinct keys accumulate across contributors to the same rule,
      // colliding keys are last-write-wins.
      self
        .groups
        .entry(prelude.to_string())
        .or_default()
        .entry(selector.to_string())
        .or_default()
        .extend(declarations);
    }

    for (key, value) in style.iter() {
      let StyleValue::Nested(nested) = value else {
        continue;
      };
      if key.starts_with('@') {
        // At-rules hoist to the top level. The prelude is replaced, not
        // composed, so the innermost at-rule wins for doubly nested ones.
        self.expand(nested, selector, key);
      } else {
        self.expand(nested, &combine_selectors(selector, key), prelude);
      }
    }
  }

  pub fn get(&self, prelude: &str, selector: &str) -> Option<&Declarations> {
    self.groups.get(prelude)?.get(selector)
  }

  /// Prelude groups in first-contribution order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, Declarations>)> {
    self
      .groups
      .iter()
      .map(|(prelude, selectors)| (prelude.as_str(), selectors))
  }

  pub fn is_empty(&self) -> bool {
    self.groups.is_empty()
  }
}

/// Combines the current selector with a nested block's key.
///
/// The current selector is split on `,`. A key containing `&` has every
/// occurrence replaced with each part in turn; any other key is treated as
/// comma-separated suffixes appended to each part with a descendant space.
/// Suffix fragments keep the author's spacing.
fn combine_selectors(selector: &str, key: &str) -> String {
  let parts = selector.split(',');
  if key.contains('&') {
    parts.map(|part| key.replace('&', part)).join(",")
  } else {
    parts
      .cartesian_product(key.split(','))
      .map(|(part, fragment)| format!("{part} {fragment}"))
      .join(",")
  }
}
