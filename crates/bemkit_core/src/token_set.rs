use indexmap::IndexSet;

use crate::descriptor::Descriptor;

/// Insertion-ordered set of class-name tokens driven by descriptors.
///
/// Mutations flatten the descriptor and apply per token. Queries differ in
/// how they treat the disabled pairs a descriptor can carry, see each method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
  tokens: IndexSet<String>,
}

impl TokenSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts every enabled token. Disabled pairs are ignored. Re-inserting
  /// an existing token keeps its original position.
  pub fn add(&mut self, descriptor: &Descriptor) {
    descriptor.for_each_enabled(|token| {
      self.tokens.insert(token.to_string());
    });
  }

  /// Removes every enabled token, preserving the order of the rest.
  pub fn remove(&mut self, descriptor: &Descriptor) {
    descriptor.for_each_enabled(|token| {
      self.tokens.shift_remove(token);
    });
  }

  /// Flips membership of every flattened token, disabled pairs included.
  /// A present token leaves, an absent one joins at the end.
  pub fn toggle(&mut self, descriptor: &Descriptor) {
    descriptor.for_each_all(|_, token| {
      if !self.tokens.shift_remove(token) {
        self.tokens.insert(token.to_string());
      }
    });
  }

  /// True when every enabled token is present. Disabled pairs do not
  /// constrain anything, so `add` followed by `valid` always holds.
  pub fn valid(&self, descriptor: &Descriptor) -> bool {
    descriptor.all_satisfy(|enabled, token| !enabled || self.tokens.contains(token))
  }

  /// True when membership mirrors the flags exactly: enabled tokens are
  /// present and disabled ones are absent.
  pub fn same(&self, descriptor: &Descriptor) -> bool {
    descriptor.all_satisfy(|enabled, token| enabled == self.tokens.contains(token))
  }

  /// Strict form of [`valid`](Self::valid): every pair must be enabled and
  /// present. A single disabled pair fails the whole check.
  pub fn in_effect(&self, descriptor: &Descriptor) -> bool {
    descriptor.all_satisfy(|enabled, token| enabled && self.tokens.contains(token))
  }

  pub fn contains(&self, token: &str) -> bool {
    self.tokens.contains(token)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.tokens.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.tokens.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  pub fn clear(&mut self) {
    self.tokens.clear();
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::desc;

  fn collect(set: &TokenSet) -> Vec<&str> {
    set.iter().collect()
  }

  #[test]
  fn add_inserts_only_enabled_tokens() {
    let mut set = TokenSet::new();
    set.add(&desc! { "a" => true, "b" => false });
    set.add(&desc!("c"));
    assert_eq!(collect(&set), vec!["a", "c"]);
  }

  #[test]
  fn add_keeps_first_insertion_order() {
    let mut set = TokenSet::new();
    set.add(&desc!["a", "b"]);
    set.add(&desc!["b", "c", "a"]);
    assert_eq!(collect(&set), vec!["a", "b", "c"]);
  }

  #[test]
  fn remove_drops_enabled_tokens_and_keeps_order() {
    let mut set = TokenSet::new();
    set.add(&desc!["a", "b", "c"]);
    set.remove(&desc! { "b" => true, "c" => false });
    assert_eq!(collect(&set), vec!["a", "c"]);
  }

  #[test]
  fn toggle_flips_membership_regardless_of_flags() {
    let mut set = TokenSet::new();
    set.add(&desc!("a"));
    set.toggle(&desc! { "a" => false, "b" => false });
    assert_eq!(collect(&set), vec!["b"]);
    set.toggle(&desc! { "a" => true, "b" => true });
    assert_eq!(collect(&set), vec!["a"]);
  }

  #[test]
  fn valid_holds_after_add_even_with_disabled_pairs() {
    let mut set = TokenSet::new();
    let descriptor = desc! { "a" => true, "b" => false };
    set.add(&descriptor);
    assert!(set.valid(&descriptor));
  }

  #[test]
  fn valid_fails_when_an_enabled_token_is_missing() {
    let mut set = TokenSet::new();
    set.add(&desc!("a"));
    assert!(!set.valid(&desc!["a", "b"]));
  }

  #[test]
  fn valid_is_vacuously_true_for_empty_descriptors() {
    let set = TokenSet::new();
    assert!(set.valid(&Descriptor::Empty));
    assert!(set.valid(&desc! { "anything" => false }));
  }

  #[test]
  fn same_requires_membership_to_mirror_the_flags() {
    let mut set = TokenSet::new();
    set.add(&desc!("a"));
    assert!(set.same(&desc! { "a" => true, "b" => false }));
    assert!(!set.same(&desc! { "a" => false }));
    assert!(!set.same(&desc! { "b" => true }));
  }

  #[test]
  fn in_effect_rejects_any_disabled_pair() {
    let mut set = TokenSet::new();
    set.add(&desc!["a", "b"]);
    assert!(set.in_effect(&desc!["a", "b"]));
    assert!(!set.in_effect(&desc! { "a" => true, "b" => false }));
    assert!(!set.in_effect(&desc!["a", "missing"]));
  }

  #[test]
  fn clear_empties_the_set() {
    let mut set = TokenSet::new();
    set.add(&desc!["a", "b"]);
    set.clear();
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);
  }
}
