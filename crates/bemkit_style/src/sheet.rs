use itertools::Itertools;
use thiserror::Error;

use crate::tree::StyleTree;

#[derive(Debug, Error)]
pub enum SheetError {
  #[error("Cannot insert a rule with an empty selector")]
  EmptySelector,
  #[error("Cannot insert a declaration with an empty property under {selector:?}")]
  EmptyProperty { selector: String },
}

/// One `property: value` pair with its priority split out of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
  pub property: String,
  pub value: String,
  pub important: bool,
}

impl Declaration {
  pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
    Declaration {
      property: property.into(),
      value: value.into(),
      important: false,
    }
  }

  /// Splits a raw value ending in `!important` into the bare value and the
  /// priority flag. Anything else is kept verbatim.
  pub fn parse(property: impl Into<String>, raw_value: &str) -> Self {
    match raw_value.trim_end().strip_suffix("!important") {
      Some(bare) => Declaration {
        property: property.into(),
        value: bare.trim().to_string(),
        important: true,
      },
      None => Declaration {
        property: property.into(),
        value: raw_value.to_string(),
        important: false,
      },
    }
  }

  fn text(&self) -> String {
    if self.important {
      format!("{}: {} !important;", self.property, self.value)
    } else {
      format!("{}: {};", self.property, self.value)
    }
  }
}

/// Opaque identifier for an inserted rule. Ids are allocated from a
/// monotonically increasing counter and never reused, so deleting one rule
/// cannot invalidate another rule's handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleHandle(u64);

impl RuleHandle {
  /// Builds a handle from a raw id. For sinks that allocate their own ids;
  /// a handle passed back to a sink must have come from that sink.
  pub fn from_raw(id: u64) -> Self {
    RuleHandle(id)
  }

  pub fn as_raw(&self) -> u64 {
    self.0
  }
}

/// Destination for flattened style rules.
///
/// [`MemorySheet`] is the in-process implementation; a sink backed by a real
/// stylesheet would implement the same contract.
#[mockall::automock]
pub trait RuleSink {
  /// Inserts one rule, optionally wrapped in an at-rule prelude.
  fn insert_rule<'a>(
    &mut self,
    selector: &str,
    declarations: Vec<Declaration>,
    prelude: Option<&'a str>,
  ) -> Result<RuleHandle, SheetError>;

  /// Deletes a previously inserted rule. Returns false for unknown handles.
  fn delete_rule(&mut self, handle: RuleHandle) -> bool;

  /// Drops every rule in the sink.
  fn delete_all(&mut self);

  /// Serialized form of the live rules, one per line in insertion order.
  fn rule_text(&self) -> String;
}

#[derive(Debug)]
struct Rule {
  handle: RuleHandle,
  selector: String,
  declarations: Vec<Declaration>,
  prelude: Option<String>,
}

impl Rule {
  fn text(&self) -> String {
    let body = self.declarations.iter().map(Declaration::text).join(" ");
    let rule = if body.is_empty() {
      format!("{} {{ }}", self.selector)
    } else {
      format!("{} {{ {} }}", self.selector, body)
    };
    match &self.prelude {
      Some(prelude) => format!("{prelude} {{ {rule} }}"),
      None => rule,
    }
  }
}

/// Ordered in-process rule sink.
#[derive(Debug, Default)]
pub struct MemorySheet {
  rules: Vec<Rule>,
  next_handle: u64,
}

impl MemorySheet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn rule_count(&self) -> usize {
    self.rules.len()
  }
}

impl RuleSink for MemorySheet {
  fn insert_rule(
    &mut self,
    selector: &str,
    declarations: Vec<Declaration>,
    prelude: Option<&str>,
  ) -> Result<RuleHandle, SheetError> {
    if selector.trim().is_empty() {
      return Err(SheetError::EmptySelector);
    }
    if declarations
      .iter()
      .any(|declaration| declaration.property.trim().is_empty())
    {
      return Err(SheetError::EmptyProperty {
        selector: selector.to_string(),
      });
    }
    let handle = RuleHandle(self.next_handle);
    self.next_handle += 1;
    self.rules.push(Rule {
      handle,
      selector: selector.to_string(),
      declarations,
      prelude: prelude.map(str::to_string),
    });
    Ok(handle)
  }

  fn delete_rule(&mut self, handle: RuleHandle) -> bool {
    let before = self.rules.len();
    self.rules.retain(|rule| rule.handle != handle);
    self.rules.len() != before
  }

  fn delete_all(&mut self) {
    self.rules.clear();
  }

  fn rule_text(&self) -> String {
    let mut text = String::new();
    for rule in &self.rules {
      text.push_str(&rule.text());
      text.push('\n');
    }
    text
  }
}

/// Inserts every rule of `tree` into `sink` in tree order and returns the
/// allocated handles. The first failure aborts the walk; rules inserted
/// before it stay in the sink.
pub fn insert_tree(
  sink: &mut dyn RuleSink,
  tree: &StyleTree,
) -> Result<Vec<RuleHandle>, SheetError> {
  let mut handles = Vec::new();
  for (prelude, selectors) in tree.iter() {
    let prelude = (!prelude.is_empty()).then_some(prelude);
    for (selector, declarations) in selectors {
      let declarations = declarations
        .iter()
        .map(|(property, raw_value)| Declaration::parse(property.clone(), raw_value))
        .collect();
      handles.push(sink.insert_rule(selector, declarations, prelude)?);
    }
  }
  Ok(handles)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::style;

  #[test]
  fn parse_splits_the_important_suffix() {
    let declaration = Declaration::parse("color", "red !important");
    assert_eq!(declaration.value, "red");
    assert!(declaration.important);
  }

  #[test]
  fn parse_keeps_plain_values_verbatim() {
    let declaration = Declaration::parse("color", "red");
    assert_eq!(declaration.value, "red");
    assert!(!declaration.important);

    let spaced = Declaration::parse("content", "\" !important \"");
    assert!(!spaced.important);
  }

  #[test]
  fn parse_tolerates_trailing_whitespace_after_the_suffix() {
    let declaration = Declaration::parse("color", "red !important  ");
    assert_eq!(declaration.value, "red");
    assert!(declaration.important);
  }

  #[test]
  fn inserted_rules_serialize_one_per_line() {
    let mut sheet = MemorySheet::new();
    sheet
      .insert_rule(
        ".box",
        vec![
          Declaration::new("color", "red"),
          Declaration::parse("border", "none !important"),
        ],
        None,
      )
      .expect("insert");
    sheet
      .insert_rule(
        ".box",
        vec![Declaration::new("color", "green")],
        Some("@media print"),
      )
      .expect("insert");
    assert_eq!(
      sheet.rule_text(),
      ".box { color: red; border: none !important; }\n\
       @media print { .box { color: green; } }\n",
    );
  }

  #[test]
  fn empty_selector_is_rejected() {
    let mut sheet = MemorySheet::new();
    let error = sheet
      .insert_rule("  ", vec![Declaration::new("color", "red")], None)
      .expect_err("blank selector");
    assert!(matches!(error, SheetError::EmptySelector));
  }

  #[test]
  fn empty_property_is_rejected() {
    let mut sheet = MemorySheet::new();
    let error = sheet
      .insert_rule(".box", vec![Declaration::new("", "red")], None)
      .expect_err("blank property");
    assert!(matches!(error, SheetError::EmptyProperty { .. }));
  }

  #[test]
  fn delete_rule_removes_exactly_one_rule() {
    let mut sheet = MemorySheet::new();
    let first = sheet
      .insert_rule(".a", vec![Declaration::new("color", "red")], None)
      .expect("insert");
    let second = sheet
      .insert_rule(".b", vec![Declaration::new("color", "blue")], None)
      .expect("insert");
    assert!(sheet.delete_rule(first));
    assert!(!sheet.delete_rule(first));
    assert_eq!(sheet.rule_count(), 1);
    assert!(sheet.delete_rule(second));
    assert_eq!(sheet.rule_count(), 0);
  }

  #[test]
  fn handles_stay_valid_across_deletions() {
    let mut sheet = MemorySheet::new();
    let first = sheet
      .insert_rule(".a", vec![Declaration::new("color", "red")], None)
      .expect("insert");
    let middle = sheet
      .insert_rule(".b", vec![Declaration::new("color", "blue")], None)
      .expect("insert");
    let last = sheet
      .insert_rule(".c", vec![Declaration::new("color", "green")], None)
      .expect("insert");
    assert!(sheet.delete_rule(middle));
    assert!(sheet.delete_rule(last));
    assert!(sheet.delete_rule(first));
    assert!(sheet.rule_text().is_empty());
  }

  #[test]
  fn insert_tree_walks_groups_in_order() {
    let tree = StyleTree::build(
      &style! {
        "color": "red !important",
        "&:hover": { "color": "blue" },
        "@media print": { "color": "black" },
      },
      ".box",
    );
    let mut sheet = MemorySheet::new();
    let handles = insert_tree(&mut sheet, &tree).expect("insert");
    assert_eq!(handles.len(), 3);
    assert_eq!(
      sheet.rule_text(),
      ".box { color: red !important; }\n\
       .box:hover { color: blue; }\n\
       @media print { .box { color: black; } }\n",
    );
  }

  #[test]
  fn insert_tree_propagates_sink_failures() {
    let tree = StyleTree::build(&style! { "color": "red" }, ".box");
    let mut sink = MockRuleSink::new();
    sink
      .expect_insert_rule()
      .times(1)
      .returning(|_, _, _| Err(SheetError::EmptySelector));
    let error = insert_tree(&mut sink, &tree).expect_err("sink failure");
    assert!(matches!(error, SheetError::EmptySelector));
  }

  #[test]
  fn insert_tree_stops_at_the_first_failure() {
    let tree = StyleTree::build(
      &style! {
        "color": "red",
        "&:hover": { "color": "blue" },
      },
      ".box",
    );
    let mut sink = MockRuleSink::new();
    let mut calls = 0;
    sink.expect_insert_rule().times(2).returning(move |_, _, _| {
      calls += 1;
      if calls == 1 {
        Ok(RuleHandle(0))
      } else {
        Err(SheetError::EmptySelector)
      }
    });
    assert!(insert_tree(&mut sink, &tree).is_err());
  }
}
