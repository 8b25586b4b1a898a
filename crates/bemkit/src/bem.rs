use std::collections::BTreeMap;
use std::fmt;

use bemkit_core::{Descriptor, TokenSet};
use bemkit_style::{
  insert_tree, next_scope_class, RuleHandle, RuleSink, SheetError, Style, StyleTree,
};
use indexmap::IndexSet;
use itertools::Itertools;

use crate::options::BemOptions;

/// A named BEM entity.
///
/// Holds the block (and optional element) name, the modifier and class-name
/// token sets, an optional rendering map, and the handles of every style
/// rule the entity has registered. `Display` composes the full class-name
/// string; the descriptor-taking methods accept anything convertible to a
/// [`Descriptor`].
#[derive(Debug, Clone)]
pub struct Bem {
  block: String,
  element: Option<String>,
  options: BemOptions,
  modifiers: TokenSet,
  class_names: TokenSet,
  rendering_map: Option<BTreeMap<String, String>>,
  rule_handles: Vec<RuleHandle>,
}

impl Bem {
  pub fn new(block: impl Into<String>) -> Self {
    Self::with_options(block, BemOptions::default())
  }

  pub fn with_options(block: impl Into<String>, options: BemOptions) -> Self {
    let mut bem = Bem {
      block: String::new(),
      element: None,
      options,
      modifiers: TokenSet::new(),
      class_names: TokenSet::new(),
      rendering_map: None,
      rule_handles: Vec::new(),
    };
    bem.set_block(block);
    bem
  }

  /// Renames the block. A name already carrying the configured namespace is
  /// kept verbatim, anything else gets it prepended.
  pub fn set_block(&mut self, block: impl Into<String>) -> &mut Self {
    let block = block.into();
    self.block = if block.starts_with(&self.options.namespace) {
      block
    } else {
      format!("{}{}", self.options.namespace, block)
    };
    self
  }

  pub fn block(&self) -> &str {
    &self.block
  }

  pub fn element_name(&self) -> Option<&str> {
    self.element.as_deref()
  }

  pub fn options(&self) -> &BemOptions {
    &self.options
  }

  pub fn modifiers(&self) -> &TokenSet {
    &self.modifiers
  }

  pub fn class_names(&self) -> &TokenSet {
    &self.class_names
  }

  /// Handles of every rule this entity has registered, in insertion order.
  pub fn rule_handles(&self) -> &[RuleHandle] {
    &self.rule_handles
  }

  /// A fresh, fully independent entity for `block__element`. It inherits
  /// the options and nothing else; destroying either entity leaves the
  /// other's styles alone.
  pub fn element(&self, name: impl Into<String>) -> Bem {
    Bem {
      block: self.block.clone(),
      element: Some(name.into()),
      options: self.options.clone(),
      modifiers: TokenSet::new(),
      class_names: TokenSet::new(),
      rendering_map: None,
      rule_handles: Vec::new(),
    }
  }

  /// `block`, or `block__element` for element entities.
  pub fn base_name(&self) -> String {
    match &self.element {
      Some(element) => format!("{}{}{}", self.block, self.options.element_separator, element),
      None => self.block.clone(),
    }
  }

  pub fn add(&mut self, modifiers: impl Into<Descriptor>) -> &mut Self {
    self.modifiers.add(&modifiers.into());
    self
  }

  pub fn remove(&mut self, modifiers: impl Into<Descriptor>) -> &mut Self {
    self.modifiers.remove(&modifiers.into());
    self
  }

  pub fn toggle(&mut self, modifiers: impl Into<Descriptor>) -> &mut Self {
    self.modifiers.toggle(&modifiers.into());
    self
  }

  /// True when every enabled modifier of the descriptor is present.
  pub fn valid(&self, modifiers: impl Into<Descriptor>) -> bool {
    self.modifiers.valid(&modifiers.into())
  }

  pub fn has(&self, modifiers: impl Into<Descriptor>) -> bool {
    self.valid(modifiers)
  }

  /// True when the modifier set mirrors the descriptor exactly: enabled
  /// tokens present, disabled tokens absent.
  pub fn same(&self, modifiers: impl Into<Descriptor>) -> bool {
    self.modifiers.same(&modifiers.into())
  }

  pub fn add_class(&mut self, class_names: impl Into<Descriptor>) -> &mut Self {
    self.class_names.add(&class_names.into());
    self
  }

  pub fn remove_class(&mut self, class_names: impl Into<Descriptor>) -> &mut Self {
    self.class_names.remove(&class_names.into());
    self
  }

  pub fn toggle_class(&mut self, class_names: impl Into<Descriptor>) -> &mut Self {
    self.class_names.toggle(&class_names.into());
    self
  }

  pub fn valid_class(&self, class_names: impl Into<Descriptor>) -> bool {
    self.class_names.valid(&class_names.into())
  }

  pub fn has_class(&self, class_names: impl Into<Descriptor>) -> bool {
    self.valid_class(class_names)
  }

  pub fn same_class(&self, class_names: impl Into<Descriptor>) -> bool {
    self.class_names.same(&class_names.into())
  }

  fn state_descriptor(&self, states: impl Into<Descriptor>) -> Descriptor {
    states.into().prefixed(&self.options.state_prefix)
  }

  /// State operations are class operations on tokens re-keyed with the
  /// state prefix; each pair keeps its enabled flag.
  pub fn add_state(&mut self, states: impl Into<Descriptor>) -> &mut Self {
    let states = self.state_descriptor(states);
    self.add_class(states)
  }

  pub fn remove_state(&mut self, states: impl Into<Descriptor>) -> &mut Self {
    let states = self.state_descriptor(states);
    self.remove_class(states)
  }

  pub fn toggle_state(&mut self, states: impl Into<Descriptor>) -> &mut Self {
    let states = self.state_descriptor(states);
    self.toggle_class(states)
  }

  pub fn valid_state(&self, states: impl Into<Descriptor>) -> bool {
    self.valid_class(self.state_descriptor(states))
  }

  pub fn has_state(&self, states: impl Into<Descriptor>) -> bool {
    self.valid_state(states)
  }

  pub fn same_state(&self, states: impl Into<Descriptor>) -> bool {
    self.same_class(self.state_descriptor(states))
  }

  /// Adds `modifiers`, and only when all of them actually stuck (every pair
  /// enabled and present afterwards) also adds the dependent states and
  /// class names. A failed gate skips the dependent part silently.
  pub fn under(
    &mut self,
    modifiers: impl Into<Descriptor>,
    states: impl Into<Descriptor>,
    class_names: impl Into<Descriptor>,
  ) -> &mut Self {
    let modifiers = modifiers.into();
    self.add(&modifiers);
    if self.modifiers.in_effect(&modifiers) {
      self.add_state(states);
      self.add_class(class_names);
    }
    self
  }

  /// Attaches a rendering map. While bound, every composed token is
  /// replaced by its mapped value and unmapped tokens are dropped.
  pub fn bind(&mut self, map: BTreeMap<String, String>) -> &mut Self {
    self.rendering_map = Some(map);
    self
  }

  pub fn unbind(&mut self) -> &mut Self {
    self.rendering_map = None;
    self
  }

  /// Registers `style` under a unique scope: the tree is anchored at
  /// `.{scope}.{block}` so `&`-keys compose into compound selectors like
  /// `.bem-0.btn--checked`, and the scope class joins the class-name set so
  /// the composed string picks the scoped rules up. The scope token makes
  /// repeated registrations of the same block independent instead of
  /// overriding each other.
  ///
  /// On a sink failure nothing is recorded on the entity; rules inserted
  /// before the failure stay in the sink.
  pub fn css(&mut self, sink: &mut dyn RuleSink, style: &Style) -> Result<&mut Self, SheetError> {
    let scope = next_scope_class();
    let anchor = format!(".{}.{}", scope, self.block);
    let handles = insert_tree(sink, &StyleTree::build(style, &anchor))?;
    tracing::debug!(
      scope = %scope,
      rules = handles.len(),
      "registered scoped style"
    );
    self.rule_handles.extend(handles);
    self.add_class(scope);
    Ok(self)
  }

  /// Registers `style` anchored at the bare `.{block}` selector, shared by
  /// every entity of the block and overridable by scoped styles.
  pub fn common_css(
    &mut self,
    sink: &mut dyn RuleSink,
    style: &Style,
  ) -> Result<&mut Self, SheetError> {
    let anchor = format!(".{}", self.block);
    let handles = insert_tree(sink, &StyleTree::build(style, &anchor))?;
    self.rule_handles.extend(handles);
    Ok(self)
  }

  /// Consumes the entity and deletes exactly the rules it registered.
  /// Other entities' rules in the same sink are untouched.
  pub fn destroy(self, sink: &mut dyn RuleSink) {
    for handle in self.rule_handles {
      sink.delete_rule(handle);
    }
  }

  /// Compound selector matching the enabled modifiers, deduplicated:
  /// `.base--a.base--b`.
  pub fn modifier_selector(&self, modifiers: impl Into<Descriptor>) -> String {
    let base = self.base_name();
    let mut selectors = IndexSet::new();
    modifiers.into().for_each_enabled(|token| {
      selectors.insert(format!(
        ".{}{}{}",
        base, self.options.modifier_separator, token
      ));
    });
    selectors.iter().join("")
  }

  /// Compound selector matching the enabled states, deduplicated:
  /// `.is-a.is-b`. Truthiness is judged on the raw tokens, before the
  /// prefix is applied.
  pub fn state_selector(&self, states: impl Into<Descriptor>) -> String {
    let mut selectors = IndexSet::new();
    states.into().for_each_enabled(|token| {
      selectors.insert(format!(".{}{}", self.options.state_prefix, token));
    });
    selectors.iter().join("")
  }

  fn segments(&self) -> Vec<String> {
    let base = self.base_name();
    let mut segments = vec![base.clone()];
    for token in self.modifiers.iter() {
      if token.is_empty() {
        continue;
      }
      segments.push(format!("{}{}{}", base, self.options.modifier_separator, token));
    }
    segments.extend(self.class_names.iter().map(str::to_string));
    segments
  }
}

impl fmt::Display for Bem {
  /// Base name, then `base--modifier` per modifier in insertion order, then
  /// the class-name tokens, space-joined. A bound rendering map replaces
  /// every segment; unmapped segments are dropped with a debug event.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let segments = self.segments();
    let rendered: Vec<&str> = match &self.rendering_map {
      None => segments.iter().map(String::as_str).collect(),
      Some(map) => segments
        .iter()
        .filter_map(|segment| match map.get(segment) {
          Some(mapped) => Some(mapped.as_str()),
          None => {
            tracing::debug!(
              token = %segment,
              "class token not found in the bound rendering map"
            );
            None
          }
        })
        .collect(),
    };
    f.write_str(rendered.join(" ").trim())
  }
}
