//! BEM class-name composition with scoped CSS-in-JS style registration.
//!
//! A [`Bem`] entity composes `block__element--modifier` class strings from
//! nested boolean-tagged descriptors, and registers nested style objects as
//! flat rules under a unique scope class through a [`RuleSink`].
//!
//! ```
//! use bemkit::{desc, style, Bem, MemorySheet};
//!
//! let mut sheet = MemorySheet::new();
//! let mut button = Bem::new("btn");
//! button
//!   .css(&mut sheet, &style! { "color": "red" })
//!   .expect("sheet accepts the rule");
//! button.add(desc! { "primary" => true });
//!
//! let classes = button.to_string();
//! assert!(classes.starts_with("btn btn--primary bem-"));
//! ```

pub mod bem;
pub mod options;

pub use bem::Bem;
pub use options::BemOptions;

pub use bemkit_core::{desc, Descriptor, Scalar, TokenSet};
pub use bemkit_style::{
  insert_tree, next_scope_class, style, Declaration, Declarations, MemorySheet, MockRuleSink,
  RuleHandle, RuleSink, SheetError, Style, StyleTree, StyleValue,
};
