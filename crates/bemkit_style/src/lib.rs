//! Style objects, the selector tree that flattens them, and the rule sinks
//! flattened rules are written to.

pub mod scope;
pub mod sheet;
pub mod style;
pub mod tree;

pub use scope::next_scope_class;
pub use sheet::{
  insert_tree, Declaration, MemorySheet, MockRuleSink, RuleHandle, RuleSink, SheetError,
};
pub use style::{Style, StyleValue};
pub use tree::{Declarations, StyleTree};
