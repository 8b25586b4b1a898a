use serde::{Deserialize, Serialize};

/// Naming options for a BEM entity. Options are plain per-entity values;
/// entities created through [`Bem::element`](crate::Bem::element) inherit
/// their parent's copy.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct BemOptions {
  /// Prefix expected on every block name. Blocks already carrying it are
  /// kept verbatim.
  pub namespace: String,
  pub element_separator: String,
  pub modifier_separator: String,
  pub state_prefix: String,
}

impl Default for BemOptions {
  fn default() -> Self {
    Self {
      namespace: String::new(),
      element_separator: "__".to_string(),
      modifier_separator: "--".to_string(),
      state_prefix: "is-".to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn defaults_follow_the_bem_convention() {
    let options = BemOptions::default();
    assert_eq!(options.namespace, "");
    assert_eq!(options.element_separator, "__");
    assert_eq!(options.modifier_separator, "--");
    assert_eq!(options.state_prefix, "is-");
  }

  #[test]
  fn partial_json_falls_back_to_defaults() {
    let options: BemOptions =
      serde_json::from_str(r#"{"namespace": "app-", "statePrefix": "has-"}"#).expect("options");
    assert_eq!(options.namespace, "app-");
    assert_eq!(options.state_prefix, "has-");
    assert_eq!(options.element_separator, "__");
    assert_eq!(options.modifier_separator, "--");
  }

  #[test]
  fn serializes_with_camel_case_keys() {
    let json = serde_json::to_value(BemOptions::default()).expect("serialize");
    assert_eq!(
      json,
      serde_json::json!({
        "namespace": "",
        "elementSeparator": "__",
        "modifierSeparator": "--",
        "statePrefix": "is-",
      }),
    );
  }
}
