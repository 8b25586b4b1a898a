use std::fmt;

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value side of a style entry: either a declaration value or a nested block
/// keyed by a selector fragment or at-rule.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
  Decl(String),
  Nested(Style),
}

impl StyleValue {
  pub fn as_decl(&self) -> Option<&str> {
    match self {
      StyleValue::Decl(value) => Some(value),
      StyleValue::Nested(_) => None,
    }
  }

  pub fn as_nested(&self) -> Option<&Style> {
    match self {
      StyleValue::Decl(_) => None,
      StyleValue::Nested(style) => Some(style),
    }
  }
}

impl From<&str> for StyleValue {
  fn from(value: &str) -> Self {
    StyleValue::Decl(value.to_string())
  }
}

impl From<String> for StyleValue {
  fn from(value: String) -> Self {
    StyleValue::Decl(value)
  }
}

impl From<Style> for StyleValue {
  fn from(value: Style) -> Self {
    StyleValue::Nested(value)
  }
}

macro_rules! impl_decl_from_number {
  ($($ty:ty),*) => {
    $(
      impl From<$ty> for StyleValue {
        fn from(value: $ty) -> Self {
          StyleValue::Decl(value.to_string())
        }
      }
    )*
  };
}

impl_decl_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// Ordered CSS-in-JS style object. Entries keep author order, which the tree
/// builder relies on for deterministic output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
  entries: IndexMap<String, StyleValue>,
}

impl Style {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts an entry, replacing (in place) any previous value for the key.
  pub fn insert(
    &mut self,
    key: impl Into<String>,
    value: impl Into<StyleValue>,
  ) -> Option<StyleValue> {
    self.entries.insert(key.into(), value.into())
  }

  pub fn get(&self, key: &str) -> Option<&StyleValue> {
    self.entries.get(key)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
    self.entries.iter().map(|(key, value)| (key.as_str(), value))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for Style {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Style {
      entries: iter
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect(),
    }
  }
}

/// Builds a [`Style`] from a nested literal.
///
/// Values are declaration strings or numbers; braced values nest. Multi-token
/// value expressions need parentheses.
///
/// ```
/// use bemkit_style::style;
///
/// let button = style! {
///   "color": "red",
///   "z-index": 2,
///   "&:hover": { "color": "blue" },
/// };
/// assert_eq!(button.len(), 3);
/// ```
#[macro_export]
macro_rules! style {
  (@value { $($nested:tt)* }) => {
    $crate::StyleValue::Nested($crate::style! { $($nested)* })
  };
  (@value $value:expr) => {
    $crate::StyleValue::from($value)
  };
  () => {
    $crate::Style::new()
  };
  ($($key:tt : $value:tt),+ $(,)?) => {{
    let mut style = $crate::Style::new();
    $(
      style.insert($key, $crate::style!(@value $value));
    )+
    style
  }};
}

impl Serialize for Style {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (key, value) in &self.entries {
      map.serialize_entry(key, value)?;
    }
    map.end()
  }
}

impl Serialize for StyleValue {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match self {
      StyleValue::Decl(value) => serializer.serialize_str(value),
      StyleValue::Nested(style) => style.serialize(serializer),
    }
  }
}

fn style_from_map<'de, A>(mut map: A) -> Result<Style, A::Error>
where
  A: MapAccess<'de>,
{
  let mut style = Style::new();
  while let Some((key, value)) = map.next_entry::<String, StyleValue>()? {
    style.entries.insert(key, value);
  }
  Ok(style)
}

impl<'de> Deserialize<'de> for Style {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct StyleVisitor;

    impl<'de> Visitor<'de> for StyleVisitor {
      type Value = Style;

      fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of declarations and nested blocks")
      }

      fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
      where
        A: MapAccess<'de>,
      {
        style_from_map(map)
      }
    }

    deserializer.deserialize_map(StyleVisitor)
  }
}

/// Declaration values are strings or numbers, nested blocks are maps. Other
/// value types are a deserialization error rather than coerced.
impl<'de> Deserialize<'de> for StyleValue {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct StyleValueVisitor;

    impl<'de> Visitor<'de> for StyleValueVisitor {
      type Value = StyleValue;

      fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a declaration string, a number or a nested block")
      }

      fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
      where
        E: serde::de::Error,
      {
        Ok(StyleValue::Decl(value.to_string()))
      }

      fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
      where
        E: serde::de::Error,
      {
        Ok(StyleValue::Decl(value.to_string()))
      }

      fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
      where
        E: serde::de::Error,
      {
        Ok(StyleValue::Decl(value.to_string()))
      }

      fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
      where
        E: serde::de::Error,
      {
        Ok(StyleValue::Decl(value.to_string()))
      }

      fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
      where
        A: MapAccess<'de>,
      {
        Ok(StyleValue::Nested(style_from_map(map)?))
      }
    }

    deserializer.deserialize_any(StyleValueVisitor)
  }
}
