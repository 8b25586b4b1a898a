use std::fmt;
use std::ops::ControlFlow;

use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A single class-name token with a truthiness of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
  Str(String),
  Num(f64),
  Bool(bool),
}

impl Scalar {
  /// Whether the scalar enables the token it renders to. Empty strings,
  /// zero, NaN and `false` all disable it.
  pub fn truthy(&self) -> bool {
    match self {
      Scalar::Str(value) => !value.is_empty(),
      Scalar::Num(value) => *value != 0.0 && !value.is_nan(),
      Scalar::Bool(value) => *value,
    }
  }
}

impl fmt::Display for Scalar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Scalar::Str(value) => f.write_str(value),
      Scalar::Num(value) => write!(f, "{}", value),
      Scalar::Bool(value) => write!(f, "{}", value),
    }
  }
}

/// A recursive description of class-name tokens and whether each one is
/// enabled.
///
/// Scalars carry their own truthiness, sequences concatenate whatever their
/// items flatten to, and entry lists pair an arbitrarily nested key with an
/// explicit flag. A scalar key under a `false` flag still flattens, just
/// disabled, which is what lets [`TokenSet::toggle`](crate::TokenSet::toggle)
/// and the membership queries see tokens that are currently switched off.
/// Composite keys establish their own flags: a sequence key flattens its
/// items as if they were top level, and an entry-list key applies its own
/// per-entry flags.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Descriptor {
  #[default]
  Empty,
  Scalar(Scalar),
  Sequence(Vec<Descriptor>),
  Entries(Vec<(Descriptor, bool)>),
}

impl Descriptor {
  /// Builds an entry list from `(key, enabled)` pairs.
  pub fn entries<K, I>(entries: I) -> Self
  where
    K: Into<Descriptor>,
    I: IntoIterator<Item = (K, bool)>,
  {
    Descriptor::Entries(
      entries
        .into_iter()
        .map(|(key, enabled)| (key.into(), enabled))
        .collect(),
    )
  }

  /// Builds a sequence from anything convertible to descriptors.
  pub fn sequence<T, I>(items: I) -> Self
  where
    T: Into<Descriptor>,
    I: IntoIterator<Item = T>,
  {
    Descriptor::Sequence(items.into_iter().map(Into::into).collect())
  }

  /// Depth-first walk over every `(enabled, token)` pair. Only scalars read
  /// the inherited flag, and it gates rather than enables: a falsy scalar
  /// stays disabled under an enabled entry. Each nesting level re-binds the
  /// flag for its children, so sequence items are always considered for
  /// inclusion and an entry flag reaches exactly the scalars directly under
  /// its key.
  fn walk<F>(&self, parent_enabled: bool, visit: &mut F) -> ControlFlow<()>
  where
    F: FnMut(bool, &str) -> ControlFlow<()>,
  {
    match self {
      Descriptor::Empty => ControlFlow::Continue(()),
      Descriptor::Scalar(scalar) => {
        let enabled = parent_enabled && scalar.truthy();
        match scalar {
          Scalar::Str(value) => visit(enabled, value),
          other => visit(enabled, &other.to_string()),
        }
      }
      Descriptor::Sequence(items) => {
        for item in items {
          item.walk(true, visit)?;
        }
        ControlFlow::Continue(())
      }
      Descriptor::Entries(entries) => {
        for (key, enabled) in entries {
          key.walk(*enabled, visit)?;
        }
        ControlFlow::Continue(())
      }
    }
  }

  /// Visits every flattened pair, disabled ones included.
  pub fn for_each_all<F>(&self, mut visit: F)
  where
    F: FnMut(bool, &str),
  {
    let _ = self.walk(true, &mut |enabled, token| {
      visit(enabled, token);
      ControlFlow::Continue(())
    });
  }

  /// Visits only the tokens that flatten as enabled.
  pub fn for_each_enabled<F>(&self, mut visit: F)
  where
    F: FnMut(&str),
  {
    self.for_each_all(|enabled, token| {
      if enabled {
        visit(token);
      }
    });
  }

  /// Short-circuiting check that every flattened pair satisfies `predicate`.
  /// Vacuously true for descriptors that flatten to nothing.
  pub fn all_satisfy<F>(&self, mut predicate: F) -> bool
  where
    F: FnMut(bool, &str) -> bool,
  {
    self
      .walk(true, &mut |enabled, token| {
        if predicate(enabled, token) {
          ControlFlow::Continue(())
        } else {
          ControlFlow::Break(())
        }
      })
      .is_continue()
  }

  /// Flattens into owned `(enabled, token)` pairs in visit order.
  pub fn flatten(&self) -> Vec<(bool, String)> {
    let mut pairs = Vec::new();
    self.for_each_all(|enabled, token| pairs.push((enabled, token.to_string())));
    pairs
  }

  /// Re-keys every flattened token with `prefix`, keeping each pair's flag.
  ///
  /// The result is a flat entry list, so a prefixed falsy scalar such as an
  /// empty string becomes a non-empty token that is still disabled by its
  /// entry flag rather than by its own emptiness.
  pub fn prefixed(&self, prefix: &str) -> Descriptor {
    Descriptor::Entries(
      self
        .flatten()
        .into_iter()
        .map(|(enabled, token)| (Descriptor::from(format!("{prefix}{token}")), enabled))
        .collect(),
    )
  }
}

impl From<&str> for Descriptor {
  fn from(value: &str) -> Self {
    Descriptor::Scalar(Scalar::Str(value.to_string()))
  }
}

impl From<String> for Descriptor {
  fn from(value: String) -> Self {
    Descriptor::Scalar(Scalar::Str(value))
  }
}

impl From<bool> for Descriptor {
  fn from(value: bool) -> Self {
    Descriptor::Scalar(Scalar::Bool(value))
  }
}

impl From<f64> for Descriptor {
  fn from(value: f64) -> Self {
    Descriptor::Scalar(Scalar::Num(value))
  }
}

macro_rules! impl_from_number {
  ($($ty:ty),*) => {
    $(
      impl From<$ty> for Descriptor {
        fn from(value: $ty) -> Self {
          Descriptor::Scalar(Scalar::Num(value as f64))
        }
      }
    )*
  };
}

impl_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32);

impl From<&Descriptor> for Descriptor {
  fn from(value: &Descriptor) -> Self {
    value.clone()
  }
}

impl<T: Into<Descriptor>> From<Option<T>> for Descriptor {
  fn from(value: Option<T>) -> Self {
    value.map_or(Descriptor::Empty, Into::into)
  }
}

impl<T: Into<Descriptor>> From<Vec<T>> for Descriptor {
  fn from(value: Vec<T>) -> Self {
    Descriptor::sequence(value)
  }
}

impl<T: Into<Descriptor>, const N: usize> From<[T; N]> for Descriptor {
  fn from(value: [T; N]) -> Self {
    Descriptor::sequence(value)
  }
}

impl<K: Into<Descriptor>> From<(K, bool)> for Descriptor {
  fn from((key, enabled): (K, bool)) -> Self {
    Descriptor::Entries(vec![(key.into(), enabled)])
  }
}

impl<K: Into<Descriptor>> FromIterator<(K, bool)> for Descriptor {
  fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
    Descriptor::entries(iter)
  }
}

/// Builds a [`Descriptor`] from a terse literal form.
///
/// ```
/// use bemkit_core::desc;
///
/// let on = true;
/// let d = desc!["wide", desc! { "active" => on, "ghost" => false }];
/// assert_eq!(
///   d.flatten(),
///   vec![
///     (true, "wide".to_string()),
///     (true, "active".to_string()),
///     (false, "ghost".to_string()),
///   ],
/// );
/// ```
#[macro_export]
macro_rules! desc {
  () => {
    $crate::Descriptor::Empty
  };
  ({ $($key:expr => $enabled:expr),* $(,)? }) => {
    $crate::Descriptor::Entries(::std::vec![
      $(($crate::Descriptor::from($key), $enabled)),*
    ])
  };
  ([ $($item:expr),* $(,)? ]) => {
    $crate::Descriptor::Sequence(::std::vec![
      $($crate::Descriptor::from($item)),*
    ])
  };
  ($($key:expr => $enabled:expr),+ $(,)?) => {
    $crate::Descriptor::Entries(::std::vec![
      $(($crate::Descriptor::from($key), $enabled)),+
    ])
  };
  ($scalar:expr) => {
    $crate::Descriptor::from($scalar)
  };
  ($($item:expr),+ $(,)?) => {
    $crate::Descriptor::Sequence(::std::vec![
      $($crate::Descriptor::from($item)),+
    ])
  };
}

impl Serialize for Descriptor {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match self {
      Descriptor::Empty => serializer.serialize_unit(),
      Descriptor::Scalar(Scalar::Str(value)) => serializer.serialize_str(value),
      Descriptor::Scalar(Scalar::Num(value)) => serializer.serialize_f64(*value),
      Descriptor::Scalar(Scalar::Bool(value)) => serializer.serialize_bool(*value),
      Descriptor::Sequence(items) => {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
          seq.serialize_element(item)?;
        }
        seq.end()
      }
      Descriptor::Entries(entries) => {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, enabled) in entries {
          map.serialize_entry(key, enabled)?;
        }
        map.end()
      }
    }
  }
}

impl<'de> Deserialize<'de> for Descriptor {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct DescriptorVisitor;

    impl<'de> Visitor<'de> for DescriptorVisitor {
      type Value = Descriptor;

      fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("null, a scalar, a sequence or a map of enable flags")
      }

      fn visit_unit<E>(self) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(Descriptor::Empty)
      }

      fn visit_none<E>(self) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(Descriptor::Empty)
      }

      fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
      where
        D: Deserializer<'de>,
      {
        Descriptor::deserialize(deserializer)
      }

      fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(value.into())
      }

      fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(value.into())
      }

      fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(value.into())
      }

      fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(value.into())
      }

      fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(value.into())
      }

      fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
      where
        A: SeqAccess<'de>,
      {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<Descriptor>()? {
          items.push(item);
        }
        Ok(Descriptor::Sequence(items))
      }

      fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
      where
        A: MapAccess<'de>,
      {
        let mut entries = Vec::new();
        while let Some((key, flag)) = map.next_entry::<Descriptor, Truthy>()? {
          entries.push((key, flag.0));
        }
        Ok(Descriptor::Entries(entries))
      }
    }

    deserializer.deserialize_any(DescriptorVisitor)
  }
}

/// Enable flag decoded from any self-describing value. Scalars use the same
/// truthiness as [`Scalar::truthy`], null is false, and aggregates are true
/// regardless of content.
struct Truthy(bool);

impl<'de> Deserialize<'de> for Truthy {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct TruthyVisitor;

    impl<'de> Visitor<'de> for TruthyVisitor {
      type Value = Truthy;

      fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any value usable as an enable flag")
      }

      fn visit_unit<E>(self) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(Truthy(false))
      }

      fn visit_none<E>(self) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(Truthy(false))
      }

      fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
      where
        D: Deserializer<'de>,
      {
        Truthy::deserialize(deserializer)
      }

      fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(Truthy(value))
      }

      fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(Truthy(value != 0))
      }

      fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(Truthy(value != 0))
      }

      fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(Truthy(value != 0.0 && !value.is_nan()))
      }

      fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(Truthy(!value.is_empty()))
      }

      fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
      where
        A: SeqAccess<'de>,
      {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Truthy(true))
      }

      fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
      where
        A: MapAccess<'de>,
      {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Truthy(true))
      }
    }

    deserializer.deserialize_any(TruthyVisitor)
  }
}
