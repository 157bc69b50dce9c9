//! The closed value model shared by records and override files.
//!
//! Every configuration value is one of eight variants. Coercion decisions are
//! made on the variant's [`TypeTag`] alone, so the rule is a total function
//! over a finite set.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

// ---------------------------------------------------------------------------
// TypeTag
// ---------------------------------------------------------------------------

/// Semantic type category of a [`ConfValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    /// Absent / unset.
    Null,
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    Str,
    /// Resizable ordered sequence.
    List,
    /// Fixed-arity ordered sequence.
    Tuple,
    /// Mapping with scalar keys.
    Map,
}

impl TypeTag {
    /// Every tag, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Null,
        Self::Bool,
        Self::Int,
        Self::Float,
        Self::Str,
        Self::List,
        Self::Tuple,
        Self::Map,
    ];

    /// Short lowercase name used in diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Map => "dict",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// MapKey
// ---------------------------------------------------------------------------

/// Key of a [`ConfValue::Map`]. Only hashable scalars are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    /// Boolean key.
    Bool(bool),
    /// Integer key (`0: generic` in YAML).
    Int(i64),
    /// String key.
    Str(String),
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for MapKey {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for MapKey {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for MapKey {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

// ---------------------------------------------------------------------------
// ConfValue
// ---------------------------------------------------------------------------

/// A configuration value.
///
/// `Clone` is a deep copy: containers are owned, never shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfValue {
    /// Absent / unset.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Resizable ordered sequence.
    List(Vec<ConfValue>),
    /// Fixed-arity ordered sequence.
    Tuple(Vec<ConfValue>),
    /// Mapping, in insertion order.
    Map(IndexMap<MapKey, ConfValue>),
}

impl ConfValue {
    /// Build a [`ConfValue::List`] from anything convertible.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a [`ConfValue::Tuple`] from anything convertible.
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Build a [`ConfValue::Map`] from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<MapKey>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The value's type category.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Null => TypeTag::Null,
            Self::Bool(_) => TypeTag::Bool,
            Self::Int(_) => TypeTag::Int,
            Self::Float(_) => TypeTag::Float,
            Self::Str(_) => TypeTag::Str,
            Self::List(_) => TypeTag::List,
            Self::Tuple(_) => TypeTag::Tuple,
            Self::Map(_) => TypeTag::Map,
        }
    }

    /// Whether this is [`ConfValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The integer, if this is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or tuple.
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of a mapping.
    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<MapKey, Self>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Convert into the shape named by `to`.
    ///
    /// Defined conversions: list/tuple into either sequence shape (order
    /// kept), `int → float`, `bool → int`, and scalar → `str`. Anything else
    /// hands the value back unchanged as `Err`.
    #[allow(clippy::cast_precision_loss)]
    pub fn cast_to(self, to: TypeTag) -> Result<Self, Self> {
        match (self, to) {
            (Self::List(items) | Self::Tuple(items), TypeTag::List) => Ok(Self::List(items)),
            (Self::List(items) | Self::Tuple(items), TypeTag::Tuple) => Ok(Self::Tuple(items)),
            (Self::Int(i), TypeTag::Float) => Ok(Self::Float(i as f64)),
            (Self::Bool(b), TypeTag::Int) => Ok(Self::Int(i64::from(b))),
            (Self::Bool(b), TypeTag::Str) => Ok(Self::Str(b.to_string())),
            (Self::Int(i), TypeTag::Str) => Ok(Self::Str(i.to_string())),
            (Self::Float(v), TypeTag::Str) => Ok(Self::Str(format_float(v))),
            (other, _) => Err(other),
        }
    }
}

/// Render a float so it never reads as an integer.
fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn write_joined<'a, I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = &'a ConfValue>,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for ConfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            },
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_joined(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            },
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            },
        }
    }
}

impl From<bool> for ConfValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ConfValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for ConfValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ConfValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for ConfValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<ConfValue>> From<Option<T>> for ConfValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

impl Serialize for MapKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for ConfValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Str(s) => serializer.serialize_str(s),
            // Markup formats have no tuple type; both shapes go out as sequences.
            Self::List(items) | Self::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            },
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            },
        }
    }
}

struct MapKeyVisitor;

impl<'de> Visitor<'de> for MapKeyVisitor {
    type Value = MapKey;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a boolean, integer, or string mapping key")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(MapKey::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(MapKey::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(MapKey::Int)
            .map_err(|_| E::custom(format!("mapping key {v} is out of range for i64")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(MapKey::Str(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(MapKey::Str(v))
    }
}

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MapKeyVisitor)
    }
}

struct ConfValueVisitor;

impl<'de> Visitor<'de> for ConfValueVisitor {
    type Value = ConfValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a null, boolean, number, string, sequence, or mapping")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ConfValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ConfValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        ConfValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(ConfValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(ConfValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(ConfValue::Int)
            .map_err(|_| E::custom(format!("integer {v} is out of range for i64")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(ConfValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ConfValue::Str(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(ConfValue::Str(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ConfValue::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<MapKey, ConfValue>()? {
            entries.insert(key, value);
        }
        Ok(ConfValue::Map(entries))
    }
}

impl<'de> Deserialize<'de> for ConfValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConfValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_cover_every_variant() {
        let samples = [
            ConfValue::Null,
            ConfValue::Bool(true),
            ConfValue::Int(1),
            ConfValue::Float(1.5),
            ConfValue::from("x"),
            ConfValue::list([1, 2]),
            ConfValue::tuple([1, 2]),
            ConfValue::map([("a", 1)]),
        ];
        let tags: Vec<TypeTag> = samples.iter().map(ConfValue::type_tag).collect();
        assert_eq!(tags, TypeTag::ALL.to_vec());
    }

    #[test]
    fn test_display_flow_form() {
        assert_eq!(ConfValue::Null.to_string(), "null");
        assert_eq!(ConfValue::Float(2.0).to_string(), "2.0");
        assert_eq!(ConfValue::list([4, 8]).to_string(), "[4, 8]");
        assert_eq!(ConfValue::tuple([32, 64]).to_string(), "(32, 64)");
        assert_eq!(ConfValue::tuple([1]).to_string(), "(1,)");
        assert_eq!(
            ConfValue::map([(0_i64, "generic")]).to_string(),
            "{0: \"generic\"}"
        );
    }

    #[test]
    fn test_cast_list_to_tuple_keeps_order() {
        let cast = ConfValue::list([3, 1, 2]).cast_to(TypeTag::Tuple).unwrap();
        assert_eq!(cast, ConfValue::tuple([3, 1, 2]));
    }

    #[test]
    fn test_cast_scalars() {
        assert_eq!(
            ConfValue::Int(3).cast_to(TypeTag::Float).unwrap(),
            ConfValue::Float(3.0)
        );
        assert_eq!(
            ConfValue::Bool(true).cast_to(TypeTag::Int).unwrap(),
            ConfValue::Int(1)
        );
        assert_eq!(
            ConfValue::Float(0.5).cast_to(TypeTag::Str).unwrap(),
            ConfValue::from("0.5")
        );
    }

    #[test]
    fn test_cast_undefined_returns_value() {
        let original = ConfValue::map([("a", 1)]);
        let back = original.clone().cast_to(TypeTag::List).unwrap_err();
        assert_eq!(back, original);
    }

    #[test]
    fn test_deserialize_yaml_integer_keys() {
        let value: ConfValue = serde_yaml::from_str("0: generic\n1: other\n").unwrap();
        let entries = value.as_map().unwrap();
        assert_eq!(entries[&MapKey::Int(0)], ConfValue::from("generic"));
        assert_eq!(entries[&MapKey::Int(1)], ConfValue::from("other"));
    }

    #[test]
    fn test_deserialize_yaml_sequences_are_lists() {
        let value: ConfValue = serde_yaml::from_str("[1, 2.5, ~, yes, text]").unwrap();
        assert_eq!(value.type_tag(), TypeTag::List);
        let items = value.as_seq().unwrap();
        assert_eq!(items[0], ConfValue::Int(1));
        assert_eq!(items[1], ConfValue::Float(2.5));
        assert!(items[2].is_null());
        assert_eq!(items[4], ConfValue::from("text"));
    }

    #[test]
    fn test_deserialize_rejects_huge_unsigned() {
        let result: Result<ConfValue, _> = serde_json::from_str("18446744073709551615");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_float_keys() {
        let result: Result<ConfValue, _> = serde_yaml::from_str("1.5: x\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_tuple_as_sequence() {
        let json = serde_json::to_string(&ConfValue::tuple([1, 2])).unwrap();
        assert_eq!(json, "[1,2]");
    }
}
