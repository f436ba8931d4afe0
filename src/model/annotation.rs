//! Structured metadata attached to trees, nodes and edges.
//!
//! An [AnnotationSet] is an ordered key/value view derived from metadata
//! comments (see [metadata](crate::model::metadata)) or read directly from
//! a structured source. Values are typed by [AnnotationValue].

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =#========================================================================#=
// ANNOTATION VALUE
// =#========================================================================#=
/// A typed metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Brace-delimited sequence, e.g. `{A,B,C}`
    List(Vec<AnnotationValue>),
    /// Brace-delimited mapping, e.g. `{lower=0.1,upper=0.9}`
    Map(BTreeMap<String, AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnnotationValue::Float(v) => Some(*v),
            AnnotationValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AnnotationValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AnnotationValue]> {
        match self {
            AnnotationValue::List(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for AnnotationValue {
    fn from(v: f64) -> Self {
        AnnotationValue::Float(v)
    }
}

impl From<i64> for AnnotationValue {
    fn from(v: i64) -> Self {
        AnnotationValue::Int(v)
    }
}

impl From<i32> for AnnotationValue {
    fn from(v: i32) -> Self {
        AnnotationValue::Int(v as i64)
    }
}

impl From<bool> for AnnotationValue {
    fn from(v: bool) -> Self {
        AnnotationValue::Bool(v)
    }
}

impl From<String> for AnnotationValue {
    fn from(v: String) -> Self {
        AnnotationValue::String(v)
    }
}

impl From<&str> for AnnotationValue {
    fn from(v: &str) -> Self {
        AnnotationValue::String(v.to_string())
    }
}

impl From<Vec<AnnotationValue>> for AnnotationValue {
    fn from(v: Vec<AnnotationValue>) -> Self {
        AnnotationValue::List(v)
    }
}

/// Formats the value in the metadata comment syntax it is parsed from.
impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Bool(v) => write!(f, "{v}"),
            AnnotationValue::Int(v) => write!(f, "{v}"),
            // Debug keeps the fraction, so 1.0 reads back as a float
            AnnotationValue::Float(v) => write!(f, "{v:?}"),
            AnnotationValue::String(v) if v.contains('"') => write!(f, "'{}'", v.replace('\'', "''")),
            AnnotationValue::String(v) => write!(f, "\"{v}\""),
            AnnotationValue::List(values) => {
                f.write_str("{")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("}")
            }
            AnnotationValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

// =#========================================================================#=
// ANNOTATION SET
// =#========================================================================#=
/// One key/value entry of an [AnnotationSet].
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub value: AnnotationValue,
}

/// Ordered key/value metadata of one tree, node or edge.
///
/// Keys are unique: inserting an existing key replaces its value in place,
/// so an entry never appears twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSet {
    entries: Vec<Annotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `name = value`, replacing an existing value for `name`.
    ///
    /// # Returns
    /// The replaced value, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AnnotationValue>,
    ) -> Option<AnnotationValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.entries.push(Annotation { name, value });
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&AnnotationValue> {
        self.entries.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<AnnotationValue> {
        let pos = self.entries.iter().position(|a| a.name == name)?;
        Some(self.entries.remove(pos).value)
    }

    /// Inserts every entry of `other`, in order.
    pub fn merge(&mut self, other: AnnotationSet) {
        for Annotation { name, value } in other.entries {
            self.insert(name, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.entries.iter()
    }

    /// Keys in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|a| a.name.as_str()).collect()
    }

    /// Plain map view of the entries.
    pub fn values_as_map(&self) -> BTreeMap<String, AnnotationValue> {
        self.entries
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a AnnotationSet {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>, V: Into<AnnotationValue>> FromIterator<(K, V)> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = AnnotationSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl Serialize for AnnotationSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}

/// Keeps the entries in document order.
impl<'de> Deserialize<'de> for AnnotationSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = AnnotationSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of annotation names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut set = AnnotationSet::new();
                while let Some((name, value)) = access.next_entry::<String, AnnotationValue>()? {
                    set.insert(name, value);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut set = AnnotationSet::new();
        set.insert("rate", 0.5);
        set.insert("height", 2);
        let old = set.insert("rate", 1.5);

        assert_eq!(old, Some(AnnotationValue::Float(0.5)));
        assert_eq!(set.names(), vec!["rate", "height"]);
        assert_eq!(set.get("rate").and_then(AnnotationValue::as_f64), Some(1.5));
    }

    #[test]
    fn display_uses_comment_syntax() {
        let value = AnnotationValue::List(vec![1.into(), 2.5.into(), "x y".into()]);
        assert_eq!(value.to_string(), "{1,2.5,\"x y\"}");
        assert_eq!(AnnotationValue::Float(1.0).to_string(), "1.0");
    }

    #[test]
    fn json_numbers_keep_their_type() {
        let set: AnnotationSet = serde_json::from_str(r#"{"n": 3, "x": 0.25, "ok": true}"#).unwrap();
        assert_eq!(set.get("n"), Some(&AnnotationValue::Int(3)));
        assert_eq!(set.get("x"), Some(&AnnotationValue::Float(0.25)));
        assert_eq!(set.get("ok"), Some(&AnnotationValue::Bool(true)));
    }
}
