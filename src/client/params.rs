//! Query-string encoding for forwarded actions and entity queries
//!
//! The clusto service takes all of its arguments from the query string.
//! Action arguments follow one rule set:
//!
//! - booleans become `0` / `1`
//! - integers and strings pass through unchanged
//! - everything else (lists, objects, floats, null) is sent as JSON text
//!
//! Entity queries (`/query/get_entities`) JSON-encode every value, strings included.

use serde_json::Value;
use std::collections::BTreeMap;
use url::form_urlencoded;

use crate::entity::AttrFilter;

/// One argument of a forwarded action
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Json(Value),
}

impl ArgValue {
    /// Wire form of the value, before URL escaping
    pub fn encode(&self) -> String {
        match self {
            ArgValue::Bool(true) => "1".to_string(),
            ArgValue::Bool(false) => "0".to_string(),
            ArgValue::Int(n) => n.to_string(),
            ArgValue::Str(s) => s.clone(),
            ArgValue::Json(v) => v.to_string(),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Int(value.into())
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        ArgValue::Int(value.into())
    }
}

impl From<u16> for ArgValue {
    fn from(value: u16) -> Self {
        ArgValue::Int(value.into())
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<&String> for ArgValue {
    fn from(value: &String) -> Self {
        ArgValue::Str(value.clone())
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(value: Vec<String>) -> Self {
        ArgValue::Json(Value::from(value))
    }
}

impl From<Value> for ArgValue {
    /// JSON scalars that have a primitive wire form keep it
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => ArgValue::Bool(b),
            Value::String(s) => ArgValue::Str(s),
            Value::Number(ref n) if n.is_i64() => match n.as_i64() {
                Some(i) => ArgValue::Int(i),
                None => ArgValue::Json(value),
            },
            other => ArgValue::Json(other),
        }
    }
}

/// Ordered keyword arguments for a forwarded action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionArgs {
    args: Vec<(String, ArgValue)>,
}

impl ActionArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, replacing any earlier value for the same key
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) {
        let key = key.into();
        let value = value.into();
        match self.args.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.args.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.args.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Encode as `k1=v1&k2=v2`, in insertion order
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.args {
            serializer.append_pair(key, &value.encode());
        }
        serializer.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for ActionArgs
where
    K: Into<String>,
    V: Into<ArgValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = ActionArgs::new();
        for (key, value) in iter {
            args.set(key, value);
        }
        args
    }
}

/// Filter criteria for `/query/get_entities`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityQuery {
    params: BTreeMap<String, Value>,
}

impl EntityQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary filter; the value is sent JSON-encoded
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn names<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param("names", string_list(names))
    }

    pub fn clusto_types<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param("clusto_types", string_list(types))
    }

    pub fn clusto_drivers<I, S>(self, drivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param("clusto_drivers", string_list(drivers))
    }

    /// Match entities carrying all of the given attributes
    pub fn attrs(self, filters: &[AttrFilter]) -> Self {
        let attrs: Vec<Value> = filters.iter().map(AttrFilter::to_json).collect();
        self.param("attrs", Value::Array(attrs))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            serializer.append_pair(key, &value.to_string());
        }
        serializer.finish()
    }
}

fn string_list<I, S>(items: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Array(items.into_iter().map(|s| Value::String(s.into())).collect())
}
