use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::ActionArgs;

/// One attribute record as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,

    #[serde(default)]
    pub subkey: Option<String>,

    #[serde(default)]
    pub number: Option<i64>,

    #[serde(default)]
    pub value: Value,

    /// Storage type reported by the service ("string", "int", "relation", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attribute {
    /// Value as a string, if the service stored it as one
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// Criteria for selecting attributes
///
/// Unset fields match anything. `merge_container_attrs` asks the service to
/// include attributes inherited from parent containers, which are never cached
/// locally, so it always forces a live fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrFilter {
    pub key: Option<String>,
    pub subkey: Option<String>,
    pub number: Option<i64>,
    pub value: Option<Value>,
    pub merge_container_attrs: bool,
}

impl AttrFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn subkey(mut self, subkey: impl Into<String>) -> Self {
        self.subkey = Some(subkey.into());
        self
    }

    pub fn number(mut self, number: i64) -> Self {
        self.number = Some(number);
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn merged(mut self) -> Self {
        self.merge_container_attrs = true;
        self
    }

    pub fn matches(&self, attr: &Attribute) -> bool {
        if let Some(key) = &self.key {
            if *key != attr.key {
                return false;
            }
        }
        if let Some(subkey) = &self.subkey {
            if attr.subkey.as_deref() != Some(subkey.as_str()) {
                return false;
            }
        }
        if let Some(number) = self.number {
            if attr.number != Some(number) {
                return false;
            }
        }
        if let Some(value) = &self.value {
            if *value != attr.value {
                return false;
            }
        }
        true
    }

    /// Keep only the records this filter matches
    pub fn apply<'a, I>(&self, attrs: I) -> Vec<Attribute>
    where
        I: IntoIterator<Item = &'a Attribute>,
    {
        attrs
            .into_iter()
            .filter(|attr| self.matches(attr))
            .cloned()
            .collect()
    }

    /// Arguments for the remote `attrs` action
    pub fn to_args(&self) -> ActionArgs {
        let mut args = ActionArgs::new();
        if let Some(key) = &self.key {
            args.set("key", key);
        }
        if let Some(subkey) = &self.subkey {
            args.set("subkey", subkey);
        }
        if let Some(number) = self.number {
            args.set("number", number);
        }
        if let Some(value) = &self.value {
            args.set("value", value.clone());
        }
        if self.merge_container_attrs {
            args.set("merge_container_attrs", true);
        }
        args
    }

    /// Object form used inside entity queries
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(key) = &self.key {
            map.insert("key".to_string(), Value::String(key.clone()));
        }
        if let Some(subkey) = &self.subkey {
            map.insert("subkey".to_string(), Value::String(subkey.clone()));
        }
        if let Some(number) = self.number {
            map.insert("number".to_string(), Value::from(number));
        }
        if let Some(value) = &self.value {
            map.insert("value".to_string(), value.clone());
        }
        Value::Object(map)
    }
}
