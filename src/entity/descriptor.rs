use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Attribute;
use crate::client::{ClustoError, Result};

/// Full description of an entity, as returned by `show` and the name lookups
///
/// The relationship lists are optional: some endpoints return abbreviated
/// descriptors, and a missing list means "not known locally" rather than empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Entity path, e.g. `/server/web1`
    pub object: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Vec<Attribute>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<String>>,

    /// Any further fields the service returned (driver, type, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Descriptor {
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            attrs: None,
            parents: None,
            contents: None,
            extra: Map::new(),
        }
    }

    /// Decode a descriptor from a JSON response body
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.get("object").is_some_and(Value::is_string) {
            return Err(ClustoError::UnexpectedResponse(format!(
                "descriptor without an object path: {value}"
            )));
        }
        Ok(serde_json::from_value(value)?)
    }
}
