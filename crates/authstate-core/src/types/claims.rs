//! Decoded token claims.
//!
//! This module provides [`Claims`], a type that guarantees the decoded token
//! payload is a JSON object (a key/value mapping with unique keys).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};

/// The decoded claims of a bearer token.
///
/// This type guarantees that the payload is a JSON object. Claims are
/// supplied by the identity provider and are never validated or mutated
/// here; interpretation beyond the registered claims is left to the UI.
///
/// # Example
///
/// ```
/// use authstate_core::Claims;
/// use serde_json::json;
///
/// let claims = Claims::new(json!({ "sub": "u1", "preferred_username": "alice" })).unwrap();
/// assert_eq!(claims.subject(), Some("u1"));
/// assert_eq!(claims.get_str("preferred_username"), Some("alice"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Create claims from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn new(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(InvalidInputError::Claims {
                reason: format!("claims must be a JSON object, got {}", kind(&other)),
            }
            .into()),
        }
    }

    /// Create claims from an existing JSON map.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Get a claim by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string claim by name.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The `sub` (subject) claim.
    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    /// The `exp` (expiration time) claim.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("exp")
    }

    /// The `iat` (issued at) claim.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("iat")
    }

    /// Returns true if there are no claims.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        self.0
            .get(key)
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Serialize for Claims {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Claims {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Claims::new(value).map_err(serde::de::Error::custom)
    }
}
