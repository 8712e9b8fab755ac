//! Primary Key System - Key values shared by parent keys and foreign keys
//!
//! Parent primary keys and related foreign keys are compared as
//! [`PrimaryKey`] values. Keys read from JSON attributes are normalised so
//! that the same logical key always lands on the same variant: integers and
//! canonical decimal strings become `Integer`, UUID strings become `Uuid`,
//! everything else textual stays `String`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Key value usable as a parent primary key or a related foreign key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryKey {
    /// Integer key
    Integer(i64),
    /// UUID key
    Uuid(Uuid),
    /// Any other textual key
    String(String),
}

impl std::fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimaryKey::Integer(id) => write!(f, "{}", id),
            PrimaryKey::Uuid(id) => write!(f, "{}", id),
            PrimaryKey::String(id) => write!(f, "{}", id),
        }
    }
}

impl PrimaryKey {
    /// Normalise a textual key
    pub fn parse(text: &str) -> Self {
        if let Ok(id) = text.parse::<i64>() {
            // "05" and "+5" stay textual; only the canonical form is numeric
            if id.to_string() == text {
                return PrimaryKey::Integer(id);
            }
        }
        if let Ok(id) = Uuid::parse_str(text) {
            return PrimaryKey::Uuid(id);
        }
        PrimaryKey::String(text.to_string())
    }

    /// Read a key from an attribute value
    ///
    /// `Null` is an absent key. Values that cannot identify a row (floats,
    /// booleans, arrays, objects) are rejected.
    pub fn from_value(value: &Value) -> ModelResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(Self::parse(text))),
            Value::Number(number) => {
                if let Some(id) = number.as_i64() {
                    Ok(Some(PrimaryKey::Integer(id)))
                } else if number.is_u64() {
                    // Past i64::MAX; textual, as `parse` would leave it
                    Ok(Some(PrimaryKey::String(number.to_string())))
                } else {
                    Err(ModelError::MalformedResults(format!(
                        "numeric key {} is not an integer",
                        number
                    )))
                }
            }
            other => Err(ModelError::MalformedResults(format!(
                "value {} cannot be used as a key",
                other
            ))),
        }
    }

    /// Bring a key built by hand into the form `from_value` produces
    ///
    /// Keys compare by variant, so a parent reporting `String("42")` must be
    /// normalised before it can equal a foreign key read as `Integer(42)`.
    pub fn normalized(self) -> Self {
        match self {
            PrimaryKey::String(text) => PrimaryKey::parse(&text),
            key => key,
        }
    }

    /// Convert the key into an attribute value
    pub fn to_value(&self) -> Value {
        match self {
            PrimaryKey::Integer(id) => Value::from(*id),
            PrimaryKey::Uuid(id) => Value::String(id.to_string()),
            PrimaryKey::String(id) => Value::String(id.clone()),
        }
    }

    /// Extract as i64 if this is an Integer key
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PrimaryKey::Integer(id) => Some(*id),
            _ => None,
        }
    }

    /// Extract as UUID if this is a UUID key
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            PrimaryKey::Uuid(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<i64> for PrimaryKey {
    fn from(id: i64) -> Self {
        PrimaryKey::Integer(id)
    }
}

impl From<i32> for PrimaryKey {
    fn from(id: i32) -> Self {
        PrimaryKey::Integer(i64::from(id))
    }
}

impl From<Uuid> for PrimaryKey {
    fn from(id: Uuid) -> Self {
        PrimaryKey::Uuid(id)
    }
}

impl From<&str> for PrimaryKey {
    fn from(id: &str) -> Self {
        PrimaryKey::parse(id)
    }
}

impl From<String> for PrimaryKey {
    fn from(id: String) -> Self {
        PrimaryKey::parse(&id)
    }
}

impl From<PrimaryKey> for Value {
    fn from(key: PrimaryKey) -> Self {
        key.to_value()
    }
}
