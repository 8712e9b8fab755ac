//! Core Model Trait - Base definition for database entities
//!
//! Models expose their attributes through an explicit accessor contract
//! (`attribute` / `to_fields`) and are instantiated from field maps through
//! `from_fields`, so relationship code stays generic over model shape.

use std::collections::HashMap;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::model::primary_key::PrimaryKey;

/// Core trait for database models
pub trait Model: Send + Sync + Debug + Serialize + DeserializeOwned + 'static {
    /// Table name for this model
    fn table_name() -> &'static str;

    /// Primary key field name
    fn primary_key_name() -> &'static str {
        "id"
    }

    /// Column names this model owns
    fn columns() -> &'static [&'static str];

    /// Get the primary key value for this model instance
    fn primary_key(&self) -> Option<PrimaryKey>;

    /// Convert model to field-value pairs
    fn to_fields(&self) -> HashMap<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }

    /// Read a single attribute by column name
    fn attribute(&self, field: &str) -> Option<Value> {
        self.to_fields().remove(field)
    }

    /// Create a new, unsaved model instance from field-value pairs
    fn from_fields(fields: HashMap<String, Value>) -> ModelResult<Self>
    where
        Self: Sized,
    {
        let object: serde_json::Map<String, Value> = fields.into_iter().collect();
        serde_json::from_value(Value::Object(object)).map_err(|e| {
            ModelError::Serialization(format!(
                "cannot build '{}' model from fields: {}",
                Self::table_name(),
                e
            ))
        })
    }

    /// Check whether this model owns the named column
    fn has_column(column: &str) -> bool
    where
        Self: Sized,
    {
        Self::columns().contains(&column)
    }
}
