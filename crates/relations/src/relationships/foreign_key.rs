//! Foreign Key Descriptor - Typed reference to the column linking a related
//! model back to its parent

use std::fmt;
use std::marker::PhantomData;

use crate::error::{ModelResult, RelationshipError};
use crate::model::{Model, PrimaryKey};

/// Foreign key column on the related model `R`
///
/// Construction checks the column against `R::columns()`, so a misspelled
/// column fails at definition time instead of producing relations that never
/// match anything.
pub struct ForeignKey<R> {
    column: String,
    _related: PhantomData<fn() -> R>,
}

impl<R: Model> ForeignKey<R> {
    /// Create a foreign key descriptor for a column of `R`
    pub fn new(column: &str) -> Result<Self, RelationshipError> {
        let column = column.trim();
        if column.is_empty() {
            return Err(RelationshipError::InvalidConfiguration(format!(
                "foreign key on '{}' cannot be empty",
                R::table_name()
            )));
        }
        if !R::has_column(column) {
            return Err(RelationshipError::UnknownColumn {
                table: R::table_name().to_string(),
                column: column.to_string(),
            });
        }

        Ok(Self {
            column: column.to_string(),
            _related: PhantomData,
        })
    }

    /// Column name
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Read the foreign key value of a related model
    ///
    /// A missing attribute and a `null` attribute both read as `None`.
    pub fn value_of(&self, related: &R) -> ModelResult<Option<PrimaryKey>> {
        match related.attribute(&self.column) {
            Some(value) => PrimaryKey::from_value(&value),
            None => Ok(None),
        }
    }
}

impl<R> Clone for ForeignKey<R> {
    fn clone(&self) -> Self {
        Self {
            column: self.column.clone(),
            _related: PhantomData,
        }
    }
}

impl<R> PartialEq for ForeignKey<R> {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column
    }
}

impl<R> fmt::Debug for ForeignKey<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignKey")
            .field("column", &self.column)
            .finish()
    }
}

impl<R> fmt::Display for ForeignKey<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column)
    }
}
