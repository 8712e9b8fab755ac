//! Relation constraints - Predicates restricting a relation query to the rows
//! owned by one parent or by a batch of parents

use serde_json::Value;

use crate::error::ModelResult;
use crate::model::{Model, PrimaryKey};
use crate::query::QueryBuilder;

use super::foreign_key::ForeignKey;

/// Query object a relation constraint can be attached to
pub trait RelationQuery: Sized {
    /// Attach `column = value`
    fn where_equals(self, column: &str, value: Value) -> Self;

    /// Attach `column IN (values)`
    fn where_in_values(self, column: &str, values: Vec<Value>) -> Self;

    /// Attach a predicate no row satisfies
    fn where_none(self) -> Self;
}

impl<M> RelationQuery for QueryBuilder<M> {
    fn where_equals(self, column: &str, value: Value) -> Self {
        self.where_eq(column, value)
    }

    fn where_in_values(self, column: &str, values: Vec<Value>) -> Self {
        self.where_in(column, values)
    }

    fn where_none(self) -> Self {
        self.where_raw("0 = 1")
    }
}

/// Predicate on a related model's foreign key column
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `column = key`, for a single parent
    Equals { column: String, key: PrimaryKey },
    /// `column IN (keys)`, for a non-empty batch of parents
    In { column: String, keys: Vec<PrimaryKey> },
    /// Matches no rows; produced for an empty batch
    Nothing { column: String },
}

impl Constraint {
    /// Equality constraint for exactly one parent key
    ///
    /// Keys are normalised, so `String("7")` constrains to `7`.
    pub fn single<R: Model>(foreign_key: &ForeignKey<R>, key: PrimaryKey) -> Self {
        Constraint::Equals {
            column: foreign_key.column().to_string(),
            key: key.normalized(),
        }
    }

    /// Set-membership constraint for a batch of parent keys
    ///
    /// An empty batch yields [`Constraint::Nothing`], never an unconstrained
    /// query.
    pub fn batch<R: Model>(foreign_key: &ForeignKey<R>, keys: Vec<PrimaryKey>) -> Self {
        let column = foreign_key.column().to_string();
        let keys: Vec<PrimaryKey> = keys.into_iter().map(PrimaryKey::normalized).collect();
        if keys.is_empty() {
            Constraint::Nothing { column }
        } else {
            Constraint::In { column, keys }
        }
    }

    /// Column the constraint filters on
    pub fn column(&self) -> &str {
        match self {
            Constraint::Equals { column, .. }
            | Constraint::In { column, .. }
            | Constraint::Nothing { column } => column,
        }
    }

    /// Whether the constraint can never admit a row
    pub fn matches_nothing(&self) -> bool {
        matches!(self, Constraint::Nothing { .. })
    }

    /// Keys the constraint admits, in constraint order
    pub fn keys(&self) -> &[PrimaryKey] {
        match self {
            Constraint::Equals { key, .. } => std::slice::from_ref(key),
            Constraint::In { keys, .. } => keys,
            Constraint::Nothing { .. } => &[],
        }
    }

    /// Attach the constraint to a query without executing it
    pub fn apply<Q: RelationQuery>(&self, query: Q) -> Q {
        match self {
            Constraint::Equals { column, key } => {
                query.where_equals(column, key.to_value())
            }
            Constraint::In { column, keys } => {
                query.where_in_values(column, keys.iter().map(PrimaryKey::to_value).collect())
            }
            Constraint::Nothing { .. } => query.where_none(),
        }
    }

    /// Evaluate the constraint against an in-memory related model
    ///
    /// A null or missing foreign key satisfies no constraint.
    pub fn matches<R: Model>(&self, related: &R) -> ModelResult<bool> {
        let value = match related.attribute(self.column()) {
            Some(value) => PrimaryKey::from_value(&value)?,
            None => None,
        };

        Ok(match value {
            Some(value) => self.keys().contains(&value),
            None => false,
        })
    }
}
