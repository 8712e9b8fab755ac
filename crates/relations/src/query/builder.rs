//! Query Builder - SELECT queries over a related model's table

use std::marker::PhantomData;

use serde_json::Value;

use super::types::WhereCondition;

/// SELECT query over the table of model `M`
///
/// Relations only ever filter with conjunctions of equality, set membership
/// and the raw match-nothing predicate, so that is all this builder holds.
#[derive(Debug)]
pub struct QueryBuilder<M = ()> {
    pub(crate) columns: Vec<String>,
    pub(crate) table: Option<String>,
    pub(crate) where_conditions: Vec<WhereCondition>,
    pub(crate) limit_count: Option<i64>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for QueryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            table: self.table.clone(),
            where_conditions: self.where_conditions.clone(),
            limit_count: self.limit_count,
            _model: PhantomData,
        }
    }
}

impl<M> Default for QueryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> QueryBuilder<M> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            table: None,
            where_conditions: Vec::new(),
            limit_count: None,
            _model: PhantomData,
        }
    }

    /// Select a comma separated column list, or `*`
    pub fn select(mut self, fields: &str) -> Self {
        self.columns.extend(
            fields
                .split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string),
        );
        self
    }

    /// Set the table to select from
    pub fn from(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Require `column = value`
    pub fn where_eq<T: Into<Value>>(mut self, column: &str, value: T) -> Self {
        self.where_conditions
            .push(WhereCondition::equals(column, value.into()));
        self
    }

    /// Require `column IN (values)`; an empty list admits no rows
    pub fn where_in<T: Into<Value>>(mut self, column: &str, values: Vec<T>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.where_conditions
            .push(WhereCondition::one_of(column, values));
        self
    }

    /// Add a predicate written as SQL
    pub fn where_raw(mut self, sql: &str) -> Self {
        self.where_conditions.push(WhereCondition::raw(sql));
        self
    }

    pub fn limit(mut self, count: i64) -> Self {
        self.limit_count = Some(count);
        self
    }

    /// Table the query selects from, if set
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Attached WHERE conditions, in attachment order
    pub fn where_conditions(&self) -> &[WhereCondition] {
        &self.where_conditions
    }

    pub fn limit_count(&self) -> Option<i64> {
        self.limit_count
    }
}
