//! Conditions a relation query can carry

use std::fmt;

use serde_json::Value;

/// Comparison applied by a [`WhereCondition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    /// `column = value`
    Equal,
    /// `column IN (values)`
    In,
    /// Verbatim SQL carried in `value`
    Raw,
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            QueryOperator::Equal => "=",
            QueryOperator::In => "IN",
            QueryOperator::Raw => "RAW",
        };
        f.write_str(keyword)
    }
}

/// One conjunct of a query's WHERE clause
///
/// `value` is set for `Equal` and `Raw`, `values` for `In`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub column: String,
    pub operator: QueryOperator,
    pub value: Option<Value>,
    pub values: Vec<Value>,
}

impl WhereCondition {
    pub(crate) fn equals(column: &str, value: Value) -> Self {
        Self {
            column: column.to_string(),
            operator: QueryOperator::Equal,
            value: Some(value),
            values: Vec::new(),
        }
    }

    pub(crate) fn one_of(column: &str, values: Vec<Value>) -> Self {
        Self {
            column: column.to_string(),
            operator: QueryOperator::In,
            value: None,
            values,
        }
    }

    pub(crate) fn raw(sql: &str) -> Self {
        Self {
            column: String::new(),
            operator: QueryOperator::Raw,
            value: Some(Value::String(sql.to_string())),
            values: Vec::new(),
        }
    }
}
