//! Query Builder SQL generation

use serde_json::Value;

use super::builder::QueryBuilder;
use super::types::{QueryOperator, WhereCondition};

impl<M> QueryBuilder<M> {
    /// Render the query with `$n` placeholders, returning the bound values
    pub fn to_sql_with_params(&self) -> (String, Vec<Value>) {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        let mut sql = format!("SELECT {}", columns);
        if let Some(table) = &self.table {
            sql.push_str(" FROM ");
            sql.push_str(table);
        }

        let mut params = Vec::new();
        let predicates: Vec<String> = self
            .where_conditions
            .iter()
            .map(|condition| render_condition(condition, &mut params))
            .collect();
        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        if let Some(limit) = self.limit_count {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        (sql, params)
    }

    /// Render the query with `$n` placeholders
    pub fn to_sql(&self) -> String {
        self.to_sql_with_params().0
    }
}

fn placeholder(value: &Value, params: &mut Vec<Value>) -> String {
    params.push(value.clone());
    format!("${}", params.len())
}

fn render_condition(condition: &WhereCondition, params: &mut Vec<Value>) -> String {
    match condition.operator {
        QueryOperator::Equal => {
            let value = condition.value.as_ref().unwrap_or(&Value::Null);
            format!("{} = {}", condition.column, placeholder(value, params))
        }
        // `IN ()` is not valid SQL; an empty set admits nothing
        QueryOperator::In if condition.values.is_empty() => "0 = 1".to_string(),
        QueryOperator::In => {
            let placeholders: Vec<String> = condition
                .values
                .iter()
                .map(|value| placeholder(value, params))
                .collect();
            format!("{} IN ({})", condition.column, placeholders.join(", "))
        }
        QueryOperator::Raw => match &condition.value {
            Some(Value::String(raw)) => raw.clone(),
            _ => String::new(),
        },
    }
}
