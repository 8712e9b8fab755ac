//! Query Builder Module - SELECT queries relations hand to their executor

pub mod builder;
pub mod sql_generation;
pub mod types;

pub use builder::QueryBuilder;
pub use types::{QueryOperator, WhereCondition};
