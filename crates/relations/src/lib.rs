//! # elif-relations: Has-One-Or-Many Relationships for elif.rs
//!
//! Relationship resolution and eager loading for the elif.rs ORM. Given a
//! parent model, a relation locates related models through a shared foreign
//! key column, creates new related models pre-populated with that key, and
//! eager loads the relation for a whole batch of parents with one query
//! instead of one query per parent.
//!
//! Query execution and persistence stay outside this crate: they are reached
//! through the [`RelationExecutor`] and [`RecordStore`] traits.

pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod relationships;

// Re-export core traits and types
pub use config::*;
pub use error::*;
pub use model::*;
pub use query::*;
pub use relationships::*;
