//! Relationship Traits - Core traits for relationship management and the
//! collaborators relations delegate I/O to

use async_trait::async_trait;

use crate::error::ModelResult;
use crate::model::Model;
use crate::query::QueryBuilder;

/// Relationship metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipMeta {
    pub foreign_key: String,
    pub local_key: String,
    pub related_table: String,
}

/// Executes relation queries and hydrates the related models
///
/// Results must come back in the order the underlying store returned them;
/// eager matching preserves that order per parent.
#[async_trait]
pub trait RelationExecutor<R>: Send + Sync
where
    R: Model + 'static,
{
    async fn fetch(&self, query: QueryBuilder<R>) -> ModelResult<Vec<R>>;
}

/// Persists related models created or associated through a relation
#[async_trait]
pub trait RecordStore<R>: Send + Sync
where
    R: Model + 'static,
{
    /// Save `record` and return the persisted model (with its generated key)
    ///
    /// Failures should be reported as `ModelError::Persistence`.
    async fn save(&self, record: R) -> ModelResult<R>;
}

/// Core relationship trait for relations bound to one parent
#[async_trait]
pub trait Relationship<Parent, Related>
where
    Parent: Model + 'static,
    Related: Model + 'static,
{
    /// Get relationship metadata
    fn meta(&self) -> &RelationshipMeta;

    /// Get the parent model instance
    fn parent(&self) -> &Parent;

    /// Check if the relationship has been loaded
    fn is_loaded(&self) -> bool;

    /// Mark the relationship as loaded
    fn set_loaded(&mut self, loaded: bool);

    /// Build the query for this relationship, constrained to the parent
    fn query(&self) -> ModelResult<QueryBuilder<Related>>;

    /// Load the relationship through `executor`
    async fn load<E>(&mut self, executor: &E) -> ModelResult<()>
    where
        E: RelationExecutor<Related>;
}
