//! HasOne Relationship - Parent-bound has-one relation with lazy loading

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ModelResult;
use crate::model::Model;
use crate::query::QueryBuilder;

use super::has_one_or_many::HasOneOrMany;
use super::traits::{RecordStore, RelationExecutor, Relationship, RelationshipMeta};

/// HasOne relationship - parent model has one related model
pub struct HasOne<Parent, Related> {
    parent: Parent,
    relation: HasOneOrMany<Parent, Related>,
    related: Option<Related>,
    loaded: bool,
}

impl<Parent, Related> HasOne<Parent, Related>
where
    Parent: Model,
    Related: Model,
{
    /// Create a new HasOne relationship through `foreign_key` on `Related`
    pub fn new(parent: Parent, foreign_key: &str) -> ModelResult<Self> {
        Ok(Self::from_relation(parent, HasOneOrMany::has_one(foreign_key)?))
    }

    /// Bind an existing relation definition to `parent`
    pub fn from_relation(parent: Parent, relation: HasOneOrMany<Parent, Related>) -> Self {
        Self {
            parent,
            relation,
            related: None,
            loaded: false,
        }
    }

    /// Relation definition shared with eager loading
    pub fn relation(&self) -> &HasOneOrMany<Parent, Related> {
        &self.relation
    }

    /// Get the related model if loaded
    pub fn get(&self) -> Option<&Related> {
        self.related.as_ref()
    }

    /// Take ownership of the related model
    pub fn take(&mut self) -> Option<Related> {
        self.related.take()
    }

    /// Set the related model
    pub fn set(&mut self, related: Option<Related>) {
        self.related = related;
        self.loaded = true;
    }

    /// Create and persist the related model for the parent
    pub async fn create<S>(
        &self,
        attributes: HashMap<String, Value>,
        store: &S,
    ) -> ModelResult<Related>
    where
        S: RecordStore<Related>,
    {
        self.relation.create(&self.parent, attributes, store).await
    }
}

#[async_trait]
impl<Parent, Related> Relationship<Parent, Related> for HasOne<Parent, Related>
where
    Parent: Model + 'static,
    Related: Model + 'static,
{
    fn meta(&self) -> &RelationshipMeta {
        self.relation.meta()
    }

    fn parent(&self) -> &Parent {
        &self.parent
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    fn query(&self) -> ModelResult<QueryBuilder<Related>> {
        Ok(self
            .relation
            .add_constraints(&self.parent, self.relation.query())?
            .limit(1))
    }

    async fn load<E>(&mut self, executor: &E) -> ModelResult<()>
    where
        E: RelationExecutor<Related>,
    {
        let query = self.query()?;
        let results = executor.fetch(query).await?;
        self.related = results.into_iter().next();
        self.loaded = true;
        Ok(())
    }
}
