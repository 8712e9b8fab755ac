//! HasMany Relationship - Parent-bound has-many relation with lazy loading

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ModelResult;
use crate::model::Model;
use crate::query::QueryBuilder;

use super::has_one_or_many::HasOneOrMany;
use super::traits::{RecordStore, RelationExecutor, Relationship, RelationshipMeta};

/// HasMany relationship - parent model has many related models
pub struct HasMany<Parent, Related> {
    parent: Parent,
    relation: HasOneOrMany<Parent, Related>,
    related: Vec<Related>,
    loaded: bool,
}

impl<Parent, Related> HasMany<Parent, Related>
where
    Parent: Model,
    Related: Model,
{
    /// Create a new HasMany relationship through `foreign_key` on `Related`
    pub fn new(parent: Parent, foreign_key: &str) -> ModelResult<Self> {
        Ok(Self::from_relation(parent, HasOneOrMany::has_many(foreign_key)?))
    }

    /// Bind an existing relation definition to `parent`
    pub fn from_relation(parent: Parent, relation: HasOneOrMany<Parent, Related>) -> Self {
        Self {
            parent,
            relation,
            related: Vec::new(),
            loaded: false,
        }
    }

    /// Relation definition shared with eager loading
    pub fn relation(&self) -> &HasOneOrMany<Parent, Related> {
        &self.relation
    }

    /// Get all related models
    pub fn get(&self) -> &[Related] {
        &self.related
    }

    /// Take ownership of all related models
    pub fn take(&mut self) -> Vec<Related> {
        std::mem::take(&mut self.related)
    }

    /// Set the related models, e.g. from an eager load slot
    pub fn set(&mut self, related: Vec<Related>) {
        self.related = related;
        self.loaded = true;
    }

    /// Get the count of related models
    pub fn len(&self) -> usize {
        self.related.len()
    }

    /// Check if there are any related models
    pub fn is_empty(&self) -> bool {
        self.related.is_empty()
    }

    /// Iterate over related models
    pub fn iter(&self) -> std::slice::Iter<'_, Related> {
        self.related.iter()
    }

    /// Create and persist a related model owned by the parent
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
impl<Parent, Related> Relationship<Parent, Related> for HasMany<Parent, Related>
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
        self.relation.add_constraints(&self.parent, self.relation.query())
    }

    async fn load<E>(&mut self, executor: &E) -> ModelResult<()>
    where
        E: RelationExecutor<Related>,
    {
        let query = self.query()?;
        self.related = executor.fetch(query).await?;
        self.loaded = true;
        Ok(())
    }
}

impl<Parent, Related> IntoIterator for HasMany<Parent, Related> {
    type Item = Related;
    type IntoIter = std::vec::IntoIter<Related>;

    fn into_iter(self) -> Self::IntoIter {
        self.related.into_iter()
    }
}

impl<'a, Parent, Related> IntoIterator for &'a HasMany<Parent, Related> {
    type Item = &'a Related;
    type IntoIter = std::slice::Iter<'a, Related>;

    fn into_iter(self) -> Self::IntoIter {
        self.related.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::relationships::tests::fixtures::{Post, User};
    use crate::relationships::tests::MemoryTable;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_fetches_only_parent_rows() {
        let table = MemoryTable::with_rows(vec![
            Post::new(1, Some(1), "a"),
            Post::new(2, Some(2), "x"),
            Post::new(3, Some(1), "b"),
        ]);
        let mut posts = HasMany::<User, Post>::new(User::new(1, "ann"), "user_id").unwrap();
        assert!(!posts.is_loaded());

        posts.load(&table).await.unwrap();

        assert!(posts.is_loaded());
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(table.executed_sql(), vec!["SELECT * FROM posts WHERE user_id = $1"]);
    }

    #[tokio::test]
    async fn test_load_without_parent_key_fails_before_query() {
        let table = MemoryTable::<Post>::new();
        let mut posts = HasMany::<User, Post>::new(User::unsaved("ann"), "user_id").unwrap();

        let err = posts.load(&table).await.unwrap_err();

        assert!(matches!(err, ModelError::UndefinedParentKey { .. }));
        assert!(table.executed_sql().is_empty());
        assert!(!posts.is_loaded());
    }

    #[tokio::test]
    async fn test_create_through_container() {
        let table = MemoryTable::<Post>::new();
        let posts = HasMany::<User, Post>::new(User::new(4, "dee"), "user_id").unwrap();

        let post = posts
            .create(serde_json::from_value(json!({"title": "new"})).unwrap(), &table)
            .await
            .unwrap();

        assert_eq!(post.user_id, Some(4));
        assert_eq!(posts.parent().id, Some(4));
    }

    #[test]
    fn test_set_take_and_iterate() {
        let mut posts = HasMany::<User, Post>::new(User::new(1, "ann"), "user_id").unwrap();
        posts.set(vec![Post::new(1, Some(1), "a"), Post::new(2, Some(1), "b")]);

        assert!(posts.is_loaded());
        assert_eq!(posts.len(), 2);
        assert_eq!((&posts).into_iter().count(), 2);

        let taken = posts.take();
        assert_eq!(taken.len(), 2);
        assert!(posts.is_empty());
    }
}
