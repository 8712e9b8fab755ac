//! HasOneOrMany - Shared machinery of has-one and has-many relations
//!
//! A parent owns every related model whose foreign key equals the parent's
//! primary key. This type builds the constraints selecting those models for
//! one parent or for a batch of parents, matches batch results back to their
//! parents, and creates related models keyed to a parent.

use std::collections::HashMap;
use std::marker::PhantomData;

use serde_json::Value;

use crate::config::RelationConfig;
use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::query::QueryBuilder;

use super::constraints::{Constraint, RelationQuery};
use super::dictionary::RelationDictionary;
use super::foreign_key::ForeignKey;
use super::keys::{dedupe_keys, parent_key, require_keys};
use super::matcher::{match_parents, Cardinality, EagerMatches};
use super::traits::{RecordStore, RelationExecutor, RelationshipMeta};

/// Relation from parent `P` to related models `R` through a foreign key on `R`
pub struct HasOneOrMany<P, R> {
    foreign_key: ForeignKey<R>,
    cardinality: Cardinality,
    config: RelationConfig,
    meta: RelationshipMeta,
    _parent: PhantomData<fn() -> P>,
}

impl<P, R> Clone for HasOneOrMany<P, R> {
    fn clone(&self) -> Self {
        Self {
            foreign_key: self.foreign_key.clone(),
            cardinality: self.cardinality,
            config: self.config.clone(),
            meta: self.meta.clone(),
            _parent: PhantomData,
        }
    }
}

impl<P, R> std::fmt::Debug for HasOneOrMany<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HasOneOrMany")
            .field("meta", &self.meta)
            .field("cardinality", &self.cardinality)
            .finish()
    }
}

impl<P, R> HasOneOrMany<P, R>
where
    P: Model,
    R: Model,
{
    /// Create a relation over an already validated foreign key
    pub fn new(foreign_key: ForeignKey<R>, cardinality: Cardinality) -> Self {
        let meta = RelationshipMeta {
            foreign_key: foreign_key.column().to_string(),
            local_key: P::primary_key_name().to_string(),
            related_table: R::table_name().to_string(),
        };

        Self {
            foreign_key,
            cardinality,
            config: RelationConfig::default(),
            meta,
            _parent: PhantomData,
        }
    }

    /// Has-one relation through `foreign_key` on `R`
    pub fn has_one(foreign_key: &str) -> ModelResult<Self> {
        Ok(Self::new(ForeignKey::new(foreign_key)?, Cardinality::One))
    }

    /// Has-many relation through `foreign_key` on `R`
    pub fn has_many(foreign_key: &str) -> ModelResult<Self> {
        Ok(Self::new(ForeignKey::new(foreign_key)?, Cardinality::Many))
    }

    /// Replace the relation configuration
    pub fn with_config(mut self, config: RelationConfig) -> ModelResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn foreign_key(&self) -> &ForeignKey<R> {
        &self.foreign_key
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn config(&self) -> &RelationConfig {
        &self.config
    }

    pub fn meta(&self) -> &RelationshipMeta {
        &self.meta
    }

    /// Unconstrained query over the related table
    pub fn query(&self) -> QueryBuilder<R> {
        QueryBuilder::new().select("*").from(R::table_name())
    }

    /// Constraint selecting the models owned by `parent`
    pub fn constraint_for(&self, parent: &P) -> ModelResult<Constraint> {
        let key = parent_key(parent).ok_or_else(|| ModelError::UndefinedParentKey {
            model: P::table_name().to_string(),
        })?;
        Ok(Constraint::single(&self.foreign_key, key))
    }

    /// Constrain `query` to the models owned by `parent`
    pub fn add_constraints<Q: RelationQuery>(&self, parent: &P, query: Q) -> ModelResult<Q> {
        let constraint = self.constraint_for(parent)?;
        tracing::debug!(
            "Constraining {} to {} = {}",
            self.meta.related_table,
            self.meta.foreign_key,
            constraint.keys()[0]
        );
        Ok(constraint.apply(query))
    }

    /// Constraint selecting the models owned by any of `parents`
    ///
    /// Every parent must have a key. Zero parents yield a constraint matching
    /// no rows.
    pub fn eager_constraint_for(&self, parents: &[P]) -> ModelResult<Constraint> {
        let mut keys = require_keys(parents)?;
        if self.config.deduplicate_eager_keys {
            keys = dedupe_keys(keys);
        }

        if let Some(max) = self.config.max_eager_keys {
            if keys.len() > max {
                return Err(ModelError::Validation(format!(
                    "eager load of {} needs {} keys, limit is {}",
                    self.meta.related_table,
                    keys.len(),
                    max
                )));
            }
        }

        Ok(Constraint::batch(&self.foreign_key, keys))
    }

    /// Constrain `query` to the models owned by any of `parents`
    pub fn add_eager_constraints<Q: RelationQuery>(
        &self,
        parents: &[P],
        query: Q,
    ) -> ModelResult<Q> {
        let constraint = self.eager_constraint_for(parents)?;
        if constraint.matches_nothing() {
            tracing::debug!(
                "No parents to eager load {} for; query will match no rows",
                self.meta.related_table
            );
        } else {
            tracing::debug!(
                "Eager constraining {} to {} IN ({} keys)",
                self.meta.related_table,
                self.meta.foreign_key,
                constraint.keys().len()
            );
        }
        Ok(constraint.apply(query))
    }

    /// Group fetched related models by foreign key
    pub fn build_dictionary(&self, results: Vec<R>) -> ModelResult<RelationDictionary<R>> {
        let dictionary = RelationDictionary::build(results, &self.foreign_key)?;
        if self.config.warn_on_null_foreign_keys && !dictionary.unkeyed().is_empty() {
            tracing::warn!(
                "{} {} rows have a null {} and match no parent",
                dictionary.unkeyed().len(),
                self.meta.related_table,
                self.meta.foreign_key
            );
        }
        Ok(dictionary)
    }

    /// Match eager loaded `results` to `parents` under `relation`
    ///
    /// Either every parent receives a slot or, when the results cannot be
    /// grouped, the call fails without producing any.
    pub fn match_eager(
        &self,
        parents: &[P],
        results: Vec<R>,
        relation: &str,
    ) -> ModelResult<EagerMatches<R>>
    where
        R: Clone,
    {
        let dictionary = self.build_dictionary(results)?;
        let matches = match_parents(parents, &dictionary, relation, self.cardinality);
        tracing::trace!(
            "Matched {} for {} parents ({} with related rows)",
            relation,
            matches.len(),
            matches.matched_count()
        );
        Ok(matches)
    }

    /// Eager load `relation` for `parents` with a single query
    pub async fn eager_load<E>(
        &self,
        parents: &[P],
        relation: &str,
        executor: &E,
    ) -> ModelResult<EagerMatches<R>>
    where
        E: RelationExecutor<R>,
        R: Clone,
    {
        let query = self.add_eager_constraints(parents, self.query())?;
        let results = executor.fetch(query).await?;
        self.match_eager(parents, results, relation)
    }

    /// Merge the parent's key into `attributes` under the foreign key column
    ///
    /// The parent key overrides any caller supplied value for that column and
    /// is written in the parent's own representation.
    pub fn attributes_for(
        &self,
        parent: &P,
        mut attributes: HashMap<String, Value>,
    ) -> ModelResult<HashMap<String, Value>> {
        let key = parent.primary_key().ok_or_else(|| {
            ModelError::InvalidParent(format!(
                "{} model has no primary key; cannot relate {} to it",
                P::table_name(),
                self.meta.related_table
            ))
        })?;

        attributes.insert(self.meta.foreign_key.clone(), key.to_value());
        Ok(attributes)
    }

    /// Build an unsaved related model keyed to `parent`
    pub fn make(&self, parent: &P, attributes: HashMap<String, Value>) -> ModelResult<R> {
        R::from_fields(self.attributes_for(parent, attributes)?)
    }

    /// Create and persist a related model keyed to `parent`
    pub async fn create<S>(
        &self,
        parent: &P,
        attributes: HashMap<String, Value>,
        store: &S,
    ) -> ModelResult<R>
    where
        S: RecordStore<R>,
    {
        let instance = self.make(parent, attributes)?;
        let saved = store.save(instance).await?;
        tracing::debug!(
            "Created {} row for {} {}",
            self.meta.related_table,
            P::table_name(),
            self.meta.foreign_key
        );
        Ok(saved)
    }

    /// Create several related models in order, stopping at the first failure
    pub async fn create_many<S>(
        &self,
        parent: &P,
        records: Vec<HashMap<String, Value>>,
        store: &S,
    ) -> ModelResult<Vec<R>>
    where
        S: RecordStore<R>,
    {
        let mut created = Vec::with_capacity(records.len());
        for attributes in records {
            created.push(self.create(parent, attributes, store).await?);
        }
        Ok(created)
    }

    /// Re-key an existing related model to `parent` and persist it
    pub async fn save<S>(&self, parent: &P, record: R, store: &S) -> ModelResult<R>
    where
        S: RecordStore<R>,
    {
        let attributes = self.attributes_for(parent, record.to_fields())?;
        store.save(R::from_fields(attributes)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrimaryKey;
    use crate::relationships::matcher::RelationSlot;
    use crate::relationships::tests::fixtures::{Post, Profile, Tag, User};
    use crate::relationships::tests::MemoryTable;
    use serde_json::json;

    fn posts_relation() -> HasOneOrMany<User, Post> {
        HasOneOrMany::has_many("user_id").unwrap()
    }

    fn attrs(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_meta() {
        let relation = posts_relation();
        assert_eq!(
            relation.meta(),
            &RelationshipMeta {
                foreign_key: "user_id".to_string(),
                local_key: "id".to_string(),
                related_table: "posts".to_string(),
            }
        );
        assert_eq!(relation.cardinality(), Cardinality::Many);
    }

    #[test]
    fn test_unknown_foreign_key_rejected() {
        let err = HasOneOrMany::<User, Post>::has_many("author_id").unwrap_err();
        assert!(matches!(err, ModelError::Relationship(_)));
    }

    #[test]
    fn test_add_constraints_for_single_parent() {
        let query = posts_relation()
            .add_constraints(&User::new(7, "ann"), posts_relation().query())
            .unwrap();

        let (sql, params) = query.to_sql_with_params();
        assert_eq!(sql, "SELECT * FROM posts WHERE user_id = $1");
        assert_eq!(params, vec![json!(7)]);
    }

    #[test]
    fn test_add_constraints_requires_parent_key() {
        let result =
            posts_relation().add_constraints(&User::unsaved("ann"), posts_relation().query());
        assert_eq!(
            result.unwrap_err(),
            ModelError::UndefinedParentKey {
                model: "users".to_string()
            }
        );
    }

    #[test]
    fn test_add_eager_constraints_preserves_order_and_dedupes() {
        let parents = vec![User::new(3, "c"), User::new(1, "a"), User::new(3, "c")];
        let query = posts_relation()
            .add_eager_constraints(&parents, posts_relation().query())
            .unwrap();

        let (sql, params) = query.to_sql_with_params();
        assert_eq!(sql, "SELECT * FROM posts WHERE user_id IN ($1, $2)");
        assert_eq!(params, vec![json!(3), json!(1)]);
    }

    #[test]
    fn test_add_eager_constraints_keeps_duplicates_when_configured() {
        let relation = posts_relation()
            .with_config(RelationConfig::new().with_deduplicated_keys(false))
            .unwrap();
        let parents = vec![User::new(3, "c"), User::new(3, "c")];

        let constraint = relation.eager_constraint_for(&parents).unwrap();
        assert_eq!(constraint.keys(), &[PrimaryKey::Integer(3), PrimaryKey::Integer(3)]);
    }

    #[test]
    fn test_add_eager_constraints_for_no_parents_matches_nothing() {
        let query = posts_relation()
            .add_eager_constraints(&[], posts_relation().query())
            .unwrap();
        assert_eq!(query.to_sql(), "SELECT * FROM posts WHERE 0 = 1");
    }

    #[test]
    fn test_add_eager_constraints_rejects_keyless_parent() {
        let parents = vec![User::new(1, "a"), User::unsaved("b")];
        let err = posts_relation()
            .add_eager_constraints(&parents, posts_relation().query())
            .unwrap_err();
        assert!(matches!(err, ModelError::UndefinedParentKey { .. }));
    }

    #[test]
    fn test_max_eager_keys_enforced() {
        let relation = posts_relation()
            .with_config(RelationConfig::new().with_max_eager_keys(2))
            .unwrap();
        let parents = vec![User::new(1, "a"), User::new(2, "b"), User::new(3, "c")];

        assert!(matches!(
            relation.eager_constraint_for(&parents),
            Err(ModelError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = posts_relation().with_config(RelationConfig::new().with_max_eager_keys(0));
        assert!(matches!(result, Err(ModelError::Configuration(_))));
    }

    #[test]
    fn test_match_eager_fails_whole_pass_on_malformed_results() {
        let relation = HasOneOrMany::<User, Tag>::has_many("post_id").unwrap();
        let results = vec![
            Tag::new(1, json!(1)),
            Tag::new(2, json!({"id": 1})),
        ];

        let err = relation
            .match_eager(&[User::new(1, "a")], results, "tags")
            .unwrap_err();
        assert!(matches!(err, ModelError::MalformedResults(_)));
    }

    #[test]
    fn test_has_one_match() {
        let relation = HasOneOrMany::<User, Profile>::has_one("user_id").unwrap();
        let parents = vec![User::new(1, "a"), User::new(2, "b")];
        let results = vec![
            Profile::new(10, Some(1), "first"),
            Profile::new(11, Some(1), "second"),
        ];

        let matches = relation.match_eager(&parents, results, "profile").unwrap();
        assert_eq!(matches.get(0).unwrap().as_one().unwrap().bio, "first");
        assert_eq!(matches.get(1).unwrap(), &RelationSlot::One(None));
    }

    #[test]
    fn test_attributes_for_overrides_caller_foreign_key() {
        let relation = HasOneOrMany::<User, Profile>::has_one("user_id").unwrap();
        let merged = relation
            .attributes_for(
                &User::new(5, "ann"),
                attrs(json!({"bio": "x", "user_id": 999})),
            )
            .unwrap();

        assert_eq!(merged, attrs(json!({"bio": "x", "user_id": 5})));
    }

    #[test]
    fn test_make_requires_parent_key() {
        let relation = posts_relation();
        let err = relation
            .make(&User::unsaved("ann"), attrs(json!({"title": "x"})))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidParent(_)));
    }

    #[tokio::test]
    async fn test_create_persists_keyed_model() {
        let store = MemoryTable::<Post>::new();
        let post = posts_relation()
            .create(
                &User::new(5, "ann"),
                attrs(json!({"title": "hello", "user_id": 999})),
                &store,
            )
            .await
            .unwrap();

        assert_eq!(post.user_id, Some(5));
        assert!(post.id.is_some());
        assert_eq!(store.rows(), vec![post]);
    }

    #[tokio::test]
    async fn test_create_invalid_parent_never_reaches_store() {
        let store = MemoryTable::<Post>::new();
        let err = posts_relation()
            .create(&User::unsaved("ann"), attrs(json!({"title": "hello"})), &store)
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::InvalidParent(_)));
        assert_eq!(store.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_propagates_persistence_error() {
        let store = MemoryTable::<Post>::failing("disk full");
        let err = posts_relation()
            .create(&User::new(1, "ann"), attrs(json!({"title": "hello"})), &store)
            .await
            .unwrap_err();

        assert_eq!(err, ModelError::Persistence("disk full".to_string()));
        assert_eq!(store.save_calls(), 1);
    }

    #[tokio::test]
    async fn test_create_many_in_order() {
        let store = MemoryTable::<Post>::new();
        let created = posts_relation()
            .create_many(
                &User::new(2, "bob"),
                vec![attrs(json!({"title": "one"})), attrs(json!({"title": "two"}))],
                &store,
            )
            .await
            .unwrap();

        let titles: Vec<_> = created.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "two"]);
        assert!(created.iter().all(|p| p.user_id == Some(2)));
    }

    #[tokio::test]
    async fn test_save_rekeys_existing_model() {
        let store = MemoryTable::<Post>::new();
        let saved = posts_relation()
            .save(&User::new(8, "eve"), Post::new(3, Some(1), "moved"), &store)
            .await
            .unwrap();

        assert_eq!(saved.user_id, Some(8));
        assert_eq!(saved.id, Some(3));
    }

    #[tokio::test]
    async fn test_eager_load_runs_single_query() {
        let table = MemoryTable::with_rows(vec![
            Post::new(1, Some(1), "a"),
            Post::new(2, Some(2), "c"),
            Post::new(3, Some(1), "b"),
            Post::new(4, Some(9), "other"),
        ]);
        let parents = vec![User::new(1, "ann"), User::new(2, "bob")];

        let matches = posts_relation()
            .eager_load(&parents, "posts", &table)
            .await
            .unwrap();

        assert_eq!(
            table.executed_sql(),
            vec!["SELECT * FROM posts WHERE user_id IN ($1, $2)"]
        );
        let first: Vec<_> = matches
            .get(0)
            .unwrap()
            .as_many()
            .unwrap()
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(matches.get(1).unwrap().len(), 1);
    }
}
