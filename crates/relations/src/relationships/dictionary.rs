//! Relation Dictionary - Groups fetched related models by foreign key value
//!
//! The dictionary is built once per eager load pass so that matching costs a
//! hash lookup per parent instead of a scan of the results.

use std::collections::HashMap;

use crate::error::ModelResult;
use crate::model::{Model, PrimaryKey};

use super::foreign_key::ForeignKey;

/// Related models grouped by their foreign key value
///
/// Models whose foreign key is null or missing are kept in a separate group.
/// That group is never returned for a parent key lookup.
#[derive(Debug, Clone)]
pub struct RelationDictionary<R> {
    groups: HashMap<PrimaryKey, Vec<R>>,
    unkeyed: Vec<R>,
}

impl<R> Default for RelationDictionary<R> {
    fn default() -> Self {
        Self {
            groups: HashMap::new(),
            unkeyed: Vec::new(),
        }
    }
}

impl<R: Model> RelationDictionary<R> {
    /// Group `results` by the value of `foreign_key`
    ///
    /// Arrival order is preserved inside each group. A foreign key value that
    /// cannot serve as a key fails the whole build.
    pub fn build<I>(results: I, foreign_key: &ForeignKey<R>) -> ModelResult<Self>
    where
        I: IntoIterator<Item = R>,
    {
        let mut dictionary = Self::default();
        let mut records = 0usize;

        for result in results {
            records += 1;
            match foreign_key.value_of(&result)? {
                Some(key) => dictionary.groups.entry(key).or_default().push(result),
                None => dictionary.unkeyed.push(result),
            }
        }

        tracing::trace!(
            "Built relation dictionary on {}: {} records in {} groups ({} without key)",
            foreign_key,
            records,
            dictionary.groups.len(),
            dictionary.unkeyed.len()
        );

        Ok(dictionary)
    }
}

impl<R> RelationDictionary<R> {
    /// Models owned by `key`, in arrival order
    pub fn get(&self, key: &PrimaryKey) -> Option<&[R]> {
        self.groups.get(&key.clone().normalized()).map(Vec::as_slice)
    }

    /// Models whose foreign key is null or missing
    pub fn unkeyed(&self) -> &[R] {
        &self.unkeyed
    }

    /// Whether a group exists for `key`
    pub fn contains_key(&self, key: &PrimaryKey) -> bool {
        self.groups.contains_key(&key.clone().normalized())
    }

    /// Foreign key values that have at least one model
    pub fn keys(&self) -> impl Iterator<Item = &PrimaryKey> {
        self.groups.keys()
    }

    /// Number of keyed groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.unkeyed.is_empty()
    }

    /// Total number of grouped models, including unkeyed ones
    pub fn record_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum::<usize>() + self.unkeyed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::relationships::tests::fixtures::{Post, Tag};

    fn user_fk() -> ForeignKey<Post> {
        ForeignKey::new("user_id").unwrap()
    }

    fn titles(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_groups_preserve_arrival_order() {
        let results = vec![
            Post::new(1, Some(1), "a"),
            Post::new(2, Some(2), "c"),
            Post::new(3, Some(1), "b"),
        ];

        let dictionary = RelationDictionary::build(results, &user_fk()).unwrap();

        assert_eq!(dictionary.len(), 2);
        assert_eq!(
            titles(dictionary.get(&PrimaryKey::Integer(1)).unwrap()),
            vec!["a", "b"]
        );
        assert_eq!(
            titles(dictionary.get(&PrimaryKey::Integer(2)).unwrap()),
            vec!["c"]
        );
        assert!(dictionary.get(&PrimaryKey::Integer(3)).is_none());
        assert_eq!(dictionary.record_count(), 3);
    }

    #[test]
    fn test_null_foreign_keys_kept_in_unkeyed_group() {
        let results = vec![Post::new(1, None, "x"), Post::new(2, Some(1), "a")];

        let dictionary = RelationDictionary::build(results, &user_fk()).unwrap();

        assert_eq!(titles(dictionary.unkeyed()), vec!["x"]);
        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.record_count(), 2);
    }

    #[test]
    fn test_build_is_deterministic() {
        let results = vec![
            Post::new(1, Some(2), "a"),
            Post::new(2, Some(1), "b"),
            Post::new(3, Some(2), "c"),
            Post::new(4, None, "d"),
        ];

        let first = RelationDictionary::build(results.clone(), &user_fk()).unwrap();
        let second = RelationDictionary::build(results, &user_fk()).unwrap();

        let mut keys: Vec<_> = first.keys().cloned().collect();
        keys.sort_by_key(|k| k.to_string());
        for key in keys {
            assert_eq!(first.get(&key), second.get(&key));
        }
        assert_eq!(first.unkeyed(), second.unkeyed());
    }

    #[test]
    fn test_lookup_normalises_text_key() {
        let results = vec![Post::new(1, Some(7), "a")];
        let dictionary = RelationDictionary::build(results, &user_fk()).unwrap();

        assert!(dictionary.contains_key(&PrimaryKey::String("7".into())));
        assert_eq!(
            titles(dictionary.get(&PrimaryKey::String("7".into())).unwrap()),
            vec!["a"]
        );
    }

    #[test]
    fn test_empty_results() {
        let dictionary = RelationDictionary::build(Vec::<Post>::new(), &user_fk()).unwrap();
        assert!(dictionary.is_empty());
    }

    #[test]
    fn test_unusable_foreign_key_fails_build() {
        let fk = ForeignKey::<Tag>::new("post_id").unwrap();
        let results = vec![
            Tag::new(1, serde_json::json!(1)),
            Tag::new(2, serde_json::json!(2.5)),
        ];

        let err = RelationDictionary::build(results, &fk).unwrap_err();
        assert!(matches!(err, ModelError::MalformedResults(_)));
    }
}
