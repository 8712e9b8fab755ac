//! Parent key extraction for relation constraints

use std::collections::HashSet;

use crate::error::{ModelError, ModelResult};
use crate::model::{Model, PrimaryKey};

/// Primary key of `parent`, normalised to compare equal to foreign keys
pub fn parent_key<P: Model>(parent: &P) -> Option<PrimaryKey> {
    parent.primary_key().map(PrimaryKey::normalized)
}

/// Primary keys of `parents`, one per parent, in input order
///
/// Duplicates are kept and an undefined key is reported as `None`.
pub fn extract_keys<P: Model>(parents: &[P]) -> Vec<Option<PrimaryKey>> {
    parents.iter().map(parent_key).collect()
}

/// Primary keys of `parents`, failing on the first parent without one
pub fn require_keys<P: Model>(parents: &[P]) -> ModelResult<Vec<PrimaryKey>> {
    extract_keys(parents)
        .into_iter()
        .map(|key| {
            key.ok_or_else(|| ModelError::UndefinedParentKey {
                model: P::table_name().to_string(),
            })
        })
        .collect()
}

/// Drop repeated keys, keeping the first occurrence of each
pub fn dedupe_keys(keys: Vec<PrimaryKey>) -> Vec<PrimaryKey> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.into_iter().filter(|key| seen.insert(key.clone())).collect()
}
