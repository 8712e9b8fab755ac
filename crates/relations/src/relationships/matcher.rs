//! Matcher - Assigns grouped related models back to their parents
//!
//! Matching does not touch the parent models. It produces an
//! [`EagerMatches`] side table, one slot per parent in input order, which the
//! caller merges into its own models (see [`EagerMatches::apply_to`]).

use crate::error::{ModelError, ModelResult};
use crate::model::{Model, PrimaryKey};

use super::dictionary::RelationDictionary;
use super::keys::parent_key;

/// How many related models one parent can own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one related model; the first match wins
    One,
    /// Any number of related models
    Many,
}

/// Relation data attached to one parent
#[derive(Debug, Clone, PartialEq)]
pub enum RelationSlot<R> {
    /// Result of a has-one relation; `None` means no related model
    One(Option<R>),
    /// Result of a has-many relation
    Many(Vec<R>),
}

impl<R> RelationSlot<R> {
    /// Related model of a has-one slot
    pub fn as_one(&self) -> Option<&R> {
        match self {
            RelationSlot::One(related) => related.as_ref(),
            RelationSlot::Many(_) => None,
        }
    }

    /// Related models of a has-many slot
    pub fn as_many(&self) -> Option<&[R]> {
        match self {
            RelationSlot::Many(related) => Some(related),
            RelationSlot::One(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RelationSlot::One(related) => related.is_none(),
            RelationSlot::Many(related) => related.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RelationSlot::One(related) => usize::from(related.is_some()),
            RelationSlot::Many(related) => related.len(),
        }
    }
}

impl<R: Clone> RelationSlot<R> {
    fn from_group(group: Option<&[R]>, cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::One => RelationSlot::One(group.and_then(|g| g.first()).cloned()),
            Cardinality::Many => RelationSlot::Many(group.map(<[R]>::to_vec).unwrap_or_default()),
        }
    }
}

/// Models that accept eager loaded relation data
pub trait RelationSetter<R> {
    /// Replace the named relation's loaded data
    fn set_relation(&mut self, relation: &str, slot: RelationSlot<R>);
}

/// Matching result for one eager load pass
///
/// Slot `i` belongs to the parent at index `i` of the matched parent slice.
#[derive(Debug, Clone, PartialEq)]
pub struct EagerMatches<R> {
    relation: String,
    cardinality: Cardinality,
    slots: Vec<(Option<PrimaryKey>, RelationSlot<R>)>,
}

impl<R> EagerMatches<R> {
    /// Relation name the matches were produced for
    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Slot for the parent at `index`
    pub fn get(&self, index: usize) -> Option<&RelationSlot<R>> {
        self.slots.get(index).map(|(_, slot)| slot)
    }

    /// Slot for the first parent whose key is `key`
    pub fn for_key(&self, key: &PrimaryKey) -> Option<&RelationSlot<R>> {
        let key = key.clone().normalized();
        self.slots
            .iter()
            .find(|(slot_key, _)| slot_key.as_ref() == Some(&key))
            .map(|(_, slot)| slot)
    }

    /// Parent keys and slots, in parent order
    pub fn iter(&self) -> impl Iterator<Item = (Option<&PrimaryKey>, &RelationSlot<R>)> {
        self.slots.iter().map(|(key, slot)| (key.as_ref(), slot))
    }

    /// Number of parents matched
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of parents that received at least one related model
    pub fn matched_count(&self) -> usize {
        self.slots.iter().filter(|(_, slot)| !slot.is_empty()).count()
    }

    /// Slots in parent order, dropping the keys
    pub fn into_slots(self) -> Vec<RelationSlot<R>> {
        self.slots.into_iter().map(|(_, slot)| slot).collect()
    }

    /// Write every slot into the corresponding parent
    ///
    /// `parents` must be the slice the matches were produced from. A length
    /// mismatch fails before any parent is modified.
    pub fn apply_to<P>(self, parents: &mut [P]) -> ModelResult<()>
    where
        P: RelationSetter<R>,
    {
        if parents.len() != self.slots.len() {
            return Err(ModelError::Relationship(format!(
                "cannot apply '{}' matches for {} parents to {} parents",
                self.relation,
                self.slots.len(),
                parents.len()
            )));
        }

        let relation = self.relation;
        for (parent, (_, slot)) in parents.iter_mut().zip(self.slots) {
            parent.set_relation(&relation, slot);
        }
        Ok(())
    }
}

/// Look up every parent's key in `dictionary`
///
/// A parent without a key receives an empty slot: it cannot own anything.
pub fn match_parents<P, R>(
    parents: &[P],
    dictionary: &RelationDictionary<R>,
    relation: &str,
    cardinality: Cardinality,
) -> EagerMatches<R>
where
    P: Model,
    R: Clone,
{
    let slots = parents
        .iter()
        .map(|parent| {
            let key = parent_key(parent);
            let group = key.as_ref().and_then(|key| dictionary.get(key));
            (key, RelationSlot::from_group(group, cardinality))
        })
        .collect();

    EagerMatches {
        relation: relation.to_string(),
        cardinality,
        slots,
    }
}
