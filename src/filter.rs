use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::utils::contains_ignore_case;

/// Predicate and ordering that derive the visible subset of a collection.
pub trait Filter<E>: Default + Clone {
    fn matches(&self, item: &E) -> bool;

    /// Ordering of the visible subset. Equal items keep collection order.
    fn compare(&self, _a: &E, _b: &E) -> Ordering {
        Ordering::Equal
    }
}

/// Accepts every record in collection order.
#[derive(Debug, Clone, Default)]
pub struct NoFilter;

impl<E> Filter<E> for NoFilter {
    fn matches(&self, _item: &E) -> bool {
        true
    }
}

/// One independent multi-select filter dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet<K: Ord> {
    selected: BTreeSet<K>,
}

impl<K: Ord> Default for Facet<K> {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Clone> Facet<K> {
    pub fn all_of<I: IntoIterator<Item = K>>(values: I) -> Self {
        Self {
            selected: values.into_iter().collect(),
        }
    }

    /// Flips membership of `value`; returns whether it is now selected.
    pub fn toggle(&mut self, value: K) -> bool {
        if self.selected.remove(&value) {
            false
        } else {
            self.selected.insert(value);
            true
        }
    }

    pub fn select(&mut self, value: K) {
        self.selected.insert(value);
    }

    pub fn deselect(&mut self, value: &K) {
        self.selected.remove(value);
    }

    pub fn select_all<I: IntoIterator<Item = K>>(&mut self, values: I) {
        self.selected.extend(values);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, value: &K) -> bool {
        self.selected.contains(value)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }
}

/// Case-insensitive search across several fields. An empty query matches.
pub fn matches_query(query: &str, fields: &[&str]) -> bool {
    let query = query.trim();
    query.is_empty() || fields.iter().any(|field| contains_ignore_case(field, query))
}
