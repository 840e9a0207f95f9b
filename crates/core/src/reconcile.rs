//! Mutation reconciliation
//!
//! After the server confirms a create or update it returns the canonical
//! entity. These helpers splice that entity into a locally held collection
//! without refetching it.
//!
//! Collections are `Vec<Arc<T>>`: entries that are not touched keep their
//! exact `Arc`, so anything comparing by pointer sees them as unchanged.
//! An entity with no local match is prepended.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// An entity with a stable server-assigned identity
pub trait Keyed {
    type Key: Copy + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;
}

/// Where an upserted entity ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Replaced the existing entry at this index
    Replaced(usize),
    /// No entry matched; inserted at the front
    Prepended,
}

/// Replace the entry matching `updated`'s key in place, or prepend it
pub fn upsert<T: Keyed>(items: &mut Vec<Arc<T>>, updated: T) -> Placement {
    match replace_existing(items, updated) {
        Ok(index) => Placement::Replaced(index),
        Err(updated) => {
            items.insert(0, Arc::new(updated));
            Placement::Prepended
        }
    }
}

/// Replace the entry matching `updated`'s key in place.
///
/// Hands the entity back when nothing matched.
pub fn replace_existing<T: Keyed>(items: &mut [Arc<T>], updated: T) -> Result<usize, T> {
    let key = updated.key();
    match items.iter().position(|item| item.key() == key) {
        Some(index) => {
            items[index] = Arc::new(updated);
            Ok(index)
        }
        None => Err(updated),
    }
}

/// Replace every entry that has a counterpart in `updates`, in one pass.
///
/// Updates without a local match are dropped. When `updates` holds the same
/// key twice the later one wins. Returns how many entries were replaced.
pub fn reconcile_batch<T, I>(items: &mut [Arc<T>], updates: I) -> usize
where
    T: Keyed,
    I: IntoIterator<Item = T>,
{
    let mut by_key: HashMap<T::Key, T> = updates.into_iter().map(|u| (u.key(), u)).collect();
    if by_key.is_empty() {
        return 0;
    }

    let mut replaced = 0;
    for slot in items.iter_mut() {
        if let Some(updated) = by_key.remove(&slot.key()) {
            *slot = Arc::new(updated);
            replaced += 1;
        }
    }
    replaced
}

/// Drop the entry with `key`, returning it
pub fn remove<T: Keyed>(items: &mut Vec<Arc<T>>, key: T::Key) -> Option<Arc<T>> {
    let index = items.iter().position(|item| item.key() == key)?;
    Some(items.remove(index))
}
