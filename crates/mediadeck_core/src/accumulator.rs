use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Anything that carries a stable identity key.
pub trait Keyed {
    type Key: Clone + Eq + Hash + fmt::Debug;

    fn key(&self) -> Self::Key;
}

/// Ordered, de-duplicated list built from successive batches.
///
/// A key keeps the position of its first insertion; a later batch carrying
/// the same key replaces the value in place. The list only shrinks on
/// [`ListAccumulator::reset`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListAccumulator<T: Keyed> {
    entries: Vec<T>,
    index: HashMap<T::Key, usize>,
}

impl<T: Keyed> Default for ListAccumulator<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> ListAccumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts every item of `batch`. Returns how many keys were new.
    pub fn merge<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut added = 0;
        for item in batch {
            let key = item.key();
            match self.index.get(&key) {
                Some(&slot) => self.entries[slot] = item,
                None => {
                    self.index.insert(key, self.entries.len());
                    self.entries.push(item);
                    added += 1;
                }
            }
        }
        added
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }
}

impl<'a, T: Keyed> IntoIterator for &'a ListAccumulator<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
