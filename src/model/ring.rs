use std::collections::VecDeque;
use std::collections::vec_deque;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fixed-capacity history, most recent first.
///
/// Pushing onto a full log evicts the oldest entry. Serializes as a plain
/// JSON array; deserializing an over-long array keeps the newest `CAP` items.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedLog<T, const CAP: usize> {
    items: VecDeque<T>,
}

impl<T, const CAP: usize> BoundedLog<T, CAP> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(CAP),
        }
    }

    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Insert at the front, evicting from the back past capacity.
    pub fn push(&mut self, item: T) {
        self.items.push_front(item);
        self.items.truncate(CAP);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// The `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        self.items.iter().take(n)
    }
}

impl<T: Clone, const CAP: usize> BoundedLog<T, CAP> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T, const CAP: usize> Default for BoundedLog<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, const CAP: usize> IntoIterator for &'a BoundedLog<T, CAP> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T, const CAP: usize> FromIterator<T> for BoundedLog<T, CAP> {
    /// Items are taken newest first, matching iteration order.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: VecDeque<T> = iter.into_iter().take(CAP).collect();
        Self { items }
    }
}

impl<T: Serialize, const CAP: usize> Serialize for BoundedLog<T, CAP> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>, const CAP: usize> Deserialize<'de> for BoundedLog<T, CAP> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut items = VecDeque::<T>::deserialize(deserializer)?;
        items.truncate(CAP);
        Ok(Self { items })
    }
}
