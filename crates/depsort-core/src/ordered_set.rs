//! Insertion-ordered key set with constant-time removal.
//!
//! The set is a doubly linked list threaded through a `SecondaryMap`, so
//! membership checks, appends, removal of an arbitrary key and popping the
//! front are all O(1) while iteration still follows insertion order. The
//! sorter keeps its unsorted nodes and breakable edges in these.

use slotmap::{Key, SecondaryMap};

/// Neighbour links of one key in the list.
#[derive(Debug, Clone, Copy)]
struct Link<K> {
    prev: Option<K>,
    next: Option<K>,
}

/// An insertion-ordered set of slotmap keys.
#[derive(Debug, Clone)]
pub struct OrderedSet<K: Key> {
    links: SecondaryMap<K, Link<K>>,
    head: Option<K>,
    tail: Option<K>,
}

impl<K: Key> Default for OrderedSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> OrderedSet<K> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            links: SecondaryMap::new(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn contains(&self, key: K) -> bool {
        self.links.contains_key(key)
    }

    /// The oldest key still in the set.
    pub fn front(&self) -> Option<K> {
        self.head
    }

    /// The newest key still in the set.
    pub fn back(&self) -> Option<K> {
        self.tail
    }

    /// Append `key` at the back. Returns `false` (and keeps the original
    /// position) if the key is already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.links.contains_key(key) {
            return false;
        }

        let link = Link {
            prev: self.tail,
            next: None,
        };
        match self.tail {
            Some(tail) => {
                if let Some(tail_link) = self.links.get_mut(tail) {
                    tail_link.next = Some(key);
                }
            }
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.links.insert(key, link);
        true
    }

    /// Remove `key` wherever it sits. Returns `false` if it was not present.
    pub fn remove(&mut self, key: K) -> bool {
        let Some(link) = self.links.remove(key) else {
            return false;
        };

        match link.prev {
            Some(prev) => {
                if let Some(prev_link) = self.links.get_mut(prev) {
                    prev_link.next = link.next;
                }
            }
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => {
                if let Some(next_link) = self.links.get_mut(next) {
                    next_link.prev = link.prev;
                }
            }
            None => self.tail = link.prev,
        }
        true
    }

    /// Remove and return the oldest key.
    pub fn pop_front(&mut self) -> Option<K> {
        let head = self.head?;
        self.remove(head);
        Some(head)
    }

    /// Iterate keys in insertion order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            set: self,
            cursor: self.head,
        }
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.head = None;
        self.tail = None;
    }
}

impl<K: Key> FromIterator<K> for OrderedSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<K: Key> Extend<K> for OrderedSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: Key> IntoIterator for &'a OrderedSet<K> {
    type Item = K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over an [`OrderedSet`] in insertion order.
pub struct Iter<'a, K: Key> {
    set: &'a OrderedSet<K>,
    cursor: Option<K>,
}

impl<K: Key> Iterator for Iter<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let current = self.cursor?;
        self.cursor = self.set.links.get(current).and_then(|link| link.next);
        Some(current)
    }
}
