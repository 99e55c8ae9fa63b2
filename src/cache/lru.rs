//! LRU Entry Store Module
//!
//! Keyed entry storage threaded onto an intrusive recency list. Lookup,
//! promotion, insertion and removal from either end are all O(1).

use std::collections::HashMap;

use crate::cache::CacheEntry;

/// Index into the slot arena.
type NodeIndex = usize;

/// Sentinel for a missing link.
const NIL: NodeIndex = usize::MAX;

/// Recency links for one slot.
///
/// `prev` points towards the most recently used end, `next` towards the
/// least recently used end.
#[derive(Debug, Clone, Copy)]
struct Links {
    prev: NodeIndex,
    next: NodeIndex,
}

impl Links {
    const DETACHED: Links = Links {
        prev: NIL,
        next: NIL,
    };
}

// == LRU Store ==
/// Entry storage ordered by recency of use.
///
/// - Head = most recently used
/// - Tail = least recently used
///
/// Freed slots are recycled through a free list so steady-state churn does
/// not grow the arena. The store also keeps the running byte total of its
/// entries, updated on every insertion and removal.
#[derive(Debug)]
pub struct LruStore<V> {
    /// Key to slot index
    index: HashMap<String, NodeIndex>,
    /// Entry arena; `None` marks a free slot
    slots: Vec<Option<CacheEntry<V>>>,
    /// Recency links, parallel to `slots`
    links: Vec<Links>,
    /// Recycled slot indices
    free: Vec<NodeIndex>,
    head: NodeIndex,
    tail: NodeIndex,
    /// Sum of `size_bytes` over live entries
    total_bytes: usize,
}

impl<V> LruStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
            links: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            total_bytes: 0,
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Sum of the estimated sizes of all stored entries.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Get ==
    /// Looks up an entry without changing its recency.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_ref()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    ///
    /// Returns false if the key is not stored.
    pub fn touch(&mut self, key: &str) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                self.move_to_head(idx);
                true
            }
            None => false,
        }
    }

    // == Put ==
    /// Stores an entry as most recently used.
    ///
    /// An entry already stored under the same key is replaced and returned.
    pub fn put(&mut self, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        let previous = self.remove(&entry.key);

        let key = entry.key.clone();
        self.total_bytes += entry.size_bytes;
        let idx = self.alloc(entry);
        self.index.insert(key, idx);
        self.push_head(idx);

        previous
    }

    // == Remove ==
    /// Removes and returns the entry stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let idx = self.index.remove(key)?;
        self.release(idx)
    }

    // == Least Recently Used ==
    /// Returns the key at the least recently used end.
    pub fn least_recently_used(&self) -> Option<&str> {
        if self.tail == NIL {
            return None;
        }
        self.slots[self.tail].as_ref().map(|entry| entry.key.as_str())
    }

    // == Pop LRU ==
    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<CacheEntry<V>> {
        if self.tail == NIL {
            return None;
        }
        let entry = self.release(self.tail)?;
        self.index.remove(&entry.key);
        Some(entry)
    }

    // == Clear ==
    /// Drops every entry and returns how many were stored.
    pub fn clear(&mut self) -> usize {
        let removed = self.index.len();
        self.index.clear();
        self.slots.clear();
        self.links.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        self.total_bytes = 0;
        removed
    }

    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            store: self,
            cursor: self.tail,
        }
    }

    // == Slot Management ==
    fn alloc(&mut self, entry: CacheEntry<V>) -> NodeIndex {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                self.links[idx] = Links::DETACHED;
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.links.push(Links::DETACHED);
                self.slots.len() - 1
            }
        }
    }

    /// Unlinks a slot, frees it, and settles the byte total.
    ///
    /// The caller is responsible for the key index.
    fn release(&mut self, idx: NodeIndex) -> Option<CacheEntry<V>> {
        self.detach(idx);
        let entry = self.slots[idx].take()?;
        self.free.push(idx);
        self.total_bytes -= entry.size_bytes;
        Some(entry)
    }

    // == Linked List Operations ==
    fn detach(&mut self, idx: NodeIndex) {
        let Links { prev, next } = self.links[idx];

        if prev != NIL {
            self.links[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.links[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.links[idx] = Links::DETACHED;
    }

    fn push_head(&mut self, idx: NodeIndex) {
        self.links[idx] = Links {
            prev: NIL,
            next: self.head,
        };

        if self.head != NIL {
            self.links[self.head].prev = idx;
        }
        self.head = idx;

        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn move_to_head(&mut self, idx: NodeIndex) {
        if self.head == idx {
            return;
        }
        self.detach(idx);
        self.push_head(idx);
    }
}

impl<V> Default for LruStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Iterator over entries, least recently used first.
pub struct Iter<'a, V> {
    store: &'a LruStore<V>,
    cursor: NodeIndex,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a CacheEntry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let idx = self.cursor;
        self.cursor = self.store.links[idx].prev;
        self.store.slots[idx].as_ref()
    }
}
