use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

const NIL: usize = usize::MAX;
const PREALLOCATE_LIMIT: usize = 4096;

#[derive(Debug)]
struct Node<K, V> {
    key:   K,
    value: V,
    prev:  usize,
    next:  usize,
}

/// LRU (Least Recently Used) Cache with a fixed capacity.
///
/// Entries live in a slab and are threaded on a doubly linked list, most
/// recently used at `head`. Lookup, promotion, insertion and eviction are O(1).
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: NonZeroUsize,
    index:    HashMap<K, usize>,
    slots:    Vec<Option<Node<K, V>>>,
    free:     Vec<usize>,
    head:     usize,
    tail:     usize,
}

impl<K: Clone + Eq + Hash, V> LruCache<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        let reserve = capacity.get().min(PREALLOCATE_LIMIT);
        Self {
            capacity,
            index: HashMap::with_capacity(reserve),
            slots: Vec::with_capacity(reserve),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.unlink(slot);
        self.push_front(slot);
        self.node(slot).map(|n| &n.value)
    }

    /// Inserts `key` as most recently used.
    ///
    /// Returns the displaced entry: the previous value under `key` if it was
    /// already resident, otherwise the least recently used entry if the
    /// insertion pushed the cache past its capacity.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&slot) = self.index.get(&key) {
            self.unlink(slot);
            self.push_front(slot);
            let node = self.node_mut(slot)?;
            let old = std::mem::replace(&mut node.value, value);
            return Some((key, old));
        }

        let node = Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, slot);
        self.push_front(slot);

        if self.index.len() > self.capacity.get() {
            return self.pop_lru();
        }
        None
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        if self.tail == NIL {
            return None;
        }
        let slot = self.tail;
        self.unlink(slot);
        let node = self.slots[slot].take()?;
        self.index.remove(&node.key);
        self.free.push(slot);
        Some((node.key, node.value))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            cache:  self,
            cursor: self.head,
        }
    }

    fn node(&self, slot: usize) -> Option<&Node<K, V>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, slot: usize) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    fn unlink(&mut self, slot: usize) {
        let Some((prev, next)) = self.node(slot).map(|n| (n.prev, n.next)) else {
            return;
        };

        match self.node_mut(prev) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match self.node_mut(next) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(slot) {
            node.prev = NIL;
            node.next = NIL;
        }
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(slot) {
            node.prev = NIL;
            node.next = old_head;
        }
        match self.node_mut(old_head) {
            Some(h) => h.prev = slot,
            None => self.tail = slot,
        }
        self.head = slot;
    }
}

pub struct Keys<'a, K, V> {
    cache:  &'a LruCache<K, V>,
    cursor: usize,
}

impl<'a, K: Clone + Eq + Hash, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cache.node(self.cursor)?;
        self.cursor = node.next;
        Some(&node.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache<V>(capacity: usize) -> LruCache<i32, V> {
        LruCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn order<V>(cache: &LruCache<i32, V>) -> Vec<i32> {
        cache.keys().copied().collect()
    }

    #[test]
    fn test_lru_basic() {
        let mut cache = cache(3);

        assert_eq!(cache.insert(1, "a"), None);
        assert_eq!(cache.insert(2, "b"), None);
        assert_eq!(cache.insert(3, "c"), None);

        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.len(), 3);

        // Adding 4th item should evict 2 (least recently used)
        assert_eq!(cache.insert(4, "d"), Some((2, "b")));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&2));
        assert!(cache.contains(&1));
        assert!(cache.contains(&3));
        assert!(cache.contains(&4));
    }

    #[test]
    fn test_lru_access_order() {
        let mut cache = cache(2);

        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.get(&1); // Access 1, making 2 the LRU

        cache.insert(3, "c"); // Should evict 2
        assert!(!cache.contains(&2));
        assert!(cache.contains(&1));
        assert!(cache.contains(&3));
        assert_eq!(order(&cache), vec![3, 1]);
    }

    #[test]
    fn test_reinsert_replaces_value() {
        let mut cache = cache(2);
        cache.insert(1, "a");
        cache.insert(2, "b");
        assert_eq!(cache.insert(1, "z"), Some((1, "a")));
        assert_eq!(cache.len(), 2);
        assert_eq!(order(&cache), vec![1, 2]);
        assert_eq!(cache.get(&1), Some(&"z"));
    }

    #[test]
    fn test_capacity_one() {
        let mut cache = cache(1);
        assert_eq!(cache.insert(1, ()), None);
        assert_eq!(cache.insert(2, ()), Some((1, ())));
        assert_eq!(cache.get(&2), Some(&()));
        assert_eq!(order(&cache), vec![2]);
    }

    #[test]
    fn test_slots_are_reused() {
        let mut cache = cache(2);
        for i in 0..100 {
            cache.insert(i, i);
        }
        assert_eq!(cache.slots.len(), 3);
        assert_eq!(order(&cache), vec![99, 98]);
        assert_eq!(cache.pop_lru(), Some((98, 98)));
        assert_eq!(cache.pop_lru(), Some((99, 99)));
        assert_eq!(cache.pop_lru(), None);
        assert_eq!(cache.len(), 0);
    }
}
