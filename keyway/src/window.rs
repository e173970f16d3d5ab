//! The shrinking window over the previous children.
//!
//! Slots are `Option`s so a key that was moved out of the middle of the window
//! can be tombstoned in place instead of shifting its neighbours. The key → index
//! map is only built when the four end-to-end comparisons all fail, and only once
//! per diff.

use core::hash::Hash;
use rapidhash::RapidHashMap as HashMap;

pub(crate) struct PrevWindow<'a, K> {
    slots: Vec<Option<&'a K>>,
    index: Option<HashMap<&'a K, usize>>,
}

impl<'a, K: Eq + Hash> PrevWindow<'a, K> {
    pub(crate) fn new(prev: &'a [K]) -> Self {
        Self {
            slots: prev.iter().map(Some).collect(),
            index: None,
        }
    }

    /// Key at `idx`, or `None` if the slot was tombstoned.
    #[inline]
    pub(crate) fn get(&self, idx: usize) -> Option<&'a K> {
        self.slots.get(idx).copied().flatten()
    }

    /// Index of `key` among the slots that were live in `start..end` when the
    /// map was first requested.
    pub(crate) fn position(&mut self, key: &K, start: usize, end: usize) -> Option<usize> {
        let slots = &self.slots;
        let index = self.index.get_or_insert_with(|| {
            let mut map = HashMap::default();
            for (idx, slot) in slots.iter().enumerate().take(end).skip(start) {
                if let Some(key) = slot {
                    map.insert(*key, idx);
                }
            }
            map
        });
        index.get(key).copied()
    }

    /// Remove the key at `idx`, leaving a tombstone.
    pub(crate) fn take(&mut self, idx: usize) -> Option<&'a K> {
        self.slots.get_mut(idx).and_then(Option::take)
    }

    #[cfg(test)]
    pub(crate) fn has_index(&self) -> bool {
        self.index.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_lazy() {
        let prev = ["a", "b", "c"];
        let mut window = PrevWindow::new(&prev);
        assert!(!window.has_index());
        assert_eq!(window.position(&"b", 0, 3), Some(1));
        assert!(window.has_index());
    }

    #[test]
    fn test_index_respects_range() {
        let prev = ["a", "b", "c", "d"];
        let mut window = PrevWindow::new(&prev);
        assert_eq!(window.position(&"a", 1, 3), None);
        // The map is frozen on first use.
        assert_eq!(window.position(&"d", 0, 4), None);
        assert_eq!(window.position(&"c", 0, 4), Some(2));
    }

    #[test]
    fn test_take_leaves_tombstone() {
        let prev = ["a", "b"];
        let mut window = PrevWindow::new(&prev);
        assert_eq!(window.take(1), Some(&"b"));
        assert_eq!(window.get(1), None);
        assert_eq!(window.take(1), None);
        assert_eq!(window.get(0), Some(&"a"));
    }
}
