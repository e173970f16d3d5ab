//! Key ↔ host-element side table.
//!
//! Only the reconciler writes here. Everyone else gets the read half.

use core::hash::Hash;
use rapidhash::RapidHashMap as HashMap;

use crate::{NodeKey, TextDirection};

/// Bidirectional key ↔ element map plus the cached subtree text of each
/// element node.
#[derive(Debug, Clone)]
pub struct Registry<E> {
    elements: HashMap<NodeKey, E>,
    keys: HashMap<E, NodeKey>,
    text_memo: HashMap<E, String>,
    /// Direction the last pass forced onto the root container.
    forced_direction: Option<TextDirection>,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            elements: HashMap::default(),
            keys: HashMap::default(),
            text_memo: HashMap::default(),
            forced_direction: None,
        }
    }
}

impl<E: Copy + Eq + Hash> Registry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host element currently registered for `key`.
    pub fn element(&self, key: &str) -> Option<E> {
        self.elements.get(key).copied()
    }

    /// Key that owns `element`.
    pub fn key_of(&self, element: E) -> Option<&NodeKey> {
        self.keys.get(&element)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.elements.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &NodeKey> + '_ {
        self.elements.keys()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Cached subtree text of an element node.
    pub fn text_memo(&self, element: E) -> Option<&str> {
        self.text_memo.get(&element).map(String::as_str)
    }

    /// Direction currently forced onto the root container, if any.
    pub fn forced_direction(&self) -> Option<TextDirection> {
        self.forced_direction
    }

    pub(crate) fn set_forced_direction(&mut self, direction: Option<TextDirection>) {
        self.forced_direction = direction;
    }

    /// Register `element` for `key`. A previous element of the same key keeps
    /// its reverse entry until it is released, since it may still be attached
    /// somewhere in the host until its old parent is diffed.
    pub(crate) fn insert(&mut self, key: NodeKey, element: E) {
        self.keys.insert(element, key.clone());
        self.elements.insert(key, element);
    }

    pub(crate) fn set_text_memo(&mut self, element: E, text: String) {
        self.text_memo.insert(element, text);
    }

    /// Drop the reverse entry and memo of a host element that is going away.
    pub(crate) fn release_element(&mut self, element: E) -> Option<NodeKey> {
        self.text_memo.remove(&element);
        self.keys.remove(&element)
    }

    /// Remove the forward entry of `key`, but only if it still points at
    /// `element`.
    pub(crate) fn remove_key_if(&mut self, key: &str, element: E) {
        if self.elements.get(key) == Some(&element) {
            self.elements.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup_both_ways() {
        let mut registry = Registry::new();
        registry.insert(NodeKey::from("p1"), 7u32);
        assert_eq!(registry.element("p1"), Some(7));
        assert_eq!(registry.key_of(7).map(NodeKey::as_str), Some("p1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reinsert_keeps_stale_reverse_entry() {
        let mut registry = Registry::new();
        registry.insert(NodeKey::from("p1"), 1u32);
        registry.insert(NodeKey::from("p1"), 2);
        assert_eq!(registry.element("p1"), Some(2));
        assert_eq!(registry.key_of(1).map(NodeKey::as_str), Some("p1"));

        registry.release_element(1);
        registry.remove_key_if("p1", 1);
        assert_eq!(registry.element("p1"), Some(2));
        assert!(registry.key_of(1).is_none());
    }

    #[test]
    fn test_release_drops_memo() {
        let mut registry = Registry::new();
        registry.insert(NodeKey::from("p1"), 1u32);
        registry.set_text_memo(1, "hi".to_string());
        assert_eq!(registry.text_memo(1), Some("hi"));
        registry.release_element(1);
        registry.remove_key_if("p1", 1);
        assert_eq!(registry.text_memo(1), None);
        assert!(registry.is_empty());
    }
}
