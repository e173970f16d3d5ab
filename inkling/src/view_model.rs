//! ViewModel - one immutable revision of the editor state.

use rapidhash::RapidHashSet as HashSet;

use crate::{NodeKey, NodeMap, Selection};

/// Node map, selection, and the dirty-subtree hint for one edit cycle.
#[derive(Debug, Clone)]
pub struct ViewModel {
    pub node_map: NodeMap,
    pub selection: Option<Selection>,
    /// Keys whose subtree changed. `None` means everything is dirty.
    pub dirty_subtrees: Option<HashSet<NodeKey>>,
}

impl ViewModel {
    /// A revision with no selection where every node counts as dirty.
    pub fn new(node_map: NodeMap) -> Self {
        Self {
            node_map,
            selection: None,
            dirty_subtrees: None,
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Narrow the dirty set to `keys`.
    pub fn with_dirty<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<NodeKey>,
    {
        self.dirty_subtrees = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Mark nothing as dirty, so only identity changes are reconciled.
    pub fn clean(self) -> Self {
        self.with_dirty(core::iter::empty::<NodeKey>())
    }

    pub fn is_dirty(&self, key: &str) -> bool {
        self.dirty_subtrees
            .as_ref()
            .is_none_or(|dirty| dirty.contains(key))
    }

    /// The document holds no text and no composition is in progress.
    pub fn is_blank(&self, is_composing: bool) -> bool {
        !is_composing && self.node_map.text_content(self.node_map.root_key()).is_empty()
    }
}
