//! Model-level selection.

use std::rc::Rc;

use crate::{Node, NodeKey, NodeMap, SelectionError};

/// A text range expressed as (key, character offset) pairs.
///
/// After resolution both keys point at text nodes. The anchor is where the
/// range started and may come after the focus in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub anchor_key: NodeKey,
    pub anchor_offset: usize,
    pub focus_key: NodeKey,
    pub focus_offset: usize,
    /// Changed by the model; the host selection has to be rewritten.
    pub is_dirty: bool,
    /// Changed by the user; the next view model has to pick it up even when
    /// no node changed.
    pub needs_sync: bool,
}

impl Selection {
    pub fn new(
        anchor_key: impl Into<NodeKey>,
        anchor_offset: usize,
        focus_key: impl Into<NodeKey>,
        focus_offset: usize,
    ) -> Self {
        Self {
            anchor_key: anchor_key.into(),
            anchor_offset,
            focus_key: focus_key.into(),
            focus_offset,
            is_dirty: false,
            needs_sync: false,
        }
    }

    /// A collapsed selection at one point.
    pub fn caret(key: impl Into<NodeKey>, offset: usize) -> Self {
        let key = key.into();
        Self::new(key.clone(), offset, key, offset)
    }

    /// A selection imposed by the model rather than read from the host, for
    /// example to pull focus into an editor that had none. Always dirty.
    pub fn forced(
        anchor_key: impl Into<NodeKey>,
        anchor_offset: usize,
        focus_key: impl Into<NodeKey>,
        focus_offset: usize,
    ) -> Self {
        let mut selection = Self::new(anchor_key, anchor_offset, focus_key, focus_offset);
        selection.is_dirty = true;
        selection
    }

    pub fn is_caret(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    /// Same as [`is_caret`](Self::is_caret), named after the host range flag.
    pub fn is_collapsed(&self) -> bool {
        self.is_caret()
    }

    /// `(anchor_offset, focus_offset)`.
    pub fn range_offsets(&self) -> (usize, usize) {
        (self.anchor_offset, self.focus_offset)
    }

    /// Move both ends and mark the selection dirty.
    pub fn set_range(
        &mut self,
        anchor_key: impl Into<NodeKey>,
        anchor_offset: usize,
        focus_key: impl Into<NodeKey>,
        focus_offset: usize,
    ) {
        self.anchor_key = anchor_key.into();
        self.anchor_offset = anchor_offset;
        self.focus_key = focus_key.into();
        self.focus_offset = focus_offset;
        self.is_dirty = true;
    }

    /// Equality of the four position fields, ignoring the flags.
    pub fn same_range(&self, other: &Selection) -> bool {
        self.anchor_key == other.anchor_key
            && self.anchor_offset == other.anchor_offset
            && self.focus_key == other.focus_key
            && self.focus_offset == other.focus_offset
    }

    pub fn anchor_node<'m>(&self, node_map: &'m NodeMap) -> Result<&'m Rc<Node>, SelectionError> {
        text_node(node_map, &self.anchor_key)
    }

    pub fn focus_node<'m>(&self, node_map: &'m NodeMap) -> Result<&'m Rc<Node>, SelectionError> {
        text_node(node_map, &self.focus_key)
    }

    /// Every node from anchor to focus inclusive, in document order.
    pub fn get_nodes<'m>(&self, node_map: &'m NodeMap) -> Result<Vec<&'m Rc<Node>>, SelectionError> {
        let anchor = self.anchor_node(node_map)?;
        let focus = self.focus_node(node_map)?;
        if Rc::ptr_eq(anchor, focus) {
            return Ok(vec![anchor]);
        }
        Ok(node_map.nodes_between(anchor.key(), focus.key()))
    }

    /// Full text of every text node touched by the selection.
    pub fn get_text_content(&self, node_map: &NodeMap) -> Result<String, SelectionError> {
        let mut out = String::new();
        for node in self.get_nodes(node_map)? {
            if node.is_text() {
                out.push_str(node.text_content());
            }
        }
        Ok(out)
    }
}

fn text_node<'m>(node_map: &'m NodeMap, key: &NodeKey) -> Result<&'m Rc<Node>, SelectionError> {
    let node = node_map
        .get(key)
        .ok_or_else(|| SelectionError::MissingNode { key: key.clone() })?;
    if node.is_text() {
        Ok(node)
    } else {
        Err(SelectionError::NotATextNode { key: key.clone() })
    }
}
