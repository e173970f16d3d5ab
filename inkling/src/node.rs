//! Node snapshots.
//!
//! A [`Node`] is immutable once it is placed in a [`NodeMap`](crate::NodeMap).
//! Revisions share unchanged nodes through `Rc`, and the reconciler treats
//! pointer identity as "nothing changed here". Element children live in a
//! shared `Rc<[NodeKey]>` for the same reason: an unchanged child list is the
//! same allocation in both revisions.

use compact_str::CompactString;
use std::rc::Rc;

use crate::NodeKey;

bitflags::bitflags! {
    /// Node-level flags that affect how the host renders a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct NodeFlags: u8 {
        /// Content cannot be edited in place; the host element is marked
        /// non-editable.
        const IMMUTABLE = 1 << 0;
        /// Content is edited as whole segments; the host element is marked
        /// non-editable.
        const SEGMENTED = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Inline formatting of a text node. An empty format is "simple" text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct TextFormat: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const CODE = 1 << 3;
    }
}

/// Text-vs-element classification with the payload of each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf holding string content.
    Text {
        text: CompactString,
        format: TextFormat,
    },
    /// Node owning an ordered list of child keys.
    Element { children: Rc<[NodeKey]> },
}

/// One node snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    key: NodeKey,
    parent: Option<NodeKey>,
    node_type: CompactString,
    flags: NodeFlags,
    kind: NodeKind,
}

impl Node {
    /// A simple text node of type `"text"`.
    pub fn text(key: impl Into<NodeKey>, text: impl Into<CompactString>) -> Self {
        Self {
            key: key.into(),
            parent: None,
            node_type: CompactString::const_new("text"),
            flags: NodeFlags::empty(),
            kind: NodeKind::Text {
                text: text.into(),
                format: TextFormat::empty(),
            },
        }
    }

    /// An element node of the given type.
    pub fn element<I, K>(key: impl Into<NodeKey>, node_type: &str, children: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<NodeKey>,
    {
        Self {
            key: key.into(),
            parent: None,
            node_type: CompactString::new(node_type),
            flags: NodeFlags::empty(),
            kind: NodeKind::Element {
                children: children.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn with_parent(mut self, parent: impl Into<NodeKey>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_type(mut self, node_type: &str) -> Self {
        self.node_type = CompactString::new(node_type);
        self
    }

    /// Replace the text format. No effect on element nodes.
    pub fn with_format(mut self, new_format: TextFormat) -> Self {
        if let NodeKind::Text { format, .. } = &mut self.kind {
            *format = new_format;
        }
        self
    }

    /// Replace the text content. No effect on element nodes.
    pub fn with_text(mut self, new_text: impl Into<CompactString>) -> Self {
        if let NodeKind::Text { text, .. } = &mut self.kind {
            *text = new_text.into();
        }
        self
    }

    /// Replace the child list. No effect on text nodes.
    pub fn with_children<I, K>(mut self, new_children: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<NodeKey>,
    {
        if let NodeKind::Element { children } = &mut self.kind {
            *children = new_children.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Replace the child list with an existing shared list, preserving its
    /// identity.
    pub fn with_shared_children(mut self, shared: Rc<[NodeKey]>) -> Self {
        if let NodeKind::Element { children } = &mut self.kind {
            *children = shared;
        }
        self
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn parent(&self) -> Option<&NodeKey> {
        self.parent.as_ref()
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn is_immutable(&self) -> bool {
        self.flags.contains(NodeFlags::IMMUTABLE)
    }

    pub fn is_segmented(&self) -> bool {
        self.flags.contains(NodeFlags::SEGMENTED)
    }

    /// Unformatted text that is neither immutable nor segmented.
    pub fn is_simple_text(&self) -> bool {
        match &self.kind {
            NodeKind::Text { format, .. } => {
                format.is_empty() && !self.is_immutable() && !self.is_segmented()
            }
            NodeKind::Element { .. } => false,
        }
    }

    /// Own text content. Empty for elements; use
    /// [`NodeMap::text_content`](crate::NodeMap::text_content) for a subtree.
    pub fn text_content(&self) -> &str {
        match &self.kind {
            NodeKind::Text { text, .. } => text,
            NodeKind::Element { .. } => "",
        }
    }

    pub fn format(&self) -> TextFormat {
        match &self.kind {
            NodeKind::Text { format, .. } => *format,
            NodeKind::Element { .. } => TextFormat::empty(),
        }
    }

    /// Child keys in order. Empty for text nodes.
    pub fn children(&self) -> &[NodeKey] {
        match &self.kind {
            NodeKind::Element { children } => children,
            NodeKind::Text { .. } => &[],
        }
    }

    /// The shared child list, for identity comparisons.
    pub fn shared_children(&self) -> Option<&Rc<[NodeKey]>> {
        match &self.kind {
            NodeKind::Element { children } => Some(children),
            NodeKind::Text { .. } => None,
        }
    }

    /// Length of the text content in characters.
    pub fn text_len(&self) -> usize {
        self.text_content().chars().count()
    }
}
