//! Arena-backed in-memory host.
//!
//! All host nodes live in one `indextree` arena. Detached nodes stay in the
//! arena (the way a DOM keeps unreferenced nodes until they are collected), so
//! handles never dangle during a pass.
//!
//! Every tree, text, or attribute change bumps a mutation counter, which is what
//! tests use to prove that a no-op reconcile really did nothing.

use compact_str::CompactString;
use indexmap::IndexMap;
use indextree::{Arena, NodeId};

use crate::host::{HostRange, HostSelection, HostTree};

/// What goes in each arena slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNode {
    /// Element with tag and attributes. Attributes keep insertion order for
    /// stable serialization.
    Element {
        tag: CompactString,
        attrs: IndexMap<CompactString, CompactString>,
    },
    /// Text fragment.
    Text(CompactString),
}

/// In-memory host tree with a native-selection slot.
#[derive(Debug, Clone, Default)]
pub struct ArenaHost {
    arena: Arena<HostNode>,
    range: Option<HostRange<NodeId>>,
    mutations: usize,
}

impl ArenaHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutations applied since creation or the last reset.
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    pub fn reset_mutations(&mut self) {
        self.mutations = 0;
    }

    pub fn get(&self, id: NodeId) -> &HostNode {
        self.arena[id].get()
    }

    /// Tag name of an element, `None` for text.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.get(id) {
            HostNode::Element { tag, .. } => Some(tag),
            HostNode::Text(_) => None,
        }
    }

    /// The range most recently installed or set, without going through the
    /// selection contract.
    pub fn range(&self) -> Option<&HostRange<NodeId>> {
        self.range.as_ref()
    }

    /// Simulate the user moving the native selection.
    pub fn select(&mut self, range: Option<HostRange<NodeId>>) {
        self.range = range;
    }

    /// Concatenated text below `id`, in tree order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in id.descendants(&self.arena) {
            if let HostNode::Text(text) = self.get(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Serialize the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in id.children(&self.arena) {
            self.serialize_node(&mut out, child);
        }
        out
    }

    /// Serialize `id` itself and everything below it.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_node(&mut out, id);
        out
    }

    fn serialize_node(&self, out: &mut String, id: NodeId) {
        match self.get(id) {
            HostNode::Text(text) => {
                for c in text.chars() {
                    match c {
                        '&' => out.push_str("&amp;"),
                        '<' => out.push_str("&lt;"),
                        '>' => out.push_str("&gt;"),
                        _ => out.push(c),
                    }
                }
            }
            HostNode::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    for c in value.chars() {
                        match c {
                            '&' => out.push_str("&amp;"),
                            '"' => out.push_str("&quot;"),
                            '<' => out.push_str("&lt;"),
                            '>' => out.push_str("&gt;"),
                            _ => out.push(c),
                        }
                    }
                    out.push('"');
                }
                out.push('>');
                for child in id.children(&self.arena) {
                    self.serialize_node(out, child);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl HostTree for ArenaHost {
    type Element = NodeId;

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.mutations += 1;
        self.arena.new_node(HostNode::Element {
            tag: CompactString::new(tag),
            attrs: IndexMap::new(),
        })
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.mutations += 1;
        self.arena.new_node(HostNode::Text(CompactString::new(text)))
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if reference == Some(child) {
            return;
        }
        self.mutations += 1;
        child.detach(&mut self.arena);
        match reference {
            Some(reference) => reference.insert_before(child, &mut self.arena),
            None => parent.append(child, &mut self.arena),
        }
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.arena[child].parent() == Some(parent) {
            self.mutations += 1;
            child.detach(&mut self.arena);
        }
    }

    fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) {
        if self.arena[old_child].parent() != Some(parent) || new_child == old_child {
            return;
        }
        self.mutations += 1;
        new_child.detach(&mut self.arena);
        old_child.insert_before(new_child, &mut self.arena);
        old_child.detach(&mut self.arena);
    }

    fn clear_children(&mut self, parent: NodeId) {
        let children: Vec<_> = parent.children(&self.arena).collect();
        if children.is_empty() {
            return;
        }
        self.mutations += 1;
        for child in children {
            child.detach(&mut self.arena);
        }
    }

    fn set_text(&mut self, fragment: NodeId, text: &str) {
        if let HostNode::Text(content) = self.arena[fragment].get_mut() {
            *content = CompactString::new(text);
            self.mutations += 1;
        }
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        if let HostNode::Element { attrs, .. } = self.arena[element].get_mut() {
            attrs.insert(CompactString::new(name), CompactString::new(value));
            self.mutations += 1;
        }
    }

    fn remove_attribute(&mut self, element: NodeId, name: &str) {
        if let HostNode::Element { attrs, .. } = self.arena[element].get_mut()
            && attrs.shift_remove(name).is_some()
        {
            self.mutations += 1;
        }
    }

    fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        match self.get(element) {
            HostNode::Element { attrs, .. } => attrs.get(name).map(CompactString::as_str),
            HostNode::Text(_) => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match self.get(node) {
            HostNode::Text(text) => Some(text),
            HostNode::Element { .. } => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena[node].parent()
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.arena[node].first_child()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.arena[node].next_sibling()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        node.children(&self.arena).collect()
    }
}

impl HostSelection for ArenaHost {
    fn read_range(&self) -> Option<HostRange<NodeId>> {
        self.range
    }

    fn install_range(&mut self, range: HostRange<NodeId>) {
        self.range = Some(range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Boundary;

    fn list(host: &mut ArenaHost) -> (NodeId, [NodeId; 3]) {
        let ul = host.create_element("ul");
        let items = ["a", "b", "c"].map(|label| {
            let li = host.create_element("li");
            let text = host.create_text(label);
            host.append_child(li, text);
            host.append_child(ul, li);
            li
        });
        (ul, items)
    }

    #[test]
    fn test_to_html() {
        let mut host = ArenaHost::new();
        let (ul, _) = list(&mut host);
        assert_eq!(
            host.outer_html(ul),
            "<ul><li>a</li><li>b</li><li>c</li></ul>"
        );
    }

    #[test]
    fn test_to_html_escaping() {
        let mut host = ArenaHost::new();
        let p = host.create_element("p");
        host.set_attribute(p, "title", "\"x\" & y");
        let text = host.create_text("<b>");
        host.append_child(p, text);
        assert_eq!(
            host.outer_html(p),
            "<p title=\"&quot;x&quot; &amp; y\">&lt;b&gt;</p>"
        );
    }

    #[test]
    fn test_insert_before_moves_attached_child() {
        let mut host = ArenaHost::new();
        let (ul, [a, _, c]) = list(&mut host);
        host.insert_before(ul, c, Some(a));
        assert_eq!(host.inner_html(ul), "<li>c</li><li>a</li><li>b</li>");
    }

    #[test]
    fn test_insert_before_itself_is_noop() {
        let mut host = ArenaHost::new();
        let (ul, [a, ..]) = list(&mut host);
        host.reset_mutations();
        host.insert_before(ul, a, Some(a));
        assert_eq!(host.mutations(), 0);
        assert_eq!(host.inner_html(ul), "<li>a</li><li>b</li><li>c</li>");
    }

    #[test]
    fn test_replace_and_clear() {
        let mut host = ArenaHost::new();
        let (ul, [_, b, _]) = list(&mut host);
        let hr = host.create_element("hr");
        host.replace_child(ul, hr, b);
        assert_eq!(host.inner_html(ul), "<li>a</li><hr></hr><li>c</li>");
        assert_eq!(host.parent(b), None);
        host.clear_children(ul);
        assert_eq!(host.inner_html(ul), "");
    }

    #[test]
    fn test_contains_and_text_content() {
        let mut host = ArenaHost::new();
        let (ul, [a, ..]) = list(&mut host);
        let text = host.first_child(a).unwrap();
        assert!(host.contains(ul, text));
        assert!(!host.contains(a, ul));
        assert_eq!(host.text_content(ul), "abc");
    }

    #[test]
    fn test_attribute_removal_counts_only_real_changes() {
        let mut host = ArenaHost::new();
        let p = host.create_element("p");
        host.reset_mutations();
        host.remove_attribute(p, "dir");
        assert_eq!(host.mutations(), 0);
        host.set_attribute(p, "dir", "rtl");
        host.remove_attribute(p, "dir");
        assert_eq!(host.mutations(), 2);
        assert_eq!(host.attribute(p, "dir"), None);
    }

    #[test]
    fn test_range_round_trip() {
        let mut host = ArenaHost::new();
        let (_, [a, _, c]) = list(&mut host);
        let range = HostRange::new(Boundary::new(a, 0), Boundary::new(c, 1));
        host.install_range(range);
        assert_eq!(host.read_range(), Some(range));
        assert!(!range.is_collapsed());
    }
}
