//! Selection resolution between host ranges and model selections.
//!
//! The host reports a range as (container, offset) boundaries. Containers are
//! either text fragments, whose owning element is what the registry knows
//! about, or elements. Element boundaries are narrowed to text nodes: the first
//! text descendant for the anchor, the last one for the focus.

use std::rc::Rc;

use crate::host::{Boundary, HostRange, HostSelection};
use crate::{Node, NodeKey, NodeMap, Registry, Selection};
#[allow(unused_imports)]
use crate::{trace, warning};

/// Kind of the input event that started the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SelectionChange,
    BeforeInput,
    Input,
    CompositionStart,
    CompositionEnd,
    KeyDown,
    KeyUp,
    Other,
}

/// What is known about user input when a selection is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    /// The event being handled, `None` outside event dispatch.
    pub event: Option<EventKind>,
    /// A key is currently held.
    pub key_down: bool,
}

impl InputState {
    pub fn new(event: Option<EventKind>, key_down: bool) -> Self {
        Self { event, key_down }
    }

    pub fn event(event: EventKind) -> Self {
        Self::new(Some(event), false)
    }
}

/// Read-only view over one revision and its host, used to turn host ranges
/// into [`Selection`]s.
pub struct SelectionResolver<'a, H: HostSelection> {
    node_map: &'a NodeMap,
    registry: &'a Registry<H::Element>,
    host: &'a H,
    root_element: H::Element,
}

impl<'a, H: HostSelection> SelectionResolver<'a, H> {
    pub fn new(
        node_map: &'a NodeMap,
        registry: &'a Registry<H::Element>,
        host: &'a H,
        root_element: H::Element,
    ) -> Self {
        Self {
            node_map,
            registry,
            host,
            root_element,
        }
    }

    /// Key of the node that owns a host container. Text fragments belong to
    /// their parent element.
    pub fn key_for(&self, container: H::Element) -> Option<&'a NodeKey> {
        let target = if self.host.is_text(container) {
            self.host.parent(container)?
        } else {
            container
        };
        self.registry.key_of(target)
    }

    /// Map a host range onto text nodes of the current revision.
    pub fn resolve_from_host_range(&self, range: &HostRange<H::Element>) -> Option<Selection> {
        let anchor_key = self.key_for(range.anchor.container)?;
        let focus_key = self.key_for(range.focus.container)?;
        let (Some(anchor), Some(focus)) = self.resolve_selection_nodes(anchor_key, focus_key) else {
            return None;
        };
        Some(Selection::new(
            anchor.key().clone(),
            clamp_offset(anchor, range.anchor.offset),
            focus.key().clone(),
            clamp_offset(focus, range.focus.offset),
        ))
    }

    /// Look up both keys, narrowing an element anchor to its first text
    /// descendant and an element focus to its last. Both `None` when either
    /// key is unknown.
    pub fn resolve_selection_nodes(
        &self,
        anchor_key: &str,
        focus_key: &str,
    ) -> (Option<&'a Rc<Node>>, Option<&'a Rc<Node>>) {
        let node_map = self.node_map;
        let (Some(anchor), Some(focus)) = (node_map.get(anchor_key), node_map.get(focus_key))
        else {
            return (None, None);
        };
        let anchor = if anchor.is_element() {
            node_map.first_text_descendant(anchor.key())
        } else {
            Some(anchor)
        };
        let focus = if focus.is_element() {
            node_map.last_text_descendant(focus.key())
        } else {
            Some(focus)
        };
        (anchor, focus)
    }

    /// Build the selection for a new cycle.
    ///
    /// The host range is read when there is no event, no previous selection,
    /// a selection-change or before-input event, or a composition starting
    /// while a key is held. Otherwise the previous selection is carried over,
    /// dirty if a composition is starting.
    pub fn create_selection(
        &self,
        input: InputState,
        previous: Option<&Selection>,
    ) -> Option<Selection> {
        let event = input.event;
        let is_composing = event == Some(EventKind::CompositionStart);
        let is_selection_change = event == Some(EventKind::SelectionChange);
        let use_host = is_selection_change || event == Some(EventKind::BeforeInput);
        let read_host = event.is_none() || use_host || (is_composing && input.key_down);

        if let (false, Some(previous)) = (read_host, previous) {
            let mut selection = Selection::new(
                previous.anchor_key.clone(),
                previous.anchor_offset,
                previous.focus_key.clone(),
                previous.focus_offset,
            );
            selection.is_dirty = is_composing;
            return Some(selection);
        }

        let range = self.host.read_range()?;
        if !self.host.contains(self.root_element, range.anchor.container)
            || !self.host.contains(self.root_element, range.focus.container)
        {
            trace!("host selection is outside the editor");
            return None;
        }

        let Some((anchor_key, anchor_offset)) = self.boundary_point(range.anchor, false) else {
            warning!("anchor boundary does not map to a node");
            return None;
        };
        let Some((focus_key, focus_offset)) = self.boundary_point(range.focus, true) else {
            warning!("focus boundary does not map to a node");
            return None;
        };

        let (Some(anchor), Some(focus)) = self.resolve_selection_nodes(anchor_key, focus_key)
        else {
            warning!(anchor = %anchor_key, focus = %focus_key, "selection does not resolve to text nodes");
            return None;
        };

        let (anchor_offset, focus_offset) = if Rc::ptr_eq(anchor, focus) && anchor.text_len() == 0 {
            (0, 0)
        } else {
            (clamp_offset(anchor, anchor_offset), clamp_offset(focus, focus_offset))
        };

        let mut selection = Selection::new(
            anchor.key().clone(),
            anchor_offset,
            focus.key().clone(),
            focus_offset,
        );
        if let Some(previous) = previous
            && is_selection_change
            && !selection.same_range(previous)
        {
            selection.needs_sync = true;
        }
        Some(selection)
    }

    /// Key and offset of one boundary. The root container itself stands for
    /// the first text node of the document: its start for the anchor, its end
    /// for the focus.
    fn boundary_point(&self, boundary: Boundary<H::Element>, is_focus: bool) -> Option<(&'a NodeKey, usize)> {
        if boundary.container == self.root_element {
            let first = self.node_map.first_text_descendant(self.node_map.root_key())?;
            let offset = if is_focus { first.text_len() } else { 0 };
            return Some((first.key(), offset));
        }
        Some((self.key_for(boundary.container)?, boundary.offset))
    }
}

fn clamp_offset(node: &Node, offset: usize) -> usize {
    offset.min(node.text_len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArenaHost, Editor, HostTree, ViewModel};

    fn editor() -> Editor<ArenaHost> {
        let map = NodeMap::from_nodes(
            "root",
            [
                Node::element("root", "root", ["b1", "b2"]),
                Node::element("b1", "paragraph", ["t1", "t2"]).with_parent("root"),
                Node::text("t1", "Hello").with_parent("b1"),
                Node::text("t2", " world").with_parent("b1"),
                Node::element("b2", "paragraph", ["e"]).with_parent("root"),
                Node::text("e", "").with_parent("b2"),
            ],
        );
        let mut editor = Editor::with_arena_host();
        editor.update(ViewModel::new(map)).unwrap();
        editor
    }

    fn fragment(editor: &Editor<ArenaHost>, key: &str) -> indextree::NodeId {
        let element = editor.element_by_key(key).unwrap();
        editor.host().first_child(element).unwrap()
    }

    #[test]
    fn test_block_endpoints_narrow_to_text() {
        let editor = editor();
        let resolver = editor.resolver();
        let (anchor, focus) = resolver.resolve_selection_nodes("b1", "b1");
        assert_eq!(anchor.unwrap().key(), "t1");
        assert_eq!(focus.unwrap().key(), "t2");
        assert_eq!(resolver.resolve_selection_nodes("b1", "nope"), (None, None));
    }

    #[test]
    fn test_host_range_round_trip() {
        let editor = editor();
        let range = HostRange::new(
            Boundary::new(fragment(&editor, "t1"), 2),
            Boundary::new(fragment(&editor, "t2"), 3),
        );
        let selection = editor.resolver().resolve_from_host_range(&range).unwrap();
        assert!(selection.same_range(&Selection::new("t1", 2, "t2", 3)));
    }

    #[test]
    fn test_offsets_clamp_to_text() {
        let editor = editor();
        let range = HostRange::new(
            Boundary::new(fragment(&editor, "t1"), 99),
            Boundary::new(fragment(&editor, "e"), 4),
        );
        let selection = editor.resolver().resolve_from_host_range(&range).unwrap();
        assert_eq!(selection.range_offsets(), (5, 0));
    }

    #[test]
    fn test_previous_selection_is_carried_over() {
        let mut editor = editor();
        let previous = Selection::new("t1", 1, "t2", 2);
        editor.host_mut().select(None);
        let resolver = editor.resolver();

        let carried = resolver
            .create_selection(InputState::event(EventKind::KeyDown), Some(&previous))
            .unwrap();
        assert!(carried.same_range(&previous));
        assert!(!carried.is_dirty);

        let composing = resolver
            .create_selection(InputState::event(EventKind::CompositionStart), Some(&previous))
            .unwrap();
        assert!(composing.is_dirty);

        // Composition starting under a held key reads the host instead, which
        // has no range here.
        let held = InputState::new(Some(EventKind::CompositionStart), true);
        assert_eq!(resolver.create_selection(held, Some(&previous)), None);
    }

    #[test]
    fn test_root_container_means_first_text_node() {
        let mut editor = editor();
        let root = editor.root_element();
        editor
            .host_mut()
            .select(Some(HostRange::new(Boundary::new(root, 1), Boundary::new(root, 2))));
        let selection = editor.create_selection(None).unwrap();
        assert_eq!(selection, Selection::new("t1", 0, "t1", 5));
    }

    #[test]
    fn test_selection_outside_root_is_none() {
        let mut editor = editor();
        let outside = editor.host_mut().create_element("aside");
        editor
            .host_mut()
            .select(Some(HostRange::caret(Boundary::new(outside, 0))));
        assert_eq!(editor.create_selection(Some(EventKind::SelectionChange)), None);
    }

    #[test]
    fn test_selection_change_sets_needs_sync() {
        let mut editor = editor();
        let t1 = fragment(&editor, "t1");
        editor
            .host_mut()
            .select(Some(HostRange::caret(Boundary::new(t1, 3))));
        let previous = Selection::caret("t1", 1);
        let resolver = editor.resolver();

        let changed = resolver
            .create_selection(InputState::event(EventKind::SelectionChange), Some(&previous))
            .unwrap();
        assert!(changed.needs_sync);

        let same = Selection::caret("t1", 3);
        let unchanged = resolver
            .create_selection(InputState::event(EventKind::SelectionChange), Some(&same))
            .unwrap();
        assert!(!unchanged.needs_sync);

        // Before-input reads the host too, but never asks for a sync.
        let before_input = resolver
            .create_selection(InputState::event(EventKind::BeforeInput), Some(&previous))
            .unwrap();
        assert!(!before_input.needs_sync);
    }
}
