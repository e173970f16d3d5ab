//! Host contracts.
//!
//! The reconciler never owns the render surface. It drives whatever implements
//! [`HostTree`] (and [`HostSelection`] for cursor work): a browser DOM binding,
//! a terminal widget tree, or the in-memory [`ArenaHost`](crate::ArenaHost).
//!
//! Host operations are infallible. A host that can fail is expected to handle
//! that on its own side.

use core::fmt;
use core::hash::Hash;

/// Mutable render tree the reconciler patches.
pub trait HostTree {
    /// Handle to an element or text fragment. Handles are cheap, stable while
    /// the node lives, and comparable.
    type Element: Copy + Eq + Hash + fmt::Debug;

    fn create_element(&mut self, tag: &str) -> Self::Element;

    fn create_text(&mut self, text: &str) -> Self::Element;

    /// Insert `child` under `parent` before `reference`, or append when
    /// `reference` is `None`. An attached `child` is moved.
    fn insert_before(
        &mut self,
        parent: Self::Element,
        child: Self::Element,
        reference: Option<Self::Element>,
    );

    fn append_child(&mut self, parent: Self::Element, child: Self::Element) {
        self.insert_before(parent, child, None);
    }

    fn remove_child(&mut self, parent: Self::Element, child: Self::Element);

    /// Put `new_child` where `old_child` is and detach `old_child`.
    fn replace_child(
        &mut self,
        parent: Self::Element,
        new_child: Self::Element,
        old_child: Self::Element,
    );

    /// Detach every child of `parent` in one step.
    fn clear_children(&mut self, parent: Self::Element);

    /// Replace the content of a text fragment.
    fn set_text(&mut self, fragment: Self::Element, text: &str);

    fn set_attribute(&mut self, element: Self::Element, name: &str, value: &str);

    fn remove_attribute(&mut self, element: Self::Element, name: &str);

    fn attribute(&self, element: Self::Element, name: &str) -> Option<&str>;

    /// Content of a text fragment, `None` for elements.
    fn text(&self, node: Self::Element) -> Option<&str>;

    fn parent(&self, node: Self::Element) -> Option<Self::Element>;

    fn first_child(&self, node: Self::Element) -> Option<Self::Element>;

    fn next_sibling(&self, node: Self::Element) -> Option<Self::Element>;

    fn is_text(&self, node: Self::Element) -> bool {
        self.text(node).is_some()
    }

    fn children(&self, node: Self::Element) -> Vec<Self::Element> {
        let mut out = Vec::new();
        let mut cursor = self.first_child(node);
        while let Some(child) = cursor {
            out.push(child);
            cursor = self.next_sibling(child);
        }
        out
    }

    /// `true` if `node` is `ancestor` or lies somewhere below it.
    fn contains(&self, ancestor: Self::Element, node: Self::Element) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }
}

/// One end of a host range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary<E> {
    pub container: E,
    pub offset: usize,
}

impl<E> Boundary<E> {
    pub fn new(container: E, offset: usize) -> Self {
        Self { container, offset }
    }
}

/// A host-level selection range. Anchor may come after focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostRange<E> {
    pub anchor: Boundary<E>,
    pub focus: Boundary<E>,
}

impl<E: PartialEq> HostRange<E> {
    pub fn new(anchor: Boundary<E>, focus: Boundary<E>) -> Self {
        Self { anchor, focus }
    }

    /// A collapsed range at one boundary.
    pub fn caret(at: Boundary<E>) -> Self
    where
        E: Copy,
    {
        Self { anchor: at, focus: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Native selection of the host.
pub trait HostSelection: HostTree {
    /// The current range, if the host has one.
    fn read_range(&self) -> Option<HostRange<Self::Element>>;

    /// Replace any existing range with `range`.
    fn install_range(&mut self, range: HostRange<Self::Element>);
}
