//! Reconcile a host tree from one view model to the next.
//!
//! A pass walks the next node map from the root. Subtrees whose node identity
//! is unchanged and that are not in the dirty set are skipped outright. For
//! everything else the node's behavior patches the host element, and element
//! children are brought in line with the keyed diff from `keyway`.
//!
//! Each element caches the text of its subtree in the registry. After an
//! element's children are settled the cache is rebuilt from the children in
//! next order: text children contribute their own text, element children
//! contribute their cache. The `dir` attribute is only touched when that text
//! actually changed.

use std::rc::Rc;

use keyway::{ChildPatcher, DiffError, diff_children};
use rapidhash::RapidHashSet as HashSet;

use crate::host::{Boundary, HostRange, HostSelection, HostTree};
use crate::node_types::NodeBehavior;
use crate::{
    Node, NodeKey, NodeMap, NodeTypes, ReconcileError, ReconcilerConfig, Registry, Revision,
    Selection, TextDirection, ViewModel,
};
#[allow(unused_imports)]
use crate::{debug, trace, warning};

/// One step a pass took, in the order it was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOp {
    /// Unchanged and clean; not visited.
    Skipped(NodeKey),
    /// Diffed in place.
    Reconciled(NodeKey),
    Created(NodeKey),
    /// The host element of `prev` was swapped for a fresh one built from `next`.
    Replaced { prev: NodeKey, next: NodeKey },
    Moved(NodeKey),
    Destroyed(NodeKey),
    /// Every child of `parent` was removed in one step.
    Cleared { parent: NodeKey, count: usize },
    /// `dir` was set, or removed when `direction` is `None`.
    DirectionSet {
        key: NodeKey,
        direction: Option<TextDirection>,
    },
}

/// Outcome of a successful pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Every step, when [`ReconcilerConfig::record_ops`] is on.
    pub ops: Vec<ReconcileOp>,
    pub skipped: usize,
    pub reconciled: usize,
    pub created: usize,
    pub replaced: usize,
    pub moved: usize,
    pub destroyed: usize,
    pub cleared: usize,
    pub direction_changes: usize,
    /// The next selection was written to the host.
    pub selection_installed: bool,
}

impl ReconcileReport {
    /// Number of structural host changes: creations, replacements, moves and
    /// destructions.
    pub fn structural_changes(&self) -> usize {
        self.created + self.replaced + self.moved + self.destroyed
    }

    /// Recorded ops concerning `key`.
    pub fn ops_for<'r>(&'r self, key: &'r str) -> impl Iterator<Item = &'r ReconcileOp> + 'r {
        self.ops.iter().filter(move |op| match op {
            ReconcileOp::Skipped(k)
            | ReconcileOp::Reconciled(k)
            | ReconcileOp::Created(k)
            | ReconcileOp::Moved(k)
            | ReconcileOp::Destroyed(k)
            | ReconcileOp::DirectionSet { key: k, .. } => k == key,
            ReconcileOp::Replaced { prev, next } => prev == key || next == key,
            ReconcileOp::Cleared { parent, .. } => parent == key,
        })
    }
}

/// Borrowed state one pass works on.
pub struct Reconciler<'a, H: HostTree> {
    host: &'a mut H,
    registry: &'a mut Registry<H::Element>,
    node_types: &'a NodeTypes<H>,
    config: &'a ReconcilerConfig,
    root_element: H::Element,
}

impl<'a, H: HostSelection> Reconciler<'a, H> {
    /// `root_element` is the host container of the root node and must already
    /// be registered under the root key.
    pub fn new(
        host: &'a mut H,
        registry: &'a mut Registry<H::Element>,
        node_types: &'a NodeTypes<H>,
        config: &'a ReconcilerConfig,
        root_element: H::Element,
    ) -> Self {
        Self {
            host,
            registry,
            node_types,
            config,
            root_element,
        }
    }

    /// Patch the host from `prev` to `next`, then install `next.selection` on
    /// the host if there is one.
    pub fn reconcile(
        self,
        prev: &ViewModel,
        next: &ViewModel,
    ) -> Result<ReconcileReport, ReconcileError> {
        let root_key = next.node_map.root_key().clone();
        trace!(root = %root_key, nodes = next.node_map.len(), "reconcile pass");

        let mut pass = Pass {
            prev: &prev.node_map,
            next: &next.node_map,
            dirty: next.dirty_subtrees.as_ref(),
            host: self.host,
            registry: self.registry,
            node_types: self.node_types,
            config: self.config,
            report: ReconcileReport::default(),
        };

        let root = self.root_element;
        if let Some(direction) = pass.config.forced_direction {
            pass.set_direction(&root_key, root, Some(direction));
        }

        pass.reconcile_node(&root_key, None)?;

        match pass.config.forced_direction {
            Some(direction) => pass.registry.set_forced_direction(Some(direction)),
            None if pass.registry.forced_direction().is_some() => {
                // The override was lifted: the root goes back to its own text.
                let detected = pass
                    .registry
                    .text_memo(root)
                    .and_then(TextDirection::detect);
                pass.set_direction(&root_key, root, detected);
                pass.registry.set_forced_direction(None);
            }
            None => {}
        }

        if let Some(selection) = &next.selection {
            pass.restore_selection(selection);
        }

        debug!(
            created = pass.report.created,
            destroyed = pass.report.destroyed,
            moved = pass.report.moved,
            replaced = pass.report.replaced,
            "reconcile pass done"
        );
        Ok(pass.report)
    }
}

/// Per-pass state. Lives for exactly one [`Reconciler::reconcile`] call.
struct Pass<'p, H: HostTree> {
    prev: &'p NodeMap,
    next: &'p NodeMap,
    dirty: Option<&'p HashSet<NodeKey>>,
    host: &'p mut H,
    registry: &'p mut Registry<H::Element>,
    node_types: &'p NodeTypes<H>,
    config: &'p ReconcilerConfig,
    report: ReconcileReport,
}

impl<'p, H: HostTree> Pass<'p, H> {
    fn record(&mut self, op: ReconcileOp) {
        let report = &mut self.report;
        match &op {
            ReconcileOp::Skipped(_) => report.skipped += 1,
            ReconcileOp::Reconciled(_) => report.reconciled += 1,
            ReconcileOp::Created(_) => report.created += 1,
            ReconcileOp::Replaced { .. } => report.replaced += 1,
            ReconcileOp::Moved(_) => report.moved += 1,
            ReconcileOp::Destroyed(_) => report.destroyed += 1,
            ReconcileOp::Cleared { .. } => report.cleared += 1,
            ReconcileOp::DirectionSet { .. } => report.direction_changes += 1,
        }
        if self.config.record_ops {
            report.ops.push(op);
        }
    }

    fn is_dirty(&self, key: &str) -> bool {
        self.dirty.is_none_or(|dirty| dirty.contains(key))
    }

    fn prev_node(&self, key: &str) -> Result<&'p Rc<Node>, ReconcileError> {
        self.prev.get(key).ok_or_else(|| ReconcileError::MissingNode {
            key: key.into(),
            revision: Revision::Previous,
        })
    }

    fn next_node(&self, key: &str) -> Result<&'p Rc<Node>, ReconcileError> {
        self.next.get(key).ok_or_else(|| ReconcileError::MissingNode {
            key: key.into(),
            revision: Revision::Next,
        })
    }

    fn behavior(&self, node: &Node) -> Result<NodeBehavior<H>, ReconcileError> {
        self.node_types
            .get(node.node_type())
            .copied()
            .ok_or_else(|| ReconcileError::UnknownNodeType {
                key: node.key().clone(),
                node_type: node.node_type().to_string(),
            })
    }

    /// Host element of `key` among the children of `parent`.
    ///
    /// The registry normally answers directly. When the key was re-created
    /// under another parent earlier in the pass, the registry already points
    /// at the new element, so the old one is found by scanning `parent`.
    fn element_under(&self, key: &str, parent: H::Element) -> Result<H::Element, ReconcileError> {
        if let Some(element) = self.registry.element(key)
            && self.host.parent(element) == Some(parent)
        {
            return Ok(element);
        }
        self.host
            .children(parent)
            .into_iter()
            .find(|child| self.registry.key_of(*child).is_some_and(|k| k == key))
            .ok_or_else(|| ReconcileError::UnregisteredKey { key: key.into() })
    }

    fn reconcile_node(&mut self, key: &NodeKey, parent: Option<H::Element>) -> Result<(), ReconcileError> {
        let prev_node = self.prev_node(key)?;
        let next_node = self.next_node(key)?;
        let dirty = self.is_dirty(key);

        if Rc::ptr_eq(prev_node, next_node) && !dirty {
            self.record(ReconcileOp::Skipped(key.clone()));
            return Ok(());
        }

        let element = match parent {
            Some(parent) => self.element_under(key, parent)?,
            None => self
                .registry
                .element(key)
                .ok_or_else(|| ReconcileError::UnregisteredKey { key: key.clone() })?,
        };
        self.record(ReconcileOp::Reconciled(key.clone()));

        let behavior = self.behavior(next_node)?;
        let must_replace = prev_node.is_text() != next_node.is_text()
            || (behavior.update)(prev_node, next_node, element, self.host);
        if must_replace {
            let Some(parent) = parent else {
                return Err(ReconcileError::CannotReplaceRoot { key: key.clone() });
            };
            return self.replace_node(key, key, element, parent);
        }

        if next_node.is_text() {
            return Ok(());
        }

        let same_children = match (prev_node.shared_children(), next_node.shared_children()) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        if !same_children || dirty {
            let mut patcher = ChildrenPatch {
                pass: self,
                parent_key: key,
                parent: element,
            };
            diff_children(prev_node.children(), next_node.children(), &mut patcher).map_err(
                |err| match err {
                    DiffError::Patch(err) => err,
                    DiffError::DuplicateKey { key: duplicate } => ReconcileError::Diff {
                        parent: key.clone(),
                        source: DiffError::DuplicateKey { key: duplicate },
                    },
                    DiffError::MoveSourceMissing { key: moved } => ReconcileError::Diff {
                        parent: key.clone(),
                        source: DiffError::MoveSourceMissing { key: moved },
                    },
                },
            )?;
        }

        self.refresh_text(key, element, next_node)
    }

    /// Build the host subtree of `key` from the next map. The returned element
    /// is not attached anywhere yet.
    fn create_node(&mut self, key: &NodeKey) -> Result<H::Element, ReconcileError> {
        let node = self.next_node(key)?;
        let behavior = self.behavior(node)?;
        let element = (behavior.create)(node, self.host);
        self.registry.insert(key.clone(), element);
        trace!(%key, "created");

        if node.is_immutable() || node.is_segmented() {
            self.host.set_attribute(element, "contenteditable", "false");
        }

        if node.is_element() {
            for child in node.children() {
                let child_element = self.create_node(child)?;
                self.host.append_child(element, child_element);
            }
            self.refresh_text(key, element, node)?;
        }

        self.record(ReconcileOp::Created(key.clone()));
        Ok(element)
    }

    /// Tear down the subtree of `key` whose host element is `element`.
    /// `detach_from` is only set for the top of the subtree; everything below
    /// goes away with it.
    fn destroy_node(
        &mut self,
        key: &NodeKey,
        element: H::Element,
        detach_from: Option<H::Element>,
    ) -> Result<(), ReconcileError> {
        let node = self.prev_node(key)?;

        if let Some(parent) = detach_from {
            self.host.remove_child(parent, element);
        }

        self.registry.release_element(element);
        if !self.next.contains(key) {
            self.registry.remove_key_if(key, element);
        }

        let behavior = self.behavior(node)?;
        if let Some(destroy) = behavior.destroy {
            destroy(node, element, self.host);
        }

        for child in node.children() {
            let child_element = self.element_under(child, element)?;
            self.destroy_node(child, child_element, None)?;
        }

        trace!(%key, "destroyed");
        self.record(ReconcileOp::Destroyed(key.clone()));
        Ok(())
    }

    /// Swap the host element of `prev_key` for a fresh one built for
    /// `next_key`, then destroy the old subtree.
    fn replace_node(
        &mut self,
        prev_key: &NodeKey,
        next_key: &NodeKey,
        old_element: H::Element,
        parent: H::Element,
    ) -> Result<(), ReconcileError> {
        let new_element = self.create_node(next_key)?;
        self.host.replace_child(parent, new_element, old_element);
        self.destroy_node(prev_key, old_element, None)?;
        trace!(prev = %prev_key, next = %next_key, "replaced");
        self.record(ReconcileOp::Replaced {
            prev: prev_key.clone(),
            next: next_key.clone(),
        });
        Ok(())
    }

    /// Rebuild the subtree text of an element and update `dir` if it changed.
    fn refresh_text(&mut self, key: &NodeKey, element: H::Element, node: &Node) -> Result<(), ReconcileError> {
        let mut text = String::new();
        for child_key in node.children() {
            let child = self.next_node(child_key)?;
            if child.is_text() {
                let behavior = self.behavior(child)?;
                text.push_str((behavior.text_content)(child));
            } else if let Some(memo) = self
                .registry
                .element(child_key)
                .and_then(|child_element| self.registry.text_memo(child_element))
            {
                text.push_str(memo);
            }
        }

        if self.registry.text_memo(element) == Some(text.as_str()) {
            return Ok(());
        }

        if self.config.forced_direction.is_none() {
            self.set_direction(key, element, TextDirection::detect(&text));
        }

        self.registry.set_text_memo(element, text);
        Ok(())
    }

    /// Set `dir` on `element`, or remove it for `None`. No-op when the
    /// attribute already matches.
    fn set_direction(&mut self, key: &NodeKey, element: H::Element, direction: Option<TextDirection>) {
        let wanted = direction.map(TextDirection::as_str);
        if self.host.attribute(element, "dir") == wanted {
            return;
        }
        match direction {
            Some(direction) => self.host.set_attribute(element, "dir", direction.as_str()),
            None => self.host.remove_attribute(element, "dir"),
        }
        self.record(ReconcileOp::DirectionSet {
            key: key.clone(),
            direction,
        });
    }
}

impl<H: HostSelection> Pass<'_, H> {
    /// Point the host selection at the text fragments of the selection's keys.
    fn restore_selection(&mut self, selection: &Selection) {
        let (Some(anchor), Some(focus)) = (
            self.selection_container(&selection.anchor_key),
            self.selection_container(&selection.focus_key),
        ) else {
            warning!(
                anchor = %selection.anchor_key,
                focus = %selection.focus_key,
                "selection keys have no host element"
            );
            return;
        };
        let (anchor_offset, focus_offset) = selection.range_offsets();
        self.host.install_range(HostRange::new(
            Boundary::new(anchor, anchor_offset),
            Boundary::new(focus, focus_offset),
        ));
        self.report.selection_installed = true;
    }

    fn selection_container(&self, key: &str) -> Option<H::Element> {
        let element = self.registry.element(key)?;
        match self.host.first_child(element) {
            Some(child) if self.host.is_text(child) => Some(child),
            _ => Some(element),
        }
    }
}

/// Applies keyed-diff decisions to the children of one parent.
struct ChildrenPatch<'x, 'p, H: HostTree> {
    pass: &'x mut Pass<'p, H>,
    parent_key: &'x NodeKey,
    parent: H::Element,
}

impl<H: HostTree> ChildPatcher<NodeKey> for ChildrenPatch<'_, '_, H> {
    type Error = ReconcileError;

    fn reconcile(&mut self, key: &NodeKey) -> Result<(), ReconcileError> {
        self.pass.reconcile_node(key, Some(self.parent))
    }

    fn create(&mut self, key: &NodeKey, before: Option<&NodeKey>) -> Result<(), ReconcileError> {
        let reference = match before {
            Some(before) => Some(self.pass.element_under(before, self.parent)?),
            None => None,
        };
        let element = self.pass.create_node(key)?;
        self.pass.host.insert_before(self.parent, element, reference);
        Ok(())
    }

    fn replace(&mut self, prev: &NodeKey, next: &NodeKey) -> Result<(), ReconcileError> {
        let old_element = self.pass.element_under(prev, self.parent)?;
        self.pass.replace_node(prev, next, old_element, self.parent)
    }

    fn move_before(&mut self, key: &NodeKey, before: &NodeKey) -> Result<(), ReconcileError> {
        let element = self.pass.element_under(key, self.parent)?;
        let reference = self.pass.element_under(before, self.parent)?;
        self.pass.host.insert_before(self.parent, element, Some(reference));
        self.pass.record(ReconcileOp::Moved(key.clone()));
        Ok(())
    }

    fn move_after(&mut self, key: &NodeKey, after: &NodeKey) -> Result<(), ReconcileError> {
        let element = self.pass.element_under(key, self.parent)?;
        let anchor = self.pass.element_under(after, self.parent)?;
        let reference = self.pass.host.next_sibling(anchor);
        self.pass.host.insert_before(self.parent, element, reference);
        self.pass.record(ReconcileOp::Moved(key.clone()));
        Ok(())
    }

    fn destroy(&mut self, key: &NodeKey) -> Result<(), ReconcileError> {
        let element = self.pass.element_under(key, self.parent)?;
        self.pass.destroy_node(key, element, Some(self.parent))
    }

    fn clear(&mut self, keys: &[NodeKey]) -> Result<(), ReconcileError> {
        for key in keys {
            let element = self.pass.element_under(key, self.parent)?;
            self.pass.destroy_node(key, element, None)?;
        }
        self.pass.host.clear_children(self.parent);
        self.pass.record(ReconcileOp::Cleared {
            parent: self.parent_key.clone(),
            count: keys.len(),
        });
        Ok(())
    }
}
