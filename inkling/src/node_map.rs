//! NodeMap - one revision of the document, indexed by key.

use rapidhash::RapidHashMap as HashMap;
use smallvec::SmallVec;
use std::rc::Rc;

use crate::{Node, NodeKey};

/// A node visited by [`NodeMap::dfs`], with its depth below the start node.
#[derive(Debug, Clone)]
pub struct DfsNode<'a> {
    pub depth: usize,
    pub node: &'a Rc<Node>,
}

/// Key → node snapshot for one revision.
///
/// Cloning a map is cheap per node: the clone shares every `Rc<Node>` with the
/// original, so untouched nodes keep their identity in the next revision.
#[derive(Debug, Clone)]
pub struct NodeMap {
    root: NodeKey,
    nodes: HashMap<NodeKey, Rc<Node>>,
}

impl NodeMap {
    /// An empty map whose tree is rooted at `root`. The root node itself still
    /// has to be inserted.
    pub fn new(root: impl Into<NodeKey>) -> Self {
        Self {
            root: root.into(),
            nodes: HashMap::default(),
        }
    }

    /// Build a map from nodes. The root key is taken from `root`.
    pub fn from_nodes(root: impl Into<NodeKey>, nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut map = Self::new(root);
        for node in nodes {
            map.insert(node);
        }
        map
    }

    pub fn root_key(&self) -> &NodeKey {
        &self.root
    }

    pub fn root(&self) -> Option<&Rc<Node>> {
        self.nodes.get(&self.root)
    }

    /// Insert a node under a fresh identity, returning the one it displaced.
    pub fn insert(&mut self, node: Node) -> Option<Rc<Node>> {
        self.insert_shared(Rc::new(node))
    }

    /// Insert an existing snapshot, keeping its identity.
    pub fn insert_shared(&mut self, node: Rc<Node>) -> Option<Rc<Node>> {
        self.nodes.insert(node.key().clone(), node)
    }

    /// Replace the node at `key` with `f(old)`. The result always gets a new
    /// identity. Returns `false` if the key is absent.
    pub fn update(&mut self, key: &str, f: impl FnOnce(&Node) -> Node) -> bool {
        let Some(old) = self.nodes.get(key) else {
            return false;
        };
        let new = f(old);
        self.insert(new);
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<Rc<Node>> {
        self.nodes.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Rc<Node>> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &NodeKey> + '_ {
        self.nodes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeKey, &Rc<Node>)> + '_ {
        self.nodes.iter()
    }

    /// Pre-order walk of the subtree at `start`. Child keys missing from the map
    /// are skipped.
    pub fn dfs(&self, start: &str) -> Vec<DfsNode<'_>> {
        let mut out = Vec::new();
        let Some(first) = self.nodes.get(start) else {
            return out;
        };
        let mut stack: SmallVec<[(&Rc<Node>, usize); 32]> = SmallVec::new();
        stack.push((first, 0));
        while let Some((node, depth)) = stack.pop() {
            out.push(DfsNode { depth, node });
            for child in node.children().iter().rev() {
                if let Some(child) = self.nodes.get(child) {
                    stack.push((child, depth + 1));
                }
            }
        }
        out
    }

    /// Concatenated text of every text node in the subtree, in tree order.
    pub fn text_content(&self, key: &str) -> String {
        let mut out = String::new();
        for entry in self.dfs(key) {
            out.push_str(entry.node.text_content());
        }
        out
    }

    /// First text node in the subtree at `key` (the node itself if it is text).
    pub fn first_text_descendant(&self, key: &str) -> Option<&Rc<Node>> {
        let node = self.nodes.get(key)?;
        if node.is_text() {
            return Some(node);
        }
        node.children()
            .iter()
            .find_map(|child| self.first_text_descendant(child))
    }

    /// Last text node in the subtree at `key` (the node itself if it is text).
    pub fn last_text_descendant(&self, key: &str) -> Option<&Rc<Node>> {
        let node = self.nodes.get(key)?;
        if node.is_text() {
            return Some(node);
        }
        node.children()
            .iter()
            .rev()
            .find_map(|child| self.last_text_descendant(child))
    }

    /// Every node between `from` and `to` inclusive, in document order. The
    /// endpoints may be given in either order. Empty if either is not reachable
    /// from the root.
    pub fn nodes_between(&self, from: &str, to: &str) -> Vec<&Rc<Node>> {
        let order = self.dfs(&self.root);
        let from_idx = order.iter().position(|e| e.node.key() == from);
        let to_idx = order.iter().position(|e| e.node.key() == to);
        let (Some(a), Some(b)) = (from_idx, to_idx) else {
            return Vec::new();
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        order[lo..=hi].iter().map(|e| e.node).collect()
    }

    /// Walk from `key` up through its parents (starting with the node itself)
    /// and return the first node accepted by `pred`. The root is never
    /// returned.
    pub fn find_matching_parent(
        &self,
        key: &str,
        mut pred: impl FnMut(&Node) -> bool,
    ) -> Option<&Rc<Node>> {
        let mut current = self.nodes.get(key);
        while let Some(node) = current {
            if node.key() == &self.root {
                return None;
            }
            if pred(node) {
                return Some(node);
            }
            current = node.parent().and_then(|p| self.nodes.get(p.as_str()));
        }
        None
    }
}
