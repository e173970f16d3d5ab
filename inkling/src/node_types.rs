//! Node-type behaviors.
//!
//! Each node type name maps to a [`NodeBehavior`]: a small table of plain
//! function pointers the reconciler calls to build, patch, and tear down the
//! host element of a node. The set is closed at editor construction time.

use compact_str::CompactString;
use rapidhash::RapidHashMap as HashMap;

use crate::host::HostTree;
use crate::{Node, TextFormat};

/// Build the host element for a node. Children are attached by the reconciler.
pub type CreateFn<H> = fn(&Node, &mut H) -> <H as HostTree>::Element;

/// Patch `element` from `prev` to `next`. Returns `true` when the element
/// cannot be patched and has to be replaced by a freshly created one.
pub type UpdateFn<H> = fn(&Node, &Node, <H as HostTree>::Element, &mut H) -> bool;

/// Release host-side resources of an element that is being destroyed.
pub type DestroyFn<H> = fn(&Node, <H as HostTree>::Element, &mut H);

/// Text a node contributes to its ancestors' subtree text.
pub type TextContentFn = fn(&Node) -> &str;

pub struct NodeBehavior<H: HostTree> {
    pub create: CreateFn<H>,
    pub update: UpdateFn<H>,
    pub destroy: Option<DestroyFn<H>>,
    pub text_content: TextContentFn,
}

impl<H: HostTree> Clone for NodeBehavior<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: HostTree> Copy for NodeBehavior<H> {}

impl<H: HostTree> core::fmt::Debug for NodeBehavior<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeBehavior")
            .field("destroy", &self.destroy.is_some())
            .finish_non_exhaustive()
    }
}

impl<H: HostTree> NodeBehavior<H> {
    /// A behavior with no destroy hook that contributes the node's own text.
    pub fn new(create: CreateFn<H>, update: UpdateFn<H>) -> Self {
        Self {
            create,
            update,
            destroy: None,
            text_content: Node::text_content,
        }
    }

    pub fn with_destroy(mut self, destroy: DestroyFn<H>) -> Self {
        self.destroy = Some(destroy);
        self
    }

    pub fn with_text_content(mut self, text_content: TextContentFn) -> Self {
        self.text_content = text_content;
        self
    }
}

/// Registry of node-type behaviors.
#[derive(Debug, Clone)]
pub struct NodeTypes<H: HostTree> {
    behaviors: HashMap<CompactString, NodeBehavior<H>>,
}

impl<H: HostTree> Default for NodeTypes<H> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<H: HostTree> NodeTypes<H> {
    /// No node types at all.
    pub fn empty() -> Self {
        Self {
            behaviors: HashMap::default(),
        }
    }

    /// `root`, `paragraph`, `quote`, `listitem` and `text`.
    pub fn with_defaults() -> Self {
        let mut types = Self::empty();
        types.register("root", NodeBehavior::new(create_root, update_block));
        types.register("paragraph", NodeBehavior::new(create_paragraph, update_block));
        types.register("quote", NodeBehavior::new(create_quote, update_block));
        types.register("listitem", NodeBehavior::new(create_list_item, update_block));
        types.register("text", NodeBehavior::new(create_text, update_text));
        types
    }

    /// Register or overwrite the behavior of `node_type`.
    pub fn register(&mut self, node_type: &str, behavior: NodeBehavior<H>) -> &mut Self {
        self.behaviors.insert(CompactString::new(node_type), behavior);
        self
    }

    pub fn get(&self, node_type: &str) -> Option<&NodeBehavior<H>> {
        self.behaviors.get(node_type)
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.behaviors.contains_key(node_type)
    }
}

fn create_root<H: HostTree>(_: &Node, host: &mut H) -> H::Element {
    host.create_element("div")
}

fn create_paragraph<H: HostTree>(_: &Node, host: &mut H) -> H::Element {
    host.create_element("p")
}

fn create_quote<H: HostTree>(_: &Node, host: &mut H) -> H::Element {
    host.create_element("blockquote")
}

fn create_list_item<H: HostTree>(_: &Node, host: &mut H) -> H::Element {
    host.create_element("li")
}

fn update_block<H: HostTree>(prev: &Node, next: &Node, _: H::Element, _: &mut H) -> bool {
    prev.node_type() != next.node_type()
}

/// Host tag for a text node's wrapper element.
pub fn text_tag(node: &Node) -> &'static str {
    let format = node.format();
    if format.contains(TextFormat::CODE) {
        "code"
    } else if format.contains(TextFormat::BOLD) {
        "strong"
    } else if format.contains(TextFormat::ITALIC) {
        "em"
    } else {
        "span"
    }
}

fn create_text<H: HostTree>(node: &Node, host: &mut H) -> H::Element {
    let element = host.create_element(text_tag(node));
    let fragment = host.create_text(node.text_content());
    host.append_child(element, fragment);
    element
}

fn update_text<H: HostTree>(prev: &Node, next: &Node, element: H::Element, host: &mut H) -> bool {
    if prev.node_type() != next.node_type() || text_tag(prev) != text_tag(next) {
        return true;
    }
    if prev.text_content() != next.text_content() {
        let first = host.first_child(element);
        match first {
            Some(fragment) if host.is_text(fragment) => host.set_text(fragment, next.text_content()),
            _ => {
                let fragment = host.create_text(next.text_content());
                host.insert_before(element, fragment, first);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArenaHost;

    #[test]
    fn test_text_tag_by_format() {
        let plain = Node::text("t", "x");
        assert_eq!(text_tag(&plain), "span");
        assert_eq!(text_tag(&plain.clone().with_format(TextFormat::BOLD)), "strong");
        assert_eq!(text_tag(&plain.clone().with_format(TextFormat::ITALIC)), "em");
        assert_eq!(
            text_tag(&plain.with_format(TextFormat::CODE | TextFormat::BOLD)),
            "code"
        );
    }

    #[test]
    fn test_text_update_patches_in_place() {
        let types = NodeTypes::<ArenaHost>::with_defaults();
        let behavior = types.get("text").unwrap();
        let mut host = ArenaHost::new();
        let prev = Node::text("t", "old");
        let element = (behavior.create)(&prev, &mut host);
        let next = prev.clone().with_text("new");
        assert!(!(behavior.update)(&prev, &next, element, &mut host));
        assert_eq!(host.outer_html(element), "<span>new</span>");
    }

    #[test]
    fn test_text_update_replaces_on_tag_change() {
        let types = NodeTypes::<ArenaHost>::with_defaults();
        let behavior = types.get("text").unwrap();
        let mut host = ArenaHost::new();
        let prev = Node::text("t", "x");
        let element = (behavior.create)(&prev, &mut host);
        let next = prev.clone().with_format(TextFormat::BOLD);
        assert!((behavior.update)(&prev, &next, element, &mut host));
    }

    #[test]
    fn test_register_overrides() {
        fn create_h1<H: HostTree>(_: &Node, host: &mut H) -> H::Element {
            host.create_element("h1")
        }
        let mut types = NodeTypes::<ArenaHost>::with_defaults();
        types.register("paragraph", NodeBehavior::new(create_h1, update_block));
        let mut host = ArenaHost::new();
        let node = Node::element("p", "paragraph", Vec::<&str>::new());
        let element = (types.get("paragraph").unwrap().create)(&node, &mut host);
        assert_eq!(host.tag(element), Some("h1"));
        assert!(!types.contains("heading"));
    }
}
