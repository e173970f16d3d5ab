//! Shared helpers for the integration tests.

#![allow(dead_code)]

use inkling::{ArenaHost, Editor, Node, NodeMap, ViewModel};
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber. Filtered by `INKLING_LOG`, silent when
/// that is unset.
pub fn setup() {
    let filter = EnvFilter::try_from_env("INKLING_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .compact()
        .try_init()
        .ok();
}

/// Key of the text node inside block `key`.
pub fn text_key(key: &str) -> String {
    format!("{key}-t")
}

/// A root holding one paragraph per key. Each paragraph has a single text
/// node whose content is the block key itself.
pub fn blocks(keys: &[&str]) -> NodeMap {
    let mut map = NodeMap::from_nodes("root", [Node::element("root", "root", keys.iter().copied())]);
    for key in keys {
        insert_block(&mut map, key);
    }
    map
}

fn insert_block(map: &mut NodeMap, key: &str) {
    let text = text_key(key);
    map.insert(Node::element(key, "paragraph", [text.as_str()]).with_parent("root"));
    map.insert(Node::text(text.as_str(), key).with_parent(key));
}

/// Next revision of a [`blocks`] map with the root children set to `keys`.
/// Blocks present in both keep their node identity, new ones are added and
/// dropped ones removed.
pub fn rearrange(prev: &NodeMap, keys: &[&str]) -> NodeMap {
    let mut next = prev.clone();
    let old: Vec<String> = prev
        .get("root")
        .map(|root| root.children().iter().map(|k| k.to_string()).collect())
        .unwrap_or_default();
    for key in &old {
        if !keys.contains(&key.as_str()) {
            next.remove(key);
            next.remove(&text_key(key));
        }
    }
    for key in keys {
        if !next.contains(key) {
            insert_block(&mut next, key);
        }
    }
    next.update("root", |root| root.clone().with_children(keys.iter().copied()));
    next
}

/// An arena editor already showing `map`, with the mutation counter reset.
pub fn editor_with(map: NodeMap) -> Editor<ArenaHost> {
    let mut editor = Editor::with_arena_host();
    editor
        .update(ViewModel::new(map))
        .expect("initial render failed");
    editor.host_mut().reset_mutations();
    editor
}

/// Text of the root container, which for [`blocks`] documents spells out the
/// block order.
pub fn host_text(editor: &Editor<ArenaHost>) -> String {
    editor.host().text_content(editor.root_element())
}

/// Registry keys, sorted.
pub fn registry_keys(editor: &Editor<ArenaHost>) -> Vec<String> {
    let mut keys: Vec<_> = editor.registry().keys().map(|k| k.to_string()).collect();
    keys.sort();
    keys
}

/// Node map keys, sorted.
pub fn map_keys(map: &NodeMap) -> Vec<String> {
    let mut keys: Vec<_> = map.keys().map(|k| k.to_string()).collect();
    keys.sort();
    keys
}
