//! Keyed document reconciler and selection resolver for structured text
//! editors.
//!
//! inkling provides:
//! - **Node model**: immutable, `Rc`-shared node snapshots keyed by [`NodeKey`],
//!   grouped per revision in a [`NodeMap`] and paired with a selection in a
//!   [`ViewModel`]
//! - **Reconciler**: patches a host render tree from one view model to the next
//!   with a keyed children diff, caching subtree text and maintaining `dir`
//! - **Selection resolver**: turns host ranges into model selections and back
//! - **Hosts**: the [`HostTree`] / [`HostSelection`] contracts plus an
//!   `indextree`-backed [`ArenaHost`]
//!
//! # Example
//!
//! ```rust
//! use inkling::{Editor, EventKind, Node, NodeMap, Selection, ViewModel};
//!
//! let mut editor = Editor::with_arena_host();
//! let doc = NodeMap::from_nodes(
//!     "root",
//!     [
//!         Node::element("root", "root", ["p"]),
//!         Node::element("p", "paragraph", ["t"]).with_parent("root"),
//!         Node::text("t", "Hello").with_parent("p"),
//!     ],
//! );
//! editor
//!     .update(ViewModel::new(doc).with_selection(Selection::caret("t", 5)))
//!     .unwrap();
//!
//! // The host selection now sits at the end of "Hello" and reads back the same.
//! let selection = editor.create_selection(Some(EventKind::SelectionChange)).unwrap();
//! assert_eq!(selection.anchor_key, "t");
//! assert_eq!(selection.anchor_offset, 5);
//! assert!(!selection.needs_sync);
//! ```

mod tracing_macros;
#[allow(unused_imports)]
pub(crate) use tracing_macros::{debug, trace, warning};

mod arena_host;
mod config;
mod direction;
mod editor;
mod error;
pub mod host;
mod key;
mod node;
mod node_map;
pub mod node_types;
mod reconciler;
mod registry;
mod resolver;
mod selection;
mod view_model;

pub use arena_host::{ArenaHost, HostNode};
pub use config::{EditorConfig, ReconcilerConfig};
pub use direction::TextDirection;
pub use editor::Editor;
pub use error::{ReconcileError, Revision, SelectionError};
pub use host::{Boundary, HostRange, HostSelection, HostTree};
pub use key::NodeKey;
pub use node::{Node, NodeFlags, NodeKind, TextFormat};
pub use node_map::{DfsNode, NodeMap};
pub use node_types::{NodeBehavior, NodeTypes};
pub use reconciler::{ReconcileOp, ReconcileReport, Reconciler};
pub use registry::Registry;
pub use resolver::{EventKind, InputState, SelectionResolver};
pub use selection::Selection;
pub use view_model::ViewModel;

// Re-export so hosts can name arena handles without a direct dependency.
pub use indextree;
