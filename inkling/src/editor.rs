//! Editor - owns the host, the registry and the current view model, and runs
//! edit cycles one at a time.

use crate::host::{HostSelection, HostTree};
use crate::resolver::{EventKind, InputState, SelectionResolver};
use crate::{
    EditorConfig, Node, NodeKey, NodeMap, NodeTypes, ReconcileError, ReconcileReport, Reconciler,
    Registry, Selection, TextDirection, ViewModel,
};

/// Drives reconcile cycles against one host.
///
/// ```
/// use inkling::{Editor, Node, NodeMap, ViewModel};
///
/// let mut editor = Editor::with_arena_host();
/// let next = NodeMap::from_nodes(
///     "root",
///     [
///         Node::element("root", "root", ["p"]),
///         Node::element("p", "paragraph", ["t"]).with_parent("root"),
///         Node::text("t", "Hello").with_parent("p"),
///     ],
/// );
/// let report = editor.update(ViewModel::new(next)).unwrap();
/// assert_eq!(report.created, 2);
/// assert_eq!(
///     editor.host().inner_html(editor.root_element()),
///     "<p dir=\"ltr\"><span>Hello</span></p>"
/// );
/// ```
#[derive(Debug)]
pub struct Editor<H: HostSelection> {
    host: H,
    root_element: H::Element,
    registry: Registry<H::Element>,
    node_types: NodeTypes<H>,
    config: EditorConfig,
    view_model: ViewModel,
    key_down: bool,
    composing: bool,
}

impl Editor<crate::ArenaHost> {
    /// An editor over a fresh in-memory host with the default node types.
    pub fn with_arena_host() -> Self {
        let mut host = crate::ArenaHost::new();
        let root = host.create_element("div");
        host.set_attribute(root, "contenteditable", "true");
        host.reset_mutations();
        Self::new(host, root, NodeTypes::with_defaults(), EditorConfig::default())
    }
}

impl<H: HostSelection> Editor<H> {
    /// Wrap `root_element`, the host container the root node renders into. The
    /// editor starts from an empty root node.
    pub fn new(host: H, root_element: H::Element, node_types: NodeTypes<H>, config: EditorConfig) -> Self {
        let mut registry = Registry::new();
        registry.insert(config.root_key.clone(), root_element);
        let root_key = config.root_key.clone();
        let empty = NodeMap::from_nodes(
            root_key.clone(),
            [Node::element(root_key, "root", Vec::<NodeKey>::new())],
        );
        Self {
            host,
            root_element,
            registry,
            node_types,
            config,
            view_model: ViewModel::new(empty),
            key_down: false,
            composing: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, for simulating user changes such as moving
    /// the native selection.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn root_element(&self) -> H::Element {
        self.root_element
    }

    pub fn registry(&self) -> &Registry<H::Element> {
        &self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Force a direction onto the root container from the next cycle on, or
    /// lift the override with `None`.
    pub fn set_forced_direction(&mut self, direction: Option<TextDirection>) {
        self.config.reconciler.forced_direction = direction;
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.view_model
    }

    pub fn element_by_key(&self, key: &str) -> Option<H::Element> {
        self.registry.element(key)
    }

    pub fn is_key_down(&self) -> bool {
        self.key_down
    }

    pub fn set_key_down(&mut self, key_down: bool) {
        self.key_down = key_down;
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn set_composing(&mut self, composing: bool) {
        self.composing = composing;
    }

    /// The document is empty and no composition is running.
    pub fn is_blank(&self) -> bool {
        self.view_model.is_blank(self.composing)
    }

    /// Reconcile the host to `next` and make it the current view model. On
    /// error the current view model is kept.
    pub fn update(&mut self, next: ViewModel) -> Result<ReconcileReport, ReconcileError> {
        let report = Reconciler::new(
            &mut self.host,
            &mut self.registry,
            &self.node_types,
            &self.config.reconciler,
            self.root_element,
        )
        .reconcile(&self.view_model, &next)?;
        self.view_model = next;
        Ok(report)
    }

    /// Selection for the next cycle, given the event being handled.
    pub fn create_selection(&self, event: Option<EventKind>) -> Option<Selection> {
        let input = InputState::new(event, self.key_down);
        self.resolver()
            .create_selection(input, self.view_model.selection.as_ref())
    }

    /// Resolver over the current view model.
    pub fn resolver(&self) -> SelectionResolver<'_, H> {
        SelectionResolver::new(
            &self.view_model.node_map,
            &self.registry,
            &self.host,
            self.root_element,
        )
    }
}
