//! Reconciler and editor configuration.

use crate::{NodeKey, TextDirection};

/// Options for one reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Put this direction on the root container and skip per-block direction
    /// detection.
    ///
    /// When the override is lifted, the next pass puts the direction detected
    /// from the document text back on the root. Blocks get their `dir` back
    /// the next time their own text changes.
    pub forced_direction: Option<TextDirection>,
    /// Collect the per-operation log in [`ReconcileReport`](crate::ReconcileReport).
    /// Counters are always kept.
    pub record_ops: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            forced_direction: None,
            record_ops: true,
        }
    }
}

impl ReconcilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forced_direction(mut self, direction: TextDirection) -> Self {
        self.forced_direction = Some(direction);
        self
    }

    pub fn record_ops(mut self, record: bool) -> Self {
        self.record_ops = record;
        self
    }
}

/// Options for an [`Editor`](crate::Editor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Key of the root node. Pre-registered to the root container.
    pub root_key: NodeKey,
    pub reconciler: ReconcilerConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            root_key: NodeKey::from("root"),
            reconciler: ReconcilerConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_key(mut self, key: impl Into<NodeKey>) -> Self {
        self.root_key = key.into();
        self
    }

    pub fn reconciler(mut self, config: ReconcilerConfig) -> Self {
        self.reconciler = config;
        self
    }
}
