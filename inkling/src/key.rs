//! NodeKey - stable node identity across revisions.

use compact_str::CompactString;
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Opaque identifier of a node, unique within one [`NodeMap`](crate::NodeMap).
///
/// Keys survive across revisions when a node is logically the same node, which
/// is what lets the reconciler keep host elements alive and lets a selection
/// point at the same place after an edit.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeKey(CompactString);

impl NodeKey {
    pub fn new(key: impl Into<CompactString>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for NodeKey {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NodeKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for NodeKey {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for NodeKey {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for NodeKey {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self(CompactString::new(s))
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        Self(CompactString::from(s))
    }
}

impl From<CompactString> for NodeKey {
    fn from(s: CompactString) -> Self {
        Self(s)
    }
}

impl From<&NodeKey> for NodeKey {
    fn from(key: &NodeKey) -> Self {
        key.clone()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<NodeKey>();
    assert_sync::<NodeKey>();
};
