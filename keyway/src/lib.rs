//! # Keyway
//!
//! Keyed children diffing for render-tree reconcilers.
//!
//! A keyway is the groove a key slides along; this crate slides two cursors
//! along each end of the previous and next child-key sequences of a parent and
//! reports what has to happen to the rendered children.
//!
//! ## Algorithm Overview
//!
//! The diff runs in phases:
//!
//! 0. **Validation**: a key listed twice in the next sequence is rejected
//!    before anything is patched.
//! 1. **Fast paths**: empty → N creates in order, N → empty is one bulk clear,
//!    and one → one is either an in-place diff or a replacement.
//! 2. **Two-pointer scan**: compare `prev[start]`, `prev[end]`, `next[start]`
//!    and `next[end]`. Equal heads and tails are diffed in place; crossed pairs
//!    are moves to the opposite end.
//! 3. **Index fallback**: when none of the four comparisons match, a key → index
//!    map over the remaining previous keys is built once. The next head is
//!    either created or moved out of the middle, leaving a tombstone behind.
//! 4. **Leftovers**: keys remaining on the next side are inserted; keys remaining
//!    on the previous side are destroyed.
//!
//! The render tree is never touched directly. Every decision goes through a
//! [`ChildPatcher`], so the same diff drives DOM-like hosts, arenas, or test
//! doubles.

#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]

mod tracing_macros;
#[allow(unused_imports)]
pub(crate) use tracing_macros::{debug, trace};

mod children;
mod window;

pub use children::{ChildPatcher, DiffError, diff_children};
