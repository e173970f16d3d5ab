//! Keyed diff of one parent's children.
//!
//! The caller hands over the previous and next child-key sequences and a
//! [`ChildPatcher`] that owns the actual render tree. The diff never touches
//! the render tree itself: every decision is expressed as a patcher callback,
//! issued in an order that is valid to apply immediately.

use core::fmt;
use core::hash::Hash;
use rapidhash::RapidHashSet as HashSet;

use crate::window::PrevWindow;
#[allow(unused_imports)]
use crate::{debug, trace};

/// Callbacks issued by [`diff_children`].
///
/// Keys passed as `before`/`after` references always belong to children that are
/// currently attached under the parent being diffed.
pub trait ChildPatcher<K> {
    /// Error type surfaced by the patcher. Returned unchanged inside
    /// [`DiffError::Patch`].
    type Error;

    /// `key` is present in both sequences; diff it in place.
    fn reconcile(&mut self, key: &K) -> Result<(), Self::Error>;

    /// `key` is new. Build it and insert it before `before`, or append when `None`.
    fn create(&mut self, key: &K, before: Option<&K>) -> Result<(), Self::Error>;

    /// The only previous child `prev` is replaced by the only next child `next`.
    fn replace(&mut self, prev: &K, next: &K) -> Result<(), Self::Error>;

    /// Move the already reconciled `key` so it sits directly before `before`.
    fn move_before(&mut self, key: &K, before: &K) -> Result<(), Self::Error>;

    /// Move the already reconciled `key` so it sits directly after `after`.
    fn move_after(&mut self, key: &K, after: &K) -> Result<(), Self::Error>;

    /// `key` is gone from the next sequence; detach and release it.
    fn destroy(&mut self, key: &K) -> Result<(), Self::Error>;

    /// Every previous child is gone. Release all of `keys` and empty the parent
    /// in one step.
    fn clear(&mut self, keys: &[K]) -> Result<(), Self::Error>;
}

/// Errors from [`diff_children`].
#[derive(Debug, thiserror::Error)]
pub enum DiffError<K, E> {
    /// The next sequence lists `key` more than once. Nothing has been patched.
    #[error("key {key:?} appears more than once in the next children")]
    DuplicateKey {
        /// The first key seen twice.
        key: K,
    },

    /// A key resolved through the index map no longer occupies its slot, so
    /// the index and the window disagree.
    #[error("moved key {key:?} not found in the remaining previous children")]
    MoveSourceMissing {
        /// The key that was looked up.
        key: K,
    },

    /// The patcher rejected a callback.
    #[error("{0}")]
    Patch(E),
}

/// Diff two child-key sequences, driving `patcher` with the minimal set of
/// creations, moves and removals.
///
/// # Example
///
/// ```
/// use keyway::{ChildPatcher, diff_children};
///
/// #[derive(Default)]
/// struct Log(Vec<String>);
///
/// impl ChildPatcher<char> for Log {
///     type Error = ();
///     fn reconcile(&mut self, _: &char) -> Result<(), ()> { Ok(()) }
///     fn create(&mut self, k: &char, _: Option<&char>) -> Result<(), ()> {
///         self.0.push(format!("+{k}"));
///         Ok(())
///     }
///     fn replace(&mut self, _: &char, _: &char) -> Result<(), ()> { Ok(()) }
///     fn move_before(&mut self, k: &char, b: &char) -> Result<(), ()> {
///         self.0.push(format!("{k}<{b}"));
///         Ok(())
///     }
///     fn move_after(&mut self, k: &char, a: &char) -> Result<(), ()> {
///         self.0.push(format!("{k}>{a}"));
///         Ok(())
///     }
///     fn destroy(&mut self, k: &char) -> Result<(), ()> {
///         self.0.push(format!("-{k}"));
///         Ok(())
///     }
///     fn clear(&mut self, _: &[char]) -> Result<(), ()> { Ok(()) }
/// }
///
/// let mut log = Log::default();
/// diff_children(&['a', 'b', 'c'], &['c', 'a', 'b'], &mut log).unwrap();
/// assert_eq!(log.0, ["c<a"]);
/// ```
pub fn diff_children<K, P>(
    prev: &[K],
    next: &[K],
    patcher: &mut P,
) -> Result<(), DiffError<K, P::Error>>
where
    K: Clone + Eq + Hash + fmt::Debug,
    P: ChildPatcher<K>,
{
    trace!(prev = prev.len(), next = next.len(), "diff_children");

    if let Some(key) = first_duplicate(next) {
        return Err(DiffError::DuplicateKey { key: key.clone() });
    }

    match (prev, next) {
        ([], []) => Ok(()),
        ([], _) => {
            for key in next {
                patcher.create(key, None).map_err(DiffError::Patch)?;
            }
            Ok(())
        }
        (_, []) => patcher.clear(prev).map_err(DiffError::Patch),
        ([only_prev], [only_next]) => {
            if only_prev == only_next {
                patcher.reconcile(only_next).map_err(DiffError::Patch)
            } else {
                patcher
                    .replace(only_prev, only_next)
                    .map_err(DiffError::Patch)
            }
        }
        _ => two_pointer(prev, next, patcher),
    }
}

fn first_duplicate<K: Eq + Hash>(keys: &[K]) -> Option<&K> {
    if keys.len() < 2 {
        return None;
    }
    let mut seen = HashSet::default();
    seen.reserve(keys.len());
    keys.iter().find(|key| !seen.insert(*key))
}

fn two_pointer<K, P>(prev: &[K], next: &[K], patcher: &mut P) -> Result<(), DiffError<K, P::Error>>
where
    K: Clone + Eq + Hash + fmt::Debug,
    P: ChildPatcher<K>,
{
    let mut window = PrevWindow::new(prev);

    // Half-open ranges: the live windows are prev[prev_start..prev_end] and
    // next[next_start..next_end].
    let mut prev_start = 0;
    let mut prev_end = prev.len();
    let mut next_start = 0;
    let mut next_end = next.len();

    while prev_start < prev_end && next_start < next_end {
        let Some(prev_start_key) = window.get(prev_start) else {
            prev_start += 1;
            continue;
        };
        let Some(prev_end_key) = window.get(prev_end - 1) else {
            prev_end -= 1;
            continue;
        };
        let next_start_key = &next[next_start];
        let next_end_key = &next[next_end - 1];

        if prev_start_key == next_start_key {
            patcher.reconcile(prev_start_key).map_err(DiffError::Patch)?;
            prev_start += 1;
            next_start += 1;
        } else if prev_end_key == next_end_key {
            patcher.reconcile(prev_end_key).map_err(DiffError::Patch)?;
            prev_end -= 1;
            next_end -= 1;
        } else if prev_start_key == next_end_key {
            patcher.reconcile(prev_start_key).map_err(DiffError::Patch)?;
            debug!(key = ?prev_start_key, after = ?prev_end_key, "start moved to end");
            patcher
                .move_after(prev_start_key, prev_end_key)
                .map_err(DiffError::Patch)?;
            prev_start += 1;
            next_end -= 1;
        } else if prev_end_key == next_start_key {
            patcher.reconcile(prev_end_key).map_err(DiffError::Patch)?;
            debug!(key = ?prev_end_key, before = ?prev_start_key, "end moved to start");
            patcher
                .move_before(prev_end_key, prev_start_key)
                .map_err(DiffError::Patch)?;
            prev_end -= 1;
            next_start += 1;
        } else {
            match window.position(next_start_key, prev_start, prev_end) {
                None => {
                    patcher
                        .create(next_start_key, Some(prev_start_key))
                        .map_err(DiffError::Patch)?;
                }
                Some(idx) => {
                    let in_window = (prev_start..prev_end).contains(&idx);
                    let moved = if in_window { window.take(idx) } else { None };
                    if moved != Some(next_start_key) {
                        return Err(DiffError::MoveSourceMissing {
                            key: next_start_key.clone(),
                        });
                    }
                    patcher.reconcile(next_start_key).map_err(DiffError::Patch)?;
                    debug!(key = ?next_start_key, before = ?prev_start_key, "moved out of the middle");
                    patcher
                        .move_before(next_start_key, prev_start_key)
                        .map_err(DiffError::Patch)?;
                }
            }
            next_start += 1;
        }
    }

    if prev_start >= prev_end {
        // Leftover next keys are insertions, placed before the first child that
        // was already settled at the tail.
        let before = next.get(next_end);
        for key in &next[next_start..next_end] {
            patcher.create(key, before).map_err(DiffError::Patch)?;
        }
    } else if next_start >= next_end {
        for idx in prev_start..prev_end {
            if let Some(key) = window.get(idx) {
                patcher.destroy(key).map_err(DiffError::Patch)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Applies callbacks to a plain vector so results can be checked against the
    /// next sequence.
    #[derive(Debug, Default)]
    struct VecPatcher {
        children: Vec<&'static str>,
        ops: Vec<String>,
    }

    impl VecPatcher {
        fn new(children: &[&'static str]) -> Self {
            Self {
                children: children.to_vec(),
                ops: Vec::new(),
            }
        }

        fn position(&self, key: &str) -> usize {
            self.children
                .iter()
                .position(|k| *k == key)
                .unwrap_or_else(|| panic!("{key} not attached"))
        }

        fn count(&self, prefix: &str) -> usize {
            self.ops.iter().filter(|op| op.starts_with(prefix)).count()
        }
    }

    impl ChildPatcher<&'static str> for VecPatcher {
        type Error = String;

        fn reconcile(&mut self, key: &&'static str) -> Result<(), String> {
            self.ops.push(format!("reconcile {key}"));
            Ok(())
        }

        fn create(&mut self, key: &&'static str, before: Option<&&'static str>) -> Result<(), String> {
            let at = before.map_or(self.children.len(), |b| self.position(b));
            self.children.insert(at, *key);
            self.ops.push(format!("create {key}"));
            Ok(())
        }

        fn replace(&mut self, prev: &&'static str, next: &&'static str) -> Result<(), String> {
            let at = self.position(prev);
            self.children[at] = *next;
            self.ops.push(format!("replace {prev} {next}"));
            Ok(())
        }

        fn move_before(&mut self, key: &&'static str, before: &&'static str) -> Result<(), String> {
            let from = self.position(key);
            let moved = self.children.remove(from);
            let at = self.position(before);
            self.children.insert(at, moved);
            self.ops.push(format!("move {key}"));
            Ok(())
        }

        fn move_after(&mut self, key: &&'static str, after: &&'static str) -> Result<(), String> {
            let from = self.position(key);
            let moved = self.children.remove(from);
            let at = self.position(after) + 1;
            self.children.insert(at, moved);
            self.ops.push(format!("move {key}"));
            Ok(())
        }

        fn destroy(&mut self, key: &&'static str) -> Result<(), String> {
            let at = self.position(key);
            self.children.remove(at);
            self.ops.push(format!("destroy {key}"));
            Ok(())
        }

        fn clear(&mut self, keys: &[&'static str]) -> Result<(), String> {
            self.children.clear();
            self.ops.push(format!("clear {}", keys.len()));
            Ok(())
        }
    }

    fn run(prev: &[&'static str], next: &[&'static str]) -> VecPatcher {
        let mut patcher = VecPatcher::new(prev);
        diff_children(prev, next, &mut patcher).unwrap();
        assert_eq!(patcher.children, next, "ops: {:?}", patcher.ops);
        patcher
    }

    #[test]
    fn test_rotate_right() {
        let p = run(&["a", "b", "c"], &["c", "a", "b"]);
        assert_eq!(p.count("move"), 1);
        assert_eq!(p.count("create"), 0);
        assert_eq!(p.count("destroy"), 0);
        assert_eq!(p.count("reconcile"), 3);
    }

    #[test]
    fn test_rotate_left() {
        let p = run(&["a", "b", "c"], &["b", "c", "a"]);
        assert_eq!(p.ops.first().map(String::as_str), Some("reconcile a"));
        assert_eq!(p.count("move"), 1);
    }

    #[test]
    fn test_reverse() {
        let p = run(&["a", "b", "c", "d", "e"], &["e", "d", "c", "b", "a"]);
        assert_eq!(p.count("create"), 0);
        assert_eq!(p.count("destroy"), 0);
    }

    #[test]
    fn test_append_one() {
        let p = run(&["a", "b"], &["a", "b", "c"]);
        assert_eq!(p.count("create"), 1);
        assert_eq!(p.count("move"), 0);
    }

    #[test]
    fn test_prepend_one() {
        let p = run(&["a", "b"], &["z", "a", "b"]);
        assert_eq!(p.count("create"), 1);
        assert_eq!(p.count("move"), 0);
    }

    #[test]
    fn test_insert_in_middle() {
        let p = run(&["a", "b", "c", "d"], &["a", "b", "x", "y", "c", "d"]);
        assert_eq!(p.count("create"), 2);
        assert_eq!(p.count("move"), 0);
    }

    #[test]
    fn test_remove_from_middle() {
        let p = run(&["a", "b", "c", "d"], &["a", "d"]);
        assert_eq!(p.count("destroy"), 2);
        assert_eq!(p.count("clear"), 0);
    }

    #[test]
    fn test_from_empty() {
        let p = run(&[], &["x", "y"]);
        assert_eq!(p.ops, ["create x", "create y"]);
    }

    #[test]
    fn test_to_empty_clears() {
        let p = run(&["x", "y"], &[]);
        assert_eq!(p.ops, ["clear 2"]);
    }

    #[test]
    fn test_single_swap_replaces() {
        let p = run(&["x"], &["y"]);
        assert_eq!(p.ops, ["replace x y"]);
    }

    #[test]
    fn test_middle_move_tombstones() {
        // "c" is found through the index map and moved, leaving a hole that the
        // start pointer later skips.
        let p = run(&["a", "b", "c", "d"], &["c", "a", "d", "b"]);
        assert_eq!(p.count("move"), 2);
        assert_eq!(p.count("create"), 0);
        assert_eq!(p.count("destroy"), 0);
    }

    #[test]
    fn test_mixed_insert_move_delete() {
        let p = run(&["a", "b", "c", "d", "e"], &["f", "d", "a", "g", "c"]);
        assert_eq!(p.count("create"), 2);
        assert_eq!(p.count("destroy"), 2);
    }

    #[test]
    fn test_duplicate_next_key_is_reported() {
        let prev = ["a", "b", "c", "d"];
        let next = ["x", "c", "c", "y"];
        let mut patcher = VecPatcher::new(&prev);
        let err = diff_children(&prev, &next, &mut patcher).unwrap_err();
        assert!(matches!(err, DiffError::DuplicateKey { key: "c" }));
    }

    #[test]
    fn test_duplicate_of_a_kept_key_patches_nothing() {
        // Both copies of "a" would otherwise go through reconcile and create.
        let prev = ["a", "b"];
        let next = ["a", "a"];
        let mut patcher = VecPatcher::new(&prev);
        let err = diff_children(&prev, &next, &mut patcher).unwrap_err();
        assert!(matches!(err, DiffError::DuplicateKey { key: "a" }));
        assert!(patcher.ops.is_empty());
        assert_eq!(patcher.children, prev);
    }

    #[test]
    fn test_duplicate_into_empty_parent_is_reported() {
        let mut patcher = VecPatcher::new(&[]);
        let err = diff_children(&[], &["x", "x"], &mut patcher).unwrap_err();
        assert!(matches!(err, DiffError::DuplicateKey { key: "x" }));
        assert!(patcher.ops.is_empty());
    }

    #[test]
    fn test_patch_error_propagates() {
        struct Failing;
        impl ChildPatcher<u32> for Failing {
            type Error = &'static str;
            fn reconcile(&mut self, _: &u32) -> Result<(), Self::Error> {
                Err("nope")
            }
            fn create(&mut self, _: &u32, _: Option<&u32>) -> Result<(), Self::Error> {
                Ok(())
            }
            fn replace(&mut self, _: &u32, _: &u32) -> Result<(), Self::Error> {
                Ok(())
            }
            fn move_before(&mut self, _: &u32, _: &u32) -> Result<(), Self::Error> {
                Ok(())
            }
            fn move_after(&mut self, _: &u32, _: &u32) -> Result<(), Self::Error> {
                Ok(())
            }
            fn destroy(&mut self, _: &u32) -> Result<(), Self::Error> {
                Ok(())
            }
            fn clear(&mut self, _: &[u32]) -> Result<(), Self::Error> {
                Ok(())
            }
        }
        let err = diff_children(&[1, 2], &[1, 2], &mut Failing).unwrap_err();
        assert!(matches!(err, DiffError::Patch("nope")));
        assert_eq!(err.to_string(), "nope");
    }
}
