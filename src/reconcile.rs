//! Reconciliation: the disk-versus-store diff.
//!
//! For one content kind, the reconciler compares the slugs of source files
//! present on disk with the slugs of records in the store and computes the
//! plan the orchestrator executes:
//!
//! - `to_create` — on disk, not in the store
//! - `to_delete` — in the store, file gone from disk
//! - `unchanged` — present on both sides, left untouched
//!
//! **There is no update path.** A file whose content changed after first
//! sync stays `unchanged` until its record is deleted and recreated. This is
//! a deliberate product constraint, not a gap.
//!
//! The diff is a pure function over ordered sets, so running it twice with
//! no filesystem changes is a no-op by construction.

use std::collections::BTreeSet;

/// Add/remove plan for one content kind. Slugs are sorted, so execution
/// order is deterministic run to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub to_create: Vec<String>,
    pub to_delete: Vec<String>,
    pub unchanged: Vec<String>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

/// Diff the slugs found on disk against the slugs in the store.
pub fn plan(disk: &BTreeSet<String>, store: &BTreeSet<String>) -> Plan {
    Plan {
        to_create: disk.difference(store).cloned().collect(),
        to_delete: store.difference(disk).cloned().collect(),
        unchanged: disk.intersection(store).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(slugs: &[&str]) -> BTreeSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_files_are_created() {
        let p = plan(&set(&["a", "b"]), &set(&[]));
        assert_eq!(p.to_create, vec!["a", "b"]);
        assert!(p.to_delete.is_empty());
    }

    #[test]
    fn missing_files_are_deleted() {
        let p = plan(&set(&["a"]), &set(&["a", "b"]));
        assert_eq!(p.to_delete, vec!["b"]);
        assert_eq!(p.unchanged, vec!["a"]);
    }

    #[test]
    fn matching_slugs_are_untouched() {
        // Changed file content never shows up here: identity is the slug
        let p = plan(&set(&["a", "b"]), &set(&["a", "b"]));
        assert!(p.is_noop());
        assert_eq!(p.unchanged, vec!["a", "b"]);
    }

    #[test]
    fn rerun_with_no_changes_is_noop() {
        let disk = set(&["x", "y"]);
        let first = plan(&disk, &set(&[]));
        // Pretend the first run committed everything
        let store: BTreeSet<String> = first.to_create.iter().cloned().collect();
        let second = plan(&disk, &store);
        assert!(second.is_noop());
    }

    #[test]
    fn empty_both_sides() {
        assert!(plan(&set(&[]), &set(&[])).is_noop());
    }
}
