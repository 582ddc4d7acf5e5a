//! Running, sorted result list for one session.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::result::ResultItem;

/// Folds batches into a growing list sorted by name.
///
/// Names compare ordinally (byte-wise). An item whose path is already present
/// is ignored, so overlapping roots never report a file twice. Items are
/// never removed until [`ResultAccumulator::reset`].
///
/// Items are held behind `Arc`, so a snapshot copies pointers only.
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    items: Vec<Arc<ResultItem>>,
    seen: HashSet<PathBuf>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch and re-sorts, returning the updated list.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = ResultItem>) -> &[Arc<ResultItem>] {
        let before = self.items.len();
        for item in batch {
            if self.seen.insert(item.entry.path.clone()) {
                self.items.push(Arc::new(item));
            }
        }

        if self.items.len() != before {
            // Stable: equal names keep their arrival order.
            self.items
                .sort_by(|a, b| a.name().as_bytes().cmp(b.name().as_bytes()));
        }

        &self.items
    }

    pub fn items(&self) -> &[Arc<ResultItem>] {
        &self.items
    }

    /// An immutable copy of the current list for delivery.
    pub fn snapshot(&self) -> Arc<[Arc<ResultItem>]> {
        Arc::from(self.items.as_slice())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forgets every item, ready for a new session.
    pub fn reset(&mut self) {
        self.items.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::DirectoryEntry;

    fn item(dir: &str, name: &str) -> ResultItem {
        ResultItem::new(DirectoryEntry {
            path: PathBuf::from(dir).join(name),
            name: name.to_string(),
            size: 0,
            is_dir: false,
            is_hidden: false,
            readable: true,
        })
    }

    fn names(items: &[Arc<ResultItem>]) -> Vec<&str> {
        items.iter().map(|i| i.name()).collect()
    }

    #[test]
    fn test_merge_sorts_ordinally() {
        let mut acc = ResultAccumulator::new();
        acc.merge(vec![item("/a", "cat.txt"), item("/b", "Category.md")]);
        assert_eq!(names(acc.items()), vec!["Category.md", "cat.txt"]);

        let merged = acc.merge(vec![item("/a", "bat"), item("/a", "_cat")]);
        assert_eq!(names(merged), vec!["Category.md", "_cat", "bat", "cat.txt"]);
    }

    #[test]
    fn test_length_never_decreases() {
        let mut acc = ResultAccumulator::new();
        let mut last = 0;
        for batch in [
            vec![item("/a", "z")],
            vec![],
            vec![item("/a", "y"), item("/b", "x")],
            vec![item("/a", "z")],
        ] {
            let len = acc.merge(batch).len();
            assert!(len >= last);
            last = len;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn test_same_path_is_kept_once() {
        let mut acc = ResultAccumulator::new();
        acc.merge(vec![item("/a", "cat.txt")]);
        acc.merge(vec![item("/a", "cat.txt"), item("/b", "cat.txt")]);

        // Equal names from different paths are both kept.
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.items()[0].path(), PathBuf::from("/a/cat.txt"));
    }

    #[test]
    fn test_snapshot_shares_items() {
        let mut acc = ResultAccumulator::new();
        acc.merge(vec![item("/a", "one")]);

        let first = acc.snapshot();
        acc.merge(vec![item("/a", "two")]);
        let second = acc.snapshot();

        assert!(Arc::ptr_eq(&first[0], &second[0]));
        assert_eq!(Arc::strong_count(&second[0]), 3);
    }

    #[test]
    fn test_reset_and_snapshot() {
        let mut acc = ResultAccumulator::new();
        acc.merge(vec![item("/a", "one"), item("/a", "two")]);

        let snapshot = acc.snapshot();
        acc.reset();

        assert!(acc.is_empty());
        assert_eq!(snapshot.len(), 2);

        acc.merge(vec![item("/a", "one")]);
        assert_eq!(acc.len(), 1);
    }
}
