//! Search result types.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::entry::DirectoryEntry;
use crate::keyword::Keyword;
use crate::size::format_size;

/// A matched file together with its formatted size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    #[serde(flatten)]
    pub entry: DirectoryEntry,

    /// Human-readable size, e.g. `"1.50 KB"`.
    pub size_label: String,
}

impl ResultItem {
    /// Creates a result from a matched entry, formatting its size.
    pub fn new(entry: DirectoryEntry) -> Self {
        let size_label = format_size(entry.size);
        Self { entry, size_label }
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn path(&self) -> &Path {
        &self.entry.path
    }

    pub fn size(&self) -> u64 {
        self.entry.size
    }
}

/// Everything accumulated so far for one session, sorted by name.
#[derive(Debug, Clone)]
pub struct ResultSnapshot {
    pub session_id: u64,
    pub keyword: Keyword,

    /// The full accumulated list, not just the latest batch.
    pub items: Arc<[Arc<ResultItem>]>,

    /// Number of new matches folded in by this delivery.
    pub batch_len: usize,
}

impl ResultSnapshot {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Counters gathered by one walker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Directories whose children were listed.
    pub directories_visited: usize,

    /// Directories that could not be listed and were skipped.
    pub unreadable_directories: usize,

    /// Matches emitted.
    pub matches: usize,
}

impl WalkStats {
    /// Adds another walker's counters to these.
    pub fn absorb(&mut self, other: WalkStats) {
        self.directories_visited += other.directories_visited;
        self.unreadable_directories += other.unreadable_directories;
        self.matches += other.matches;
    }
}

/// Totals for a session that ran to natural completion.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: u64,
    pub keyword: Keyword,

    /// Distinct matches delivered.
    pub matches: usize,

    /// Counters summed over every walker.
    pub walk: WalkStats,

    pub elapsed: Duration,
}

/// An event delivered to the consumer of a search.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// A new batch was folded in.
    Snapshot(ResultSnapshot),

    /// Every walker finished. No further events follow.
    Completed(SessionSummary),
}

impl SearchEvent {
    pub fn session_id(&self) -> u64 {
        match self {
            Self::Snapshot(snapshot) => snapshot.session_id,
            Self::Completed(summary) => summary.session_id,
        }
    }
}
