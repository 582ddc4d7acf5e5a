#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]
//! Multidir Search - concurrent file name search across several roots.
//!
//! A search walks every root directory breadth-first on its own blocking
//! thread and merges the matches into one bounded channel. The engine
//! batches them into 150 ms windows and delivers a sorted, de-duplicated
//! snapshot of everything found so far after each window.
//!
//! # Features
//!
//! - Case-insensitive substring matching on file names, or regex patterns
//! - One walker per root, with backpressure through a bounded channel
//! - Starting a new search cancels the previous one before it delivers again
//! - Hidden files are skipped; hidden directories are still searched
//! - Symlinked directories are followed with a cycle guard
//!
//! # Example
//!
//! ```no_run
//! use multidir_search::{SearchConfig, SearchEngine, SearchEvent, SystemRoots};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = SearchEngine::new(SystemRoots::new(), SearchConfig::default());
//!
//!     let mut results = engine.search("invoice");
//!     while let Some(event) = results.next().await {
//!         if let SearchEvent::Snapshot(snapshot) = event {
//!             for item in snapshot.items.iter() {
//!                 println!("{} ({})", item.path().display(), item.size_label);
//!             }
//!         }
//!     }
//! }
//! ```

mod accumulator;
mod config;
mod engine;
mod entry;
mod error;
mod intake;
mod keyword;
mod matcher;
mod result;
mod roots;
mod session;
mod size;
mod walker;

pub use accumulator::ResultAccumulator;
pub use config::{
    DEFAULT_BATCH_WINDOW_MS, DEFAULT_CHANNEL_CAPACITY, DEFAULT_DEBOUNCE_MS, SearchConfig,
    SearchConfigBuilder,
};
pub use engine::{ResultStream, SearchEngine};
pub use entry::DirectoryEntry;
pub use error::{SearchError, SearchResult};
pub use intake::KeywordIntake;
pub use keyword::Keyword;
pub use matcher::{MatchMode, NameMatcher, matches};
pub use result::{ResultItem, ResultSnapshot, SearchEvent, SessionSummary, WalkStats};
pub use roots::{AccessCheck, FsAccess, RootProvider, StaticRoots, SystemRoots, dedup_roots};
pub use session::SearchSession;
pub use size::format_size;
pub use walker::{DirectoryWalker, Walk, WalkOptions};

/// Re-export of the cancellation token accepted by sessions and walkers.
pub use tokio_util::sync::CancellationToken;
