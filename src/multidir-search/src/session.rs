//! One keyword's search across every root.
//!
//! A session spawns one blocking walker per root and merges their matches
//! into a single bounded channel. The channel bound is the backpressure:
//! when the consumer falls behind, walkers block on send instead of
//! buffering without limit.
//!
//! Every walker shares the session's cancellation token. Cancelling it stops
//! each walker at its next directory dequeue and closes the merge point, so
//! no further matches are observed even while walker threads wind down.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::entry::DirectoryEntry;
use crate::keyword::Keyword;
use crate::matcher::NameMatcher;
use crate::result::{ResultItem, WalkStats};
use crate::walker::DirectoryWalker;

/// The walkers and merge point serving one keyword.
///
/// Dropping a session cancels it.
#[derive(Debug)]
pub struct SearchSession {
    id: u64,
    keyword: Keyword,
    cancel: CancellationToken,
    rx: mpsc::Receiver<ResultItem>,
    walkers: Vec<JoinHandle<WalkStats>>,
    started: Instant,
}

impl SearchSession {
    /// Starts one walker per root with a fresh cancellation token.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        id: u64,
        keyword: Keyword,
        roots: Vec<DirectoryEntry>,
        config: &SearchConfig,
    ) -> Self {
        Self::start_with_cancel(id, keyword, roots, config, CancellationToken::new())
    }

    /// Starts one walker per root, stopping them all when `cancel` fires.
    pub fn start_with_cancel(
        id: u64,
        keyword: Keyword,
        roots: Vec<DirectoryEntry>,
        config: &SearchConfig,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let matcher = Arc::new(NameMatcher::new(&keyword, config.match_mode));
        let walker = DirectoryWalker::with_matcher(matcher, config.walk_options());

        info!(
            session_id = id,
            keyword = %keyword,
            roots = roots.len(),
            mode = config.match_mode.description(),
            "starting search session"
        );

        let walkers = roots
            .into_iter()
            .map(|root| {
                let walker = walker.clone();
                let cancel = cancel.clone();
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let mut walk = walker.walk(&root, cancel);
                    for item in walk.by_ref() {
                        if tx.blocking_send(item).is_err() {
                            // Merge point closed: the session is gone.
                            break;
                        }
                    }
                    let stats = walk.stats();
                    debug!(
                        session_id = id,
                        root = %root.path.display(),
                        matches = stats.matches,
                        directories = stats.directories_visited,
                        unreadable = stats.unreadable_directories,
                        "walker finished"
                    );
                    stats
                })
            })
            .collect();

        Self {
            id,
            keyword,
            cancel,
            rx,
            walkers,
            started: Instant::now(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    /// Time since the walkers were spawned.
    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    /// A handle that cancels this session when triggered.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Signals every walker to stop. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the next match from any walker.
    ///
    /// Returns `None` once every walker is exhausted or the session has been
    /// cancelled. Cancel-safe.
    pub async fn next(&mut self) -> Option<ResultItem> {
        if self.cancel.is_cancelled() {
            self.rx.close();
            return None;
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.rx.close();
                None
            }
            item = self.rx.recv() => item.filter(|_| !self.cancel.is_cancelled()),
        }
    }

    /// Waits for every walker thread to exit and sums their counters.
    ///
    /// Call after [`SearchSession::next`] returned `None`.
    pub async fn finish(&mut self) -> WalkStats {
        let mut total = WalkStats::default();
        for handle in self.walkers.drain(..) {
            match handle.await {
                Ok(stats) => total.absorb(stats),
                Err(err) => debug!(session_id = self.id, error = %err, "walker task failed"),
            }
        }
        total
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn roots(paths: &[&Path]) -> Vec<DirectoryEntry> {
        paths.iter().map(|p| DirectoryEntry::probe(*p)).collect()
    }

    async fn drain(session: &mut SearchSession) -> Vec<String> {
        let mut names = Vec::new();
        while let Some(item) = session.next().await {
            names.push(item.name().to_string());
        }
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_merges_all_roots() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        fs::write(a.path().join("cat.txt"), "").unwrap();
        fs::write(b.path().join("Category.md"), "").unwrap();
        fs::write(b.path().join(".dog.txt"), "").unwrap();

        let mut session = SearchSession::start(
            1,
            Keyword::new("cat"),
            roots(&[a.path(), b.path()]),
            &SearchConfig::default(),
        );

        assert_eq!(drain(&mut session).await, vec!["Category.md", "cat.txt"]);

        let stats = session.finish().await;
        assert_eq!(stats.matches, 2);
        assert_eq!(stats.directories_visited, 2);
    }

    #[tokio::test]
    async fn test_unreadable_root_is_skipped() {
        let b = TempDir::new().unwrap();
        fs::write(b.path().join("x.txt"), "").unwrap();
        let missing = b.path().join("missing");

        let mut session = SearchSession::start(
            2,
            Keyword::new("x"),
            roots(&[&missing, b.path()]),
            &SearchConfig::default(),
        );

        assert_eq!(drain(&mut session).await, vec!["x.txt"]);
    }

    #[tokio::test]
    async fn test_no_roots_completes_immediately() {
        let mut session =
            SearchSession::start(3, Keyword::new(""), Vec::new(), &SearchConfig::default());
        assert!(session.next().await.is_none());
        assert_eq!(session.finish().await, WalkStats::default());
    }

    #[tokio::test]
    async fn test_cancel_stops_delivery() {
        let root = TempDir::new().unwrap();
        for i in 0..200 {
            fs::write(root.path().join(format!("file{i}.txt")), "").unwrap();
        }

        // A tiny channel keeps the walker blocked on send.
        let config = SearchConfig::builder().channel_capacity(1).build();
        let mut session =
            SearchSession::start(4, Keyword::new("file"), roots(&[root.path()]), &config);

        assert!(session.next().await.is_some());
        session.cancel();
        session.cancel();

        assert!(session.is_cancelled());
        assert!(session.next().await.is_none());

        // Walker threads exit once the merge point is closed.
        let stats = session.finish().await;
        assert!(stats.matches < 200);
    }

    #[tokio::test]
    async fn test_parent_token_cancels_session() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("a.txt"), "").unwrap();

        let parent = CancellationToken::new();
        let mut session = SearchSession::start_with_cancel(
            5,
            Keyword::new("a"),
            roots(&[root.path()]),
            &SearchConfig::default(),
            parent.child_token(),
        );

        parent.cancel();
        assert!(session.next().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_cancels_token() {
        let session =
            SearchSession::start(6, Keyword::new(""), Vec::new(), &SearchConfig::default());
        let token = session.cancel_token();
        assert!(!token.is_cancelled());
        drop(session);
        assert!(token.is_cancelled());
    }
}
