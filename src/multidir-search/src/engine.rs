//! The long-lived search façade.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::accumulator::ResultAccumulator;
use crate::config::SearchConfig;
use crate::entry::DirectoryEntry;
use crate::keyword::Keyword;
use crate::result::{ResultItem, ResultSnapshot, SearchEvent, SessionSummary};
use crate::roots::{RootProvider, dedup_roots};
use crate::session::SearchSession;

/// Events buffered between a session and its consumer. Small on purpose:
/// a slow consumer should hold matches back in the walkers, not here.
const EVENT_BUFFER: usize = 4;

/// Runs searches over every root and keeps exactly one of them current.
///
/// Starting a search cancels the previous one before the new one can
/// deliver anything, so two sessions never interleave.
///
/// # Example
///
/// ```no_run
/// use multidir_search::{SearchConfig, SearchEngine, SearchEvent, StaticRoots};
///
/// #[tokio::main]
/// async fn main() {
///     let engine = SearchEngine::new(StaticRoots::new(["/data"]), SearchConfig::default());
///     let mut results = engine.search("report");
///     while let Some(event) = results.next().await {
///         match event {
///             SearchEvent::Snapshot(snapshot) => println!("{} matches", snapshot.len()),
///             SearchEvent::Completed(summary) => println!("done in {:?}", summary.elapsed),
///         }
///     }
/// }
/// ```
pub struct SearchEngine {
    roots: Arc<dyn RootProvider>,
    config: SearchConfig,
    current: Mutex<Option<ActiveSession>>,
    next_id: AtomicU64,
}

#[derive(Debug)]
struct ActiveSession {
    id: u64,
    keyword: Keyword,
    cancel: CancellationToken,
    done: Arc<AtomicBool>,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &self.config)
            .field("current", &*self.current.lock())
            .finish()
    }
}

impl SearchEngine {
    /// Creates an engine. No search runs until [`SearchEngine::search`].
    pub fn new(roots: impl RootProvider + 'static, config: SearchConfig) -> Self {
        Self::with_provider(Arc::new(roots), config)
    }

    /// Creates an engine around a shared root provider.
    pub fn with_provider(roots: Arc<dyn RootProvider>, config: SearchConfig) -> Self {
        Self {
            roots,
            config,
            current: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Supersedes the current search with one for `keyword`.
    ///
    /// The returned stream yields a snapshot of everything found so far after
    /// every non-empty batching window, then [`SearchEvent::Completed`]. It
    /// ends early, dropping anything still queued, once this search is
    /// superseded or cancelled. Dropping the stream cancels the search.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn search(&self, keyword: impl Into<Keyword>) -> ResultStream {
        let keyword = keyword.into();
        let mut current = self.current.lock();

        if let Some(previous) = current.take() {
            previous.cancel.cancel();
            info!(
                session_id = previous.id,
                keyword = %previous.keyword,
                "search superseded"
            );
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        let done = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        tokio::spawn(drive_session(SessionDriver {
            id,
            keyword: keyword.clone(),
            roots: self.roots.clone(),
            config: self.config.clone(),
            cancel: cancel.clone(),
            done: done.clone(),
            tx,
        }));

        *current = Some(ActiveSession {
            id,
            keyword,
            cancel: cancel.clone(),
            done,
        });

        ResultStream { id, rx, cancel }
    }

    /// Cancels the current search, if any. Idempotent.
    pub fn cancel_search(&self) {
        if let Some(previous) = self.current.lock().take() {
            previous.cancel.cancel();
            info!(
                session_id = previous.id,
                keyword = %previous.keyword,
                "search cancelled"
            );
        }
    }

    /// Id of the current session, including one that already completed.
    pub fn current_session(&self) -> Option<u64> {
        self.current.lock().as_ref().map(|s| s.id)
    }

    /// Whether the current session is still walking.
    pub fn is_searching(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|s| !s.done.load(Ordering::Acquire) && !s.cancel.is_cancelled())
    }
}

impl Drop for SearchEngine {
    fn drop(&mut self) {
        if let Some(previous) = self.current.get_mut().take() {
            previous.cancel.cancel();
        }
    }
}

/// The events of one search, in delivery order.
///
/// Yields `None` once the search is finished, superseded or cancelled.
#[derive(Debug)]
pub struct ResultStream {
    id: u64,
    rx: mpsc::Receiver<SearchEvent>,
    cancel: CancellationToken,
}

impl ResultStream {
    pub fn session_id(&self) -> u64 {
        self.id
    }

    /// Whether this search was superseded or cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<SearchEvent> {
        std::future::poll_fn(|cx| self.poll_event(cx)).await
    }

    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<Option<SearchEvent>> {
        if self.cancel.is_cancelled() {
            self.rx.close();
            return Poll::Ready(None);
        }

        match self.rx.poll_recv(cx) {
            // Retired between send and receive: drop it.
            Poll::Ready(Some(_)) if self.cancel.is_cancelled() => {
                self.rx.close();
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl Stream for ResultStream {
    type Item = SearchEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<SearchEvent>> {
        self.get_mut().poll_event(cx)
    }
}

impl Drop for ResultStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct SessionDriver {
    id: u64,
    keyword: Keyword,
    roots: Arc<dyn RootProvider>,
    config: SearchConfig,
    cancel: CancellationToken,
    done: Arc<AtomicBool>,
    tx: mpsc::Sender<SearchEvent>,
}

impl SessionDriver {
    /// Sends unless the session is retired first. Returns false when the
    /// session should stop.
    async fn deliver(&self, event: SearchEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(event) => sent.is_ok(),
        }
    }

    async fn deliver_batch(
        &self,
        accumulator: &mut ResultAccumulator,
        batch: &mut Vec<ResultItem>,
    ) -> bool {
        let batch_len = batch.len();
        accumulator.merge(batch.drain(..));
        let snapshot = ResultSnapshot {
            session_id: self.id,
            keyword: self.keyword.clone(),
            items: accumulator.snapshot(),
            batch_len,
        };
        self.deliver(SearchEvent::Snapshot(snapshot)).await
    }
}

async fn resolve_roots(
    provider: Arc<dyn RootProvider>,
    extra: Vec<std::path::PathBuf>,
) -> Vec<DirectoryEntry> {
    let roots = tokio::task::spawn_blocking(move || {
        let mut paths = provider.search_roots();
        paths.extend(extra);
        dedup_roots(paths)
            .into_iter()
            .map(DirectoryEntry::probe)
            .collect::<Vec<_>>()
    });
    match roots.await {
        Ok(roots) => roots,
        Err(err) => {
            debug!(error = %err, "root enumeration failed");
            Vec::new()
        }
    }
}

/// Walks, batches and delivers one session until it completes or is retired.
async fn drive_session(driver: SessionDriver) {
    let roots = tokio::select! {
        biased;
        _ = driver.cancel.cancelled() => return,
        roots = resolve_roots(driver.roots.clone(), driver.config.roots.clone()) => roots,
    };

    let mut session = SearchSession::start_with_cancel(
        driver.id,
        driver.keyword.clone(),
        roots,
        &driver.config,
        driver.cancel.child_token(),
    );
    let mut accumulator = ResultAccumulator::new();
    let mut batch = Vec::new();

    let window = driver.config.batch_window();
    let mut ticker = tokio::time::interval_at(Instant::now() + window, window);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = driver.cancel.cancelled() => {
                debug!(session_id = driver.id, "session retired");
                return;
            }
            _ = ticker.tick() => {
                if !batch.is_empty() && !driver.deliver_batch(&mut accumulator, &mut batch).await {
                    session.cancel();
                    return;
                }
            }
            item = session.next() => match item {
                Some(item) => batch.push(item),
                None => break,
            },
        }
    }

    if driver.cancel.is_cancelled() {
        return;
    }
    if !batch.is_empty() && !driver.deliver_batch(&mut accumulator, &mut batch).await {
        return;
    }

    let walk = session.finish().await;
    let summary = SessionSummary {
        session_id: driver.id,
        keyword: driver.keyword.clone(),
        matches: accumulator.len(),
        walk,
        elapsed: session.elapsed(),
    };
    info!(
        session_id = driver.id,
        keyword = %driver.keyword,
        matches = summary.matches,
        directories = walk.directories_visited,
        unreadable = walk.unreadable_directories,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "search complete"
    );

    driver.done.store(true, Ordering::Release);
    driver.deliver(SearchEvent::Completed(summary)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roots::StaticRoots;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn fast_config() -> SearchConfig {
        SearchConfig::builder()
            .batch_window(Duration::from_millis(10))
            .build()
    }

    async fn collect_final(stream: &mut ResultStream) -> (Vec<String>, Option<SessionSummary>) {
        let mut last = Vec::new();
        let mut summary = None;
        while let Some(event) = stream.next().await {
            match event {
                SearchEvent::Snapshot(snapshot) => {
                    last = snapshot.items.iter().map(|i| i.name().to_string()).collect();
                }
                SearchEvent::Completed(done) => summary = Some(done),
            }
        }
        (last, summary)
    }

    #[tokio::test]
    async fn test_search_delivers_sorted_snapshot() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("zeta-cat"), "").unwrap();
        fs::write(root.path().join("alpha-cat"), "").unwrap();
        fs::write(root.path().join("dog"), "").unwrap();

        let engine = SearchEngine::new(StaticRoots::new([root.path()]), fast_config());
        let mut stream = engine.search("CAT");
        let (names, summary) = collect_final(&mut stream).await;

        assert_eq!(names, vec!["alpha-cat", "zeta-cat"]);
        let summary = summary.unwrap();
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.session_id, stream.session_id());
        assert!(!engine.is_searching());
        assert_eq!(engine.current_session(), Some(stream.session_id()));
    }

    #[tokio::test]
    async fn test_configured_roots_are_added() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        fs::write(a.path().join("a.txt"), "").unwrap();
        fs::write(b.path().join("b.txt"), "").unwrap();

        let config = SearchConfig {
            roots: vec![b.path().to_path_buf(), a.path().to_path_buf()],
            ..fast_config()
        };
        let engine = SearchEngine::new(StaticRoots::new([a.path()]), config);
        let (names, summary) = collect_final(&mut engine.search("txt")).await;

        assert_eq!(names, vec!["a.txt", "b.txt"]);
        // `a` is listed twice but walked once.
        assert_eq!(summary.unwrap().walk.directories_visited, 2);
    }

    #[tokio::test]
    async fn test_new_search_retires_previous_stream() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("apple"), "").unwrap();
        fs::write(root.path().join("banana"), "").unwrap();

        let engine = SearchEngine::new(StaticRoots::new([root.path()]), fast_config());
        let mut first = engine.search("a");
        let mut second = engine.search("b");

        assert!(first.is_cancelled());
        assert!(first.next().await.is_none());

        let (names, _) = collect_final(&mut second).await;
        assert_eq!(names, vec!["banana"]);
    }

    #[tokio::test]
    async fn test_cancel_search_is_idempotent() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("file"), "").unwrap();

        let engine = SearchEngine::new(StaticRoots::new([root.path()]), fast_config());
        let mut stream = engine.search("");

        engine.cancel_search();
        engine.cancel_search();

        assert!(stream.next().await.is_none());
        assert_eq!(engine.current_session(), None);
        assert!(!engine.is_searching());
    }

    #[tokio::test]
    async fn test_session_ids_increase() {
        let engine = SearchEngine::new(StaticRoots::default(), fast_config());
        let first = engine.search("x").session_id();
        let second = engine.search("x").session_id();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_no_roots_completes_without_snapshots() {
        let engine = SearchEngine::new(StaticRoots::default(), fast_config());
        let mut stream = engine.search("anything");

        match stream.next().await {
            Some(SearchEvent::Completed(summary)) => assert_eq!(summary.matches, 0),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_stream_cancels_search() {
        let engine = SearchEngine::new(StaticRoots::default(), fast_config());
        drop(engine.search("x"));
        assert!(!engine.is_searching());
    }
}
