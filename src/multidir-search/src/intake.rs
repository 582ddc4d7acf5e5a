//! Debounced keyword input.
//!
//! Raw edits arrive faster than searches are worth starting. [`KeywordIntake`]
//! waits until the input has been quiet for the debounce delay and only then
//! emits the latest keyword. Keywords equal to the last one emitted are
//! dropped, so whitespace-only edits do not restart a search.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::trace;

use crate::keyword::Keyword;

const OUTPUT_BUFFER: usize = 16;

/// Turns a stream of raw edits into a stream of settled keywords.
#[derive(Debug, Clone, Copy)]
pub struct KeywordIntake {
    debounce: Duration,
}

impl KeywordIntake {
    pub fn new(debounce: Duration) -> Self {
        Self { debounce }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Spawns the debouncing task.
    ///
    /// An empty keyword is emitted like any other, so a consumer can clear
    /// its results. When `edits` closes, a pending keyword is flushed and
    /// the returned channel then closes.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self, edits: mpsc::Receiver<String>) -> mpsc::Receiver<Keyword> {
        let (tx, rx) = mpsc::channel(OUTPUT_BUFFER);
        tokio::spawn(self.run(edits, tx));
        rx
    }

    async fn run(self, mut edits: mpsc::Receiver<String>, tx: mpsc::Sender<Keyword>) {
        let mut last: Option<Keyword> = None;
        let mut pending: Option<Keyword> = None;

        loop {
            let edit = if pending.is_some() {
                match tokio::time::timeout(self.debounce, edits.recv()).await {
                    Ok(edit) => edit,
                    Err(_) => {
                        // Quiet for a full debounce period.
                        if let Some(keyword) = pending.take() {
                            if !emit(&tx, &mut last, keyword).await {
                                return;
                            }
                        }
                        continue;
                    }
                }
            } else {
                edits.recv().await
            };

            match edit {
                Some(text) => {
                    let keyword = Keyword::new(text);
                    trace!(keyword = %keyword, "keyword edited");
                    pending = Some(keyword);
                }
                None => break,
            }
        }

        if let Some(keyword) = pending.take() {
            emit(&tx, &mut last, keyword).await;
        }
    }
}

/// Sends `keyword` unless it repeats the last one. Returns false once the
/// receiver is gone.
async fn emit(tx: &mpsc::Sender<Keyword>, last: &mut Option<Keyword>, keyword: Keyword) -> bool {
    if last.as_ref() == Some(&keyword) {
        return true;
    }
    *last = Some(keyword.clone());
    tx.send(keyword).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(200);

    fn intake() -> (mpsc::Sender<String>, mpsc::Receiver<Keyword>) {
        let (tx, rx) = mpsc::channel(16);
        (tx, KeywordIntake::new(DEBOUNCE).spawn(rx))
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_collapse_to_last() {
        let (tx, mut out) = intake();

        for text in ["c", "ca", "cat"] {
            tx.send(text.to_string()).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert_eq!(out.recv().await, Some(Keyword::new("cat")));
        drop(tx);
        assert_eq!(out.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_edits_are_each_emitted() {
        let (tx, mut out) = intake();

        tx.send("a".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send("b".to_string()).await.unwrap();

        assert_eq!(out.recv().await, Some(Keyword::new("a")));
        assert_eq!(out.recv().await, Some(Keyword::new("b")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_keyword_is_dropped() {
        let (tx, mut out) = intake();

        tx.send("cat".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send("  cat ".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send("dog".to_string()).await.unwrap();
        drop(tx);

        assert_eq!(out.recv().await, Some(Keyword::new("cat")));
        assert_eq!(out.recv().await, Some(Keyword::new("dog")));
        assert_eq!(out.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_keyword_is_emitted() {
        let (tx, mut out) = intake();

        tx.send("cat".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send("   ".to_string()).await.unwrap();

        assert_eq!(out.recv().await, Some(Keyword::new("cat")));
        let cleared = out.recv().await.unwrap();
        assert!(cleared.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_pending() {
        let (tx, mut out) = intake();

        tx.send("pending".to_string()).await.unwrap();
        drop(tx);

        assert_eq!(out.recv().await, Some(Keyword::new("pending")));
        assert_eq!(out.recv().await, None);
    }
}
