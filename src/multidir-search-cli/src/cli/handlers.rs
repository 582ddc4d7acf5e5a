//! Search execution.
//!
//! One-shot mode runs a single search and prints its final snapshot.
//! Interactive mode treats each stdin line as the current text of a search
//! field: edits are debounced, every settled keyword supersedes the running
//! search, and an empty line clears the results.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use multidir_search::{
    AccessCheck, FsAccess, KeywordIntake, Keyword, ResultItem, ResultStream, RootProvider,
    SearchConfig, SearchEngine, SearchError, SearchEvent, StaticRoots, SystemRoots,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::args::Cli;
use crate::config;
use crate::render::Renderer;

/// Runs the command described by `cli`.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = config::load(&cli)?;
    let roots = root_provider(&cli, &mut config);

    if !FsAccess::new(roots.as_ref()).is_read_permission_granted() {
        return Err(SearchError::NoRoots).context("cannot search");
    }

    let renderer = Renderer::new(cli.json, cli.limit());
    let intake = KeywordIntake::new(config.debounce());
    let engine = SearchEngine::with_provider(roots, config);
    let interrupt = tokio::signal::ctrl_c();

    match cli.keyword {
        Some(keyword) => run_once(&engine, keyword, renderer, interrupt).await,
        None => run_interactive(&engine, intake, renderer, interrupt).await,
    }
}

/// `--root` replaces the system roots; roots from the config file are
/// searched after them.
fn root_provider(cli: &Cli, config: &mut SearchConfig) -> Arc<dyn RootProvider> {
    let configured = std::mem::take(&mut config.roots);
    if cli.roots.is_empty() {
        Arc::new(SystemRoots::new().with_extra(configured))
    } else {
        Arc::new(StaticRoots::new(configured))
    }
}

async fn run_once(
    engine: &SearchEngine,
    keyword: String,
    renderer: Renderer,
    interrupt: impl Future,
) -> Result<()> {
    let last = final_results(engine, keyword, interrupt).await?;

    let mut stdout = std::io::stdout().lock();
    renderer
        .items(&mut stdout, &last)
        .context("failed to write results")?;
    stdout.flush().context("failed to write results")?;
    Ok(())
}

/// Runs one search to completion and returns its last snapshot.
///
/// `interrupt` is polled across the whole search, so it fires at most once
/// and is never missed between events.
async fn final_results(
    engine: &SearchEngine,
    keyword: String,
    interrupt: impl Future,
) -> Result<Arc<[Arc<ResultItem>]>> {
    tokio::pin!(interrupt);
    let mut stream = engine.search(keyword);
    let mut last: Arc<[Arc<ResultItem>]> = Arc::from(Vec::new());

    loop {
        let event = tokio::select! {
            biased;
            _ = &mut interrupt => {
                engine.cancel_search();
                bail!("search interrupted");
            }
            event = stream.next() => event,
        };

        match event {
            Some(SearchEvent::Snapshot(snapshot)) => last = snapshot.items,
            Some(SearchEvent::Completed(summary)) => {
                info!(
                    matches = summary.matches,
                    directories = summary.walk.directories_visited,
                    "search finished"
                );
            }
            None => break,
        }
    }

    Ok(last)
}

async fn run_interactive(
    engine: &SearchEngine,
    intake: KeywordIntake,
    renderer: Renderer,
    interrupt: impl Future,
) -> Result<()> {
    tokio::pin!(interrupt);
    let (edits_tx, edits_rx) = mpsc::channel(64);
    tokio::spawn(read_lines(edits_tx));
    let mut keywords = intake.spawn(edits_rx);

    let mut current: Option<ResultStream> = None;
    let mut input_open = true;
    let mut stdout = std::io::stdout();

    loop {
        tokio::select! {
            keyword = keywords.recv(), if input_open => match keyword {
                Some(keyword) => {
                    current = start(engine, keyword);
                    if current.is_none() {
                        renderer.cleared(&mut stdout)?;
                    }
                }
                None => {
                    debug!("input closed");
                    input_open = false;
                }
            },
            event = next_event(&mut current) => match event {
                Some(SearchEvent::Snapshot(snapshot)) => {
                    renderer.snapshot(&mut stdout, &snapshot)?;
                }
                Some(SearchEvent::Completed(summary)) => {
                    renderer.completed(&mut stdout, &summary)?;
                }
                None => current = None,
            },
            _ = &mut interrupt => {
                engine.cancel_search();
                break;
            }
        }

        if !input_open && current.is_none() {
            break;
        }
    }

    stdout.flush()?;
    Ok(())
}

/// Supersedes the running search, or just cancels it for an empty keyword.
fn start(engine: &SearchEngine, keyword: Keyword) -> Option<ResultStream> {
    if keyword.is_empty() {
        engine.cancel_search();
        return None;
    }
    Some(engine.search(keyword))
}

/// The next event of the running search; pending forever when idle.
async fn next_event(current: &mut Option<ResultStream>) -> Option<SearchEvent> {
    match current {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn read_lines(edits: mpsc::Sender<String>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if edits.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                debug!(error = %err, "stdin read failed");
                break;
            }
        }
    }
}
