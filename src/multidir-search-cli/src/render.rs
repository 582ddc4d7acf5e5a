//! Result output.
//!
//! Text output is one match per line, size first. JSON output is one object
//! per line: bare items in one-shot mode, tagged events in interactive mode.

use std::io::{self, Write};
use std::sync::Arc;

use multidir_search::{ResultItem, ResultSnapshot, SessionSummary};
use serde::Serialize;

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent<'a> {
    Snapshot {
        session_id: u64,
        keyword: &'a str,
        total: usize,
        items: Vec<&'a ResultItem>,
    },
    Completed {
        session_id: u64,
        keyword: &'a str,
        matches: usize,
        directories_visited: usize,
        unreadable_directories: usize,
        elapsed_ms: u64,
    },
    Cleared,
}

/// Writes results in the format chosen on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    json: bool,
    limit: Option<usize>,
}

impl Renderer {
    pub fn new(json: bool, limit: Option<usize>) -> Self {
        Self { json, limit }
    }

    fn visible<'a>(&self, items: &'a [Arc<ResultItem>]) -> &'a [Arc<ResultItem>] {
        match self.limit {
            Some(limit) if limit < items.len() => &items[..limit],
            _ => items,
        }
    }

    /// Prints a final result list.
    pub fn items(&self, out: &mut impl Write, items: &[Arc<ResultItem>]) -> io::Result<()> {
        let visible = self.visible(items);
        if self.json {
            for item in visible {
                serde_json::to_writer(&mut *out, &**item)?;
                writeln!(out)?;
            }
            return Ok(());
        }

        for item in visible {
            write_item(out, item)?;
        }
        let hidden = items.len() - visible.len();
        if hidden > 0 {
            writeln!(out, "... {hidden} more")?;
        }
        Ok(())
    }

    /// Prints one progress snapshot of an interactive search.
    pub fn snapshot(&self, out: &mut impl Write, snapshot: &ResultSnapshot) -> io::Result<()> {
        if self.json {
            let event = JsonEvent::Snapshot {
                session_id: snapshot.session_id,
                keyword: snapshot.keyword.as_str(),
                total: snapshot.len(),
                items: self.visible(&snapshot.items).iter().map(|item| &**item).collect(),
            };
            return write_json(out, &event);
        }

        writeln!(
            out,
            "# {} matches for \"{}\"",
            snapshot.len(),
            snapshot.keyword
        )?;
        self.items(out, &snapshot.items)
    }

    /// Prints the end of a search.
    pub fn completed(&self, out: &mut impl Write, summary: &SessionSummary) -> io::Result<()> {
        let elapsed_ms = summary.elapsed.as_millis() as u64;
        if self.json {
            let event = JsonEvent::Completed {
                session_id: summary.session_id,
                keyword: summary.keyword.as_str(),
                matches: summary.matches,
                directories_visited: summary.walk.directories_visited,
                unreadable_directories: summary.walk.unreadable_directories,
                elapsed_ms,
            };
            return write_json(out, &event);
        }

        writeln!(
            out,
            "# done: {} matches in {} directories ({} unreadable), {elapsed_ms} ms",
            summary.matches,
            summary.walk.directories_visited,
            summary.walk.unreadable_directories,
        )
    }

    /// Prints that the results were cleared by an empty keyword.
    pub fn cleared(&self, out: &mut impl Write) -> io::Result<()> {
        if self.json {
            return write_json(out, &JsonEvent::Cleared);
        }
        writeln!(out, "# cleared")
    }
}

fn write_item(out: &mut impl Write, item: &ResultItem) -> io::Result<()> {
    writeln!(out, "{:>12}  {}", item.size_label, item.path().display())
}

fn write_json(out: &mut impl Write, event: &JsonEvent<'_>) -> io::Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    writeln!(out)?;
    out.flush()
}
