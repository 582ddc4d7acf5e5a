//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

use super::styles::{AFTER_HELP, get_styles};

/// Default number of results printed per snapshot.
pub const DEFAULT_LIMIT: usize = 50;

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show session start and completion
    Info,
    /// Show skipped directories and walker progress
    Debug,
    /// Show every entry considered
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Search file names across several root directories.
///
/// With a KEYWORD, runs one search and prints the sorted result. Without
/// one, reads the search text from stdin line by line and re-runs the
/// search as it changes.
#[derive(Debug, Parser)]
#[command(name = "mdsearch")]
#[command(author, version)]
#[command(about = "Search file names across several root directories", long_about = None)]
#[command(styles = get_styles(), after_help = AFTER_HELP)]
pub struct Cli {
    /// Keyword to search for. Omit to read keywords from stdin
    #[arg(value_name = "KEYWORD", allow_hyphen_values = true)]
    pub keyword: Option<String>,

    /// Search root; repeat for several. Defaults to the system roots
    #[arg(short = 'r', long = "root", value_name = "DIR", help_heading = "Search")]
    pub roots: Vec<PathBuf>,

    /// Treat the keyword as a case-insensitive regular expression
    #[arg(long = "pattern", help_heading = "Search")]
    pub pattern: bool,

    /// Config file (default: $MDSEARCH_CONFIG, then ~/.config/mdsearch/config.toml)
    #[arg(short = 'c', long = "config", value_name = "PATH", help_heading = "Search")]
    pub config: Option<PathBuf>,

    /// Print results as JSON lines
    #[arg(long = "json", help_heading = "Output")]
    pub json: bool,

    /// Print at most N results per snapshot; 0 prints all
    #[arg(
        long = "limit",
        value_name = "N",
        default_value_t = DEFAULT_LIMIT,
        help_heading = "Output"
    )]
    pub limit: usize,

    /// Set log verbosity level (error, warn, info, debug, trace)
    #[arg(
        long = "log-level",
        short = 'L',
        value_enum,
        default_value = "warn",
        help_heading = "Debugging"
    )]
    pub log_level: LogLevel,

    /// Shorthand for --log-level debug
    #[arg(short = 'v', long = "verbose", help_heading = "Debugging")]
    pub verbose: bool,

    /// Shorthand for --log-level trace
    #[arg(long = "trace", help_heading = "Debugging")]
    pub trace: bool,

    /// Write logs to this file instead of stderr
    #[arg(long = "log-file", value_name = "PATH", help_heading = "Debugging")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Effective log level, given the value of `MDSEARCH_LOG_LEVEL`.
    pub fn effective_log_level(&self, env_level: Option<&str>) -> LogLevel {
        if self.trace {
            LogLevel::Trace
        } else if self.verbose {
            LogLevel::Debug
        } else if let Some(level) = env_level.and_then(LogLevel::from_str_loose) {
            level
        } else {
            self.log_level
        }
    }

    /// The print limit, `None` when unlimited.
    pub fn limit(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_one_shot() {
        let cli = Cli::parse_from(["mdsearch", "-r", "/a", "--root", "/b", "--json", "cat"]);
        assert_eq!(cli.keyword.as_deref(), Some("cat"));
        assert_eq!(cli.roots, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert!(cli.json);
        assert_eq!(cli.limit(), Some(DEFAULT_LIMIT));
    }

    #[test]
    fn test_parse_interactive() {
        let cli = Cli::parse_from(["mdsearch", "--limit", "0"]);
        assert!(cli.keyword.is_none());
        assert!(cli.roots.is_empty());
        assert_eq!(cli.limit(), None);
    }

    #[test]
    fn test_log_level_precedence() {
        let cli = Cli::parse_from(["mdsearch", "--log-level", "error"]);
        assert_eq!(cli.effective_log_level(None), LogLevel::Error);
        assert_eq!(cli.effective_log_level(Some("DEBUG")), LogLevel::Debug);
        assert_eq!(cli.effective_log_level(Some("bogus")), LogLevel::Error);

        let cli = Cli::parse_from(["mdsearch", "-v"]);
        assert_eq!(cli.effective_log_level(Some("error")), LogLevel::Debug);

        let cli = Cli::parse_from(["mdsearch", "-v", "--trace"]);
        assert_eq!(cli.effective_log_level(None), LogLevel::Trace);
    }

    #[test]
    fn test_log_level_loose_parse() {
        assert_eq!(LogLevel::from_str_loose("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str_loose(" info "), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str_loose("loud"), None);
        assert_eq!(LogLevel::Trace.as_filter_str(), "trace");
    }
}
