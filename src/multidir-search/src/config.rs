//! Configuration types for multi-root search.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{SearchError, SearchResult};
use crate::matcher::MatchMode;
use crate::walker::WalkOptions;

/// Default width of a result batching window.
pub const DEFAULT_BATCH_WINDOW_MS: u64 = 150;

/// Default quiet period before a typed keyword is searched.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Default bound of the channel walkers send matches into.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Configuration for the search engine.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// batch_window_ms = 100
/// match_mode = "pattern"
/// roots = ["/mnt/usb"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Width of the window matches are gathered in before delivery.
    pub batch_window_ms: u64,

    /// Quiet period applied to keyword intake.
    pub debounce_ms: u64,

    /// Bound of the fan-in channel. A full channel blocks the walkers.
    pub channel_capacity: usize,

    /// How keywords are matched against file names.
    pub match_mode: MatchMode,

    /// Whether symlinked directories are descended into.
    pub follow_symlinks: bool,

    /// Whether each walker remembers visited directories so that symlink
    /// cycles terminate.
    pub cycle_guard: bool,

    /// Maximum depth below each root. `None` means unlimited depth.
    pub max_depth: Option<usize>,

    /// Extra root directories searched in addition to the provider's roots.
    pub roots: Vec<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_window_ms: DEFAULT_BATCH_WINDOW_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            match_mode: MatchMode::default(),
            follow_symlinks: true,
            cycle_guard: true,
            max_depth: None,
            roots: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// Creates a builder for constructing a configuration.
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> SearchResult<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| SearchError::read_config(path, e))?;
        let config =
            Self::from_toml_str(&text).map_err(|e| SearchError::parse_config(path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> SearchResult<()> {
        if self.batch_window_ms == 0 {
            return Err(SearchError::invalid_config(
                "batch_window_ms must be greater than zero",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(SearchError::invalid_config(
                "channel_capacity must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Traversal options handed to every walker of a session.
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            follow_symlinks: self.follow_symlinks,
            cycle_guard: self.cycle_guard,
            max_depth: self.max_depth,
        }
    }
}

/// Builder for creating `SearchConfig` instances.
#[derive(Debug, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Creates a new builder starting from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batching window.
    pub fn batch_window(mut self, window: Duration) -> Self {
        self.config.batch_window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the keyword debounce period.
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.config.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the fan-in channel bound.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Sets the match mode.
    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.config.match_mode = mode;
        self
    }

    /// Sets whether to follow symbolic links.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.follow_symlinks = follow;
        self
    }

    /// Sets whether visited directories are tracked.
    pub fn cycle_guard(mut self, guard: bool) -> Self {
        self.config.cycle_guard = guard;
        self
    }

    /// Sets the maximum traversal depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    /// Adds an extra root directory.
    pub fn add_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.roots.push(root.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> SearchConfig {
        self.config
    }
}
