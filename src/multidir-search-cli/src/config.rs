//! Config file discovery and command-line overrides.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use multidir_search::{MatchMode, SearchConfig};
use tracing::debug;

use crate::cli::Cli;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "MDSEARCH_CONFIG";

/// Picks the config file: `--config`, then `$MDSEARCH_CONFIG`, then the
/// per-user default when it exists.
pub fn config_path(
    explicit: Option<&Path>,
    env: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    config_dir
        .map(|dir| dir.join("mdsearch").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Loads the config and applies command-line overrides.
///
/// `--root` replaces the roots listed in the file.
pub fn load(cli: &Cli) -> Result<SearchConfig> {
    let path = config_path(
        cli.config.as_deref(),
        std::env::var_os(CONFIG_ENV),
        dirs::config_dir(),
    );

    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            SearchConfig::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => SearchConfig::default(),
    };

    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut SearchConfig, cli: &Cli) {
    if cli.pattern {
        config.match_mode = MatchMode::Pattern;
    }
    if !cli.roots.is_empty() {
        config.roots = cli.roots.clone();
    }
}
