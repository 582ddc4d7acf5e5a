//! Help output styling.

use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Help theme: cyan headers, green literals.
pub fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Cyan.on_default())
        .invalid(AnsiColor::Yellow.on_default())
}

/// After-help section listing environment variables and paths.
pub const AFTER_HELP: &str = "\
EXAMPLES
    mdsearch report                 Search the system roots once
    mdsearch -r ~/src -r /srv cat   Search two roots once
    mdsearch -r ~/src               Read keywords from stdin, one per line

ENVIRONMENT VARIABLES
    MDSEARCH_CONFIG       Config file (alternative to --config)
    MDSEARCH_LOG_LEVEL    Log verbosity (error, warn, info, debug, trace)
    RUST_LOG              Full tracing filter; overrides every other log setting

PATHS
    Config      ~/.config/mdsearch/config.toml";
