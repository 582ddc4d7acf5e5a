//! Argument parsing and command execution.
//!
//! - `args` - command-line argument structures
//! - `styles` - ANSI styling for help output
//! - `handlers` - one-shot and interactive search

pub mod args;
pub mod handlers;
pub mod styles;

pub use args::{Cli, DEFAULT_LIMIT, LogLevel};
pub use handlers::run;
pub use styles::{AFTER_HELP, get_styles};
