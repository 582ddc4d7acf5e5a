//! mdsearch - command-line front end for `multidir_search`.
//!
//! - `cli/` - argument parsing and the one-shot and interactive runners
//! - `config` - config file discovery and flag overrides
//! - `logging` - tracing subscriber setup
//! - `render` - text and JSON output

pub mod cli;
pub mod config;
pub mod logging;
pub mod render;
