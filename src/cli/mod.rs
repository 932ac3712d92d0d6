//! CLI module
//!
//! Command-line interface for the sync service.
//!
//! # Commands
//!
//! - `serve` - Scheduler plus the HTTP read path
//! - `sync` - One cycle, then exit
//! - `get` - Print one stored record
//! - `count` - Print stored counts

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
