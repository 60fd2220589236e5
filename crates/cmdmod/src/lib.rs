//! cmdmod - Demo shell for hierarchical command modules
//!
//! Registers the `bettermodel` command tree against the in-memory registry
//! and runs it from the command line or a stdin REPL.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
