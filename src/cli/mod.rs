//! # Command-Line Interface
//!
//! Argument resolution and dispatch for `rove`.
//!
//! ## Resolution Stages
//!
//! | Stage | Input | Output |
//! |-------|-------|--------|
//! | Stage one | raw argument vector | config/plugin selection tokens |
//! | Config load | selection tokens | optional `[DEFAULT]` settings |
//! | Plugin lookup | CLI > config > default | plugin instance, extended grammar |
//! | Final parse | raw args + config options | parsed options for the run |
//!
//! ## Exit Codes
//!
//! - `0` - success, plugin listing, help/version, interrupted run
//! - `1` - usage error, unknown plugin, missing explicit config, failed run
//!
//! ## Entry Point
//!
//! Call [`run()`] to resolve the process arguments and dispatch.

mod app;
mod grammar;
mod resolve;

pub use app::{run, Dispatcher, EntryPoint, ErrorHook};
pub use grammar::Grammar;
pub use resolve::{resolve, Outcome, ResolveError};
