//! rove - a plugin-driven file tree processor
//!
//! rove walks file trees and hands every visited file to a plugin. Which
//! plugin runs, and which flags the command line accepts, is decided at
//! runtime by a two-stage argument resolution: the selection flags are
//! scanned first, the chosen plugin may extend the grammar, and only then
//! is the full command line parsed.

pub mod walk;
pub mod config;
pub mod plugin;
pub mod args;
pub mod profile;
pub mod logging;
pub mod cli;

pub use args::{Options, ResolvedArgs};
pub use plugin::{Plugin, PluginDescriptor, PluginRegistry};
