//! # Plugin System
//!
//! Every run of `rove` is driven by exactly one plugin: the walker hands it
//! each visited file, bracketed by start/done lifecycle hooks. Plugins are a
//! closed set registered in an explicit table at startup; there is no binary
//! discovery.
//!
//! ## Lifecycle
//!
//! ```text
//! registry lookup ── factory(&mut Grammar) ── may register extra flags
//!        │
//!        ├── start(options, config)
//!        ├── handle_file(path)        once per visited file
//!        └── handle_done()            skipped on interrupt
//! ```
//!
//! ## Built-in Plugins
//!
//! | Name | Aliases | Purpose |
//! |------|---------|---------|
//! | `print` | `echo` | Print each visited path (default) |
//! | `stats` | `count` | Count files and bytes per extension |
//! | `json` | | Collect metadata records, print as JSON |
//! | `hash` | `checksum` | BLAKE3 digest per file |
//!
//! ## Key Types
//!
//! - [`Plugin`] - Per-file handler capability
//! - [`PluginDescriptor`] - Name, aliases, summary, and factory
//! - [`PluginRegistry`] - Name-keyed lookup and enumeration

use std::path::Path;

use anyhow::Result;

use crate::args::Options;
use crate::cli::Grammar;
use crate::config::Config;

mod hash;
mod json;
mod print;
mod registry;
mod stats;

pub use hash::HashPlugin;
pub use json::JsonPlugin;
pub use print::PrintPlugin;
pub use registry::{PluginRegistry, RegistryError};
pub use stats::StatsPlugin;

/// Plugin used when neither the command line nor the config names one.
pub const DEFAULT_PLUGIN: &str = "print";

/// A handler invoked once per visited file.
///
/// `start` runs before any path is walked and `handle_done` after the last
/// one; both default to no-ops. An interrupted run skips `handle_done`.
pub trait Plugin {
    /// Called once before processing begins.
    fn start(&mut self, _options: &Options, _config: Option<&Config>) -> Result<()> {
        Ok(())
    }

    /// Called for every file the walker delivers.
    fn handle_file(&mut self, path: &Path) -> Result<()>;

    /// Called once after all paths have been processed.
    fn handle_done(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Creates a plugin instance, registering any plugin-specific flags on the
/// grammar before the final command-line parse.
pub type PluginFactory = fn(&mut Grammar) -> Box<dyn Plugin>;

/// Registration entry for one plugin.
#[derive(Debug, Clone, Copy)]
pub struct PluginDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub summary: &'static str,
    pub factory: PluginFactory,
}

impl PluginDescriptor {
    /// Primary name followed by aliases.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    /// Instantiates the plugin, letting it extend the grammar.
    pub fn instantiate(&self, grammar: &mut Grammar) -> Box<dyn Plugin> {
        (self.factory)(grammar)
    }
}
