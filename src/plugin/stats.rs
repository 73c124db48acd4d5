//! Stats plugin
//!
//! Tallies file counts and byte totals, grouped by extension. With `--quiet`
//! only the grand total is printed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::{Plugin, PluginDescriptor};
use crate::args::Options;
use crate::cli::Grammar;
use crate::config::Config;

pub(super) const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "stats",
    aliases: &["count"],
    summary: "Count files and bytes, grouped by file extension.",
    factory: new_boxed,
};

fn new_boxed(_grammar: &mut Grammar) -> Box<dyn Plugin> {
    Box::<StatsPlugin>::default()
}

#[derive(Debug, Default, Clone, Copy)]
struct ExtStat {
    files: u64,
    bytes: u64,
}

#[derive(Debug, Default)]
pub struct StatsPlugin {
    quiet: bool,
    total: ExtStat,
    by_extension: BTreeMap<String, ExtStat>,
}

impl StatsPlugin {
    fn render(&self) -> String {
        let mut out = String::new();
        if !self.quiet {
            for (ext, stat) in &self.by_extension {
                out.push_str(&format!(
                    "{:<12} {:>8} files {:>14} bytes\n",
                    ext, stat.files, stat.bytes
                ));
            }
        }
        out.push_str(&format!(
            "total: {} files, {} bytes\n",
            self.total.files, self.total.bytes
        ));
        out
    }
}

impl Plugin for StatsPlugin {
    fn start(&mut self, options: &Options, _config: Option<&Config>) -> Result<()> {
        self.quiet = options.quiet;
        Ok(())
    }

    fn handle_file(&mut self, path: &Path) -> Result<()> {
        let meta =
            fs::metadata(path).with_context(|| format!("cannot stat {}", path.display()))?;

        let stat = self.by_extension.entry(extension_of(path)).or_default();
        stat.files += 1;
        stat.bytes += meta.len();
        self.total.files += 1;
        self.total.bytes += meta.len();
        Ok(())
    }

    fn handle_done(&mut self) -> Result<()> {
        print!("{}", self.render());
        Ok(())
    }
}

fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
        None => "(none)".to_string(),
    }
}
