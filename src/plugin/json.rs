//! JSON plugin
//!
//! Collects one metadata record per file and prints the whole set as a JSON
//! array when the walk finishes. Registers `--pretty` on the grammar;
//! `pretty = true` in the `[json]` config section does the same.

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction};
use serde::Serialize;

use super::{Plugin, PluginDescriptor};
use crate::args::Options;
use crate::cli::Grammar;
use crate::config::Config;
use crate::walk::FsEncoding;

pub(super) const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "json",
    aliases: &[],
    summary: "Collect file metadata and print it as JSON.",
    factory: new_boxed,
};

fn new_boxed(grammar: &mut Grammar) -> Box<dyn Plugin> {
    grammar.register(
        Arg::new("pretty")
            .long("pretty")
            .action(ArgAction::SetTrue)
            .help("Pretty-print the JSON output"),
    );
    Box::<JsonPlugin>::default()
}

#[derive(Debug, Serialize)]
struct FileRecord {
    path: String,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<u64>,
}

#[derive(Debug, Default)]
pub struct JsonPlugin {
    pretty: bool,
    fs_encoding: FsEncoding,
    records: Vec<FileRecord>,
}

impl JsonPlugin {
    fn render(&self) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(&self.records).context("cannot serialize records")
        } else {
            serde_json::to_string(&self.records).context("cannot serialize records")
        }
    }
}

impl Plugin for JsonPlugin {
    fn start(&mut self, options: &Options, config: Option<&Config>) -> Result<()> {
        let from_config = config
            .and_then(|c| c.section("json"))
            .and_then(|table| table.get("pretty"))
            .and_then(|value| value.as_bool())
            .unwrap_or(false);

        self.pretty = options.matches().get_flag("pretty") || from_config;
        self.fs_encoding = options.fs_encoding;
        Ok(())
    }

    fn handle_file(&mut self, path: &Path) -> Result<()> {
        let meta =
            fs::metadata(path).with_context(|| format!("cannot stat {}", path.display()))?;

        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs());

        self.records.push(FileRecord {
            path: self.fs_encoding.decode(path.as_os_str()).into_owned(),
            size: meta.len(),
            modified,
        });
        Ok(())
    }

    fn handle_done(&mut self) -> Result<()> {
        println!("{}", self.render()?);
        Ok(())
    }
}
