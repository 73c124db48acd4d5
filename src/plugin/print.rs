//! Print plugin
//!
//! The default plugin: prints the path of every file the walker delivers,
//! decoded with the active filesystem encoding.

use std::path::Path;

use anyhow::Result;

use super::{Plugin, PluginDescriptor};
use crate::args::Options;
use crate::cli::Grammar;
use crate::config::Config;
use crate::walk::FsEncoding;

pub(super) const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "print",
    aliases: &["echo"],
    summary: "Print the path of every file visited. This is the default plugin.",
    factory: new_boxed,
};

fn new_boxed(_grammar: &mut Grammar) -> Box<dyn Plugin> {
    Box::<PrintPlugin>::default()
}

#[derive(Debug, Default)]
pub struct PrintPlugin {
    fs_encoding: FsEncoding,
}

impl Plugin for PrintPlugin {
    fn start(&mut self, options: &Options, _config: Option<&Config>) -> Result<()> {
        self.fs_encoding = options.fs_encoding;
        Ok(())
    }

    fn handle_file(&mut self, path: &Path) -> Result<()> {
        println!("{}", self.fs_encoding.decode(path.as_os_str()));
        Ok(())
    }
}
