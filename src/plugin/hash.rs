//! Hash plugin
//!
//! Prints a BLAKE3 digest for every file visited, in the familiar
//! `<digest>  <path>` checksum-tool format.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::{Plugin, PluginDescriptor};
use crate::args::Options;
use crate::cli::Grammar;
use crate::config::Config;
use crate::walk::FsEncoding;

pub(super) const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "hash",
    aliases: &["checksum"],
    summary: "Compute a BLAKE3 checksum of every file visited.",
    factory: new_boxed,
};

fn new_boxed(_grammar: &mut Grammar) -> Box<dyn Plugin> {
    Box::<HashPlugin>::default()
}

#[derive(Debug, Default)]
pub struct HashPlugin {
    fs_encoding: FsEncoding,
}

impl Plugin for HashPlugin {
    fn start(&mut self, options: &Options, _config: Option<&Config>) -> Result<()> {
        self.fs_encoding = options.fs_encoding;
        Ok(())
    }

    fn handle_file(&mut self, path: &Path) -> Result<()> {
        let digest = hash_file(path)?;
        println!("{}  {}", digest, self.fs_encoding.decode(path.as_os_str()));
        Ok(())
    }
}

fn hash_file(path: &Path) -> Result<String> {
    let mut file =
        fs::File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut hasher = blake3::Hasher::new();
    std::io::copy(&mut file, &mut hasher)
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(hasher.finalize().to_hex().to_string())
}
