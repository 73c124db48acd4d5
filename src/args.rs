//! Parsed command-line options
//!
//! The base flags are lifted into typed fields after the final parse; the
//! raw matches stay attached so a plugin can read whatever flags it
//! registered on the grammar.

use std::fmt;
use std::path::PathBuf;

use clap::ArgMatches;

use crate::plugin::Plugin;
use crate::walk::FsEncoding;

/// Final parsed option set for one run.
#[derive(Debug)]
pub struct Options {
    pub paths: Vec<PathBuf>,
    pub excludes: Vec<String>,
    pub fs_encoding: FsEncoding,
    pub quiet: bool,
    pub profile: bool,
    pub pdb: bool,
    matches: ArgMatches,
}

impl Options {
    /// Lifts the typed fields out of a successful parse.
    pub fn from_matches(matches: ArgMatches) -> Self {
        let paths = matches
            .get_many::<String>("paths")
            .map(|values| values.map(PathBuf::from).collect())
            .unwrap_or_default();
        let excludes = matches
            .get_many::<String>("exclude")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        let fs_encoding = matches
            .get_one::<FsEncoding>("fs-encoding")
            .copied()
            .unwrap_or_default();

        Self {
            paths,
            excludes,
            fs_encoding,
            quiet: matches.get_flag("quiet"),
            profile: matches.get_flag("profile"),
            pdb: matches.get_flag("pdb"),
            matches,
        }
    }

    /// Raw matches, for plugin-registered flags.
    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }
}

/// A fully resolved run: the parsed options plus the plugin that will
/// process them. The plugin is created once during resolution and never
/// replaced afterwards, even if later tokens name a different plugin.
pub struct ResolvedArgs {
    pub options: Options,
    pub plugin_name: String,
    pub plugin: Box<dyn Plugin>,
}

impl fmt::Debug for ResolvedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedArgs")
            .field("options", &self.options)
            .field("plugin_name", &self.plugin_name)
            .finish_non_exhaustive()
    }
}
