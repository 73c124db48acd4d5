//! Command-line grammar
//!
//! The recognized flag set is not fixed at compile time: the base grammar
//! covers the built-in flags, and the resolved plugin may register more
//! before the final parse. That rules out clap's derive API, so the
//! grammar wraps a builder-style `Command`.

use clap::{builder::EnumValueParser, Arg, ArgAction, ArgMatches, Command};

use crate::plugin::DEFAULT_PLUGIN;
use crate::walk::FsEncoding;

/// The flag set for one parse pass.
pub struct Grammar {
    cmd: Command,
}

impl Grammar {
    /// Base grammar: every built-in flag, no plugin extensions.
    pub fn base() -> Self {
        let cmd = Command::new("rove")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Plugin-driven file tree processor")
            .no_binary_name(true)
            .arg(
                Arg::new("paths")
                    .value_name("PATH")
                    .num_args(0..)
                    .action(ArgAction::Append)
                    .help("Files or directory paths"),
            )
            .arg(
                Arg::new("exclude")
                    .long("exclude")
                    .value_name("PATTERN")
                    .action(ArgAction::Append)
                    .help(
                        "A regular expression for paths to exclude. \
                         May be given multiple times",
                    ),
            )
            .arg(
                Arg::new("plugins")
                    .short('L')
                    .long("plugins")
                    .action(ArgAction::SetTrue)
                    .help("List all available plugins"),
            )
            .arg(
                Arg::new("plugin")
                    .short('P')
                    .long("plugin")
                    .value_name("NAME")
                    .action(ArgAction::Set)
                    .help(format!(
                        "Which plugin to use. The default is '{DEFAULT_PLUGIN}'"
                    )),
            )
            .arg(
                Arg::new("config")
                    .short('C')
                    .long("config")
                    .value_name("FILE")
                    .action(ArgAction::Set)
                    .help(
                        "Supply a configuration file. The per-user default \
                         is used otherwise, if present",
                    ),
            )
            .arg(
                Arg::new("quiet")
                    .short('Q')
                    .long("quiet")
                    .action(ArgAction::SetTrue)
                    .help("A hint to plugins to output less"),
            )
            .arg(
                Arg::new("fs-encoding")
                    .long("fs-encoding")
                    .value_name("ENCODING")
                    .value_parser(EnumValueParser::<FsEncoding>::new())
                    .default_value(FsEncoding::detect().as_str())
                    .help("Decode filesystem names with this encoding"),
            )
            .arg(
                Arg::new("profile")
                    .long("profile")
                    .action(ArgAction::SetTrue)
                    .help_heading("Debugging")
                    .help("Collect per-file timings and print a report"),
            )
            .arg(
                Arg::new("pdb")
                    .long("pdb")
                    .action(ArgAction::SetTrue)
                    .help_heading("Debugging")
                    .help("Run the error inspection hook when errors occur"),
            );

        Self { cmd }
    }

    /// Registers a plugin-supplied flag.
    pub fn register(&mut self, arg: Arg) {
        let cmd = std::mem::replace(&mut self.cmd, Command::new(""));
        self.cmd = cmd.arg(arg);
    }

    /// Parses tokens (no binary name expected). Each call parses a fresh
    /// clone; the stored command is never built, so flags registered after
    /// an earlier parse still take effect. Help and version requests
    /// surface as `Err` too; callers tell them apart from real usage
    /// errors via [`clap::Error::use_stderr`].
    pub fn parse(&self, args: &[String]) -> Result<ArgMatches, clap::Error> {
        self.cmd.clone().try_get_matches_from(args)
    }
}
