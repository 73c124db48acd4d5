//! Two-stage argument resolution
//!
//! The final command-line grammar depends on which plugin runs, and the
//! plugin choice can come from the command line or from configuration.
//! The pipeline bootstraps its way out of that loop: a minimal first scan
//! extracts only the config/plugin selection flags, those decide the
//! plugin, the plugin may extend the grammar, and only then is the full
//! command line parsed.
//!
//! ```text
//! raw args ── stage one scan ── base parse ── config load
//!                                                │
//!                               plugin lookup ◄──┘  (CLI > config > default)
//!                                     │
//!               grammar extension ◄───┘
//!                     │
//!          final parse of raw args + config options
//! ```

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use super::grammar::Grammar;
use crate::args::{Options, ResolvedArgs};
use crate::config::{Config, ConfigError};
use crate::plugin::{PluginRegistry, DEFAULT_PLUGIN};

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Bad flags or values; rendered by clap with usage.
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// The resolved plugin name matches nothing in the registry.
    #[error("plugin not found: {0}")]
    PluginNotFound(String),

    /// An explicitly named config file is missing.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What a successful resolution asks the process to do.
#[derive(Debug)]
pub enum Outcome {
    /// Dispatch the resolved plugin over the parsed paths.
    Run {
        args: ResolvedArgs,
        config: Option<Config>,
    },
    /// A terminal side effect already happened (plugin listing, help or
    /// version output); exit with this code.
    Exit(i32),
}

/// Flags whose values must be known before the final grammar exists.
const SELECTION_FLAGS: [&str; 4] = ["-C", "--config", "-P", "--plugin"];
const SELECTION_PREFIXES: [&str; 4] = ["-C=", "--config=", "-P=", "--plugin="];

/// Extracts the config/plugin selection tokens from a raw command line.
///
/// The checks are sequential, not exclusive: a token appended as a pending
/// flag value is still examined as a possible flag itself, so `-P -C cfg`
/// yields `["-P", "-C", "-C", "cfg"]`. Malformed lines like that fail the
/// stage-one parse the same way they would fail the final one.
fn stage_one_extract(raw: &[String]) -> Vec<String> {
    let mut extracted = Vec::new();
    let mut pending_value = false;

    for token in raw {
        if pending_value {
            extracted.push(token.clone());
            pending_value = false;
        }
        if SELECTION_FLAGS.contains(&token.as_str()) {
            extracted.push(token.clone());
            pending_value = true;
        } else if SELECTION_PREFIXES.iter().any(|p| token.starts_with(p)) {
            extracted.push(token.clone());
        }
    }

    extracted
}

/// Resolves a raw command line into a runnable plugin dispatch.
///
/// Order matters throughout: config errors precede plugin resolution,
/// plugin resolution precedes the final parse, and the plugin listing is
/// checked only after the final parse succeeds.
pub fn resolve(registry: &mut PluginRegistry, raw: Vec<String>) -> Result<Outcome, ResolveError> {
    let mut cmd_line = raw;

    // Stage one: just enough of the command line to choose config and
    // plugin. Plugin-specific flags cannot appear here by construction.
    let stage_one = stage_one_extract(&cmd_line);
    debug!("stage one args: {:?}", stage_one);

    let mut grammar = Grammar::base();
    let first_pass = match grammar.parse(&stage_one) {
        Ok(matches) => matches,
        Err(err) if err.use_stderr() => return Err(ResolveError::Usage(err)),
        Err(err) => {
            let _ = err.print();
            return Ok(Outcome::Exit(0));
        }
    };

    let explicit_config = first_pass.get_one::<String>("config").map(PathBuf::from);
    let config = Config::load(explicit_config.as_deref())?;

    // Plugin precedence: command line, then config, then the default.
    let plugin_name = first_pass
        .get_one::<String>("plugin")
        .map(String::as_str)
        .or_else(|| config.as_ref().and_then(|c| c.default_plugin()))
        .unwrap_or(DEFAULT_PLUGIN)
        .to_string();

    let descriptor = registry
        .lookup(&plugin_name)
        .ok_or_else(|| ResolveError::PluginNotFound(plugin_name.clone()))?;

    // The instance created here is the one that runs, even if the final
    // parse sees a different --plugin value injected from config options.
    let plugin = descriptor.instantiate(&mut grammar);

    // Config-supplied tokens go after everything the user typed, so flags
    // with last-wins semantics read the config value.
    if let Some(extra) = config.as_ref().and_then(|c| c.default_options()) {
        cmd_line.extend(extra.split_whitespace().map(str::to_string));
    }

    let matches = match grammar.parse(&cmd_line) {
        Ok(matches) => matches,
        Err(err) if err.use_stderr() => return Err(ResolveError::Usage(err)),
        Err(err) => {
            let _ = err.print();
            return Ok(Outcome::Exit(0));
        }
    };

    if matches.get_flag("plugins") {
        registry.reload();
        print!("{}", registry.listing());
        return Ok(Outcome::Exit(0));
    }

    let options = Options::from_matches(matches);
    debug!("command line args: {:?}", options);
    debug!("plugin is: {}", plugin_name);

    Ok(Outcome::Run {
        args: ResolvedArgs {
            options,
            plugin_name,
            plugin,
        },
        config,
    })
}
