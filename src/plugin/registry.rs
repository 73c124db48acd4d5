//! Plugin registry
//!
//! Maps plugin names and aliases to descriptors. The built-in table is the
//! single source of registrations; `reload` rebuilds from it.

use std::collections::HashMap;

use thiserror::Error;

use super::{hash, json, print, stats, PluginDescriptor};

/// Registration table for the built-in plugins.
const BUILTIN_TABLE: &[PluginDescriptor] = &[
    print::DESCRIPTOR,
    stats::DESCRIPTOR,
    json::DESCRIPTOR,
    hash::DESCRIPTOR,
];

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate plugin name: {0}")]
    Duplicate(String),
}

/// Name-keyed plugin lookup.
///
/// Aliases resolve to the same descriptor as the primary name. Enumeration
/// is deduplicated (one entry per descriptor) and sorted by primary name.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    descriptors: Vec<PluginDescriptor>,
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated from the built-in table.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in BUILTIN_TABLE {
            registry
                .register(*descriptor)
                .expect("duplicate built-in plugin name");
        }
        registry
    }

    /// Registers a descriptor. Rejects any name or alias already taken,
    /// without partially registering.
    pub fn register(&mut self, descriptor: PluginDescriptor) -> Result<(), RegistryError> {
        for name in descriptor.names() {
            if self.index.contains_key(name) {
                return Err(RegistryError::Duplicate(name.to_string()));
            }
        }

        let idx = self.descriptors.len();
        for name in descriptor.names() {
            self.index.insert(name.to_string(), idx);
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Looks up a descriptor by name or alias.
    pub fn lookup(&self, name: &str) -> Option<&PluginDescriptor> {
        self.index.get(name).map(|&idx| &self.descriptors[idx])
    }

    /// All descriptors, sorted by primary name.
    pub fn descriptors(&self) -> Vec<&PluginDescriptor> {
        let mut all: Vec<_> = self.descriptors.iter().collect();
        all.sort_by_key(|d| d.name);
        all
    }

    /// Drops everything registered and rebuilds from the built-in table.
    pub fn reload(&mut self) {
        *self = Self::builtin();
    }

    /// Renders the plugin listing shown by `--plugins`.
    pub fn listing(&self) -> String {
        let mut out = String::from("\n");
        for descriptor in self.descriptors() {
            let aliases = if descriptor.aliases.is_empty() {
                String::new()
            } else {
                format!(" ({})", descriptor.aliases.join(", "))
            };
            out.push_str(&format!(
                "- {}{}:\n{}\n\n",
                descriptor.name, aliases, descriptor.summary
            ));
        }
        out
    }
}
