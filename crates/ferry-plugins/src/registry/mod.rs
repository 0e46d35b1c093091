//! Plugin registry loaded from a directory of manifest files.
//!
//! [`PluginRegistry::load`] reads every `*.json` file in a directory, parses
//! each independently, and indexes the resulting plugins by identity. Files
//! that cannot be read or decoded are skipped, so one broken manifest never
//! hides the others.
//!
//! Files are visited in lexicographic file-name order and plugins keep that
//! order. A later manifest with an already-seen identity replaces the earlier
//! plugin in place. Action resolution scans plugins in load order, so when two
//! plugins declare the same action key the first loaded plugin wins.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::manifest::{Action, Plugin};
use crate::parser::parse_plugin;

/// Tracing target for registry operations.
const REGISTRY_TARGET: &str = "ferry_plugins::registry";

/// File extension recognised as a manifest.
const MANIFEST_EXTENSION: &str = "json";

/// Registry of loaded plugins.
///
/// # Example
///
/// ```
/// use ferry_plugins::{Action, Plugin, PluginRegistry, Transport};
///
/// let registry = PluginRegistry::from_plugins(vec![
///     Plugin::new("writer", Transport::docker("acme/writer"))
///         .with_actions(vec![Action::new("refine")]),
/// ]);
/// let (plugin, action) = registry.find_action("refine").expect("resolved");
/// assert_eq!(plugin.id(), "writer");
/// assert_eq!(action.key(), "refine");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Plugin>,
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from already-parsed plugins, in order.
    ///
    /// A plugin whose identity was seen before replaces the earlier one.
    #[must_use]
    pub fn from_plugins(plugins: impl IntoIterator<Item = Plugin>) -> Self {
        let mut registry = Self::new();
        for plugin in plugins {
            registry.insert(plugin);
        }
        registry
    }

    /// Loads every manifest in `directory`.
    ///
    /// A directory that does not exist, or cannot be listed, yields an empty
    /// registry.
    ///
    /// # Example
    ///
    /// ```
    /// use ferry_plugins::PluginRegistry;
    ///
    /// let registry = PluginRegistry::load("/definitely/not/here");
    /// assert!(registry.is_empty());
    /// ```
    #[must_use]
    pub fn load(directory: impl AsRef<Path>) -> Self {
        let directory = directory.as_ref();
        let plugins = manifest_paths(directory)
            .into_iter()
            .filter_map(|path| load_manifest(&path))
            .collect::<Vec<_>>();
        let registry = Self::from_plugins(plugins);
        debug!(
            target: REGISTRY_TARGET,
            directory = %directory.display(),
            plugins = registry.len(),
            "loaded plugin registry"
        );
        registry
    }

    fn insert(&mut self, plugin: Plugin) {
        if let Some(&slot) = self.index.get(plugin.id()) {
            warn!(
                target: REGISTRY_TARGET,
                plugin = plugin.id(),
                "duplicate plugin id, replacing earlier manifest"
            );
            if let Some(existing) = self.plugins.get_mut(slot) {
                *existing = plugin;
            }
            return;
        }

        for action in plugin.actions() {
            if let Some((owner, _)) = self.find_action(action.key()) {
                warn!(
                    target: REGISTRY_TARGET,
                    action = action.key(),
                    plugin = plugin.id(),
                    owner = owner.id(),
                    "action key already provided by an earlier plugin"
                );
            }
        }

        self.index.insert(plugin.id().to_owned(), self.plugins.len());
        self.plugins.push(plugin);
    }

    /// Looks up a plugin by identity.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Plugin> {
        self.index.get(id).and_then(|&slot| self.plugins.get(slot))
    }

    /// Iterates over plugins in load order.
    pub fn plugins(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter()
    }

    /// Resolves an action key to its owning plugin and definition.
    ///
    /// Plugins are scanned in load order and the first exact match is
    /// returned.
    #[must_use]
    pub fn find_action(&self, key: &str) -> Option<(&Plugin, &Action)> {
        self.plugins
            .iter()
            .find_map(|plugin| plugin.action(key).map(|action| (plugin, action)))
    }

    /// Returns the number of loaded plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` when no plugins are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Lists manifest files in `directory`, sorted by file name.
fn manifest_paths(directory: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(error) => {
            debug!(
                target: REGISTRY_TARGET,
                directory = %directory.display(),
                %error,
                "manifest directory unavailable"
            );
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_manifest(path))
        .collect();
    paths.sort_by(|left, right| left.file_name().cmp(&right.file_name()));
    paths
}

fn is_manifest(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MANIFEST_EXTENSION))
}

fn load_manifest(path: &Path) -> Option<Plugin> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            warn!(
                target: REGISTRY_TARGET,
                path = %path.display(),
                %error,
                "skipping unreadable manifest"
            );
            return None;
        }
    };

    let document: Value = match serde_json::from_str(&text) {
        Ok(document) => document,
        Err(error) => {
            warn!(
                target: REGISTRY_TARGET,
                path = %path.display(),
                %error,
                "skipping manifest with invalid JSON"
            );
            return None;
        }
    };

    let plugin = parse_plugin(&document);
    if plugin.is_none() {
        debug!(
            target: REGISTRY_TARGET,
            path = %path.display(),
            "manifest did not describe a plugin"
        );
    }
    plugin
}
