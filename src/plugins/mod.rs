//! Plugin registration for node types
//!
//! Registration is explicit: nothing registers itself at module load. A host
//! loads plugins through [`PluginManager`], which lets it control load order
//! and unregister a plugin's node types again.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::constants;
use crate::nodes::math::float_math::FloatMathNodeFactory;
use crate::nodes::{NodeRegistry, RegistryError};

/// Plugin identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Host version the plugin was built against
    pub compatible_version: String,
}

/// Errors raised while loading or unloading plugins
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin `{name}` requires host version {required}, current version is {current}")]
    Compatibility {
        name: String,
        required: String,
        current: String,
    },
    #[error("plugin `{0}` is not loaded")]
    NotLoaded(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A bundle of node types loaded into a host registry
pub trait NodePlugin: Send + Sync {
    fn plugin_info(&self) -> PluginInfo;

    /// Register every node type this plugin provides
    fn register_nodes(&self, registry: &mut NodeRegistry) -> Result<(), RegistryError>;

    /// Identifiers of the node types registered by [`NodePlugin::register_nodes`]
    fn node_types(&self) -> Vec<&'static str>;

    fn on_load(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn on_unload(&self) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Register the built-in function nodes. Safe to call more than once.
pub fn register(registry: &mut NodeRegistry) -> Result<(), RegistryError> {
    registry.register::<FloatMathNodeFactory>()
}

/// The built-in function node plugin
pub struct FunctionNodesPlugin;

impl NodePlugin for FunctionNodesPlugin {
    fn plugin_info(&self) -> PluginInfo {
        PluginInfo {
            name: constants::plugin::FUNCTION_NODES.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Function nodes: Float Math".to_string(),
            compatible_version: constants::plugin::HOST_VERSION.to_string(),
        }
    }

    fn register_nodes(&self, registry: &mut NodeRegistry) -> Result<(), RegistryError> {
        register(registry)
    }

    fn node_types(&self) -> Vec<&'static str> {
        vec![constants::node::FLOAT_MATH]
    }
}

struct LoadedPlugin {
    plugin: Box<dyn NodePlugin>,
    info: PluginInfo,
}

/// Tracks loaded plugins and the node types they own
#[derive(Default)]
pub struct PluginManager {
    loaded_plugins: BTreeMap<String, LoadedPlugin>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a plugin and register its node types
    ///
    /// Loading a plugin whose name is already loaded does nothing. If
    /// registration fails part way, node types registered by this call are
    /// removed again and the plugin's `on_unload` hook runs.
    pub fn load(
        &mut self,
        plugin: Box<dyn NodePlugin>,
        registry: &mut NodeRegistry,
    ) -> Result<PluginInfo, PluginError> {
        let info = plugin.plugin_info();

        if self.loaded_plugins.contains_key(&info.name) {
            debug!("Plugin {} already loaded", info.name);
            return Ok(info);
        }

        if !Self::is_compatible_version(&info.compatible_version) {
            return Err(PluginError::Compatibility {
                name: info.name,
                required: info.compatible_version,
                current: constants::plugin::HOST_VERSION.to_string(),
            });
        }

        plugin.on_load()?;

        let preexisting: Vec<&'static str> = plugin
            .node_types()
            .into_iter()
            .filter(|node_type| registry.has_node_type(node_type))
            .collect();

        if let Err(err) = plugin.register_nodes(registry) {
            for node_type in plugin.node_types() {
                if preexisting.contains(&node_type) || !registry.has_node_type(node_type) {
                    continue;
                }
                if let Err(unregister_err) = registry.unregister(node_type) {
                    warn!("Rolling back plugin {}: {}", info.name, unregister_err);
                }
            }
            if let Err(unload_err) = plugin.on_unload() {
                warn!("Plugin {} failed to unload: {}", info.name, unload_err);
            }
            return Err(err.into());
        }

        info!("Loaded plugin {} v{}", info.name, info.version);
        self.loaded_plugins.insert(
            info.name.clone(),
            LoadedPlugin {
                plugin,
                info: info.clone(),
            },
        );
        Ok(info)
    }

    /// Unload a plugin and unregister its node types
    pub fn unload(&mut self, name: &str, registry: &mut NodeRegistry) -> Result<(), PluginError> {
        let loaded = self
            .loaded_plugins
            .remove(name)
            .ok_or_else(|| PluginError::NotLoaded(name.to_string()))?;

        for node_type in loaded.plugin.node_types() {
            if let Err(err) = registry.unregister(node_type) {
                warn!("Unloading plugin {}: {}", name, err);
            }
        }

        loaded.plugin.on_unload()?;
        info!("Unloaded plugin {}", name);
        Ok(())
    }

    /// Get info about all loaded plugins
    pub fn loaded_plugins(&self) -> Vec<&PluginInfo> {
        self.loaded_plugins.values().map(|p| &p.info).collect()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded_plugins.contains_key(name)
    }

    /// Plugins must target the host's major.minor version
    fn is_compatible_version(plugin_version: &str) -> bool {
        fn major_minor(version: &str) -> Vec<&str> {
            version.split('.').take(2).collect()
        }
        major_minor(plugin_version) == major_minor(constants::plugin::HOST_VERSION)
    }
}

static GLOBAL_REGISTRY: Lazy<RwLock<NodeRegistry>> = Lazy::new(|| RwLock::new(NodeRegistry::new()));

/// Process-wide node registry
pub fn global_registry() -> &'static RwLock<NodeRegistry> {
    &GLOBAL_REGISTRY
}

/// Register the built-in function nodes with the process-wide registry
pub fn register_global() -> Result<(), RegistryError> {
    let mut registry = GLOBAL_REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    register(&mut registry)
}
