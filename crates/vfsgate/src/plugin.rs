//! Plugin registry.
//!
//! Plugins are named compound operations built on the [`FileSystem`]
//! contract ("empty a directory", "move even if the target exists").
//! They are looked up by method name at runtime and handed the invoking
//! filesystem on every call.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{VfsError, VfsResult};
use crate::ops::FileSystem;
use crate::path::VfsPath;

/// A plugin argument.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginArg {
    /// A filesystem path (raw; the filesystem normalizes it).
    Path(String),
    Text(String),
    Bool(bool),
    Int(i64),
    Json(Value),
}

impl PluginArg {
    /// Build a path argument.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// The path, if this is a path argument.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }
}

impl From<VfsPath> for PluginArg {
    fn from(path: VfsPath) -> Self {
        Self::Path(path.into())
    }
}

impl From<bool> for PluginArg {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for PluginArg {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// A plugin result.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PluginValue {
    /// No meaningful result.
    #[default]
    Unit,
    Bool(bool),
    Text(String),
    Json(Value),
}

/// A named, runtime-registered operation.
pub trait Plugin: Send + Sync {
    /// Method name the plugin is invoked by.
    fn method(&self) -> &str;

    /// Run the plugin against `fs`.
    fn handle(&self, fs: &dyn FileSystem, args: &[PluginArg]) -> VfsResult<PluginValue>;
}

/// Check arity and pull out path arguments, in order.
pub fn path_args<'a, const N: usize>(
    method: &str,
    args: &'a [PluginArg],
) -> VfsResult<[&'a str; N]> {
    if args.len() != N {
        return Err(VfsError::invalid_argument(format!(
            "{method} expects {N} path argument(s), got {}",
            args.len()
        )));
    }
    let mut out = [""; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.as_path().ok_or_else(|| {
            VfsError::invalid_argument(format!("{method} expects path arguments, got {arg:?}"))
        })?;
    }
    Ok(out)
}

/// Registry of plugins, keyed by method name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<HashMap<String, Arc<dyn Plugin>>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under its method name.
    ///
    /// A plugin already registered under the same name is replaced.
    pub fn add_plugin(&self, plugin: impl Plugin + 'static) {
        self.add_plugin_arc(Arc::new(plugin));
    }

    /// Register a plugin (already wrapped in Arc).
    pub fn add_plugin_arc(&self, plugin: Arc<dyn Plugin>) {
        let method = plugin.method().to_string();
        let replaced = self.plugins.write().insert(method.clone(), plugin);
        if replaced.is_some() {
            debug!("plugin {} replaced", method);
        } else {
            debug!("plugin {} registered", method);
        }
    }

    /// Remove a plugin. Returns `true` if one was registered.
    pub fn remove_plugin(&self, method: &str) -> bool {
        self.plugins.write().remove(method).is_some()
    }

    /// Find the plugin registered for `method`.
    pub fn find_plugin(&self, method: &str) -> VfsResult<Arc<dyn Plugin>> {
        self.plugins
            .read()
            .get(method)
            .cloned()
            .ok_or_else(|| VfsError::plugin_not_found(method))
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<_> = self.plugins.read().keys().cloned().collect();
        methods.sort();
        methods
    }

    /// Invoke `method` against `fs`.
    ///
    /// The table lock is released before the plugin runs, so a plugin may
    /// itself use the registry.
    #[tracing::instrument(skip(self, fs, args), name = "plugin.invoke")]
    pub fn invoke_plugin(
        &self,
        fs: &dyn FileSystem,
        method: &str,
        args: &[PluginArg],
    ) -> VfsResult<PluginValue> {
        let plugin = self.find_plugin(method)?;
        plugin.handle(fs, args)
    }
}
