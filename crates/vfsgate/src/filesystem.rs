//! The virtual filesystem facade.
//!
//! [`Vfs`] wraps one [`Adapter`]. Every operation normalizes its paths,
//! resolves configuration, checks presence/absence invariants and only then
//! delegates to the adapter. Adapters therefore never see `..`, stray
//! separators or partial option maps.
//!
//! Presence checks can be switched off with the `disableAsserts` option, for
//! backends where an extra existence round-trip is expensive or the caller
//! already knows the answer.

use std::io::Read;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

use crate::adapter::{Adapter, ReadStream};
use crate::config::{Config, Options};
use crate::error::{VfsError, VfsResult};
use crate::ops::FileSystem;
use crate::path::{normalize, VfsPath};
use crate::plugin::{Plugin, PluginArg, PluginRegistry, PluginValue};
use crate::types::{Metadata, Visibility};

/// Virtual filesystem over a single adapter.
pub struct Vfs<A: Adapter> {
    adapter: A,
    /// Persistent defaults; the fallback of every per-call config.
    config: Arc<Config>,
    plugins: PluginRegistry,
}

impl<A: Adapter> std::fmt::Debug for Vfs<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vfs")
            .field("config", &self.config)
            .field("plugins", &self.plugins)
            .finish()
    }
}

impl<A: Adapter> Vfs<A> {
    /// Create a filesystem with empty defaults.
    pub fn new(adapter: A) -> Self {
        Self::with_config(adapter, Config::new())
    }

    /// Create a filesystem with the given persistent defaults.
    pub fn with_config(adapter: A, config: Config) -> Self {
        Self {
            adapter,
            config: Arc::new(config),
            plugins: PluginRegistry::new(),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The persistent defaults.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Layer call-site overrides over the persistent defaults.
    pub fn prepare_config(&self, overrides: Options) -> Config {
        Config::from_options(overrides).with_fallback(Arc::clone(&self.config))
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Register a plugin on this filesystem.
    pub fn add_plugin(&self, plugin: impl Plugin + 'static) {
        self.plugins.add_plugin(plugin);
    }

    pub fn find_plugin(&self, method: &str) -> VfsResult<Arc<dyn Plugin>> {
        self.plugins.find_plugin(method)
    }

    /// Invoke a registered plugin against this filesystem.
    pub fn invoke_plugin(&self, method: &str, args: &[PluginArg]) -> VfsResult<PluginValue> {
        self.plugins.invoke_plugin(self, method, args)
    }

    fn has_path(&self, path: &VfsPath) -> VfsResult<bool> {
        if path.is_root() {
            return Ok(false);
        }
        self.adapter.has(path)
    }

    fn assert_present(&self, path: &VfsPath, config: &Config) -> VfsResult<()> {
        if config.asserts_enabled() && !self.has_path(path)? {
            return Err(VfsError::file_not_found(path.as_str()));
        }
        Ok(())
    }

    /// Move and copy never touch the root, whatever the assert settings.
    fn guard_transfer(from: &VfsPath, to: &VfsPath) -> VfsResult<()> {
        if from.is_root() {
            return Err(VfsError::permission_denied("cannot move or copy root"));
        }
        if to.is_root() {
            return Err(VfsError::permission_denied("cannot replace root"));
        }
        Ok(())
    }

    fn assert_absent(&self, path: &VfsPath, config: &Config) -> VfsResult<()> {
        if config.asserts_enabled() && self.has_path(path)? {
            return Err(VfsError::file_exists(path.as_str()));
        }
        Ok(())
    }
}

impl<A: Adapter> FileSystem for Vfs<A> {
    #[tracing::instrument(skip(self), name = "vfs.has")]
    fn has(&self, path: &str) -> VfsResult<bool> {
        let path = normalize(path)?;
        self.has_path(&path)
    }

    #[tracing::instrument(skip(self), name = "vfs.read")]
    fn read(&self, path: &str) -> VfsResult<Vec<u8>> {
        let path = normalize(path)?;
        self.assert_present(&path, &self.config)?;
        self.adapter.read(&path)
    }

    #[tracing::instrument(skip(self), name = "vfs.read_stream")]
    fn read_stream(&self, path: &str) -> VfsResult<ReadStream> {
        let path = normalize(path)?;
        self.assert_present(&path, &self.config)?;
        self.adapter.read_stream(&path)
    }

    #[tracing::instrument(skip(self), name = "vfs.get_metadata")]
    fn get_metadata(&self, path: &str) -> VfsResult<Metadata> {
        let path = normalize(path)?;
        self.adapter.get_metadata(&path)
    }

    fn get_mime_type(&self, path: &str) -> VfsResult<String> {
        self.adapter.get_mime_type(&normalize(path)?)
    }

    fn get_timestamp(&self, path: &str) -> VfsResult<SystemTime> {
        self.adapter.get_timestamp(&normalize(path)?)
    }

    fn get_file_size(&self, path: &str) -> VfsResult<u64> {
        self.adapter.get_file_size(&normalize(path)?)
    }

    fn get_visibility(&self, path: &str) -> VfsResult<Visibility> {
        self.adapter.get_visibility(&normalize(path)?)
    }

    #[tracing::instrument(skip(self), name = "vfs.list_contents")]
    fn list_contents(&self, path: &str, recursive: bool) -> VfsResult<Vec<Metadata>> {
        let path = normalize(path)?;
        self.adapter.list_contents(&path, recursive)
    }

    #[tracing::instrument(skip(self, content, options), fields(len = content.len()), name = "vfs.write")]
    fn write(&self, path: &str, content: &[u8], options: Options) -> VfsResult<()> {
        let path = normalize(path)?;
        let config = self.prepare_config(options);
        self.assert_absent(&path, &config)?;
        self.adapter.write(&path, content, &config)
    }

    #[tracing::instrument(skip(self, reader, options), name = "vfs.write_stream")]
    fn write_stream(&self, path: &str, reader: &mut dyn Read, options: Options) -> VfsResult<()> {
        let path = normalize(path)?;
        let config = self.prepare_config(options);
        self.assert_absent(&path, &config)?;
        self.adapter.write_stream(&path, reader, &config)
    }

    #[tracing::instrument(skip(self, content, options), fields(len = content.len()), name = "vfs.update")]
    fn update(&self, path: &str, content: &[u8], options: Options) -> VfsResult<()> {
        let path = normalize(path)?;
        let config = self.prepare_config(options);
        self.assert_present(&path, &config)?;
        self.adapter.update(&path, content, &config)
    }

    #[tracing::instrument(skip(self, reader, options), name = "vfs.update_stream")]
    fn update_stream(
        &self,
        path: &str,
        reader: &mut dyn Read,
        options: Options,
    ) -> VfsResult<()> {
        let path = normalize(path)?;
        let config = self.prepare_config(options);
        self.assert_present(&path, &config)?;
        self.adapter.update_stream(&path, reader, &config)
    }

    #[tracing::instrument(skip(self, content, options), fields(len = content.len()), name = "vfs.put")]
    fn put(&self, path: &str, content: &[u8], options: Options) -> VfsResult<()> {
        let path = normalize(path)?;
        let config = self.prepare_config(options);
        if self.has_path(&path)? && self.adapter.can_overwrite() {
            debug!("put {} as update", path);
            self.adapter.update(&path, content, &config)
        } else {
            self.adapter.write(&path, content, &config)
        }
    }

    #[tracing::instrument(skip(self, reader, options), name = "vfs.put_stream")]
    fn put_stream(&self, path: &str, reader: &mut dyn Read, options: Options) -> VfsResult<()> {
        let path = normalize(path)?;
        let config = self.prepare_config(options);
        if self.has_path(&path)? && self.adapter.can_overwrite() {
            debug!("put_stream {} as update", path);
            self.adapter.update_stream(&path, reader, &config)
        } else {
            self.adapter.write_stream(&path, reader, &config)
        }
    }

    #[tracing::instrument(skip(self), name = "vfs.delete")]
    fn delete(&self, path: &str) -> VfsResult<bool> {
        let path = normalize(path)?;
        self.assert_present(&path, &self.config)?;
        self.adapter.delete(&path)
    }

    #[tracing::instrument(skip(self), name = "vfs.read_and_delete")]
    fn read_and_delete(&self, path: &str) -> VfsResult<Vec<u8>> {
        let path = normalize(path)?;
        self.assert_present(&path, &self.config)?;
        let content = self.adapter.read(&path)?;
        self.adapter.delete(&path)?;
        Ok(content)
    }

    #[tracing::instrument(skip(self), name = "vfs.move")]
    fn move_file(&self, path: &str, new_path: &str) -> VfsResult<()> {
        let path = normalize(path)?;
        let new_path = normalize(new_path)?;
        Self::guard_transfer(&path, &new_path)?;
        self.assert_present(&path, &self.config)?;
        self.assert_absent(&new_path, &self.config)?;
        self.adapter.move_file(&path, &new_path)
    }

    #[tracing::instrument(skip(self), name = "vfs.copy")]
    fn copy_file(&self, path: &str, new_path: &str) -> VfsResult<()> {
        let path = normalize(path)?;
        let new_path = normalize(new_path)?;
        Self::guard_transfer(&path, &new_path)?;
        self.assert_present(&path, &self.config)?;
        self.assert_absent(&new_path, &self.config)?;
        self.adapter.copy_file(&path, &new_path)
    }

    #[tracing::instrument(skip(self, options), name = "vfs.create_dir")]
    fn create_dir(&self, path: &str, options: Options) -> VfsResult<()> {
        let path = normalize(path)?;
        let config = self.prepare_config(options);
        self.adapter.create_dir(&path, &config)
    }

    #[tracing::instrument(skip(self), name = "vfs.delete_dir")]
    fn delete_dir(&self, path: &str) -> VfsResult<()> {
        let path = normalize(path)?;
        if path.is_root() {
            return Err(VfsError::permission_denied("cannot remove root"));
        }
        self.adapter.delete_dir(&path)
    }

    #[tracing::instrument(skip(self), name = "vfs.set_visibility")]
    fn set_visibility(&self, path: &str, visibility: Visibility) -> VfsResult<()> {
        let path = normalize(path)?;
        self.assert_present(&path, &self.config)?;
        self.adapter.set_visibility(&path, visibility)
    }
}
