//! Layered configuration.
//!
//! A [`Config`] is a settings map with an optional fallback. Lookups walk the
//! local map, then the fallback chain, then return the caller's default.
//! The facade builds a fresh `Config` per call from the call-site
//! [`Options`], falling back to the filesystem's persistent defaults, so
//! adapters always see a fully resolved view.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{VfsError, VfsResult};
use crate::types::Visibility;

/// Per-call option overrides.
pub type Options = HashMap<String, Value>;

/// Skip presence/absence pre-checks on mutating operations.
pub const DISABLE_ASSERTS: &str = "disableAsserts";

/// Visibility to apply on write/create.
pub const VISIBILITY: &str = "visibility";

/// Settings map with an optional fallback chain.
///
/// Fallbacks are shared `Arc`s to configs that were fully built before being
/// linked, so a chain cannot loop back on itself.
#[derive(Debug, Clone, Default)]
pub struct Config {
    settings: Options,
    fallback: Option<Arc<Config>>,
}

impl Config {
    /// Create an empty config with no fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config whose local map is `settings`.
    pub fn from_options(settings: Options) -> Self {
        Self {
            settings,
            fallback: None,
        }
    }

    /// Parse filesystem defaults from a TOML table.
    ///
    /// ```toml
    /// disableAsserts = false
    /// visibility = "private"
    /// ```
    pub fn from_toml_str(s: &str) -> VfsResult<Self> {
        let settings: Options =
            toml::from_str(s).map_err(|e| VfsError::other(format!("config parse error: {e}")))?;
        Ok(Self::from_options(settings))
    }

    /// Builder-style [`Config::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder-style [`Config::set_fallback`].
    pub fn with_fallback(mut self, fallback: Arc<Config>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Set a local setting.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.settings.insert(key.into(), value.into());
    }

    /// Set the fallback config.
    pub fn set_fallback(&mut self, fallback: Arc<Config>) {
        self.fallback = Some(fallback);
    }

    pub fn fallback(&self) -> Option<&Arc<Config>> {
        self.fallback.as_ref()
    }

    /// Find `key` in the local map or anywhere down the fallback chain.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        let mut current = Some(self);
        while let Some(cfg) = current {
            if let Some(value) = cfg.settings.get(key) {
                return Some(value);
            }
            current = cfg.fallback.as_deref();
        }
        None
    }

    /// Get a setting, or `default` when no config in the chain has it.
    pub fn get(&self, key: &str, default: impl Into<Value>) -> Value {
        self.lookup(key).cloned().unwrap_or_else(|| default.into())
    }

    /// Get a setting from the fallback chain only, ignoring local overrides.
    pub fn get_default(&self, key: &str, default: impl Into<Value>) -> Value {
        match &self.fallback {
            Some(fallback) => fallback.get(key, default),
            None => default.into(),
        }
    }

    /// Check whether any config in the chain has `key`.
    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Boolean setting; non-boolean values count as unset.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.lookup(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// String setting; non-string values count as unset.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.lookup(key).and_then(Value::as_str)
    }

    /// Whether presence/absence assertions should run.
    pub fn asserts_enabled(&self) -> bool {
        !self.get_bool(DISABLE_ASSERTS, false)
    }

    /// The `visibility` option, if set to a recognised value.
    pub fn visibility(&self) -> Option<Visibility> {
        self.get_str(VISIBILITY).and_then(|s| s.parse().ok())
    }
}

impl From<Options> for Config {
    fn from(settings: Options) -> Self {
        Self::from_options(settings)
    }
}
