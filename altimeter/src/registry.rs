//! Registration table of elevation backends.
//!
//! A [`PluginRegistry`] maps a backend name to its configuration schema and a
//! constructor. It is built explicitly at startup, with the built-in backends
//! and any extra ones, then handed by reference to the
//! [`ConfigResolver`](crate::ConfigResolver).
//!
//! ```ignore
//! use altimeter::{BackendPlugin, PluginRegistry};
//!
//! let registry = PluginRegistry::builtin().with(my_backend_plugin());
//! let names: Vec<&str> = registry.names().collect();
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::backend::ElevationBackend;
use crate::backends::FileBackend;
use crate::error::{BoxError, ConfigError};
use crate::schema::{Section, SectionSchema};

/// Builds a backend from its validated configuration section.
pub type BackendConstructor =
    Arc<dyn Fn(&Section) -> Result<Arc<dyn ElevationBackend>, BoxError> + Send + Sync>;

/// What a backend contributes to the registry.
#[derive(Clone)]
pub struct BackendPlugin {
    name: String,
    schema: fn() -> SectionSchema,
    constructor: BackendConstructor,
}

impl BackendPlugin {
    pub fn new<F>(name: impl Into<String>, schema: fn() -> SectionSchema, constructor: F) -> Self
    where
        F: Fn(&Section) -> Result<Arc<dyn ElevationBackend>, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            schema,
            constructor: Arc::new(constructor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for BackendPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendPlugin")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A backend's name and declared configuration schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub name: String,
    pub schema: SectionSchema,
}

/// Backends available to the process, keyed by name.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, BackendPlugin>,
    discovered: OnceLock<BTreeMap<String, BackendDescriptor>>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the backends shipped with this crate.
    pub fn builtin() -> Self {
        Self::new().with(FileBackend::plugin())
    }

    pub fn with(mut self, plugin: BackendPlugin) -> Self {
        self.register(plugin);
        self
    }

    /// Add a backend, replacing any previous one of the same name.
    pub fn register(&mut self, plugin: BackendPlugin) {
        self.discovered = OnceLock::new();
        self.plugins.insert(plugin.name.clone(), plugin);
    }

    /// Descriptors of every registered backend.
    ///
    /// Schemas are collected on first call and cached for the registry's
    /// lifetime.
    pub fn discover(&self) -> &BTreeMap<String, BackendDescriptor> {
        self.discovered.get_or_init(|| {
            let descriptors: BTreeMap<_, _> = self
                .plugins
                .iter()
                .map(|(name, plugin)| {
                    let descriptor = BackendDescriptor {
                        name: name.clone(),
                        schema: (plugin.schema)(),
                    };
                    (name.clone(), descriptor)
                })
                .collect();
            tracing::debug!(
                backends = ?descriptors.keys().collect::<Vec<_>>(),
                "Discovered elevation backends"
            );
            descriptors
        })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.discover().keys().map(String::as_str)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownBackend`] if `name` is not registered.
    pub fn descriptor(&self, name: &str) -> Result<&BackendDescriptor, ConfigError> {
        self.discover()
            .get(name)
            .ok_or_else(|| ConfigError::UnknownBackend {
                name: name.to_string(),
            })
    }

    /// Constructor of the backend registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownBackend`] if `name` is not registered.
    pub fn resolve(&self, name: &str) -> Result<&BackendConstructor, ConfigError> {
        self.plugins
            .get(name)
            .map(|plugin| &plugin.constructor)
            .ok_or_else(|| ConfigError::UnknownBackend {
                name: name.to_string(),
            })
    }
}
