//! Two-pass configuration resolution.
//!
//! Which keys the backend section must hold depends on the backend chosen in
//! the `[server]` section, so the same [`RawConfig`] is validated twice:
//!
//! 1. against the server schema alone, to learn the `handler` name;
//! 2. against the server schema plus that backend's own schema.
//!
//! The backend is then built from its validated section.

use std::path::Path;
use std::sync::Arc;

use crate::backend::ElevationBackend;
use crate::error::{ConfigError, Result};
use crate::registry::PluginRegistry;
use crate::schema::{
    FieldError, FieldSpec, Reason, Schema, Section, SectionSchema, ValidationErrors,
};
use crate::source::RawConfig;

/// Name of the server section.
pub const SERVER_SECTION: &str = "server";

/// Name of the backend section.
pub const HANDLER_SECTION: &str = "handler";

/// Backend used when `handler` is not set.
pub const DEFAULT_HANDLER: &str = "file";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8088;

/// Validated `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub handler: String,
    pub host: String,
    pub port: u16,
    /// Worker threads; the runtime default when unset.
    pub pool_size: Option<usize>,
    /// Allowed CORS origin, `*` for any. CORS is off when unset.
    pub cors: Option<String>,
}

impl ServerSettings {
    /// Schema of the server section, with `handler` restricted to `handlers`.
    pub fn schema<'a>(handlers: impl IntoIterator<Item = &'a str>) -> SectionSchema {
        SectionSchema::new()
            .field(FieldSpec::choice("handler", handlers).default(DEFAULT_HANDLER))
            .field(FieldSpec::string("host").default(DEFAULT_HOST))
            .field(
                FieldSpec::integer("port")
                    .min(0)
                    .max(i64::from(u16::MAX))
                    .default(DEFAULT_PORT.to_string()),
            )
            .field(FieldSpec::integer("pool_size").min(1).optional())
            .field(FieldSpec::string("cors").optional())
    }

    fn from_section(section: &Section) -> std::result::Result<Self, FieldError> {
        let cors = section.str("cors").map(str::to_string);
        if let Some(origin) = &cors {
            if !is_valid_origin(origin) {
                return Err(FieldError::new(
                    SERVER_SECTION,
                    "cors",
                    Reason::Unacceptable(origin.clone()),
                ));
            }
        }

        Ok(Self {
            handler: section.str("handler").unwrap_or(DEFAULT_HANDLER).to_string(),
            host: section.str("host").unwrap_or(DEFAULT_HOST).to_string(),
            port: section
                .int("port")
                .and_then(|p| u16::try_from(p).ok())
                .unwrap_or(DEFAULT_PORT),
            pool_size: section.int("pool_size").and_then(|n| usize::try_from(n).ok()),
            cors,
        })
    }
}

fn is_valid_origin(origin: &str) -> bool {
    !origin.is_empty() && origin.bytes().all(|b| b.is_ascii_graphic())
}

/// Immutable result of a successful resolution.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server: ServerSettings,
    /// Name of the section the backend was configured from.
    pub backend_section_name: String,
    pub backend_section: Section,
    pub backend: Arc<dyn ElevationBackend>,
}

/// Resolves raw configuration against the backends of a registry.
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'r> {
    registry: &'r PluginRegistry,
}

impl<'r> ConfigResolver<'r> {
    pub fn new(registry: &'r PluginRegistry) -> Self {
        Self { registry }
    }

    /// Load `path` and resolve it.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve); also fails with [`ConfigError::Load`]
    /// if the file cannot be read.
    pub fn resolve_path<P: AsRef<Path>>(&self, path: P) -> Result<ResolvedConfig> {
        let raw = RawConfig::from_path(path)?;
        self.resolve(&raw)
    }

    /// Validate `raw` in two passes and build the selected backend.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidConfig`] on any field failure
    /// - [`ConfigError::UnknownBackend`] if the registry lost the backend
    /// - [`ConfigError::BackendConstruction`] if the backend rejects its section
    pub fn resolve(&self, raw: &RawConfig) -> Result<ResolvedConfig> {
        let settings = self.server_settings(raw)?;
        let (backend_section_name, backend_section) = self.backend_section(raw, &settings.handler)?;

        let constructor = self.registry.resolve(&settings.handler)?;
        let backend =
            constructor(&backend_section).map_err(|source| ConfigError::BackendConstruction {
                name: settings.handler.clone(),
                source,
            })?;

        tracing::info!(
            handler = %settings.handler,
            section = %backend_section_name,
            "Elevation backend ready"
        );

        Ok(ResolvedConfig {
            server: settings,
            backend_section_name,
            backend_section,
            backend,
        })
    }

    /// First pass: the server section only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if the server section is invalid.
    pub fn server_settings(&self, raw: &RawConfig) -> Result<ServerSettings> {
        let mut validated = self.server_schema().validate(raw)?;
        let settings = ServerSettings::from_section(&validated.take(SERVER_SECTION))
            .map_err(ValidationErrors::from)?;
        Ok(settings)
    }

    /// Second pass: the server section plus the `handler` backend's section.
    ///
    /// The section is `[handler]`, or a section named after the backend when
    /// there is no `[handler]` one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if either section is invalid, or
    /// [`ConfigError::UnknownBackend`] if `handler` is not registered.
    pub fn backend_section(&self, raw: &RawConfig, handler: &str) -> Result<(String, Section)> {
        let descriptor = self.registry.descriptor(handler)?;

        let name = if !raw.has_section(HANDLER_SECTION) && raw.has_section(handler) {
            handler
        } else {
            HANDLER_SECTION
        };

        let mut validated = self
            .server_schema()
            .section(name, descriptor.schema.clone())
            .validate(raw)?;

        Ok((name.to_string(), validated.take(name)))
    }

    fn server_schema(&self) -> Schema {
        Schema::new().section(SERVER_SECTION, ServerSettings::schema(self.registry.names()))
    }
}
