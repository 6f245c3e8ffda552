//! Raw INI configuration input.
//!
//! [`RawConfig`] is the untyped `section -> key -> string` view that both
//! validation passes read. It is loaded once and never mutated, so running the
//! passes (or the whole resolution) twice over it yields the same result.

use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};

use crate::error::ConfigError;

/// Prefix of environment variables overriding file values,
/// e.g. `ALTIMETER__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "ALTIMETER";

/// Keys of one section mapped to their unparsed values.
pub type RawSection = BTreeMap<String, String>;

/// Untyped sections of an INI document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    sections: BTreeMap<String, RawSection>,
}

impl RawConfig {
    /// Parse an INI document held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the text is not valid INI.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(text, FileFormat::Ini))
            .build()?;
        Self::from_config(config)
    }

    /// Load an INI file, then apply `ALTIMETER__<SECTION>__<KEY>` overrides
    /// from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the file is missing or unreadable.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Loading configuration");

        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini).required(true))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let root: config::Map<String, config::Value> = config.try_deserialize()?;

        let mut sections = BTreeMap::new();
        for (name, value) in root {
            // Top-level keys outside any section are not part of any schema
            let Ok(table) = value.into_table() else {
                continue;
            };
            let section: RawSection = table
                .into_iter()
                .filter_map(|(key, value)| value.into_string().ok().map(|v| (key, v)))
                .collect();
            sections.insert(name, section);
        }

        Ok(Self { sections })
    }

    /// Add or replace a section.
    pub fn with_section<I, K, V>(mut self, name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let section = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.sections.insert(name.into(), section);
        self
    }

    pub fn section(&self, name: &str) -> Option<&RawSection> {
        self.sections.get(name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }
}
