//! # Altimeter - pluggable elevation lookup
//!
//! Core of the altimeter elevation service: the backend capability, the
//! registry of available backends, and the two-pass resolution of the INI
//! configuration that selects and builds one of them.
//!
//! ## Quick Start
//!
//! ```ignore
//! use altimeter::{ConfigResolver, PluginRegistry};
//!
//! let registry = PluginRegistry::builtin();
//! let config = ConfigResolver::new(&registry).resolve_path("conf/altimeter.cfg")?;
//!
//! let alt = config.backend.lookup(10.0, 48.1)?;
//! println!("Elevation: {:?}", alt);
//! ```
//!
//! ## Configuration
//!
//! ```ini
//! [server]
//! handler = file
//! host = localhost
//! port = 8088
//!
//! [handler]
//! folder = /data/hgt
//! ```
//!
//! ## Backends
//!
//! - `file`: local SRTM `.hgt` tiles, see [`backends::FileBackend`].

pub mod backend;
pub mod backends;
pub mod config;
pub mod error;
pub mod hgt;
pub mod registry;
pub mod schema;
pub mod source;

// Re-export main types at crate root for convenience
pub use backend::{BackendError, ElevationBackend};
pub use backends::FileBackend;
pub use config::{ConfigResolver, ResolvedConfig, ServerSettings};
pub use error::{BoxError, ConfigError, HgtError, Result};
pub use registry::{BackendDescriptor, BackendPlugin, PluginRegistry};
pub use schema::{FieldSpec, Schema, Section, SectionSchema, ValidationErrors};
pub use source::RawConfig;
