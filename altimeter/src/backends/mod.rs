//! Elevation backends shipped with the crate.

pub mod file;

pub use file::FileBackend;
