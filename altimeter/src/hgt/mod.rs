//! Reading SRTM `.hgt` elevation tiles.
//!
//! - **SRTM1**: 3601×3601 samples, 1 arc-second (~30m) resolution
//! - **SRTM3**: 1201×1201 samples, 3 arc-second (~90m) resolution
//!
//! Each sample is a 16-bit big-endian signed integer (meters); -32768 marks
//! a void.

pub mod filename;
pub mod tile;

pub use tile::{Resolution, Tile, VOID_VALUE};
