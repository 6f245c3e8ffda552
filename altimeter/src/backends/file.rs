//! Elevation from a folder of `.hgt` tiles.
//!
//! Configuration (`[handler]` section):
//!
//! | Key | Type | Default |
//! |-----|------|---------|
//! | `folder` | directory holding `.hgt` / `.hgt.zip` tiles | required |
//! | `cache_size` | maximum tiles kept in memory | 100 |

use std::path::{Path, PathBuf};
use std::sync::Arc;

use moka::sync::Cache;

use crate::backend::{BackendError, ElevationBackend};
use crate::error::{BoxError, HgtError};
use crate::hgt::filename::{is_tile_file, lat_lng_to_filename, HGT_ZIP_EXTENSION};
use crate::hgt::Tile;
use crate::registry::BackendPlugin;
use crate::schema::{FieldSpec, Section, SectionSchema};

/// Registry name of this backend.
pub const NAME: &str = "file";

const DEFAULT_CACHE_SIZE: u64 = 100;

/// Looks elevations up in local tiles, keeping recently used ones mapped.
#[derive(Debug)]
pub struct FileBackend {
    folder: PathBuf,
    /// Loaded tiles keyed by (floor_lat, floor_lng). `None` records a tile
    /// that is not on disk.
    tiles: Cache<(i32, i32), Option<Arc<Tile>>>,
}

impl FileBackend {
    /// # Errors
    ///
    /// Returns an error if `folder` is not a directory or holds no tile.
    pub fn new<P: AsRef<Path>>(folder: P, cache_size: u64) -> Result<Self, BoxError> {
        let folder = folder.as_ref();
        validate_folder(folder)?;

        Ok(Self {
            folder: folder.to_path_buf(),
            tiles: Cache::builder().max_capacity(cache_size).build(),
        })
    }

    pub fn schema() -> SectionSchema {
        SectionSchema::new()
            .field(FieldSpec::string("folder"))
            .field(
                FieldSpec::integer("cache_size")
                    .min(1)
                    .default(DEFAULT_CACHE_SIZE.to_string()),
            )
    }

    /// Registry entry for this backend.
    pub fn plugin() -> BackendPlugin {
        BackendPlugin::new(NAME, Self::schema, |section: &Section| {
            let folder = section.str("folder").ok_or("missing folder")?;
            let cache_size = section
                .int("cache_size")
                .map_or(DEFAULT_CACHE_SIZE, |n| n.max(1) as u64);
            let backend = FileBackend::new(folder, cache_size)?;
            Ok(Arc::new(backend) as Arc<dyn ElevationBackend>)
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn tile(&self, lat: f64, lng: f64) -> Result<Option<Arc<Tile>>, BackendError> {
        let key = (lat.floor() as i32, lng.floor() as i32);

        // Concurrent misses on one key run a single load
        self.tiles
            .try_get_with(key, || self.load_tile(lat, lng))
            .map_err(|e: Arc<HgtError>| BackendError::other(e.to_string()))
    }

    fn load_tile(&self, lat: f64, lng: f64) -> Result<Option<Arc<Tile>>, HgtError> {
        let filename = lat_lng_to_filename(lat, lng);
        let path = self.folder.join(&filename);

        if path.is_file() {
            tracing::debug!(tile = %filename, "Loading tile");
            return Ok(Some(Arc::new(Tile::from_file(&path)?)));
        }

        let zip_path = self
            .folder
            .join(format!("{}{}", filename.trim_end_matches(".hgt"), HGT_ZIP_EXTENSION));
        if zip_path.is_file() {
            tracing::debug!(tile = %filename, "Loading zipped tile");
            return Ok(Some(Arc::new(Tile::from_zip(&zip_path)?)));
        }

        tracing::debug!(tile = %filename, folder = %self.folder.display(), "Tile not found");
        Ok(None)
    }
}

impl ElevationBackend for FileBackend {
    fn lookup(&self, lat: f64, lng: f64) -> Result<Option<f64>, BackendError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            tracing::debug!(lat, lng, "Coordinates outside any tile");
            return Ok(None);
        }

        let Some(tile) = self.tile(lat, lng)? else {
            return Ok(None);
        };
        Ok(tile.elevation(lat, lng).map(f64::from))
    }
}

fn validate_folder(folder: &Path) -> Result<(), BoxError> {
    if !folder.is_dir() {
        return Err(format!(
            "folder {} does not exist or is not a directory",
            folder.display()
        )
        .into());
    }

    let has_tile = std::fs::read_dir(folder)?
        .flatten()
        .any(|entry| is_tile_file(&entry.file_name().to_string_lossy()));
    if !has_tile {
        return Err(format!("folder {} does not contain any HGT file", folder.display()).into());
    }

    Ok(())
}
