//! HGT tile parsing and elevation extraction.
//!
//! A tile covers one 1° × 1° cell. It is either memory-mapped from a `.hgt`
//! file or held in memory after being read out of a `.hgt.zip` archive.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;

use crate::error::HgtError;

/// File size for SRTM1 (1 arc-second, ~30m resolution): 3601 × 3601 × 2 bytes
const SRTM1_SIZE: usize = 3601 * 3601 * 2; // 25,934,402 bytes

/// File size for SRTM3 (3 arc-second, ~90m resolution): 1201 × 1201 × 2 bytes
const SRTM3_SIZE: usize = 1201 * 1201 * 2; // 2,884,802 bytes

const SRTM1_SAMPLES: usize = 3601;
const SRTM3_SAMPLES: usize = 1201;

/// Value indicating no data (void) in HGT files
pub const VOID_VALUE: i16 = -32768;

/// Resolution type of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// SRTM1: 1 arc-second (~30m) resolution
    Srtm1,
    /// SRTM3: 3 arc-second (~90m) resolution
    Srtm3,
}

impl Resolution {
    /// Detect the resolution from the raw data length.
    fn from_len(len: usize) -> Result<Self, HgtError> {
        match len {
            SRTM1_SIZE => Ok(Resolution::Srtm1),
            SRTM3_SIZE => Ok(Resolution::Srtm3),
            size => Err(HgtError::InvalidFileSize { size }),
        }
    }

    /// Returns the number of samples per row/column for this resolution.
    pub fn samples(&self) -> usize {
        match self {
            Resolution::Srtm1 => SRTM1_SAMPLES,
            Resolution::Srtm3 => SRTM3_SAMPLES,
        }
    }
}

#[derive(Debug)]
enum TileData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl TileData {
    fn bytes(&self) -> &[u8] {
        match self {
            TileData::Mapped(mmap) => &mmap[..],
            TileData::Owned(bytes) => bytes.as_slice(),
        }
    }
}

/// One elevation grid.
#[derive(Debug)]
pub struct Tile {
    data: TileData,
    resolution: Resolution,
}

impl Tile {
    /// Memory-map a `.hgt` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be mapped or its size matches
    /// neither SRTM1 nor SRTM3.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HgtError> {
        let file = File::open(&path)?;

        // SAFETY: Memory mapping is safe as long as the file is not modified
        // while mapped. We open the file read-only and don't expose the mapping.
        let mmap = unsafe { Mmap::map(&file)? };

        let resolution = Resolution::from_len(mmap.len())?;
        Ok(Self {
            data: TileData::Mapped(mmap),
            resolution,
        })
    }

    /// Build a tile from bytes already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`HgtError::InvalidFileSize`] for a length matching neither format.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, HgtError> {
        let resolution = Resolution::from_len(bytes.len())?;
        Ok(Self {
            data: TileData::Owned(bytes),
            resolution,
        })
    }

    /// Read the first `.hgt` entry of a `.hgt.zip` archive into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is unreadable or has no `.hgt` entry.
    pub fn from_zip<P: AsRef<Path>>(path: P) -> Result<Self, HgtError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let archive_err = |source| HgtError::Archive {
            name: name.clone(),
            source,
        };

        let mut archive = zip::ZipArchive::new(File::open(path)?).map_err(archive_err)?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(archive_err)?;
            if entry.name().to_ascii_lowercase().ends_with(".hgt") {
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut bytes)?;
                return Self::from_bytes(bytes);
            }
        }

        Err(HgtError::EmptyArchive { name })
    }

    /// Nearest-sample elevation in meters, or `None` on a void sample.
    ///
    /// Only the fractional part of the coordinates is used: the caller picks
    /// the tile that covers them.
    pub fn elevation(&self, lat: f64, lon: f64) -> Option<i16> {
        let samples = self.resolution.samples();
        let lat_frac = lat - lat.floor();
        let lon_frac = lon - lon.floor();

        // Row 0 is the north edge: the file stores data north to south, west to east
        let row = ((1.0 - lat_frac) * (samples - 1) as f64).round() as usize;
        let col = (lon_frac * (samples - 1) as f64).round() as usize;

        let value = self.sample(row.min(samples - 1), col.min(samples - 1));
        (value != VOID_VALUE).then_some(value)
    }

    /// Raw 16-bit big-endian sample at `row`, `col`.
    fn sample(&self, row: usize, col: usize) -> i16 {
        let offset = (row * self.resolution.samples() + col) * 2;
        let bytes = self.data.bytes();
        i16::from_be_bytes([bytes[offset], bytes[offset + 1]])
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// SRTM3 data with 1000m at the NW corner, 500m at the center and a void
    /// sample at the SE corner.
    fn srtm3_bytes() -> Vec<u8> {
        let mut data = vec![0u8; SRTM3_SIZE];
        data[0..2].copy_from_slice(&1000i16.to_be_bytes());

        let center_offset = (600 * SRTM3_SAMPLES + 600) * 2;
        data[center_offset..center_offset + 2].copy_from_slice(&500i16.to_be_bytes());

        let se_offset = (1200 * SRTM3_SAMPLES + 1200) * 2;
        data[se_offset..se_offset + 2].copy_from_slice(&VOID_VALUE.to_be_bytes());
        data
    }

    fn stored() -> zip::write::SimpleFileOptions {
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored)
    }

    fn create_test_srtm3_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&srtm3_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_srtm3_file() {
        let file = create_test_srtm3_file();
        let tile = Tile::from_file(file.path()).unwrap();

        assert_eq!(tile.resolution(), Resolution::Srtm3);
        assert_eq!(tile.resolution().samples(), SRTM3_SAMPLES);
    }

    #[test]
    fn test_invalid_file_size() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 1000]).unwrap();

        match Tile::from_file(file.path()) {
            Err(HgtError::InvalidFileSize { size }) => assert_eq!(size, 1000),
            other => panic!("Expected InvalidFileSize error, got {:?}", other),
        }
    }

    #[test]
    fn test_elevation_samples() {
        let tile = Tile::from_bytes(srtm3_bytes()).unwrap();

        assert_eq!(tile.elevation(35.5, 138.5), Some(500));
        // Close to the NW corner
        assert_eq!(tile.elevation(35.99999, 138.00001), Some(1000));
        // Plain zero elevation elsewhere
        assert_eq!(tile.elevation(35.25, 138.25), Some(0));
    }

    #[test]
    fn test_void_sample_is_none() {
        let tile = Tile::from_bytes(srtm3_bytes()).unwrap();
        assert_eq!(tile.elevation(35.00001, 138.99999), None);
    }

    #[test]
    fn test_from_zip() {
        let file = NamedTempFile::new().unwrap();
        {
            let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
            writer.start_file("N35E138.hgt", stored()).unwrap();
            writer.write_all(&srtm3_bytes()).unwrap();
            writer.finish().unwrap();
        }

        let tile = Tile::from_zip(file.path()).unwrap();
        assert_eq!(tile.elevation(35.5, 138.5), Some(500));
    }

    #[test]
    fn test_from_zip_without_hgt_entry() {
        let file = NamedTempFile::new().unwrap();
        {
            let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
            writer.start_file("README.txt", stored()).unwrap();
            writer.write_all(b"nothing here").unwrap();
            writer.finish().unwrap();
        }

        assert!(matches!(
            Tile::from_zip(file.path()),
            Err(HgtError::EmptyArchive { .. })
        ));
    }
}
