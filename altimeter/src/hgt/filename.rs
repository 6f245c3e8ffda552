//! HGT filename conventions.
//!
//! Tiles are named after their **southwest corner**: `{N|S}{lat}{E|W}{lon}.hgt`
//! with a 2-digit latitude and a 3-digit longitude, e.g. `N35E138.hgt`.

/// Extension of raw tiles.
pub const HGT_EXTENSION: &str = ".hgt";

/// Extension of zipped tiles.
pub const HGT_ZIP_EXTENSION: &str = ".hgt.zip";

/// Name of the tile covering `lat`, `lng`.
///
/// # Examples
///
/// ```
/// use altimeter::hgt::filename::lat_lng_to_filename;
///
/// assert_eq!(lat_lng_to_filename(10.0, 48.1), "N10E048.hgt");
/// assert_eq!(lat_lng_to_filename(-12.3, -77.1), "S13W078.hgt");
/// assert_eq!(lat_lng_to_filename(0.5, -0.5), "N00W001.hgt");
/// ```
pub fn lat_lng_to_filename(lat: f64, lng: f64) -> String {
    let lat_int = lat.floor() as i32;
    let lng_int = lng.floor() as i32;

    let lat_prefix = if lat_int >= 0 { 'N' } else { 'S' };
    let lng_prefix = if lng_int >= 0 { 'E' } else { 'W' };

    format!(
        "{}{:02}{}{:03}{}",
        lat_prefix,
        lat_int.unsigned_abs(),
        lng_prefix,
        lng_int.unsigned_abs(),
        HGT_EXTENSION
    )
}

/// Whether `name` looks like a tile file, raw or zipped. Case-insensitive.
pub fn is_tile_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(HGT_EXTENSION) || lower.ends_with(HGT_ZIP_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_coords() {
        assert_eq!(lat_lng_to_filename(0.0, 0.0), "N00E000.hgt");
        assert_eq!(lat_lng_to_filename(1.0, 1.0), "N01E001.hgt");
        assert_eq!(lat_lng_to_filename(45.0, 128.0), "N45E128.hgt");
        assert_eq!(lat_lng_to_filename(59.9, 179.9), "N59E179.hgt");
    }

    #[test]
    fn test_negative_coords() {
        assert_eq!(lat_lng_to_filename(-1.0, -1.0), "S01W001.hgt");
        assert_eq!(lat_lng_to_filename(-45.0, -128.0), "S45W128.hgt");
        // floor(-0.1) = -1
        assert_eq!(lat_lng_to_filename(-0.1, -0.1), "S01W001.hgt");
    }

    #[test]
    fn test_out_of_coverage_coords() {
        // No range check: such tiles simply never exist on disk
        assert_eq!(lat_lng_to_filename(99.0, 99.0), "N99E099.hgt");
        assert_eq!(lat_lng_to_filename(10.0, 200.5), "N10E200.hgt");
    }

    #[test]
    fn test_extreme_coords_do_not_overflow() {
        // floor() saturates to i32::MIN / i32::MAX
        assert_eq!(lat_lng_to_filename(-3.0e9, 0.0), "S2147483648E000.hgt");
        assert_eq!(lat_lng_to_filename(0.0, 3.0e9), "N00E2147483647.hgt");
    }

    #[test]
    fn test_is_tile_file() {
        assert!(is_tile_file("N35E138.hgt"));
        assert!(is_tile_file("N35E138.HGT"));
        assert!(is_tile_file("N35E138.hgt.zip"));
        assert!(is_tile_file("file.hgt"));
        assert!(!is_tile_file("N35E138.tif"));
        assert!(!is_tile_file("hgt"));
    }
}
