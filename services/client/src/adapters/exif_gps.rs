//! services/client/src/adapters/exif_gps.rs
//!
//! Reads GPS coordinates out of image EXIF metadata.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Exif, In, Tag, Value};
use tracing::debug;

use lep_inspect_core::domain::GpsCoordinates;
use lep_inspect_core::ports::GpsReader;

pub struct ExifGpsReader;

impl GpsReader for ExifGpsReader {
    /// Absence of EXIF data (or of the GPS tags) is not an error; the
    /// caller falls back to zero coordinates.
    fn read_gps(&self, path: &Path) -> Option<GpsCoordinates> {
        let file = File::open(path).ok()?;
        let exif = exif::Reader::new()
            .read_from_container(&mut BufReader::new(file))
            .ok()?;
        let latitude = read_coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S')?;
        let longitude = read_coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W')?;
        debug!(path = %path.display(), latitude, longitude, "read EXIF GPS");
        Some(GpsCoordinates {
            latitude,
            longitude,
        })
    }
}

fn read_coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative_ref: u8) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let Value::Rational(parts) = &field.value else {
        return None;
    };
    if parts.len() < 3 {
        return None;
    }
    let negative = match exif.get_field(ref_tag, In::PRIMARY) {
        Some(field) => match &field.value {
            Value::Ascii(chars) => chars
                .first()
                .and_then(|s| s.first())
                .map(|&c| c == negative_ref)
                .unwrap_or(false),
            _ => false,
        },
        None => false,
    };
    Some(to_decimal_degrees(
        parts[0].to_f64(),
        parts[1].to_f64(),
        parts[2].to_f64(),
        negative,
    ))
}

/// Converts degrees/minutes/seconds into signed decimal degrees.
fn to_decimal_degrees(degrees: f64, minutes: f64, seconds: f64, negative: bool) -> f64 {
    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dms_to_decimal() {
        let value = to_decimal_degrees(55.0, 45.0, 20.88, false);
        assert!((value - 55.7558).abs() < 1e-4);
    }

    #[test]
    fn southern_latitude_is_negative() {
        let value = to_decimal_degrees(33.0, 51.0, 35.9, true);
        assert!(value < 0.0);
        assert!((value + 33.8600).abs() < 1e-3);
    }

    #[test]
    fn file_without_exif_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        assert!(ExifGpsReader.read_gps(&path).is_none());
    }
}
