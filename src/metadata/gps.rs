use chrono::{DateTime, Local, NaiveDateTime};
use exif::{Exif, In, Tag, Value};
use std::fs;
use std::path::Path;

/// Pattern used by embedded DateTime* tags.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
/// Pattern used everywhere in the generated document.
const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Capture-time tags, in resolution order. The first one that parses wins;
/// if none do, the file's creation timestamp is used instead.
const DATETIME_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTime, Tag::DateTimeDigitized];

/// Normalized geolocation metadata for one image.
///
/// Produced once per image and owned by the document assembler for the
/// duration of a single conversion run; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    /// Decimal degrees, negative south of the equator.
    pub latitude: f64,
    /// Decimal degrees, negative west of the prime meridian.
    pub longitude: f64,
    /// Meters; 0 when the altitude tag is absent.
    pub altitude: f64,
    /// Compass bearing in degrees; 0 when the image-direction tag is absent.
    /// Not range-checked.
    pub heading: f64,
    /// `YYYY-MM-DD HH:MM:SS`, resolved through the DateTime* fallback chain.
    pub timestamp: String,
}

/// The outcome of extracting metadata from one image.
///
/// `metadata` is `None` when the image has no usable GPS data — which is
/// not an error, the image is simply excluded from the document. `warnings`
/// carries every degraded field and read failure so callers can report or
/// assert on them without intercepting log output.
#[derive(Debug, Default)]
pub struct Extraction {
    pub metadata: Option<ImageMetadata>,
    /// Raw rotation-tag value, read from the same tag table as the GPS
    /// fields so the orientation corrector needs no second parse.
    pub orientation: Option<u32>,
    pub warnings: Vec<String>,
}

impl Extraction {
    fn none(warnings: Vec<String>) -> Self {
        Self {
            metadata: None,
            orientation: None,
            warnings,
        }
    }
}

/// Extract GPS metadata from a JPEG or PNG image.
///
/// Returns `metadata: None` when the image carries no tag table, no GPS
/// sub-block, or no parseable latitude/longitude pair. Read and decode
/// failures are reported as warnings and also yield `None`, so a corrupt
/// file never aborts the batch it belongs to.
pub fn extract(path: &Path) -> Extraction {
    let mut warnings = Vec::new();

    let exif = match super::open_tag_table(path) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => {
            log::debug!("No embedded tag table in {}", path.display());
            return Extraction::none(warnings);
        }
        Err(err) => {
            warnings.push(format!(
                "Error extracting metadata from {}: {err}",
                path.display()
            ));
            return Extraction::none(warnings);
        }
    };

    // Timestamp resolves independently of GPS presence.
    let timestamp = resolve_timestamp(&exif, path);

    // Without a GPS sub-block there is nothing to place on the map.
    if !has_gps_block(&exif) {
        log::debug!("No GPS sub-block in {}", path.display());
        return Extraction::none(warnings);
    }

    let latitude = coordinate(&exif, Tag::GPSLatitude, path, &mut warnings)
        .map(|lat| apply_reference(lat, reference(&exif, Tag::GPSLatitudeRef), "S"));
    let longitude = coordinate(&exif, Tag::GPSLongitude, path, &mut warnings)
        .map(|lon| apply_reference(lon, reference(&exif, Tag::GPSLongitudeRef), "W"));

    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Extraction::none(warnings);
    };

    let altitude = scalar_tag(&exif, Tag::GPSAltitude).unwrap_or(0.0);
    let heading = scalar_tag(&exif, Tag::GPSImgDirection).unwrap_or(0.0);
    let orientation = orientation_tag(&exif, path, &mut warnings);

    Extraction {
        metadata: Some(ImageMetadata {
            latitude,
            longitude,
            altitude,
            heading,
            timestamp,
        }),
        orientation,
        warnings,
    }
}

/// The raw rotation-tag value, if present and readable. An unreadable
/// value warns and leaves the pixels untouched downstream.
fn orientation_tag(exif: &Exif, path: &Path, warnings: &mut Vec<String>) -> Option<u32> {
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    match field.value.get_uint(0) {
        Some(tag_value) => Some(tag_value),
        None => {
            warnings.push(format!(
                "Could not read the orientation tag in {}",
                path.display()
            ));
            None
        }
    }
}

/// Whether any of the recognized GPS tags are present.
fn has_gps_block(exif: &Exif) -> bool {
    [
        Tag::GPSLatitude,
        Tag::GPSLongitude,
        Tag::GPSAltitude,
        Tag::GPSImgDirection,
    ]
    .iter()
    .any(|&tag| exif.get_field(tag, In::PRIMARY).is_some())
}

/// Read one coordinate triplet, warning on a malformed value.
fn coordinate(exif: &Exif, tag: Tag, path: &Path, warnings: &mut Vec<String>) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match dms_to_degrees(&field.value) {
        Some(deg) => Some(deg),
        None => {
            warnings.push(format!(
                "Error converting {tag} to degrees in {}",
                path.display()
            ));
            None
        }
    }
}

/// Convert a (degrees, minutes, seconds) triplet to decimal degrees.
///
/// Each component may be a rational or a plain number. A short, missing,
/// or non-finite triplet (e.g. a zero denominator) yields `None`.
fn dms_to_degrees(value: &Value) -> Option<f64> {
    let degrees = component(value, 0)?;
    let minutes = component(value, 1)?;
    let seconds = component(value, 2)?;
    Some(degrees + minutes / 60.0 + seconds / 3600.0).filter(|d| d.is_finite())
}

/// One numeric component of a tag value, whatever its encoding.
fn component(value: &Value, index: usize) -> Option<f64> {
    match value {
        Value::Rational(v) => v.get(index).map(|r| r.to_f64()),
        Value::SRational(v) => v.get(index).map(|r| r.to_f64()),
        Value::Byte(v) => v.get(index).map(|&n| f64::from(n)),
        Value::Short(v) => v.get(index).map(|&n| f64::from(n)),
        Value::Long(v) => v.get(index).map(|&n| f64::from(n)),
        Value::Float(v) => v.get(index).map(|&n| f64::from(n)),
        Value::Double(v) => v.get(index).copied(),
        _ => None,
    }
}

/// Negate the coordinate when the hemisphere reference matches.
fn apply_reference(coord: f64, reference: Option<String>, negative: &str) -> f64 {
    match reference {
        Some(r) if r.trim() == negative => -coord,
        _ => coord,
    }
}

/// The hemisphere reference letter for a coordinate, if present.
fn reference(exif: &Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|field| ascii_value(&field.value))
}

/// A single-valued numeric tag (altitude, image direction).
fn scalar_tag(exif: &Exif, tag: Tag) -> Option<f64> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|field| component(&field.value, 0))
        .filter(|v| v.is_finite())
}

/// The first ASCII string stored in a tag value.
fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(items) => items
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Resolve the capture timestamp through the DateTime* fallback chain,
/// ending at the file's creation time.
fn resolve_timestamp(exif: &Exif, path: &Path) -> String {
    for tag in DATETIME_TAGS {
        if let Some(field) = exif.get_field(tag, In::PRIMARY)
            && let Some(raw) = ascii_value(&field.value)
            && let Some(formatted) = reformat_datetime(&raw)
        {
            return formatted;
        }
    }
    file_timestamp(path)
}

/// Parse an embedded `YYYY:MM:DD HH:MM:SS` value and reformat it with
/// dashed dates. A parse failure yields `None` so the caller can fall
/// through to the next candidate.
fn reformat_datetime(raw: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.format(OUTPUT_DATETIME_FORMAT).to_string())
}

/// The file's creation time (modification time where creation is not
/// available), formatted like the embedded timestamps.
fn file_timestamp(path: &Path) -> String {
    let stamp = fs::metadata(path)
        .and_then(|m| m.created().or_else(|_| m.modified()))
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now());
    stamp.format(OUTPUT_DATETIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::Rational;
    use std::fs;

    fn rational_triplet(d: (u32, u32), m: (u32, u32), s: (u32, u32)) -> Value {
        Value::Rational(vec![
            Rational { num: d.0, denom: d.1 },
            Rational { num: m.0, denom: m.1 },
            Rational { num: s.0, denom: s.1 },
        ])
    }

    // ── DMS conversion ───────────────────────────────────────────────

    #[test]
    fn dms_from_rationals() {
        // 40°26'46" ≈ 40.446111
        let value = rational_triplet((40, 1), (26, 1), (46, 1));
        let deg = dms_to_degrees(&value).unwrap();
        assert!((deg - (40.0 + 26.0 / 60.0 + 46.0 / 3600.0)).abs() < 1e-9);
    }

    #[test]
    fn dms_from_plain_numbers() {
        let value = Value::Double(vec![79.0, 58.0, 56.0]);
        let deg = dms_to_degrees(&value).unwrap();
        assert!((deg - (79.0 + 58.0 / 60.0 + 56.0 / 3600.0)).abs() < 1e-9);
    }

    #[test]
    fn dms_with_fractional_seconds() {
        let value = rational_triplet((51, 1), (30, 1), (525, 10));
        let deg = dms_to_degrees(&value).unwrap();
        assert!((deg - (51.0 + 30.0 / 60.0 + 52.5 / 3600.0)).abs() < 1e-9);
    }

    #[test]
    fn short_triplet_is_malformed() {
        let value = Value::Rational(vec![Rational { num: 40, denom: 1 }]);
        assert_eq!(dms_to_degrees(&value), None);
    }

    #[test]
    fn zero_denominator_is_malformed() {
        let value = rational_triplet((40, 0), (26, 1), (46, 1));
        assert_eq!(dms_to_degrees(&value), None);
    }

    #[test]
    fn text_value_is_malformed() {
        let value = Value::Ascii(vec![b"40 26 46".to_vec()]);
        assert_eq!(dms_to_degrees(&value), None);
    }

    // ── Hemisphere signs ─────────────────────────────────────────────

    #[test]
    fn south_and_west_negate() {
        assert_eq!(apply_reference(40.0, Some("S".into()), "S"), -40.0);
        assert_eq!(apply_reference(79.0, Some("W".into()), "W"), -79.0);
    }

    #[test]
    fn north_and_east_stay_positive() {
        assert_eq!(apply_reference(40.0, Some("N".into()), "S"), 40.0);
        assert_eq!(apply_reference(79.0, Some("E".into()), "W"), 79.0);
        assert_eq!(apply_reference(79.0, None, "W"), 79.0);
    }

    // ── Timestamp resolution ─────────────────────────────────────────

    #[test]
    fn embedded_pattern_is_reformatted() {
        assert_eq!(
            reformat_datetime("2023:06:01 10:00:00").as_deref(),
            Some("2023-06-01 10:00:00")
        );
    }

    #[test]
    fn unparseable_datetime_falls_through() {
        assert_eq!(reformat_datetime("not a date"), None);
        assert_eq!(reformat_datetime("2023-06-01 10:00:00"), None);
    }

    #[test]
    fn file_timestamp_uses_the_output_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        fs::write(&path, b"fake").unwrap();

        let stamp = file_timestamp(&path);
        assert!(NaiveDateTime::parse_from_str(&stamp, OUTPUT_DATETIME_FORMAT).is_ok());
    }

    // ── Whole-file extraction ────────────────────────────────────────

    #[test]
    fn png_without_tags_yields_no_data_silently() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        image::RgbImage::new(4, 4).save(&path).unwrap();

        let extraction = extract(&path);
        assert!(extraction.metadata.is_none());
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn unreadable_file_warns_and_yields_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();

        let extraction = extract(&path);
        assert!(extraction.metadata.is_none());
        assert_eq!(extraction.warnings.len(), 1);
        assert!(extraction.warnings[0].contains("broken.jpg"));
    }

    #[test]
    fn missing_file_warns_and_yields_no_data() {
        let extraction = extract(Path::new("/nonexistent/photo.jpg"));
        assert!(extraction.metadata.is_none());
        assert_eq!(extraction.warnings.len(), 1);
    }
}
