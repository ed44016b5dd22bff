//! EXIF extraction: GPS block and the JPEG resolution fallback

use exif::{Context, Exif, Field, In, Rational, Reader, Tag, Value};
use serde_json::json;
use std::io::Cursor;

use crate::metadata::GpsInfo;

/// Parse EXIF from any container kamadak-exif understands.
/// Images without EXIF are common; failure is not an error.
pub fn read_exif(data: &[u8]) -> Option<Exif> {
    match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => Some(exif),
        Err(e) => {
            tracing::debug!(error = %e, "No readable EXIF data");
            None
        }
    }
}

fn ascii(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts.first().map(|bytes| {
            String::from_utf8_lossy(bytes)
                .trim_end_matches('\0')
                .trim()
                .to_string()
        }),
        _ => None,
    }
}

fn collapse(mut values: Vec<serde_json::Value>) -> serde_json::Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        serde_json::Value::Array(values)
    }
}

fn numbers<T: Copy + Into<f64>>(values: &[T]) -> serde_json::Value {
    collapse(values.iter().map(|v| json!((*v).into())).collect())
}

fn integers<T: Copy + Into<i64>>(values: &[T]) -> serde_json::Value {
    collapse(values.iter().map(|v| json!((*v).into())).collect())
}

/// JSON rendition of a raw EXIF value. Single-element vectors collapse to
/// a scalar; rationals become floats (a zero denominator becomes `null`).
pub fn value_to_json(field: &Field) -> serde_json::Value {
    match &field.value {
        Value::Ascii(parts) if parts.len() <= 1 => {
            ascii(&field.value).map(serde_json::Value::String).unwrap_or_default()
        }
        Value::Ascii(parts) => collapse(
            parts
                .iter()
                .map(|p| json!(String::from_utf8_lossy(p).trim_end_matches('\0')))
                .collect(),
        ),
        Value::Byte(v) => integers(v),
        Value::Short(v) => integers(v),
        Value::Long(v) => integers(v),
        Value::SByte(v) => integers(v),
        Value::SShort(v) => integers(v),
        Value::SLong(v) => integers(v),
        Value::Rational(v) => collapse(v.iter().map(|r| json!(r.to_f64())).collect()),
        Value::SRational(v) => collapse(v.iter().map(|r| json!(r.to_f64())).collect()),
        Value::Float(v) => numbers(v),
        Value::Double(v) => numbers(v),
        _ => json!(field.display_value().to_string()),
    }
}

/// `deg + min/60 + sec/3600`, rounded to 6 decimals
pub fn dms_to_degrees(dms: &[Rational]) -> Option<f64> {
    let [deg, min, sec] = dms else {
        return None;
    };
    let degrees = deg.to_f64() + min.to_f64() / 60.0 + sec.to_f64() / 3600.0;
    if !degrees.is_finite() {
        return None;
    }
    Some((degrees * 1e6).round() / 1e6)
}

fn coordinate(exif: &Exif, tag: Tag) -> Option<f64> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(dms) => dms_to_degrees(dms),
        _ => None,
    }
}

fn reference(exif: &Exif, tag: Tag, default: &str) -> String {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|f| ascii(&f.value))
        .unwrap_or_else(|| default.to_string())
}

/// Collect the GPS IFD. Returns `None` when the image carries no GPS tags.
///
/// When both coordinates are present, signed decimal `latitude` and
/// `longitude` are added. A missing latitude ref counts as north, a missing
/// longitude ref as west.
pub fn gps_info(exif: &Exif) -> Option<GpsInfo> {
    let mut gps: GpsInfo = exif
        .fields()
        .filter(|f| f.ifd_num == In::PRIMARY && f.tag.context() == Context::Gps)
        .map(|f| (f.tag.to_string(), value_to_json(f)))
        .collect();

    if gps.is_empty() {
        return None;
    }

    if let (Some(lat), Some(lon)) = (
        coordinate(exif, Tag::GPSLatitude),
        coordinate(exif, Tag::GPSLongitude),
    ) {
        let lat_ref = reference(exif, Tag::GPSLatitudeRef, "N");
        let lon_ref = reference(exif, Tag::GPSLongitudeRef, "W");

        let lat = if lat_ref == "S" { -lat } else { lat };
        let lon = if lon_ref == "W" { -lon } else { lon };

        gps.insert("latitude".to_string(), json!(lat));
        gps.insert("longitude".to_string(), json!(lon));
    }

    Some(gps)
}

/// Resolution assumed when EXIF resolution tags are missing or unusable
pub const DEFAULT_DPI: f64 = 72.0;
const RESOLUTION_UNIT_CENTIMETRE: u32 = 3;

/// JPEG dpi from EXIF, for files without a JFIF density in inches.
///
/// Both `ResolutionUnit` and `XResolution` are required; the x resolution is
/// used for both axes. Anything missing or non-finite yields 72 dpi.
pub fn exif_dpi(exif: &Exif) -> [f64; 2] {
    let unit = exif
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0));
    let x = exif
        .get_field(Tag::XResolution, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Rational(v) => v.first().map(Rational::to_f64),
            other => other.get_uint(0).map(f64::from),
        });

    match (unit, x) {
        (Some(unit), Some(x)) if x.is_finite() => {
            let dpi = if unit == RESOLUTION_UNIT_CENTIMETRE { x * 2.54 } else { x };
            [dpi, dpi]
        }
        _ => [DEFAULT_DPI, DEFAULT_DPI],
    }
}
