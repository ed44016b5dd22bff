//! Sidecar metadata types

use chrono::{DateTime, Utc};
use picmeta_vision::ScoreMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `time.ctime`-style timestamp: `Mon Jan  2 15:04:05 2006`
pub const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

pub fn format_ctime(at: DateTime<Utc>) -> String {
    at.format(CTIME_FORMAT).to_string()
}

/// EXIF GPS tag name → value, plus decimal `latitude`/`longitude`
pub type GpsInfo = BTreeMap<String, serde_json::Value>;

/// Marker serialized as the string `"Unknown"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownDepth {
    Unknown,
}

/// Bits per pixel, or `"Unknown"` for modes outside the depth table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorDepth {
    Bits(u32),
    Unknown(UnknownDepth),
}

impl ColorDepth {
    pub const UNKNOWN: ColorDepth = ColorDepth::Unknown(UnknownDepth::Unknown);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorInfo {
    pub depth: ColorDepth,
    pub mode: String,
}

/// Format-level image information, read from the container header.
///
/// Fields a format does not carry are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub format: Option<String>,
    /// JFIF density in inches, PNG pHYs in metres, or EXIF resolution for JPEG
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jfif: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jfif_version: Option<[u8; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jfif_unit: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jfif_density: Option<[u16; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progressive: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progression: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srgb: Option<u8>,
    /// GIF signature, e.g. `GIF89a`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Everything about an image that can be derived from its bytes alone
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInspection {
    pub width: u32,
    pub height: u32,
    pub hash: String,
    pub size: u64,
    pub file_type: Option<String>,
    pub gps: Option<GpsInfo>,
    pub color: ColorInfo,
    pub image: ImageInfo,
}

/// The JSON document stored next to each processed image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub width: u32,
    pub height: u32,
    pub created: String,
    pub modified: String,
    pub hash: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub gps: Option<GpsInfo>,
    pub color: ColorInfo,
    pub image: ImageInfo,
    pub labels: ScoreMap,
    pub texts: ScoreMap,
}

impl MetadataRecord {
    /// Assemble a record. `modified` falls back to `created` when the
    /// storage backend did not report a last-modified time.
    pub fn new(
        inspection: ImageInspection,
        created: DateTime<Utc>,
        modified: Option<DateTime<Utc>>,
        labels: ScoreMap,
        texts: ScoreMap,
    ) -> Self {
        Self {
            width: inspection.width,
            height: inspection.height,
            created: format_ctime(created),
            modified: format_ctime(modified.unwrap_or(created)),
            hash: inspection.hash,
            size: inspection.size,
            file_type: inspection.file_type,
            gps: inspection.gps,
            color: inspection.color,
            image: inspection.image,
            labels,
            texts,
        }
    }

    /// Pretty-printed JSON, two-space indent
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn inspection() -> ImageInspection {
        ImageInspection {
            width: 640,
            height: 480,
            hash: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            size: 1234,
            file_type: Some("jpeg".to_string()),
            gps: None,
            color: ColorInfo {
                depth: ColorDepth::Bits(24),
                mode: "RGB".to_string(),
            },
            image: ImageInfo {
                format: Some("JPEG".to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_format_ctime_pads_day_with_space() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(format_ctime(at), "Tue Mar  5 07:08:09 2024");

        let at = Utc.with_ymd_and_hms(2023, 11, 21, 23, 0, 0).unwrap();
        assert_eq!(format_ctime(at), "Tue Nov 21 23:00:00 2023");
    }

    #[test]
    fn test_modified_falls_back_to_created() {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();

        let record = MetadataRecord::new(
            inspection(),
            created,
            None,
            ScoreMap::new(),
            ScoreMap::new(),
        );
        assert_eq!(record.modified, record.created);

        let modified = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let record = MetadataRecord::new(
            inspection(),
            created,
            Some(modified),
            ScoreMap::new(),
            ScoreMap::new(),
        );
        assert_eq!(record.modified, "Mon Jan  1 00:00:00 2024");
    }

    #[test]
    fn test_record_json_shape() {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let labels = ScoreMap::from([("dog".to_string(), 1414)]);
        let record = MetadataRecord::new(inspection(), created, None, labels, ScoreMap::new());

        let json: serde_json::Value = serde_json::from_slice(&record.to_json().unwrap()).unwrap();

        assert_eq!(json["type"], "jpeg");
        assert_eq!(json["gps"], serde_json::Value::Null);
        assert_eq!(json["color"]["depth"], 24);
        assert_eq!(json["image"], serde_json::json!({"format": "JPEG"}));
        assert_eq!(json["labels"]["dog"], 1414);
        assert_eq!(json["texts"], serde_json::json!({}));
    }

    #[test]
    fn test_pretty_print_uses_two_spaces() {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let record =
            MetadataRecord::new(inspection(), created, None, ScoreMap::new(), ScoreMap::new());

        let text = String::from_utf8(record.to_json().unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"width\": 640,\n  \"height\": 480,"));
    }

    #[test]
    fn test_unknown_color_depth_round_trips_as_string() {
        let info = ColorInfo {
            depth: ColorDepth::UNKNOWN,
            mode: "I;16".to_string(),
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["depth"], "Unknown");

        let back: ColorInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, info);
    }
}
