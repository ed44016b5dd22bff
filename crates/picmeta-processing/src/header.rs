//! Format header fields: JFIF density, PNG physical size and gamma,
//! progressive JPEG, GIF version

use image::ImageFormat;
use img_parts::jpeg::{markers, Jpeg};
use img_parts::png::Png;

use crate::metadata::ImageInfo;

/// pHYs densities are pixels per metre
const METRES_TO_INCHES: f64 = 0.0254;
const PNG_GAMMA_SCALE: f64 = 100_000.0;
const JFIF_UNIT_DOTS_PER_INCH: u8 = 1;
const PHYS_UNIT_METRE: u8 = 1;

/// SOF2, SOF6, SOF10, SOF14
const PROGRESSIVE_SOF: [u8; 4] = [0xC2, 0xC6, 0xCA, 0xCE];

/// Read the header fields a decoder would expose for `format`.
/// `format` itself is left for the caller to fill in.
pub fn header_info(format: Option<ImageFormat>, data: &[u8]) -> ImageInfo {
    let mut info = ImageInfo::default();

    match format {
        Some(ImageFormat::Jpeg) => jpeg_info(data, &mut info),
        Some(ImageFormat::Png) => png_info(data, &mut info),
        Some(ImageFormat::Gif) => {
            info.version = data
                .get(..6)
                .filter(|magic| magic.starts_with(b"GIF"))
                .map(|magic| String::from_utf8_lossy(magic).into_owned());
        }
        _ => {}
    }

    info
}

fn be_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn jpeg_info(data: &[u8], info: &mut ImageInfo) {
    let jpeg = match Jpeg::from_bytes(data.to_vec().into()) {
        Ok(jpeg) => jpeg,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable JPEG segments");
            return;
        }
    };

    for segment in jpeg.segments() {
        let marker = segment.marker();
        if marker == markers::APP0 && info.jfif.is_none() {
            jfif(segment.contents(), info);
        } else if PROGRESSIVE_SOF.contains(&marker) {
            info.progressive = Some(1);
            info.progression = Some(1);
        }
    }
}

fn jfif(contents: &[u8], info: &mut ImageInfo) {
    if contents.len() < 12 || !contents.starts_with(b"JFIF") {
        return;
    }

    let unit = contents[7];
    let density = [be_u16(&contents[8..10]), be_u16(&contents[10..12])];

    info.jfif = Some(be_u16(&contents[5..7]));
    info.jfif_version = Some([contents[5], contents[6]]);
    info.jfif_unit = Some(unit);
    info.jfif_density = Some(density);
    if unit == JFIF_UNIT_DOTS_PER_INCH {
        info.dpi = Some([f64::from(density[0]), f64::from(density[1])]);
    }
}

fn png_info(data: &[u8], info: &mut ImageInfo) {
    let png = match Png::from_bytes(data.to_vec().into()) {
        Ok(png) => png,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable PNG chunks");
            return;
        }
    };

    for chunk in png.chunks() {
        let contents = chunk.contents();
        match &chunk.kind() {
            b"pHYs" if contents.len() >= 9 => {
                if contents[8] == PHYS_UNIT_METRE {
                    info.dpi = Some([
                        f64::from(be_u32(&contents[0..4])) * METRES_TO_INCHES,
                        f64::from(be_u32(&contents[4..8])) * METRES_TO_INCHES,
                    ]);
                }
            }
            b"gAMA" if contents.len() >= 4 => {
                info.gamma = Some(f64::from(be_u32(&contents[0..4])) / PNG_GAMMA_SCALE);
            }
            b"sRGB" if !contents.is_empty() => info.srgb = Some(contents[0]),
            _ => {}
        }
    }
}
