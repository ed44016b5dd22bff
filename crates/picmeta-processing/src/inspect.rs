//! Byte-level image inspection: dimensions, format, color, checksum, EXIF,
//! header fields

use image::{ExtendedColorType, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::ProcessingResult;
use crate::exif_tags::{exif_dpi, gps_info, read_exif};
use crate::header::header_info;
use crate::metadata::{ColorDepth, ColorInfo, ImageInspection};

pub struct ImageInspector;

impl ImageInspector {
    /// Inspect an encoded image. Only the header is decoded.
    pub fn inspect(data: &[u8]) -> ProcessingResult<ImageInspection> {
        let start = std::time::Instant::now();

        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader.format();
        let decoder = reader.into_decoder()?;

        let (width, height) = decoder.dimensions();
        let mode = color_mode(decoder.original_color_type());
        let color = ColorInfo {
            depth: color_depth(&mode),
            mode,
        };

        let exif = read_exif(data);

        let mut image = header_info(format, data);
        image.format = format.map(format_name);
        if format == Some(ImageFormat::Jpeg) && image.dpi.is_none() {
            image.dpi = exif.as_ref().map(exif_dpi);
        }

        let inspection = ImageInspection {
            width,
            height,
            hash: md5_hex(data),
            size: data.len() as u64,
            file_type: format.and_then(|f| file_type(f, data)),
            gps: exif.as_ref().and_then(gps_info),
            color,
            image,
        };

        tracing::debug!(
            width,
            height,
            format = ?format,
            mode = %inspection.color.mode,
            has_exif = exif.is_some(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image inspected"
        );

        Ok(inspection)
    }
}

/// Lowercase MD5 hex digest
pub fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Short sniffed type name; `None` for formats outside the usual web set.
/// Netpbm files are told apart by their magic number.
pub fn file_type(format: ImageFormat, data: &[u8]) -> Option<String> {
    let name = match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::WebP => "webp",
        ImageFormat::Bmp => "bmp",
        ImageFormat::OpenExr => "exr",
        ImageFormat::Pnm => match data.get(..2)? {
            b"P1" | b"P4" => "pbm",
            b"P2" | b"P5" => "pgm",
            b"P3" | b"P6" => "ppm",
            _ => return None,
        },
        _ => return None,
    };
    Some(name.to_string())
}

/// Upper-case format name, e.g. `JPEG`
pub fn format_name(format: ImageFormat) -> String {
    format!("{:?}", format).to_uppercase()
}

/// PIL-style mode name for the color type stored in the file
pub fn color_mode(color: ExtendedColorType) -> String {
    let mode = match color {
        ExtendedColorType::L1 => "1",
        ExtendedColorType::L8 => "L",
        ExtendedColorType::La8 => "LA",
        ExtendedColorType::Rgb8 => "RGB",
        ExtendedColorType::Rgba8 => "RGBA",
        ExtendedColorType::Cmyk8 => "CMYK",
        ExtendedColorType::L16 => "I;16",
        ExtendedColorType::La16 => "LA;16",
        ExtendedColorType::Rgb16 => "RGB;16",
        ExtendedColorType::Rgba16 => "RGBA;16",
        ExtendedColorType::Rgb32F => "RGB;F",
        ExtendedColorType::Rgba32F => "RGBA;F",
        other => return format!("{:?}", other),
    };
    mode.to_string()
}

/// Bits per pixel for a mode name
pub fn color_depth(mode: &str) -> ColorDepth {
    match mode {
        "1" => ColorDepth::Bits(1),
        "L" | "P" => ColorDepth::Bits(8),
        "RGB" | "YCbCr" | "LAB" | "HSV" => ColorDepth::Bits(24),
        "RGBA" | "CMYK" | "I" | "F" => ColorDepth::Bits(32),
        _ => ColorDepth::UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    #[test]
    fn test_inspect_rgba_png() {
        let data = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 50, Rgba([255, 0, 0, 255]))),
            ImageFormat::Png,
        );

        let inspection = ImageInspector::inspect(&data).unwrap();

        assert_eq!((inspection.width, inspection.height), (100, 50));
        assert_eq!(inspection.file_type.as_deref(), Some("png"));
        assert_eq!(inspection.image.format.as_deref(), Some("PNG"));
        assert_eq!(inspection.color.mode, "RGBA");
        assert_eq!(inspection.color.depth, ColorDepth::Bits(32));
        assert_eq!(inspection.size, data.len() as u64);
        assert_eq!(inspection.hash, md5_hex(&data));
        assert!(inspection.gps.is_none());
    }

    #[test]
    fn test_inspect_grayscale_png() {
        let data = encode(
            DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([128]))),
            ImageFormat::Png,
        );

        let inspection = ImageInspector::inspect(&data).unwrap();

        assert_eq!(inspection.color.mode, "L");
        assert_eq!(inspection.color.depth, ColorDepth::Bits(8));
    }

    #[test]
    fn test_inspect_jpeg() {
        let data = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 16, Rgb([10, 20, 30]))),
            ImageFormat::Jpeg,
        );

        let inspection = ImageInspector::inspect(&data).unwrap();

        assert_eq!(inspection.file_type.as_deref(), Some("jpeg"));
        assert_eq!(inspection.image.format.as_deref(), Some("JPEG"));
        assert_eq!(inspection.color.mode, "RGB");
        assert_eq!(inspection.color.depth, ColorDepth::Bits(24));
        assert_eq!((inspection.width, inspection.height), (32, 16));
    }

    #[test]
    fn test_inspect_jpeg_dpi_from_jfif_header() {
        let mut data = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut data, 85);
        encoder.set_pixel_density(image::codecs::jpeg::PixelDensity::dpi(150));
        encoder
            .encode_image(&RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])))
            .unwrap();

        let inspection = ImageInspector::inspect(&data).unwrap();

        assert_eq!(inspection.image.dpi, Some([150.0, 150.0]));
        assert_eq!(inspection.image.jfif_unit, Some(1));
        assert_eq!(inspection.image.format.as_deref(), Some("JPEG"));
    }

    #[test]
    fn test_inspect_16_bit_png_has_unknown_depth() {
        let img = image::ImageBuffer::<Luma<u16>, Vec<u16>>::from_pixel(4, 4, Luma([1000]));
        let data = encode(DynamicImage::ImageLuma16(img), ImageFormat::Png);

        let inspection = ImageInspector::inspect(&data).unwrap();

        assert_eq!(inspection.color.mode, "I;16");
        assert_eq!(inspection.color.depth, ColorDepth::UNKNOWN);
    }

    #[test]
    fn test_inspect_rejects_non_image() {
        let result = ImageInspector::inspect(b"not an image");
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
    }

    #[test]
    fn test_md5_hex() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex(b"hello"), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_color_depth_table() {
        let cases = [
            ("1", ColorDepth::Bits(1)),
            ("L", ColorDepth::Bits(8)),
            ("P", ColorDepth::Bits(8)),
            ("RGB", ColorDepth::Bits(24)),
            ("RGBA", ColorDepth::Bits(32)),
            ("CMYK", ColorDepth::Bits(32)),
            ("YCbCr", ColorDepth::Bits(24)),
            ("LAB", ColorDepth::Bits(24)),
            ("HSV", ColorDepth::Bits(24)),
            ("I", ColorDepth::Bits(32)),
            ("F", ColorDepth::Bits(32)),
            ("LA", ColorDepth::UNKNOWN),
            ("RGB;16", ColorDepth::UNKNOWN),
        ];

        for (mode, expected) in cases {
            assert_eq!(color_depth(mode), expected, "mode {}", mode);
        }
    }

    #[test]
    fn test_color_mode_names() {
        assert_eq!(color_mode(ExtendedColorType::L1), "1");
        assert_eq!(color_mode(ExtendedColorType::Cmyk8), "CMYK");
        assert_eq!(color_mode(ExtendedColorType::La8), "LA");
    }

    #[test]
    fn test_file_type_names() {
        assert_eq!(file_type(ImageFormat::Gif, b"GIF89a").as_deref(), Some("gif"));
        assert_eq!(file_type(ImageFormat::Tiff, b"II*\0").as_deref(), Some("tiff"));
        assert_eq!(file_type(ImageFormat::Ico, b"\0\0\x01\0"), None);
    }

    #[test]
    fn test_netpbm_types() {
        assert_eq!(file_type(ImageFormat::Pnm, b"P4\n").as_deref(), Some("pbm"));
        assert_eq!(file_type(ImageFormat::Pnm, b"P2\n").as_deref(), Some("pgm"));
        assert_eq!(file_type(ImageFormat::Pnm, b"P6\n").as_deref(), Some("ppm"));
        assert_eq!(file_type(ImageFormat::Pnm, b"P7\n"), None);
    }

    #[test]
    fn test_inspect_ppm() {
        let mut data = b"P6\n3 2\n255\n".to_vec();
        data.extend(std::iter::repeat([1u8, 2, 3]).take(6).flatten());

        let inspection = ImageInspector::inspect(&data).unwrap();

        assert_eq!(inspection.file_type.as_deref(), Some("ppm"));
        assert_eq!(inspection.color.mode, "RGB");
        assert_eq!((inspection.width, inspection.height), (3, 2));
    }
}
