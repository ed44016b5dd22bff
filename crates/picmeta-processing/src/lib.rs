//! Picmeta Processing
//!
//! File-level metadata for images: dimensions, sniffed type, color mode and
//! depth, MD5 checksum, EXIF GPS block and format header info, and the sidecar
//! record that carries them together with the detection scores.

pub mod error;
pub mod exif_tags;
pub mod header;
pub mod inspect;
pub mod metadata;

pub use error::{ProcessingError, ProcessingResult};
pub use inspect::ImageInspector;
pub use metadata::{
    format_ctime, ColorDepth, ColorInfo, GpsInfo, ImageInfo, ImageInspection, MetadataRecord,
};
