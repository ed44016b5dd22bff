use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Bytes are not a decodable image in a supported format
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;
