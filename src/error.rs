use thiserror::Error;

/// Recoverable failures of the editing engine.
///
/// Operations that the editor treats as harmless no-ops (undo on an empty
/// stack, applying a crop with no crop area) do not produce errors.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    PixelBufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("invalid hex color: {0:?}")]
    InvalidHexColor(String),

    #[error("invalid font data for family {0:?}")]
    InvalidFont(String),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image load was cancelled before completing")]
    LoadCancelled,
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
