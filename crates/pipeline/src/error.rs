use std::path::PathBuf;

/// Errors raised by the batch pipelines.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Audio decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("Unsupported audio format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Clip too short: {samples} samples, need at least {min}")]
    TooShort { samples: usize, min: usize },

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to write array: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    #[error("Failed to read array: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Malformed input in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
