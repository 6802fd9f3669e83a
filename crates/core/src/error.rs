use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for the OCR pipeline.
///
/// Acquisition and generation failures abort the whole batch; `EmptyResult`
/// is the distinct "model had nothing to say" outcome that callers map to a
/// null result instead of a hard error.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to read image at {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to load image {index}: {source}")]
    ImageLoad {
        index: usize,
        #[source]
        source: Box<OcrError>,
    },

    #[error("failed to build image tensor: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("unknown conversation template `{0}`")]
    Template(String),

    #[error("tokenization failed: {0}")]
    Tokenize(String),

    #[error("generation failed: {0:#}")]
    Generation(anyhow::Error),

    #[error("generator produced no text")]
    EmptyResult,
}
