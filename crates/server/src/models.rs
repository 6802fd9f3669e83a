use rocket::fs::TempFile;
use serde::{Deserialize, Serialize};

/// Query parameters of the OCR endpoint. `type` selects the recognition
/// flavour (`format` or the default `ocr`); `save` additionally persists the
/// aggregated text to the configured result file.
#[derive(Debug, FromForm)]
pub struct OcrQuery {
    #[field(name = "type")]
    pub mode: Option<String>,
    pub save: bool,
}

/// Multipart input form: one or more image file parts under `files`.
#[derive(FromForm)]
pub struct OcrUpload<'r> {
    pub files: Vec<TempFile<'r>>,
}

/// JSON input form. `urls` is required; entries may be http(s) URLs or local
/// paths.
#[derive(Debug, Deserialize)]
pub struct UrlListRequest {
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub result: Option<String>,
}
