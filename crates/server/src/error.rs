use got_ocr_core::OcrError;
use rocket::{
    http::Status,
    response::{Responder, status::Custom},
    serde::json::Json,
};
use serde::Serialize;
use thiserror::Error;

/// Wire-level failure split: malformed input is 400, everything the pipeline
/// reports is 500. Kind-level detail stays inside [`OcrError`]; the body is a
/// flat `{"error": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        ApiError::Internal(format!("{:#}", anyhow::Error::new(err)))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        let status = match self {
            ApiError::BadRequest(_) => Status::BadRequest,
            ApiError::Internal(_) => Status::InternalServerError,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        Custom(status, Json(body)).respond_to(request)
    }
}
