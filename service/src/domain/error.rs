use crate::domain::envelope::ApiResponse;
use crate::domain::error::ErrorResponse::{
    BadRequestError, EndpointNotFoundError, InternalError, MethodNotAllowedError,
    PayloadTooLargeError, StudentNotFoundError, ValidationError,
};
use crate::response_handler::{json_response, ResultResponse};
use hyper::StatusCode;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name to message, reported together when a payload fails validation.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// Failures that end a request and are rendered as an error envelope.
#[derive(Debug, Error)]
pub enum ErrorResponse {
    #[error("Student not found with id: '{id}'")]
    StudentNotFoundError { id: u64 },
    #[error("Validation failed")]
    ValidationError { errors: FieldErrors },
    #[error("{message}")]
    BadRequestError { message: String },
    #[error("Request body too large")]
    PayloadTooLargeError {},
    #[error("Endpoint not found")]
    EndpointNotFoundError {},
    #[error("Method not allowed")]
    MethodNotAllowedError {},
    #[error("An unexpected error occurred: {message}")]
    InternalError { message: String },
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> ErrorResponse {
        BadRequestError {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            StudentNotFoundError { .. } | EndpointNotFoundError {} => StatusCode::NOT_FOUND,
            ValidationError { .. } | BadRequestError { .. } => StatusCode::BAD_REQUEST,
            PayloadTooLargeError {} => StatusCode::PAYLOAD_TOO_LARGE,
            MethodNotAllowedError {} => StatusCode::METHOD_NOT_ALLOWED,
            InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn handle(&self) -> ResultResponse {
        match self {
            ValidationError { errors } => json_response(
                self.status(),
                &ApiResponse::failure_with(self.to_string(), errors),
                None,
            ),
            _ => json_response(
                self.status(),
                &ApiResponse::<()>::failure(self.to_string()),
                None,
            ),
        }
    }
}

/// Errors raised inside the photo pipeline. None of these reach a client.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("photo is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("photo could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("photo format is not recognised")]
    UnsupportedFormat,
    #[error("photo is corrupt: {0}")]
    Corrupt(#[source] image::ImageError),
    #[error("photo has an empty side ({width}x{height})")]
    EmptyDimension { width: u32, height: u32 },
    #[error("photo could not be resampled: {0}")]
    Resample(#[from] fast_image_resize::ResizeError),
    #[error("photo could not be written: {0}")]
    Encode(#[source] image::ImageError),
}
