use chrono::{Local, NaiveDateTime};
use serde::Serialize;

/// Uniform body returned by every `/api` endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: NaiveDateTime,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> ApiResponse<T> {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: Local::now().naive_local(),
        }
    }

    pub fn failure(message: impl Into<String>) -> ApiResponse<T> {
        ApiResponse {
            success: false,
            message: message.into(),
            data: None,
            timestamp: Local::now().naive_local(),
        }
    }

    pub fn failure_with(message: impl Into<String>, data: T) -> ApiResponse<T> {
        ApiResponse {
            data: Some(data),
            ..ApiResponse::failure(message)
        }
    }
}
