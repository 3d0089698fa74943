use crate::domain::envelope::ApiResponse;
use crate::domain::server_timing::ServerTiming;
use crate::router::full;
use crate::service::{InternalResponse, Reply};
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::error;
use tracing::{instrument, warn};

const CONTENT_TYPE_HEADER_NAME: &str = "content-type";
const CONTENT_TYPE_HEADER_VALUE: &str = "application/json";
const CACHE_CONTROL_HEADER_NAME: &str = "cache-control";
const CACHE_CONTROL_HEADER_VALUE: &str = "no-store";
const SERVER_TIMING_HEADER_NAME: &str = "Server-Timing";

pub type ResultResponse =
    Result<Response<BoxBody<Bytes, hyper::Error>>, Box<dyn error::Error + Send + Sync>>;

/// Wrap a service outcome in the JSON envelope.
#[instrument(skip_all)]
pub fn transform<T: Serialize>(response: InternalResponse<T>) -> ResultResponse {
    match response {
        Ok(Reply {
            status,
            message,
            data,
            server_timing,
        }) => json_response(
            status,
            &ApiResponse::success(data, message),
            Some(&server_timing),
        ),
        Err(e) => {
            if e.status().is_server_error() {
                warn!("Request failed: {e}");
            }
            e.handle()
        }
    }
}

pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &ApiResponse<T>,
    server_timing: Option<&ServerTiming>,
) -> ResultResponse {
    let bytes = serde_json::to_vec(body)?;
    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE_HEADER_NAME, CONTENT_TYPE_HEADER_VALUE)
        .header(CACHE_CONTROL_HEADER_NAME, CACHE_CONTROL_HEADER_VALUE)
        .header("content-length", bytes.len());
    if let Some(server_timing) = server_timing.filter(|timing| !timing.is_empty()) {
        builder = builder.header(SERVER_TIMING_HEADER_NAME, server_timing.to_string());
    }
    Ok(builder.body(full(bytes))?)
}
