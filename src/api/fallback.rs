use std::any::Any;

use axum::{http::StatusCode, response::Response};

use crate::error::{INTERNAL_ERROR_MESSAGE, ProxyError, error_response};

/// Answers every path or method no route claims.
pub async fn not_found() -> ProxyError {
    ProxyError::NotFound
}

/// Turns a panic inside the pipeline into the generic 500 response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");

    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}
