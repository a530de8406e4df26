//! Core library for the Wi-Fi channel registry service.
//! This crate defines the channel data model and scoring, the in-memory
//! registry that owns every record, and the Axum web server exposing it.

pub mod config;
pub mod registry;
pub mod structs;
pub mod web_server;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

// Define a shared Error and Result type for the entire crate.

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Web server error: {0}")]
    WebServer(#[from] axum::BoxError),

    #[error("Config error: {0}")]
    Config(String),

    /// 请求体无法解析为 WiFiChannel
    #[error("Cannot parse JSON")]
    MalformedBody(String),

    /// 路径参数无法解析（例如 channel number 不是整数）
    #[error("Invalid {name}: {value}")]
    InvalidPathParam { name: &'static str, value: String },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MalformedBody(_) | Error::InvalidPathParam { .. } => StatusCode::BAD_REQUEST,
            Error::Io(_) | Error::WebServer(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            // The parser detail stays in the log; clients get the fixed message.
            Error::MalformedBody(detail) => {
                tracing::warn!(%detail, "Rejected channel body");
            }
            Error::InvalidPathParam { name, value } => {
                tracing::warn!(param = name, %value, "Rejected path parameter");
            }
            other => {
                tracing::error!("❌ Request failed: {}", other);
            }
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// A specialized `Result` type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_map_to_bad_request() {
        let malformed = Error::MalformedBody("expected value at line 1".to_string());
        assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(malformed.to_string(), "Cannot parse JSON");

        let invalid = Error::InvalidPathParam {
            name: "channel number",
            value: "abc".to_string(),
        };
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "Invalid channel number: abc");
    }

    #[test]
    fn server_errors_map_to_internal_error() {
        let io = Error::Io(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "address in use",
        ));
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            Error::Config("missing [server]".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
