use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use neuroscreen_core::CoreError;
use serde::Serialize;
use thiserror::Error;

// -------------------------
// Success DTOs
// -------------------------

/// Response body for a successful audio prediction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AudioPrediction {
    pub status: &'static str, // always "ok"
    /// "Parkinson's" or "Healthy"
    pub prediction: String,
    /// Model probability, always within [0, 1]
    pub confidence: f32,
}

impl AudioPrediction {
    pub fn new(prediction: impl Into<String>, confidence: f32) -> Self {
        Self {
            status: "ok",
            prediction: prediction.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Response body for a successful video analysis relay.
#[derive(Debug, Clone, Serialize)]
pub struct VideoAnalysis {
    pub status: &'static str, // always "ok"
    /// Structured gait analysis produced by the generative backend
    pub analysis: serde_json::Value,
}

impl VideoAnalysis {
    pub fn new(analysis: serde_json::Value) -> Self {
        Self {
            status: "ok",
            analysis,
        }
    }
}

// -------------------------
// Error body
// -------------------------

/// JSON error body shared by every failing endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorBody {
    pub status: &'static str, // always "error"
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            error: message.into(),
        }
    }
}

/// High-level API errors to be mapped to HTTP responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("Bad gateway: {0}")]
    BadGateway(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }
    pub fn unsupported_media_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedMediaType(msg.into())
    }
    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::BadGateway(msg.into())
    }
    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::UnsupportedMediaType(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ModelNotLoaded => ApiError::ServiceUnavailable(err.to_string()),
            _ if err.is_client_error() => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody::new(self.message());

        let bytes = match serde_json::to_vec(&body) {
            Ok(b) => b,
            Err(_) => br#"{"status":"error","error":"Serialization failure"}"#.to_vec(),
        };

        let mut builder = axum::http::Response::builder().status(status);
        builder = builder.header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        builder
            .body(axum::body::Body::from(bytes))
            .unwrap_or_else(|_| {
                axum::http::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .header(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    )
                    .body(axum::body::Body::from("{}"))
                    .expect("build fallback response")
            })
    }
}
