use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("order not found")]
    OrderNotFound,
    #[error("settlement oracle unavailable: {0}")]
    OracleUnavailable(String),
    #[error("store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Error body returned to API callers.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::OrderNotFound => StatusCode::NOT_FOUND,
            Self::OracleUnavailable(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to expose to clients. 5xx details stay in the server
    /// logs; an expired order is not distinguished from one that never
    /// existed.
    fn safe_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::OrderNotFound => "Order not found".to_string(),
            Self::OracleUnavailable(_) => "Bank error".to_string(),
            Self::Store(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }

        let body = Json(ErrorBody {
            error: self.safe_message(),
        });
        (status, body).into_response()
    }
}

#[cfg(feature = "store-redis")]
impl From<redis::RedisError> for GatewayError {
    fn from(err: redis::RedisError) -> Self {
        GatewayError::Store(err.to_string())
    }
}
