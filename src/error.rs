//! Error types and handling for the InfoHub gateway

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed or out-of-range request fields
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The weather provider was unreachable, failed, or sent an unexpected payload
    #[error("Upstream error: {message}")]
    Upstream { message: String },

    /// Unexpected failure while processing an otherwise valid request
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Configuration-related errors, only raised at startup
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl GatewayError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status reported to the caller
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Upstream { .. }
            | GatewayError::Internal { .. }
            | GatewayError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message.
    ///
    /// Only validation messages are passed through; everything else is
    /// replaced by a generic text so upstream details never reach the caller.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Validation { message } => message.clone(),
            GatewayError::Upstream { .. } => {
                "Service temporarily unavailable. Try again later.".to_string()
            }
            GatewayError::Internal { .. } | GatewayError::Config { .. } => {
                "Internal server error.".to_string()
            }
        }
    }

    /// Attach the endpoint specific text shown for server-side failures.
    #[must_use]
    pub fn with_public_message(self, public: &'static str) -> ApiError {
        ApiError {
            error: self,
            public: Some(public),
        }
    }
}

/// Error body sent to HTTP callers
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A [`GatewayError`] on its way out of a handler
#[derive(Debug)]
pub struct ApiError {
    error: GatewayError,
    public: Option<&'static str>,
}

impl ApiError {
    #[must_use]
    pub fn inner(&self) -> &GatewayError {
        &self.error
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        Self {
            error,
            public: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let message = match (&self.error, self.public) {
            (GatewayError::Validation { .. }, _) | (_, None) => self.error.user_message(),
            (_, Some(public)) => public.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let validation_err = GatewayError::validation("bad amount");
        assert!(matches!(validation_err, GatewayError::Validation { .. }));

        let upstream_err = GatewayError::upstream("connection refused");
        assert!(matches!(upstream_err, GatewayError::Upstream { .. }));

        let internal_err = GatewayError::internal("empty table");
        assert!(matches!(internal_err, GatewayError::Internal { .. }));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::upstream("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_user_messages_hide_upstream_details() {
        let err = GatewayError::upstream("dns error: api.open-meteo.com");
        assert!(!err.user_message().contains("open-meteo"));

        let err = GatewayError::validation("Invalid amount: Must be a positive number.");
        assert_eq!(
            err.user_message(),
            "Invalid amount: Must be a positive number."
        );
    }

    #[test]
    fn test_public_message_does_not_override_validation() {
        let response = GatewayError::validation("Invalid target currency. Must be USD or EUR.")
            .with_public_message("Conversion service error.");
        assert!(matches!(response.inner(), GatewayError::Validation { .. }));
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
