//! # Error Types
//!
//! Errors of the checkout layer and the serializable [`ApiError`] the
//! command functions return to the ordering page.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Bistro Order Desk                      │
//! │                                                                         │
//! │  Ordering page               Rust checkout layer                        │
//! │  ─────────────               ───────────────────                        │
//! │                                                                         │
//! │  invoke('place_order')                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Cart rule? ──────── CoreError::QuantityTooLarge ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Guard failed? ───── ValidationError ───────────► ApiError ────►│  │
//! │  │         │                                          ▲            │  │
//! │  │         ▼                                          │            │  │
//! │  │  Remote failed? ──── ClientError (logged) ─► CheckoutError      │  │
//! │  │         │            generic message only                       │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  catch (e) {                                                            │
//! │    // e.code = "SUBMISSION_FAILED"                                      │
//! │    // e.message = "Failed to place order. Please try again."            │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Remote failure detail never reaches the customer; it is logged where the
//! failure happens and replaced by [`GENERIC_SUBMISSION_FAILURE`].

use serde::Serialize;
use thiserror::Error;

use bistro_core::{CoreError, ValidationError};

/// Text shown to the customer for any failed API submission.
pub const GENERIC_SUBMISSION_FAILURE: &str = "Failed to place order. Please try again.";

// =============================================================================
// Order API Client Error
// =============================================================================

/// Failures of the HTTP order API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the credentials.
    #[error("Authentication required")]
    Unauthorized,

    /// Backend refused the order.
    #[error("Order rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Response body did not contain what we expected.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Base URL could not be joined with the orders path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type for order API client operations.
pub type ClientResult<T> = Result<T, ClientError>;

// =============================================================================
// Configuration Error
// =============================================================================

/// Failures while loading or validating `checkout.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Checkout Error
// =============================================================================

/// Failures of the submission dispatcher.
///
/// Needing to sign in is not an error; it is reported as
/// [`crate::checkout::SubmissionOutcome::AuthRequired`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The checkout guard blocked the submission; nothing was sent.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The order API call failed. Carries the customer-facing text only.
    #[error("{message}")]
    SubmissionFailed { message: String },

    /// Another API submission is still waiting for the backend.
    #[error("An order is already being submitted")]
    SubmissionInFlight,

    /// The link opener could not hand the WhatsApp link off.
    #[error("Could not open link: {0}")]
    LinkOpen(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl CheckoutError {
    /// The generic, retryable submission failure.
    pub fn submission_failed() -> Self {
        CheckoutError::SubmissionFailed {
            message: GENERIC_SUBMISSION_FAILURE.to_string(),
        }
    }
}

/// Result type for dispatcher operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// API Error (command boundary)
// =============================================================================

/// Error returned from command functions.
///
/// ## Serialization
/// This is what the ordering page receives when a command fails:
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "phone is required"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input or checkout guard failed
    ValidationError,

    /// Item not in the cart
    NotFound,

    /// Cart limit exceeded
    CartError,

    /// Order API call failed; safe to retry
    SubmissionFailed,

    /// A submission is already running
    SubmissionInFlight,

    /// WhatsApp link could not be opened
    LinkError,

    /// Configuration could not be loaded
    ConfigError,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotInCart(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::CartTooLarge { .. } => ApiError::new(ErrorCode::CartError, err.to_string()),
            CoreError::QuantityTooLarge { .. } => ApiError::validation(err.to_string()),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!(error = %err, "Configuration error");
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(e) => e.into(),
            CheckoutError::SubmissionFailed { message } => {
                ApiError::new(ErrorCode::SubmissionFailed, message)
            }
            CheckoutError::SubmissionInFlight => {
                ApiError::new(ErrorCode::SubmissionInFlight, err.to_string())
            }
            CheckoutError::LinkOpen(_) => ApiError::new(ErrorCode::LinkError, err.to_string()),
            CheckoutError::Config(e) => e.into(),
            CheckoutError::Client(e) => {
                // Log the actual error but return a generic message
                tracing::error!(error = %e, "Order API client error");
                ApiError::new(ErrorCode::SubmissionFailed, GENERIC_SUBMISSION_FAILURE)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_json() {
        let err = ApiError::from(ValidationError::required("phone"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "phone is required");
    }

    #[test]
    fn test_submission_failure_is_generic() {
        let err = ApiError::from(CheckoutError::submission_failed());
        assert_eq!(err.code, ErrorCode::SubmissionFailed);
        assert_eq!(err.message, GENERIC_SUBMISSION_FAILURE);

        let client = ClientError::Rejected {
            status: 500,
            body: "stack trace".to_string(),
        };
        let err = ApiError::from(CheckoutError::from(client));
        assert_eq!(err.message, GENERIC_SUBMISSION_FAILURE);
    }

    #[test]
    fn test_core_error_codes() {
        assert_eq!(ApiError::from(CoreError::ItemNotInCart(3)).code, ErrorCode::NotFound);
        assert_eq!(
            ApiError::from(CoreError::CartTooLarge { max: 100 }).code,
            ErrorCode::CartError
        );
        assert_eq!(
            ApiError::from(CoreError::Validation(ValidationError::required("name"))).code,
            ErrorCode::ValidationError
        );
    }
}
