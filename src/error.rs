//! Error types for mapkit
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Missing event data is never an error: absent values resolve to `None`.
//! Errors are reserved for malformed mappings, invalid payloads and the
//! transport-level conditions adapters report back through this type.

use thiserror::Error;

/// Code reported for payloads that fail field validation
pub const PAYLOAD_VALIDATION_FAILED: &str = "PAYLOAD_VALIDATION_FAILED";

/// Code reported for transient failures
pub const RETRYABLE_ERROR: &str = "RETRYABLE_ERROR";

/// Code reported for rejected credentials
pub const INVALID_AUTHENTICATION: &str = "INVALID_AUTHENTICATION";

/// Fallback code when nothing more specific applies
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// The main error type for mapkit
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Mapping Errors
    // ============================================================================
    #[error("{path} {message}")]
    MalformedDirective { path: String, message: String },

    #[error("Invalid mapping: {}", .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    InvalidMapping { errors: Vec<Error> },

    #[error("Invalid event: {message}")]
    InvalidEvent { message: String },

    // ============================================================================
    // Payload / Integration Errors
    // ============================================================================
    #[error("Payload validation failed: {}", .violations.join("; "))]
    PayloadValidation { violations: Vec<String> },

    #[error("{message}")]
    Integration {
        message: String,
        code: String,
        status: u16,
    },

    #[error("Retryable error ({status}): {message}")]
    Retryable { message: String, status: u16 },

    #[error("Invalid authentication: {message}")]
    InvalidAuthentication { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a malformed directive error at the given location stack
    pub fn malformed(stack: &[String], message: impl Into<String>) -> Self {
        Self::MalformedDirective {
            path: format!("/{}", stack.join("/")),
            message: message.into(),
        }
    }

    /// Create an invalid event error
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }

    /// Create a payload validation error with a single violation
    pub fn payload_validation(message: impl Into<String>) -> Self {
        Self::PayloadValidation {
            violations: vec![message.into()],
        }
    }

    /// Create an integration error
    pub fn integration(message: impl Into<String>, code: impl Into<String>, status: u16) -> Self {
        Self::Integration {
            message: message.into(),
            code: code.into(),
            status,
        }
    }

    /// Create an error for a failed destination API call
    pub fn api(message: impl Into<String>, status: u16) -> Self {
        Self::integration(message, error_code_from_status(status), status)
    }

    /// Create a retryable error
    pub fn retryable(message: impl Into<String>, status: u16) -> Self {
        Self::Retryable {
            message: message.into(),
            status,
        }
    }

    /// Combine several errors into one, unwrapping a single error
    pub fn aggregate(mut errors: Vec<Error>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            Self::InvalidMapping { errors }
        }
    }

    /// HTTP-style status for this error
    pub fn status(&self) -> u16 {
        match self {
            Error::PayloadValidation { .. }
            | Error::MalformedDirective { .. }
            | Error::InvalidMapping { .. }
            | Error::InvalidEvent { .. } => 400,
            Error::Integration { status, .. } | Error::Retryable { status, .. } => *status,
            Error::InvalidAuthentication { .. } => 401,
            _ => 500,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &str {
        match self {
            Error::PayloadValidation { .. } => PAYLOAD_VALIDATION_FAILED,
            Error::Integration { code, .. } => code,
            Error::Retryable { .. } => RETRYABLE_ERROR,
            Error::InvalidAuthentication { .. } => INVALID_AUTHENTICATION,
            Error::MalformedDirective { .. }
            | Error::InvalidMapping { .. }
            | Error::InvalidEvent { .. } => error_code_from_status(400),
            _ => UNKNOWN_ERROR,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Retryable { .. } => true,
            Error::Integration { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
///
/// 4xx are terminal except 408, 423 and 429; 5xx are retried except 501.
fn is_retryable_status(status: u16) -> bool {
    match status {
        408 | 423 | 429 => true,
        501 => false,
        500..=599 => true,
        _ => false,
    }
}

/// Map an HTTP status to its standard error code
pub fn error_code_from_status(status: u16) -> &'static str {
    match status {
        400 => "BAD_REQUEST",
        401 => "UNAUTHORIZED",
        402 => "PAYMENT_REQUIRED",
        403 => "FORBIDDEN",
        404 => "NOT_FOUND",
        405 => "METHOD_NOT_ALLOWED",
        408 => "REQUEST_TIMEOUT",
        409 => "CONFLICT",
        410 => "GONE",
        413 => "PAYLOAD_TOO_LARGE",
        415 => "UNSUPPORTED_MEDIA_TYPE",
        422 => "UNPROCESSABLE_ENTITY",
        423 => "LOCKED",
        429 => "TOO_MANY_REQUESTS",
        499 => "CANCELLED",
        500 => "INTERNAL_SERVER_ERROR",
        501 => "NOT_IMPLEMENTED",
        502 => "BAD_GATEWAY",
        503 => "SERVICE_UNAVAILABLE",
        504 => "GATEWAY_TIMEOUT",
        529 => "SITE_IS_OVERLOADED",
        _ => UNKNOWN_ERROR,
    }
}

/// Result type alias for mapkit
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
