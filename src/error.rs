/// Unified Error Handling Module
///
/// This module provides a unified error handling system for the entire application.
/// It covers:
/// 1. Domain-Specific Error Types (validation, storage, hashing, tokens)
/// 2. Unified Application Error Type (AppError)
/// 3. HTTP Response Mapping (actix ResponseError)
/// 4. Structured Error Logging with Context
///
/// Client-visible rule: every authentication failure maps to the same
/// unauthorized status with a non-specific message. Hashing and storage
/// faults are reported generically; raw driver text never reaches a client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
    SuspiciousContent(String),
    WeakPassword(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
            ValidationError::WeakPassword(rule) => write!(f, "password is too weak: {}", rule),
        }
    }
}

impl StdError for ValidationError {}

/// Storage contract errors
///
/// `NotFound` stays distinct so callers can decide what a miss means;
/// credential lookups collapse it into `AuthError` before it reaches a client.
#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    UniqueViolation(String),
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "{} not found", what),
            StoreError::UniqueViolation(msg) => write!(f, "duplicate record: {}", msg),
            StoreError::Database(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            StoreError::UniqueViolation("record already exists".to_string())
        } else {
            StoreError::Database(error_msg)
        }
    }
}

/// Password hashing subsystem faults
///
/// A mismatching password is not an error (verification returns `Ok(false)`);
/// these cover malformed stored hashes and internal hashing failures.
#[derive(Debug, Clone)]
pub enum HashError {
    InvalidHash(String),
    HashingFailed(String),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashError::InvalidHash(msg) => write!(f, "stored hash is malformed: {}", msg),
            HashError::HashingFailed(msg) => write!(f, "password hashing failed: {}", msg),
        }
    }
}

impl StdError for HashError {}

/// Access-token codec errors
///
/// Callers branch on the kind: an expired token is handled differently
/// from a tampered or garbled one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    InvalidSignature,
    Malformed,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::InvalidSignature => write!(f, "token signature is invalid"),
            TokenError::Malformed => write!(f, "token is malformed"),
        }
    }
}

impl StdError for TokenError {}

/// Authorization header parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    Missing,
    Malformed,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::Missing => write!(f, "no authorization header"),
            HeaderError::Malformed => write!(f, "invalid authorization header"),
        }
    }
}

impl StdError for HeaderError {}

/// Authentication outcomes
///
/// Every variant maps to the same unauthorized response; the variant itself
/// carries the detail that only ever reaches the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    TokenExpired,
    TokenRevoked,
    TokenInvalid,
    MissingToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid email or password"),
            AuthError::TokenExpired => write!(f, "expired token, please log in"),
            AuthError::TokenRevoked => write!(f, "token revoked"),
            AuthError::TokenInvalid => write!(f, "invalid token, please log in"),
            AuthError::MissingToken => write!(f, "no authorization header"),
        }
    }
}

impl StdError for AuthError {}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::InvalidSignature | TokenError::Malformed => AuthError::TokenInvalid,
        }
    }
}

impl From<HeaderError> for AuthError {
    fn from(err: HeaderError) -> Self {
        match err {
            HeaderError::Missing => AuthError::MissingToken,
            HeaderError::Malformed => AuthError::TokenInvalid,
        }
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Store(StoreError),
    Hash(HashError),
    Auth(AuthError),
    Forbidden(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Hash(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Forbidden(msg) => write!(f, "forbidden: {}", msg),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<HashError> for AppError {
    fn from(err: HashError) -> Self {
        AppError::Hash(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

/// ============================================================================
/// 3. HTTP RESPONSE MAPPING
/// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking (request ID or trace ID)
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = match self {
            // Validation errors -> 400 Bad Request
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR".to_string(),
                e.to_string(),
            ),

            AppError::Store(e) => match e {
                StoreError::NotFound(what) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND".to_string(),
                    format!("{} not found", what),
                ),
                StoreError::UniqueViolation(msg) => (
                    StatusCode::CONFLICT,
                    "DUPLICATE_ENTRY".to_string(),
                    msg.clone(),
                ),
                // Raw driver text stays in the logs
                StoreError::Database(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR".to_string(),
                    "Database error occurred".to_string(),
                ),
            },

            // Hashing faults are internal faults, never "bad password"
            AppError::Hash(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR".to_string(),
                "Internal server error".to_string(),
            ),

            // One status, one message, whichever check actually failed
            AppError::Auth(_) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED".to_string(),
                "Authentication failed".to_string(),
            ),

            AppError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN".to_string(),
                "Forbidden".to_string(),
            ),

            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR".to_string(),
                "Internal server error".to_string(),
            ),
        };

        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code,
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(
                    request_id = request_id,
                    error = %e,
                    "Validation error"
                );
            }
            AppError::Store(StoreError::NotFound(_)) => {
                tracing::warn!(
                    request_id = request_id,
                    error = %self,
                    "Record not found"
                );
            }
            AppError::Store(StoreError::UniqueViolation(_)) => {
                tracing::warn!(
                    request_id = request_id,
                    error = %self,
                    "Duplicate entry attempt"
                );
            }
            AppError::Store(e) => {
                tracing::error!(
                    request_id = request_id,
                    error = %e,
                    "Storage error"
                );
            }
            AppError::Hash(e) => {
                tracing::error!(
                    request_id = request_id,
                    error = %e,
                    "Password hashing fault"
                );
            }
            AppError::Auth(e) => {
                // The only place expiry/revocation detail is visible
                tracing::warn!(
                    request_id = request_id,
                    error = %e,
                    "Authentication failed"
                );
            }
            AppError::Forbidden(msg) => {
                tracing::warn!(
                    request_id = request_id,
                    error = %msg,
                    "Forbidden"
                );
            }
            AppError::Internal(msg) => {
                tracing::error!(
                    request_id = request_id,
                    error = %msg,
                    "Internal error"
                );
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(e) => match e {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::UniqueViolation(_) => StatusCode::CONFLICT,
                StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ============================================================================
/// 4. ERROR CONTEXT FOR REQUEST-SCOPED LOGGING
/// ============================================================================

/// Error context carried through a handler for correlated log lines
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            operation: operation.into(),
        }
    }
}
