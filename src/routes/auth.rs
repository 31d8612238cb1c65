/// Authentication Routes
///
/// Handles user registration, login, token refresh, revocation, password
/// updates, and current user information.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{extract_bearer_token, hash_password, SessionManager};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::storage::Stores;
use crate::validators::{is_valid_email, validate_password_strength};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Credential update request
#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub email: String,
    pub password: String,
}

/// Authentication response with access and refresh tokens
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Refresh response; the refresh token is not rotated, so only a new
/// access token is returned
#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User information response
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub is_premium: bool,
}

/// POST /auth/register
///
/// Register a new user with email and password.
/// Returns access token and refresh token on success.
///
/// # Validation
/// - Email must be valid format and not already registered
/// - Password must be 8+ chars with digit, lowercase, and uppercase
///
/// # Errors
/// - 400: Validation errors (invalid email/password)
/// - 409: Email already registered (duplicate)
/// - 500: Internal server error
pub async fn register(
    form: web::Json<RegisterRequest>,
    stores: web::Data<Stores>,
    sessions: web::Data<SessionManager>,
    auth_settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    // Validate inputs
    let email = is_valid_email(&form.email)?;
    validate_password_strength(&form.password)?;
    let password_hash = hash_password(&form.password)?;

    let user = stores.credentials.create_user(&email, &password_hash).await?;

    let session = sessions.start_session(user).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %session.user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: auth_settings.access_token_ttl_seconds,
    }))
}

/// POST /auth/login
///
/// Authenticate user with email and password.
/// Returns access token and refresh token on success.
///
/// # Errors
/// - 400: Validation error (invalid email format)
/// - 401: Invalid credentials (email not found or wrong password)
/// - 500: Internal server error
///
/// # Security Notes
/// - Uses the same error for "not found" and "wrong password"
/// - Prevents user enumeration attacks
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionManager>,
    auth_settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    // Validate email format
    let email = is_valid_email(&form.email)?;

    let session = sessions.login(&email, &form.password).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %session.user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: auth_settings.access_token_ttl_seconds,
    }))
}

/// POST /auth/refresh
///
/// Mint a new access token from a refresh token presented as
/// `Authorization: Bearer <refresh_token>`.
/// The refresh token itself is left untouched: no rotation, no extension.
///
/// # Errors
/// - 401: Missing header, unknown, expired, or revoked refresh token
/// - 500: Internal server error
pub async fn refresh(
    request: HttpRequest,
    sessions: web::Data<SessionManager>,
    auth_settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let refresh_token = extract_bearer_token(request.headers())
        .map_err(AuthError::from)?
        .to_string();

    let access_token = sessions.refresh(&refresh_token).await?;

    tracing::info!(
        request_id = %context.request_id,
        "Access token refreshed successfully"
    );

    Ok(HttpResponse::Ok().json(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: auth_settings.access_token_ttl_seconds,
    }))
}

/// POST /auth/revoke
///
/// Revoke the refresh token presented as `Authorization: Bearer <token>`.
/// Succeeds (204) even if the token is already revoked or unknown.
///
/// # Errors
/// - 401: Missing or malformed Authorization header
/// - 500: Internal server error
pub async fn revoke(
    request: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = extract_bearer_token(request.headers())
        .map_err(AuthError::from)?
        .to_string();

    sessions.revoke(&refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/me
///
/// Get current authenticated user's information.
/// **Requires valid JWT access token** in Authorization header.
///
/// # Errors
/// - 401: Missing or invalid token (handled by middleware)
/// - 404: User not found (token outlived the account)
/// - 500: Internal server error
pub async fn get_current_user(
    user: web::ReqData<AuthenticatedUser>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let user = stores.credentials.user_by_id(user.0).await?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id.to_string(),
        email: user.email,
        created_at: user.created_at.to_rfc3339(),
        is_premium: user.is_premium,
    }))
}

/// PUT /api/password
///
/// Replace the authenticated user's email and password. A thin call into
/// the password hasher plus one store write.
///
/// # Errors
/// - 400: Validation errors (invalid email/password)
/// - 401: Missing or invalid token (handled by middleware)
/// - 409: Email already taken by another account
/// - 500: Internal server error
pub async fn update_password(
    user: web::ReqData<AuthenticatedUser>,
    form: web::Json<UpdatePasswordRequest>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("password_update");

    let email = is_valid_email(&form.email)?;
    validate_password_strength(&form.password)?;
    let password_hash = hash_password(&form.password)?;

    let updated = stores
        .credentials
        .update_credentials(user.0, &email, &password_hash)
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %updated.id,
        "Credentials updated successfully"
    );

    Ok(HttpResponse::Ok().json(UserResponse {
        id: updated.id.to_string(),
        email: updated.email,
        created_at: updated.created_at.to_rfc3339(),
        is_premium: updated.is_premium,
    }))
}
