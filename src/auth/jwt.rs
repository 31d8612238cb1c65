/// JWT Token Generation and Validation
///
/// Handles creation and validation of signed access tokens.

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::error::{AppError, TokenError};

/// Generate a new access token for a user
///
/// A zero or negative `ttl_seconds` is encoded as-is; the result is a token
/// that is already expired. Production call sites always pass a positive ttl,
/// tests rely on the non-positive form.
///
/// # Arguments
/// * `user_id` - User's UUID
/// * `secret` - Symmetric signing key
/// * `ttl_seconds` - Token lifetime in seconds
///
/// # Errors
/// Returns error if token signing fails
pub fn make_jwt(user_id: &Uuid, secret: &str, ttl_seconds: i64) -> Result<String, AppError> {
    let claims = Claims::new(*user_id, ttl_seconds);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and extract the subject
///
/// Signature and structure are checked first; expiry second, with the token
/// counted as expired at its expiry instant. The expiry check is done here
/// rather than by the library so that no clock leeway is applied.
///
/// # Arguments
/// * `token` - JWT token string
/// * `secret` - Symmetric signing key
///
/// # Errors
/// * `TokenError::InvalidSignature` - signature does not match `secret`
/// * `TokenError::Expired` - token is past its expiry instant
/// * `TokenError::Malformed` - structurally invalid token
pub fn validate_jwt(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("JWT validation error: {}", e);
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    })?;

    if claims.is_expired() {
        tracing::warn!("JWT validation error: token has expired");
        return Err(TokenError::Expired);
    }

    claims.user_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    #[test]
    fn test_generate_and_validate_token() {
        let user_id = Uuid::new_v4();

        let token = make_jwt(&user_id, SECRET, 3600).expect("Failed to generate token");
        let subject = validate_jwt(&token, SECRET).expect("Failed to validate token");

        assert_eq!(subject, user_id);
    }

    #[test]
    fn test_same_inputs_yield_distinct_tokens() {
        let user_id = Uuid::new_v4();

        let first = make_jwt(&user_id, SECRET, 3600).expect("Failed to generate token");
        let second = make_jwt(&user_id, SECRET, 3600).expect("Failed to generate token");

        assert_ne!(first, second);
        assert_eq!(validate_jwt(&first, SECRET).unwrap(), user_id);
        assert_eq!(validate_jwt(&second, SECRET).unwrap(), user_id);
    }

    #[test]
    fn test_invalid_token() {
        let result = validate_jwt("invalid.token.here", SECRET);

        assert_eq!(result.unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_tampered_token() {
        let user_id = Uuid::new_v4();

        let token = make_jwt(&user_id, SECRET, 3600).expect("Failed to generate token");

        // Tamper with the signature segment
        let tampered = format!("{}X", token);
        let result = validate_jwt(&tampered, SECRET);

        assert!(matches!(
            result.unwrap_err(),
            TokenError::InvalidSignature | TokenError::Malformed
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let user_id = Uuid::new_v4();

        let token = make_jwt(&user_id, SECRET, 3600).expect("Failed to generate token");

        // Flip one character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let payload = parts[1].clone();
        let flipped = if payload.ends_with('A') { "B" } else { "A" };
        parts[1] = format!("{}{}", &payload[..payload.len() - 1], flipped);
        let mutated = parts.join(".");

        assert!(validate_jwt(&mutated, SECRET).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let user_id = Uuid::new_v4();

        let token = make_jwt(&user_id, SECRET, 3600).expect("Failed to generate token");
        let result = validate_jwt(&token, "a-completely-different-secret-key-here");

        assert_eq!(result.unwrap_err(), TokenError::InvalidSignature);
    }

    #[test]
    fn test_expired_token() {
        let user_id = Uuid::new_v4();

        let token = make_jwt(&user_id, SECRET, -1).expect("Failed to generate token");
        let result = validate_jwt(&token, SECRET);

        assert_eq!(result.unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_zero_ttl_is_already_expired() {
        let user_id = Uuid::new_v4();

        let token = make_jwt(&user_id, SECRET, 0).expect("Failed to generate token");
        let result = validate_jwt(&token, SECRET);

        assert_eq!(result.unwrap_err(), TokenError::Expired);
    }
}
