/// Authentication module
///
/// Handles JWT minting/validation, password hashing, bearer-header
/// parsing, refresh-token lifecycle, and session orchestration.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use bearer::extract_api_key;
pub use bearer::extract_bearer_token;
pub use claims::Claims;
pub use jwt::make_jwt;
pub use jwt::validate_jwt;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::refresh_token_expiry;
pub use refresh_token::RefreshTokenState;
pub use refresh_token::StoredRefreshToken;
pub use refresh_token::REFRESH_TOKEN_LIFETIME_DAYS;
pub use session::Session;
pub use session::SessionManager;
