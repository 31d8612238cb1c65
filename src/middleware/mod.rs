/// Middleware module
///
/// Custom middleware for authentication and other cross-cutting concerns.

mod auth_middleware;

pub use auth_middleware::AuthenticatedUser;
pub use auth_middleware::AuthMiddleware;
