mod auth;
mod health_check;
mod messages;
mod webhooks;

pub use auth::{get_current_user, login, refresh, register, revoke, update_password};
pub use health_check::health_check;
pub use messages::{create_message, delete_message, get_message, list_messages};
pub use webhooks::premium_webhook;
