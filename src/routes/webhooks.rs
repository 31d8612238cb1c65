/// Webhook Routes
///
/// Inbound notifications from the payment provider, authenticated with a
/// shared API key (`Authorization: ApiKey <key>`), not a user token.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extract_api_key;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, ErrorContext, StoreError, ValidationError};
use crate::storage::Stores;

const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: String,
}

/// POST /webhooks/premium
///
/// Handle a `user.upgraded` event by marking the user premium.
///
/// # Errors
/// - 400: `user_id` is not a valid UUID
/// - 401: Missing, malformed, or wrong API key
/// - 404: Unrecognized event, or no such user
/// - 500: Internal server error
pub async fn premium_webhook(
    request: HttpRequest,
    form: web::Json<WebhookRequest>,
    stores: web::Data<Stores>,
    auth_settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("premium_webhook");

    let api_key = extract_api_key(request.headers()).map_err(AuthError::from)?;
    if !api_key.eq_ignore_ascii_case(&auth_settings.webhook_api_key) {
        tracing::warn!(
            request_id = %context.request_id,
            "Webhook call with wrong API key"
        );
        return Err(AuthError::InvalidCredentials.into());
    }

    if form.event != USER_UPGRADED_EVENT {
        return Err(AppError::Store(StoreError::NotFound(
            "event handler".to_string(),
        )));
    }

    let user_id = Uuid::parse_str(&form.data.user_id).map_err(|_| {
        AppError::Validation(ValidationError::InvalidFormat("user id".to_string()))
    })?;

    stores.credentials.set_premium(user_id, true).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "User upgraded to premium"
    );

    Ok(HttpResponse::NoContent().finish())
}
