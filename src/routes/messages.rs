/// Message Routes
///
/// Public listing and lookup, authenticated posting and deletion.
/// Message bodies are length-limited and profanity-scrubbed before storage.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, ErrorContext, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::storage::{Message, Stores};
use crate::validators::{scrub_profanity, validate_message_body};

/// Message creation request
#[derive(Deserialize)]
pub struct CreateMessageRequest {
    pub body: String,
}

/// Listing filters
#[derive(Deserialize)]
pub struct ListMessagesQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

/// Message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub body: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            body: message.body,
            user_id: message.user_id.to_string(),
            created_at: message.created_at.to_rfc3339(),
            updated_at: message.updated_at.to_rfc3339(),
        }
    }
}

fn parse_message_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::Validation(ValidationError::InvalidFormat("message id".to_string())))
}

/// POST /api/messages
///
/// Create a message for the authenticated user. The body is limited to
/// 140 characters and profane words are replaced with asterisks.
///
/// # Errors
/// - 400: Body over the length limit
/// - 401: Missing or invalid token (handled by middleware)
/// - 500: Internal server error
pub async fn create_message(
    user: web::ReqData<AuthenticatedUser>,
    form: web::Json<CreateMessageRequest>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("message_creation");

    validate_message_body(&form.body)?;
    let clean_body = scrub_profanity(&form.body);

    let message = stores.messages.create_message(user.0, &clean_body).await?;

    tracing::info!(
        request_id = %context.request_id,
        message_id = %message.id,
        user_id = %message.user_id,
        "Message created"
    );

    Ok(HttpResponse::Created().json(MessageResponse::from(message)))
}

/// GET /messages
///
/// List messages, oldest first. `author_id` restricts to one author;
/// `sort=desc` reverses the order.
///
/// # Errors
/// - 400: `author_id` is not a valid UUID
/// - 500: Internal server error
pub async fn list_messages(
    query: web::Query<ListMessagesQuery>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let author = match query.author_id.as_deref() {
        Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| {
            AppError::Validation(ValidationError::InvalidFormat("author id".to_string()))
        })?),
        None => None,
    };

    let messages = stores.messages.list_messages(author).await?;

    let mut responses: Vec<MessageResponse> =
        messages.into_iter().map(MessageResponse::from).collect();
    if query.sort.as_deref() == Some("desc") {
        responses.reverse();
    }

    Ok(HttpResponse::Ok().json(responses))
}

/// GET /messages/{id}
///
/// # Errors
/// - 400: `id` is not a valid UUID
/// - 404: No such message
/// - 500: Internal server error
pub async fn get_message(
    path: web::Path<String>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let message_id = parse_message_id(&path)?;

    let message = stores.messages.message_by_id(message_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::from(message)))
}

/// DELETE /api/messages/{id}
///
/// Delete one of the authenticated user's own messages.
///
/// # Errors
/// - 400: `id` is not a valid UUID
/// - 401: Missing or invalid token (handled by middleware)
/// - 403: Message belongs to another user
/// - 404: No such message
/// - 500: Internal server error
pub async fn delete_message(
    user: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("message_deletion");
    let message_id = parse_message_id(&path)?;

    let message = stores.messages.message_by_id(message_id).await?;

    if message.user_id != user.0 {
        tracing::warn!(
            request_id = %context.request_id,
            message_id = %message_id,
            user_id = %user.0,
            "Attempt to delete another user's message"
        );
        return Err(AppError::Forbidden(
            "message belongs to another user".to_string(),
        ));
    }

    stores.messages.delete_message(message_id).await?;

    tracing::info!(
        request_id = %context.request_id,
        message_id = %message_id,
        "Message deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
