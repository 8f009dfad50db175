use super::main_handlers::AppState;
use crate::auth::AuthResult;
use crate::error::AppError;
use agenthub_models::{
    AppendMessageRequest, ConversationResponse, MessageResponse, MessageRole,
};
use actix_web::{web, HttpResponse, Result};

/// Fetches the agent plus the caller's own transcript, oldest first. The
/// greeting is synthesized on every fetch and never stored.
pub async fn get_conversation(
    data: web::Data<AppState>,
    auth: AuthResult,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require()?;
    let agent_id = path.into_inner();

    let agent = data.database.get_agent_by_id(&agent_id)?;
    let messages = data.database.get_messages(&agent_id, &identity.id)?;
    let greeting = agent.greeting();

    let response = ConversationResponse {
        agent,
        greeting,
        messages,
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Appends one turn to the caller's conversation with the agent. Duplicate
/// content is allowed; ordering comes from the store-assigned timestamp.
pub async fn append_message(
    data: web::Data<AppState>,
    auth: AuthResult,
    path: web::Path<String>,
    request: web::Json<AppendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require()?;
    let agent_id = path.into_inner();
    let append_req = request.into_inner();

    if append_req.content.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "content is required".to_string(),
        ));
    }

    let role = append_req.role.unwrap_or(MessageRole::User);

    let message =
        data.database
            .append_message(&agent_id, &identity.id, role, &append_req.content)?;

    tracing::info!(
        "Appended {} message {} to agent {}",
        role.as_str(),
        message.id,
        agent_id
    );

    let response = MessageResponse { message };
    Ok(HttpResponse::Ok().json(response))
}
