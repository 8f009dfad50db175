use super::main_handlers::AppState;
use crate::auth::AuthResult;
use crate::error::{AppError, AppResult};
use agenthub_models::{
    Agent, AgentListQuery, AgentListResponse, AgentResponse, CreateAgentRequest,
    UpdateAgentRequest, MIN_PROMPT_LEN,
};
use actix_web::{web, HttpResponse, Result};

pub async fn create_agent(
    data: web::Data<AppState>,
    auth: AuthResult,
    request: web::Json<CreateAgentRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require()?;
    let create_req = request.into_inner();

    validate_agent_fields(
        &data,
        &create_req.name,
        &create_req.description,
        &create_req.instructions,
        &create_req.seed,
        &create_req.avatar_ref,
        &create_req.category_id,
    )?;

    let agent = Agent::new(
        identity.id,
        identity.display_name,
        create_req.name,
        create_req.description,
        create_req.instructions,
        create_req.seed,
        create_req.avatar_ref,
        create_req.category_id,
    );

    data.database.create_agent(&agent)?;

    let response = AgentResponse { agent };
    Ok(HttpResponse::Ok().json(response))
}

pub async fn update_agent(
    data: web::Data<AppState>,
    auth: AuthResult,
    path: web::Path<String>,
    request: web::Json<UpdateAgentRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require()?;
    let agent_id = path.into_inner();
    let update_req = request.into_inner();

    validate_agent_fields(
        &data,
        &update_req.name,
        &update_req.description,
        &update_req.instructions,
        &update_req.seed,
        &update_req.avatar_ref,
        &update_req.category_id,
    )?;

    let agent = data
        .database
        .update_agent(&agent_id, &identity.id, &update_req)?;

    let response = AgentResponse { agent };
    Ok(HttpResponse::Ok().json(response))
}

pub async fn delete_agent(
    data: web::Data<AppState>,
    auth: AuthResult,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let identity = auth.require()?;
    let agent_id = path.into_inner();

    let agent = data.database.delete_agent(&agent_id, &identity.id)?;

    let response = AgentResponse { agent };
    Ok(HttpResponse::Ok().json(response))
}

/// Public directory listing; no identity required.
pub async fn list_agents(
    data: web::Data<AppState>,
    query: web::Query<AgentListQuery>,
) -> Result<HttpResponse, AppError> {
    let agents = data
        .database
        .list_agents(query.category_id.as_deref(), query.name.as_deref())?;

    let response = AgentListResponse { agents };
    Ok(HttpResponse::Ok().json(response))
}

/// All fields are required; length minimums apply to the prompt-like fields.
/// Detected here at the boundary, before any persistence attempt.
fn validate_agent_fields(
    data: &web::Data<AppState>,
    name: &str,
    description: &str,
    instructions: &str,
    seed: &str,
    avatar_ref: &str,
    category_id: &str,
) -> AppResult<()> {
    for (field, value) in [
        ("name", name),
        ("description", description),
        ("instructions", instructions),
        ("seed", seed),
        ("avatar_ref", avatar_ref),
        ("category_id", category_id),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::InvalidInput(format!("{field} is required")));
        }
    }

    if instructions.chars().count() < MIN_PROMPT_LEN {
        return Err(AppError::InvalidInput(format!(
            "instructions require at least {MIN_PROMPT_LEN} characters"
        )));
    }

    if seed.chars().count() < MIN_PROMPT_LEN {
        return Err(AppError::InvalidInput(format!(
            "seed requires at least {MIN_PROMPT_LEN} characters"
        )));
    }

    if !data.database.category_exists(category_id)? {
        return Err(AppError::InvalidInput(format!(
            "Unknown category: {category_id}"
        )));
    }

    Ok(())
}
