use super::main_handlers::AppState;
use crate::error::AppError;
use agenthub_models::CategoryListResponse;
use actix_web::{web, HttpResponse, Result};

/// Reference data backing the directory's filter bar and the agent form.
pub async fn list_categories(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = data.database.get_all_categories()?;
    let response = CategoryListResponse { categories };
    Ok(HttpResponse::Ok().json(response))
}
