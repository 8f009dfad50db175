//! Centralized route configuration for the agenthub API.
//!
//! This module provides a shared function to configure all application routes,
//! allowing both the main server and test servers to use the same routing setup.

use crate::handlers::{agent_handlers, category_handlers, chat_handlers, main_handlers};
use actix_web::web;

/// Configures all application routes for the given scope.
///
/// The directory listing and category reference data are public; everything
/// else resolves the caller's identity explicitly inside the handler.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(main_handlers::health_check))
            .route(
                "/categories",
                web::get().to(category_handlers::list_categories),
            )
            .route("/agents", web::get().to(agent_handlers::list_agents))
            .route("/agents", web::post().to(agent_handlers::create_agent))
            .route(
                "/agents/{id}",
                web::get().to(chat_handlers::get_conversation),
            )
            .route("/agents/{id}", web::patch().to(agent_handlers::update_agent))
            .route(
                "/agents/{id}",
                web::delete().to(agent_handlers::delete_agent),
            )
            .route(
                "/agents/{id}/messages",
                web::post().to(chat_handlers::append_message),
            ),
    );
}
