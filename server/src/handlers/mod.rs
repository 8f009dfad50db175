// Main handlers (system/health handlers)
pub mod main_handlers;
pub use main_handlers::AppState;

// Agent directory handlers module
pub mod agent_handlers;

// Conversation handlers module
pub mod chat_handlers;

// Category reference data handlers module
pub mod category_handlers;
