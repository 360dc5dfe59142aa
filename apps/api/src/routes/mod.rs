pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::advisors::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/flows", get(handlers::handle_list_flows))
        .route("/api/v1/flows/:name", post(handlers::handle_invoke_flow))
        .route(
            "/api/v1/flows/chatbot/users/:user_id",
            post(handlers::handle_chatbot_for_user),
        )
        .with_state(state)
}
