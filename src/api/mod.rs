pub mod handlers;

use axum::{routing::post, Router};
use std::sync::Arc;

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/build", post(handlers::handle_build))
        .route("/interpret", post(handlers::handle_interpret))
        .route("/auction", post(handlers::handle_auction))
        .route("/usersync", post(handlers::handle_user_sync))
        .with_state(state)
}
