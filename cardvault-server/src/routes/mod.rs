use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod cards;
mod health;

pub fn router(state: AppState) -> Router {
    // One byte of headroom so oversized content reaches the engine and gets a JSON 413
    let body_limit = state.engine.max_content_size().saturating_add(1);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/escalation", get(health::escalation))
        .route("/cards", post(cards::create_card).get(cards::list_cards))
        .route("/cards/lookup", post(cards::lookup_content))
        .route(
            "/cards/{digest}",
            get(cards::get_card).delete(cards::delete_card),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
