pub mod api;
pub mod health;
pub mod pages;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Web pages
        .route("/", get(pages::handle_home))
        .route("/image", get(pages::handle_image))
        .route("/data", get(pages::handle_data))
        .route("/about", get(pages::handle_about))
        // Web service
        .route("/json-dataset", get(api::handle_json_dataset))
        .route("/json-stats", get(api::handle_json_stats))
        .with_state(state)
}
