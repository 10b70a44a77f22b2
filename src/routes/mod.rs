// Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

mod api;
mod auth;
mod static_pages;

pub fn create_router(app_state: AppState) -> Router {
    // API routes; handlers expect AppState via the State extractor.
    let api_router = Router::new()
        .route("/search", post(api::search_products))
        .route("/makes", get(api::get_makes))
        .route("/models/:make", get(api::get_models))
        .route("/categories", get(api::get_categories))
        .route("/filters/:category", get(api::get_category_filters))
        .route("/filters/component/:component", get(api::get_component_filters))
        // Routes requiring authentication
        .route("/vehicle", get(api::get_vehicle))
        .route("/vehicle", post(api::save_vehicle))
        .route("/settings", get(api::get_settings))
        .with_state(app_state.clone());

    Router::new()
        // Static page routes (these don't need the AppState)
        .route("/", get(static_pages::landing_page))
        .route("/login", get(static_pages::login_page))
        .route("/app", get(static_pages::app_page))
        // Auth routes (handle_login needs AppState)
        .route("/login", post(auth::handle_login))
        .nest("/api", api_router)
        .with_state(app_state)
}
