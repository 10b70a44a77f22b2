// Handlers for backend API endpoints

use axum::{
    extract::{Json as JsonExtract, Path, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;

use crate::{
    auth::AuthenticatedUser,
    catalog,
    error::AppError,
    models::{AiResponse, FilterCriteria, Product, VehicleProfile},
    schema::AttributeDef,
    search::{run_search, SearchOutcome, SearchSession},
    suggester, vehicles,
};

use crate::AppState;

// --- Request / Response shapes ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    query: String,
    #[serde(flatten)]
    criteria: FilterCriteria,
    // The app sends its locally-registered vehicle inline; when absent and
    // the user is signed in, the stored profile is used instead.
    vehicle: Option<VehicleProfile>,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    count: usize,
    reasoning: Option<String>,
    products: Vec<Product>,
}

#[derive(Serialize)]
struct VehicleResponse {
    success: bool,
    vehicle: Option<VehicleProfile>,
    error: Option<String>,
}

#[derive(Serialize)]
struct GenericResponse {
    success: bool,
    message: Option<String>,
    error: Option<String>,
}

// --- Search ---

pub async fn search_products(
    State(app_state): State<AppState>,
    user: Option<AuthenticatedUser>,
    JsonExtract(request): JsonExtract<SearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(query = %request.query, "API call: search");

    let vehicle = resolve_vehicle(&app_state, user.as_ref(), &request).await;

    // The catalog snapshot and the AI suggestion have no data dependency;
    // fetch them concurrently.
    let catalog_fut = catalog::fetch_all_products(&app_state.settings);
    let suggestion_fut = fetch_suggestion_if_allowed(&app_state, user.as_ref(), &request, vehicle.as_ref());
    let (catalog_result, ai) = futures::join!(catalog_fut, suggestion_fut);

    let catalog = match catalog_result {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to load catalog snapshot: {:?}", e);
            return Err(AppError::InternalServerError(
                e.context("Failed to load product catalog"),
            ));
        }
    };

    let session = SearchSession {
        query: request.query,
        criteria: request.criteria,
        vehicle,
    };

    // A pipeline panic renders as "no filtering applied", never an empty
    // screen or a 500.
    let outcome = match std::panic::catch_unwind(AssertUnwindSafe(|| {
        run_search(&catalog, &session, &ai)
    })) {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!("Search pipeline panicked; returning unfiltered catalog");
            SearchOutcome {
                match_count: catalog.len(),
                products: catalog,
                reasoning: None,
            }
        }
    };

    tracing::info!(count = outcome.match_count, "Search complete");
    Ok(Json(SearchResponse {
        success: true,
        count: outcome.match_count,
        reasoning: outcome.reasoning,
        products: outcome.products,
    }))
}

// The inline vehicle wins; a signed-in user with the toggle on falls back
// to the stored profile. A failed profile lookup degrades to no vehicle
// context rather than failing the search.
async fn resolve_vehicle(
    app_state: &AppState,
    user: Option<&AuthenticatedUser>,
    request: &SearchRequest,
) -> Option<VehicleProfile> {
    if let Some(vehicle) = &request.vehicle {
        return Some(vehicle.clone());
    }
    if !request.criteria.use_my_vehicle {
        return None;
    }
    let user = user?;
    match catalog::get_vehicle_profile(&user.user_id, &app_state.settings).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(user = %user.user_id, error = %e, "Vehicle profile lookup failed; searching without it");
            None
        }
    }
}

// The suggestion runs only for non-blank queries, and per-user settings
// can turn it off. Every failure degrades to the empty response.
async fn fetch_suggestion_if_allowed(
    app_state: &AppState,
    user: Option<&AuthenticatedUser>,
    request: &SearchRequest,
    vehicle: Option<&VehicleProfile>,
) -> AiResponse {
    if request.query.trim().is_empty() {
        return AiResponse::default();
    }

    if let Some(user) = user {
        match catalog::get_user_settings(&user.user_id, &app_state.settings).await {
            Ok(Some(settings)) if settings.can_use_ai == Some(false) => {
                tracing::debug!(user = %user.user_id, "AI suggestions disabled for user");
                return AiResponse::default();
            }
            Err(e) => {
                tracing::warn!(user = %user.user_id, error = %e, "User settings lookup failed; allowing suggestion");
            }
            _ => {}
        }
    }

    suggester::fetch_suggestion(
        &app_state.http_client,
        &app_state.settings,
        &request.query,
        vehicle,
    )
    .await
}

// --- Vehicle reference table ---

pub async fn get_makes() -> impl IntoResponse {
    Json(vehicles::all_makes())
}

pub async fn get_models(Path(make): Path<String>) -> Result<impl IntoResponse, AppError> {
    tracing::info!("API call: get_models for make: {}", make);
    match vehicles::models_for_make(&make) {
        Some(models) => Ok(Json(models.to_vec())),
        None => Err(AppError::NotFound(format!("Unknown make: {}", make))),
    }
}

// --- Filter schema ---

pub async fn get_categories(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.schema.category_names())
}

pub async fn get_category_filters(
    State(app_state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<AttributeDef>>, AppError> {
    match app_state.schema.category_attributes(&category) {
        Some(attrs) => Ok(Json(attrs.to_vec())),
        None => Err(AppError::NotFound(format!("Unknown category: {}", category))),
    }
}

pub async fn get_component_filters(
    State(app_state): State<AppState>,
    Path(component): Path<String>,
) -> Result<Json<Vec<AttributeDef>>, AppError> {
    match app_state.schema.component_attributes(&component) {
        Some(attrs) => Ok(Json(attrs.to_vec())),
        None => Err(AppError::NotFound(format!("Unknown component: {}", component))),
    }
}

// --- Per-user documents ---

pub async fn get_vehicle(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let user_id = &authenticated_user.user_id;
    tracing::info!("API call: get_vehicle for user: {}", user_id);

    match catalog::get_vehicle_profile(user_id, &app_state.settings).await {
        Ok(vehicle) => Ok(Json(VehicleResponse {
            success: true,
            vehicle,
            error: None,
        })),
        Err(e) => {
            tracing::error!("Failed to get vehicle profile: {}", e);
            Ok(Json(VehicleResponse {
                success: false,
                vehicle: None,
                error: Some(format!("Failed to retrieve vehicle: {}", e)),
            }))
        }
    }
}

pub async fn save_vehicle(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    JsonExtract(profile): JsonExtract<VehicleProfile>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = &authenticated_user.user_id;
    tracing::info!("API call: save_vehicle for user: {}", user_id);

    match catalog::save_vehicle_profile(user_id, &profile, &app_state.settings).await {
        Ok(()) => Ok(Json(GenericResponse {
            success: true,
            message: Some("Vehicle saved successfully.".to_string()),
            error: None,
        })),
        Err(e) => {
            tracing::error!("Failed to save vehicle profile: {}", e);
            Err(AppError::InternalServerError(e.context("Failed to save vehicle profile")))
        }
    }
}

pub async fn get_settings(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let user_id = &authenticated_user.user_id;
    tracing::info!("API call: get_settings for user: {}", user_id);

    let settings = catalog::get_user_settings(user_id, &app_state.settings)
        .await
        .map_err(|e| AppError::InternalServerError(e.context("Failed to get user settings")))?;

    Ok(Json(settings))
}
