use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect},
};

use crate::{auth, error::AppError, models::LoginForm, AppState};

// Handler for POST /login: exchanges the Firebase ID token from the login
// form for an app session.
pub async fn handle_login(
    State(app_state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    match auth::verify_token(&form.id_token, &app_state.settings, &app_state.http_client).await {
        Ok(claims) => {
            tracing::info!("Token verified successfully for user_id: {}", claims.sub);
            Ok(Redirect::to("/app"))
        }
        Err(e) => {
            tracing::error!("Token verification failed: {:?}", e);
            Err(e)
        }
    }
}
