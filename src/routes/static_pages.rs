use askama::Template;
use axum::response::{Html, IntoResponse};

use crate::error::AppError;

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate;

#[derive(Template)]
#[template(path = "index.html")]
struct AppTemplate;

pub async fn landing_page() -> Result<impl IntoResponse, AppError> {
    render(LandingTemplate)
}

pub async fn login_page() -> Result<impl IntoResponse, AppError> {
    render(LoginTemplate)
}

pub async fn app_page() -> Result<impl IntoResponse, AppError> {
    render(AppTemplate)
}

fn render<T: Template>(template: T) -> Result<Html<String>, AppError> {
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render template: {}", e);
            Err(AppError::InternalServerError(anyhow::Error::new(e)))
        }
    }
}
