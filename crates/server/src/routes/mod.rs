pub mod auth;
pub mod dashboard;
pub mod grade;
pub mod health;
pub mod root;

use crate::doc::ApiDoc;
use axum::{
    Router,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/student", get(dashboard::student_dashboard))
        .route("/instructor", get(dashboard::instructor_dashboard))
        .route(
            "/grades",
            post(grade::create_grade).put(grade::upsert_grade),
        )
        .route("/grades/{student_id}/{course_id}", delete(grade::delete_grade))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()))
        .with_state(state)
}
