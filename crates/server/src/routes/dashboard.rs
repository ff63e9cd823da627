use super::AppState;
use crate::{
    dtos::dashboard::{EmailQuery, InstructorDashboardResponse, StudentDashboardResponse},
    error::{ApiError, ErrorResponse},
};
use axum::{
    Json,
    extract::{Query, State},
};
use database::{ServiceError, services::dashboard::DashboardService};

fn required_email(query: EmailQuery) -> Result<String, ApiError> {
    query
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| ServiceError::validation("email", "Email parameter required.").into())
}

/// Grades, GPA and course totals of a student
#[utoipa::path(
    get,
    path = "/student",
    params(EmailQuery),
    responses(
        (status = 200, description = "Student dashboard", body = StudentDashboardResponse),
        (status = 400, description = "Missing email parameter", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Dashboards"
)]
pub async fn student_dashboard(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<StudentDashboardResponse>, ApiError> {
    let email = required_email(query)?;
    let dashboard = DashboardService::student_view(&state.db, &email).await?;

    Ok(Json(dashboard.into()))
}

/// Courses taught by an instructor with every enrollment record in them
#[utoipa::path(
    get,
    path = "/instructor",
    params(EmailQuery),
    responses(
        (status = 200, description = "Instructor dashboard", body = InstructorDashboardResponse),
        (status = 400, description = "Missing email parameter", body = ErrorResponse),
        (status = 403, description = "Email is outside the instructor domain", body = ErrorResponse),
        (status = 404, description = "Instructor not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Dashboards"
)]
pub async fn instructor_dashboard(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<InstructorDashboardResponse>, ApiError> {
    let email = required_email(query)?;
    let dashboard = DashboardService::instructor_view(&state.db, &email).await?;

    Ok(Json(dashboard.into()))
}
