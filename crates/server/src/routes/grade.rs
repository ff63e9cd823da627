use super::AppState;
use crate::{
    dtos::grade::{GradeKey, GradeRequest, GradeResponse},
    error::{ApiError, ErrorResponse},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::services::grade::GradeService;

/// Creates the enrollment record of a student in a course
#[utoipa::path(
    post,
    path = "/grades",
    request_body = GradeRequest,
    responses(
        (status = 201, description = "Record created, grades computed when all scores are present", body = GradeResponse),
        (status = 400, description = "Score out of range", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse),
        (status = 409, description = "Student already has a record in this course", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Grades"
)]
pub async fn create_grade(
    State(state): State<AppState>,
    Json(request): Json<GradeRequest>,
) -> Result<(StatusCode, Json<GradeResponse>), ApiError> {
    let record =
        GradeService::create(&state.db, request.student_id, request.course_id, request.scores())
            .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Writes scores onto a student's record in a course, creating it if needed
#[utoipa::path(
    put,
    path = "/grades",
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Record saved and grades recomputed", body = GradeResponse),
        (status = 400, description = "Score out of range", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Grades"
)]
pub async fn upsert_grade(
    State(state): State<AppState>,
    Json(request): Json<GradeRequest>,
) -> Result<Json<GradeResponse>, ApiError> {
    let record =
        GradeService::upsert(&state.db, request.student_id, request.course_id, request.scores())
            .await?;

    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/grades/{student_id}/{course_id}",
    params(GradeKey),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Grades"
)]
pub async fn delete_grade(
    State(state): State<AppState>,
    Path(key): Path<GradeKey>,
) -> Result<StatusCode, ApiError> {
    GradeService::delete(&state.db, key.student_id, key.course_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
