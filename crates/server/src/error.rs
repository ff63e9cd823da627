use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::ServiceError;
use serde::Serialize;
use utoipa::ToSchema;

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// A `ServiceError` on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Validation { .. } | ServiceError::InvalidEmailDomain(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::DuplicateEmail(_)
            | ServiceError::DuplicateEnrollment { .. }
            | ServiceError::DuplicateCourse(_) => StatusCode::CONFLICT,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) | ServiceError::RoleMismatch { .. } => StatusCode::NOT_FOUND,
            ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::PasswordHash(_) | ServiceError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            // reads exactly like a missing profile
            ServiceError::RoleMismatch { profile_id, .. } => {
                ServiceError::NotFound(format!("Profile {profile_id}")).to_string()
            }
            ServiceError::PasswordHash(_) | ServiceError::Database(_) => {
                "Internal server error.".to_owned()
            }
            err => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self.0);
        }

        let body = ErrorResponse {
            error: self.message(),
            field: self.0.field().map(str::to_owned),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Role;
    use sea_orm::DbErr;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ServiceError::validation("email", "missing"), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidEmailDomain("x@gmail.com".into()), StatusCode::BAD_REQUEST),
            (ServiceError::DuplicateEmail("a@b".into()), StatusCode::CONFLICT),
            (
                ServiceError::DuplicateEnrollment {
                    student_id: Uuid::nil(),
                    course_id: Uuid::nil(),
                },
                StatusCode::CONFLICT,
            ),
            (ServiceError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (ServiceError::NotFound("Student".into()), StatusCode::NOT_FOUND),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                ServiceError::Database(DbErr::Custom("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn test_role_mismatch_looks_like_not_found() {
        let profile_id = Uuid::new_v4();
        let mismatch = ApiError(ServiceError::RoleMismatch {
            profile_id,
            expected: Role::Student,
        });
        let missing = ApiError(ServiceError::NotFound(format!("Profile {profile_id}")));

        assert_eq!(mismatch.status(), missing.status());
        assert_eq!(mismatch.message(), missing.message());
        assert_eq!(mismatch.0.field(), missing.0.field());
    }

    #[test]
    fn test_database_details_are_hidden() {
        let err = ApiError(ServiceError::Database(DbErr::Custom("secret dsn".into())));
        assert!(!err.message().contains("secret"));
    }
}
