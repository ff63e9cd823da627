use models::{CatalogValueError, Role, ScoreError};
use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Every way a records operation can be rejected
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    /// Malformed or out-of-range input
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Email {0} is already in use.")]
    DuplicateEmail(String),

    #[error("Student {student_id} already has a record in course {course_id}.")]
    DuplicateEnrollment { student_id: Uuid, course_id: Uuid },

    #[error("Course code {0} is already in use.")]
    DuplicateCourse(String),

    #[error("Email must be a valid student or instructor email address.")]
    InvalidEmailDomain(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("{0} not found.")]
    NotFound(String),

    /// The profile exists but holds the other role
    #[error("Profile {profile_id} is not a {}.", .expected.as_str())]
    RoleMismatch { profile_id: Uuid, expected: Role },

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Failed to hash password: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Name of the offending input field, for validation failures
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::InvalidEmailDomain(_) | Self::DuplicateEmail(_) => Some("email"),
            _ => None,
        }
    }
}

impl From<ScoreError> for ServiceError {
    fn from(err: ScoreError) -> Self {
        Self::validation(err.field(), err.to_string())
    }
}

impl From<CatalogValueError> for ServiceError {
    fn from(err: CatalogValueError) -> Self {
        let field = match err {
            CatalogValueError::InvalidCredits(_) => "credits",
            CatalogValueError::InvalidSemester(_) => "semester",
        };
        Self::validation(field, err.to_string())
    }
}

/// Whether the store rejected a write because of a unique constraint
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
