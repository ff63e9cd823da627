use super::to_f64;
use chrono::NaiveDateTime;
use database::entities::grades;
use models::Scores;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Scores for one (student, course) pair; omitted scores are left untouched on update
#[derive(Debug, Deserialize, ToSchema)]
pub struct GradeRequest {
    pub student_id: Uuid,
    pub course_id: Uuid,
    #[schema(value_type = Option<f64>, example = 85.5)]
    pub assignment_score: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub midterm_score: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub final_score: Option<Decimal>,
}

impl GradeRequest {
    pub fn scores(&self) -> Scores {
        Scores::new(self.assignment_score, self.midterm_score, self.final_score)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct GradeKey {
    pub student_id: Uuid,
    pub course_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GradeResponse {
    pub id: i32,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub assignment_score: Option<f64>,
    pub midterm_score: Option<f64>,
    pub final_score: Option<f64>,
    /// Present only once all three scores are
    pub final_grade: Option<f64>,
    pub letter_grade: Option<String>,
    pub grade_point: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<grades::Model> for GradeResponse {
    fn from(record: grades::Model) -> Self {
        Self {
            id: record.id,
            student_id: record.student_id,
            course_id: record.course_id,
            assignment_score: record.assignment_score.map(to_f64),
            midterm_score: record.midterm_score.map(to_f64),
            final_score: record.final_score.map(to_f64),
            final_grade: record.final_grade.map(to_f64),
            letter_grade: record.letter_grade.map(|letter| letter.to_string()),
            grade_point: record.grade_point().map(to_f64),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
