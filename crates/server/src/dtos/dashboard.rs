use super::to_f64;
use chrono::NaiveDateTime;
use database::services::dashboard::{
    CourseOverview, GradeRow, InstructorDashboard, ProfileSummary, StudentDashboard,
    StudentStatistics,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    /// Email of the profile whose dashboard is requested
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    pub major: Option<String>,
}

impl From<ProfileSummary> for ProfileSummaryResponse {
    fn from(profile: ProfileSummary) -> Self {
        Self {
            id: profile.id,
            name: profile.full_name,
            email: profile.email,
            username: profile.username,
            major: profile.major.map(|major| major.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsResponse {
    pub total_courses: usize,
    pub gpa: f64,
    pub total_credits: u32,
}

impl From<StudentStatistics> for StatisticsResponse {
    fn from(statistics: StudentStatistics) -> Self {
        Self {
            total_courses: statistics.total_courses,
            gpa: to_f64(statistics.gpa),
            total_credits: statistics.total_credits,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GradeRowResponse {
    pub id: i32,
    pub course_id: Uuid,
    pub course_code: String,
    pub course_name: String,
    pub course_credits: u32,
    pub instructor_name: Option<String>,
    pub student_id: Uuid,
    pub student_name: String,
    pub assignment_score: Option<f64>,
    pub midterm_score: Option<f64>,
    pub final_score: Option<f64>,
    pub final_grade: Option<f64>,
    pub letter_grade: Option<String>,
    pub grade_point: Option<f64>,
    pub created_at: NaiveDateTime,
}

impl From<GradeRow> for GradeRowResponse {
    fn from(row: GradeRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            course_code: row.course_code,
            course_name: row.course_name,
            course_credits: row.course_credits.value(),
            instructor_name: row.instructor_name,
            student_id: row.student_id,
            student_name: row.student_name,
            assignment_score: row.assignment_score.map(to_f64),
            midterm_score: row.midterm_score.map(to_f64),
            final_score: row.final_score.map(to_f64),
            final_grade: row.final_grade.map(to_f64),
            letter_grade: row.letter_grade.map(|letter| letter.to_string()),
            grade_point: row.grade_point.map(to_f64),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentDashboardResponse {
    pub student: ProfileSummaryResponse,
    pub statistics: StatisticsResponse,
    pub grades: Vec<GradeRowResponse>,
}

impl From<StudentDashboard> for StudentDashboardResponse {
    fn from(dashboard: StudentDashboard) -> Self {
        Self {
            student: dashboard.profile.into(),
            statistics: dashboard.statistics.into(),
            grades: dashboard.grades.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseOverviewResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: u32,
    pub semester: i16,
    pub major: String,
    pub total_students: u64,
    pub average_grade: Option<f64>,
    pub grades: Vec<GradeRowResponse>,
}

impl From<CourseOverview> for CourseOverviewResponse {
    fn from(course: CourseOverview) -> Self {
        Self {
            id: course.id,
            code: course.code,
            name: course.name,
            description: course.description,
            credits: course.credits.value(),
            semester: course.semester,
            major: course.major.as_str().to_owned(),
            total_students: course.total_students,
            average_grade: course.average_grade.map(to_f64),
            grades: course.grades.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InstructorDashboardResponse {
    pub instructor: ProfileSummaryResponse,
    pub courses: Vec<CourseOverviewResponse>,
}

impl From<InstructorDashboard> for InstructorDashboardResponse {
    fn from(dashboard: InstructorDashboard) -> Self {
        Self {
            instructor: dashboard.profile.into(),
            courses: dashboard.courses.into_iter().map(Into::into).collect(),
        }
    }
}
