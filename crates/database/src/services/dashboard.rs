//! Read views for the student and instructor dashboards.
//!
//! Callers identify themselves with an email parameter only; nothing here is
//! bound to an authenticated session.

use crate::{
    entities::{courses, grades, users},
    error::{ServiceError, ServiceResult},
    services::{
        course::CourseService, gpa::GpaService, grade::GradeService, profile::ProfileService,
    },
};
use models::{Credits, GpaSummary, LetterGrade, Major, Role, email};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, prelude::DateTime};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub major: Option<Major>,
    pub role: Role,
}

impl From<&users::Model> for ProfileSummary {
    fn from(profile: &users::Model) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            major: profile.major,
            role: profile.role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StudentStatistics {
    /// Graded and ungraded records alike
    pub total_courses: usize,
    /// Graded records only
    pub total_credits: u32,
    pub gpa: Decimal,
}

impl From<GpaSummary> for StudentStatistics {
    fn from(summary: GpaSummary) -> Self {
        Self {
            total_courses: summary.total_courses,
            total_credits: summary.total_credits,
            gpa: summary.gpa,
        }
    }
}

/// One enrollment record joined with its course and people
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeRow {
    pub id: i32,
    pub course_id: Uuid,
    pub course_code: String,
    pub course_name: String,
    pub course_credits: Credits,
    pub instructor_name: Option<String>,
    pub student_id: Uuid,
    pub student_name: String,
    pub assignment_score: Option<Decimal>,
    pub midterm_score: Option<Decimal>,
    pub final_score: Option<Decimal>,
    pub final_grade: Option<Decimal>,
    pub letter_grade: Option<LetterGrade>,
    pub grade_point: Option<Decimal>,
    pub created_at: DateTime,
}

impl GradeRow {
    fn new(
        record: &grades::Model,
        course: &courses::Model,
        instructor_name: Option<String>,
        student_name: String,
    ) -> Self {
        Self {
            id: record.id,
            course_id: course.id,
            course_code: course.code.clone(),
            course_name: course.name.clone(),
            course_credits: course.credits,
            instructor_name,
            student_id: record.student_id,
            student_name,
            assignment_score: record.assignment_score,
            midterm_score: record.midterm_score,
            final_score: record.final_score,
            final_grade: record.final_grade,
            letter_grade: record.letter_grade,
            grade_point: record.grade_point(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDashboard {
    pub profile: ProfileSummary,
    pub statistics: StudentStatistics,
    pub grades: Vec<GradeRow>,
}

/// A taught course with its class statistics and every record in it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseOverview {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: Credits,
    pub semester: i16,
    pub major: Major,
    pub total_students: u64,
    pub average_grade: Option<Decimal>,
    pub grades: Vec<GradeRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructorDashboard {
    pub profile: ProfileSummary,
    pub courses: Vec<CourseOverview>,
}

pub struct DashboardService;

impl DashboardService {
    pub async fn student_view<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> ServiceResult<StudentDashboard> {
        let profile = ProfileService::find_by_email_and_role(db, email, Role::Student)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Student {}", email::normalize(email))))?;

        let records = GradeService::list_by_student(db, profile.id).await?;
        let courses =
            CourseService::find_many(db, records.iter().map(|record| record.course_id).collect())
                .await?;
        let instructor_names = ProfileService::names_by_id(
            db,
            courses
                .values()
                .filter_map(|course| course.instructor_id)
                .collect(),
        )
        .await?;

        let statistics = GpaService::from_records(&records, &courses).into();

        let grades = records
            .iter()
            .filter_map(|record| {
                let course = courses.get(&record.course_id)?;
                let instructor_name = course
                    .instructor_id
                    .and_then(|id| instructor_names.get(&id).cloned());

                Some(GradeRow::new(
                    record,
                    course,
                    instructor_name,
                    profile.full_name.clone(),
                ))
            })
            .collect();

        Ok(StudentDashboard {
            profile: ProfileSummary::from(&profile),
            statistics,
            grades,
        })
    }

    /// The domain check runs before any lookup, so a foreign address learns nothing
    pub async fn instructor_view<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> ServiceResult<InstructorDashboard> {
        if !email::is_instructor_domain(email) {
            log::warn!("Rejected instructor dashboard request for {}", email::normalize(email));
            return Err(ServiceError::Forbidden(
                "Only instructors can access this dashboard.".to_owned(),
            ));
        }

        let profile = ProfileService::find_by_email_and_role(db, email, Role::Instructor)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Instructor {}", email::normalize(email)))
            })?;

        let taught = CourseService::list_by_instructor(db, profile.id).await?;
        let records =
            GradeService::list_by_courses(db, taught.iter().map(|course| course.id).collect())
                .await?;
        let student_names = ProfileService::names_by_id(
            db,
            records.iter().map(|record| record.student_id).collect(),
        )
        .await?;

        let mut records_by_course: HashMap<Uuid, Vec<grades::Model>> = HashMap::new();
        for record in records {
            records_by_course
                .entry(record.course_id)
                .or_default()
                .push(record);
        }

        let mut courses = Vec::with_capacity(taught.len());
        for course in taught {
            let total_students = CourseService::total_students(db, course.id).await?;
            let average_grade = CourseService::average_grade(db, course.id).await?;

            let grades = records_by_course
                .remove(&course.id)
                .unwrap_or_default()
                .iter()
                .map(|record| {
                    let student_name = student_names
                        .get(&record.student_id)
                        .cloned()
                        .unwrap_or_default();
                    GradeRow::new(record, &course, Some(profile.full_name.clone()), student_name)
                })
                .collect();

            courses.push(CourseOverview {
                id: course.id,
                code: course.code,
                name: course.name,
                description: course.description,
                credits: course.credits,
                semester: course.semester,
                major: course.major,
                total_students,
                average_grade,
                grades,
            });
        }

        Ok(InstructorDashboard {
            profile: ProfileSummary::from(&profile),
            courses,
        })
    }
}
