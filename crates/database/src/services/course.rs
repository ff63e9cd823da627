use crate::{
    entities::{courses, grades},
    error::{ServiceError, ServiceResult, is_unique_violation},
    services::profile::ProfileService,
};
use chrono::Utc;
use models::{Credits, Major, Role, Semester, grading};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Input for a new catalog entry
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub credits: i32,
    pub semester: i16,
    pub major: Major,
    #[serde(default)]
    pub instructor_id: Option<Uuid>,
}

pub struct CourseService;

impl CourseService {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        course: NewCourse,
    ) -> ServiceResult<courses::Model> {
        let code = course.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(ServiceError::validation("code", "Course code is required."));
        }
        let name = course.name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("name", "Course name is required."));
        }

        let credits = Credits::try_from(course.credits)?;
        let semester = Semester::try_from(course.semester)?;

        if let Some(instructor_id) = course.instructor_id {
            ProfileService::require_role(db, instructor_id, Role::Instructor).await?;
        }

        if Self::find_by_code(db, &code).await?.is_some() {
            return Err(ServiceError::DuplicateCourse(code));
        }

        let now = Utc::now().naive_utc();
        let model = courses::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.clone()),
            name: Set(name.to_owned()),
            description: Set(course.description.filter(|d| !d.trim().is_empty())),
            credits: Set(credits),
            semester: Set(semester.into()),
            major: Set(course.major),
            instructor_id: Set(course.instructor_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(db).await.map_err(|err| {
            if is_unique_violation(&err) {
                ServiceError::DuplicateCourse(code.clone())
            } else {
                err.into()
            }
        })?;

        log::info!("Created course {} ({})", created.code, credits);
        Ok(created)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        course_id: Uuid,
    ) -> ServiceResult<Option<courses::Model>> {
        Ok(courses::Entity::find_by_id(course_id).one(db).await?)
    }

    /// Course codes are stored upper-cased
    pub async fn find_by_code<C: ConnectionTrait>(
        db: &C,
        code: &str,
    ) -> ServiceResult<Option<courses::Model>> {
        Ok(courses::Entity::find()
            .filter(courses::Column::Code.eq(code.trim().to_uppercase()))
            .one(db)
            .await?)
    }

    /// Like `find_by_id`, but a missing course is an error
    pub async fn require<C: ConnectionTrait>(
        db: &C,
        course_id: Uuid,
    ) -> ServiceResult<courses::Model> {
        Self::find_by_id(db, course_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Course {course_id}")))
    }

    /// Batch lookup keyed by course id
    pub async fn find_many<C: ConnectionTrait>(
        db: &C,
        course_ids: Vec<Uuid>,
    ) -> ServiceResult<HashMap<Uuid, courses::Model>> {
        if course_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let found = courses::Entity::find()
            .filter(courses::Column::Id.is_in(course_ids))
            .all(db)
            .await?;

        Ok(found.into_iter().map(|course| (course.id, course)).collect())
    }

    /// Every course taught by an instructor, by semester then code
    pub async fn list_by_instructor<C: ConnectionTrait>(
        db: &C,
        instructor_id: Uuid,
    ) -> ServiceResult<Vec<courses::Model>> {
        Ok(courses::Entity::find()
            .filter(courses::Column::InstructorId.eq(instructor_id))
            .order_by_asc(courses::Column::Semester)
            .order_by_asc(courses::Column::Code)
            .all(db)
            .await?)
    }

    /// Sets or clears the instructor of a course
    pub async fn assign_instructor<C: ConnectionTrait>(
        db: &C,
        course_id: Uuid,
        instructor_id: Option<Uuid>,
    ) -> ServiceResult<courses::Model> {
        let course = Self::require(db, course_id).await?;

        if let Some(instructor_id) = instructor_id {
            ProfileService::require_role(db, instructor_id, Role::Instructor).await?;
        }

        let mut course = course.into_active_model();
        course.instructor_id = Set(instructor_id);
        course.updated_at = Set(Utc::now().naive_utc());

        Ok(course.update(db).await?)
    }

    /// Number of enrollment records in a course, graded or not
    pub async fn total_students<C: ConnectionTrait>(db: &C, course_id: Uuid) -> ServiceResult<u64> {
        Ok(grades::Entity::find()
            .filter(grades::Column::CourseId.eq(course_id))
            .count(db)
            .await?)
    }

    /// Mean final grade over the graded records of a course
    pub async fn average_grade<C: ConnectionTrait>(
        db: &C,
        course_id: Uuid,
    ) -> ServiceResult<Option<Decimal>> {
        let final_grades: Vec<Option<Decimal>> = grades::Entity::find()
            .select_only()
            .column(grades::Column::FinalGrade)
            .filter(grades::Column::CourseId.eq(course_id))
            .filter(grades::Column::FinalGrade.is_not_null())
            .into_tuple()
            .all(db)
            .await?;

        Ok(grading::average(final_grades.into_iter().flatten()))
    }
}
