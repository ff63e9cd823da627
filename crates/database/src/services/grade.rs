use crate::{
    entities::grades,
    error::{ServiceError, ServiceResult, is_unique_violation},
    services::{course::CourseService, profile::ProfileService},
};
use chrono::{NaiveDateTime, Utc};
use models::{Role, Scores};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    /// A record for the pair must not exist yet
    Create,
    /// Update the pair's record in place, creating it when missing
    Upsert,
}

pub struct GradeService;

impl GradeService {
    /// Creates the enrollment record of a (student, course) pair
    pub async fn create<C: TransactionTrait>(
        db: &C,
        student_id: Uuid,
        course_id: Uuid,
        scores: Scores,
    ) -> ServiceResult<grades::Model> {
        Self::write(db, student_id, course_id, scores, WriteMode::Create).await
    }

    /// Writes the scores present in `scores` onto the pair's record, creating it if needed
    pub async fn upsert<C: TransactionTrait>(
        db: &C,
        student_id: Uuid,
        course_id: Uuid,
        scores: Scores,
    ) -> ServiceResult<grades::Model> {
        retry_after_insert_race(move || {
            Self::write(db, student_id, course_id, scores, WriteMode::Upsert)
        })
        .await
    }

    /// Validates, merges and recomputes the derived grades in one transaction
    async fn write<C: TransactionTrait>(
        db: &C,
        student_id: Uuid,
        course_id: Uuid,
        scores: Scores,
        mode: WriteMode,
    ) -> ServiceResult<grades::Model> {
        scores.validate()?;

        let txn = db.begin().await?;

        ProfileService::require_role(&txn, student_id, Role::Student).await?;
        CourseService::require(&txn, course_id).await?;

        // Serializes writers of the same pair; other pairs are not blocked
        let existing = Self::pair(student_id, course_id)
            .lock_exclusive()
            .one(&txn)
            .await?;

        let now = Utc::now().naive_utc();
        let saved = match existing {
            Some(_) if mode == WriteMode::Create => {
                return Err(ServiceError::DuplicateEnrollment {
                    student_id,
                    course_id,
                });
            }
            Some(record) => {
                let merged = record.scores().merge(scores);
                let mut record = record.into_active_model();
                apply_scores(&mut record, merged);
                record.updated_at = Set(now);
                record.update(&txn).await?
            }
            None if scores.is_empty() => {
                return Err(ServiceError::validation(
                    "scores",
                    "At least one score is required to create a grade record",
                ));
            }
            None => Self::insert_record(&txn, student_id, course_id, scores, now).await?,
        };

        txn.commit().await?;

        log::info!(
            "Saved grade record {} for student {student_id} in course {course_id} (letter: {})",
            saved.id,
            saved.letter_grade.map_or("-", |letter| letter.as_str())
        );
        Ok(saved)
    }

    /// Inserts a fresh record for the pair, translating the pair's unique index violation
    async fn insert_record<C: ConnectionTrait>(
        db: &C,
        student_id: Uuid,
        course_id: Uuid,
        scores: Scores,
        now: NaiveDateTime,
    ) -> ServiceResult<grades::Model> {
        let mut record = grades::ActiveModel {
            id: NotSet,
            student_id: Set(student_id),
            course_id: Set(course_id),
            assignment_score: NotSet,
            midterm_score: NotSet,
            final_score: NotSet,
            final_grade: NotSet,
            letter_grade: NotSet,
            created_at: Set(now),
            updated_at: Set(now),
        };
        apply_scores(&mut record, scores);

        record.insert(db).await.map_err(|err| {
            if is_unique_violation(&err) {
                ServiceError::DuplicateEnrollment {
                    student_id,
                    course_id,
                }
            } else {
                err.into()
            }
        })
    }

    pub async fn find<C: ConnectionTrait>(
        db: &C,
        student_id: Uuid,
        course_id: Uuid,
    ) -> ServiceResult<Option<grades::Model>> {
        Ok(Self::pair(student_id, course_id).one(db).await?)
    }

    /// Hard-deletes the pair's record
    pub async fn delete<C: ConnectionTrait>(
        db: &C,
        student_id: Uuid,
        course_id: Uuid,
    ) -> ServiceResult<()> {
        let result = grades::Entity::delete_many()
            .filter(grades::Column::StudentId.eq(student_id))
            .filter(grades::Column::CourseId.eq(course_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Grade record for student {student_id} in course {course_id}"
            )));
        }

        log::info!("Deleted grade record for student {student_id} in course {course_id}");
        Ok(())
    }

    /// A student's records, most recent first
    pub async fn list_by_student<C: ConnectionTrait>(
        db: &C,
        student_id: Uuid,
    ) -> ServiceResult<Vec<grades::Model>> {
        Ok(Self::newest_first(
            grades::Entity::find().filter(grades::Column::StudentId.eq(student_id)),
        )
        .all(db)
        .await?)
    }

    /// A course's records, most recent first
    pub async fn list_by_course<C: ConnectionTrait>(
        db: &C,
        course_id: Uuid,
    ) -> ServiceResult<Vec<grades::Model>> {
        Self::list_by_courses(db, vec![course_id]).await
    }

    /// Records of several courses at once, most recent first
    pub async fn list_by_courses<C: ConnectionTrait>(
        db: &C,
        course_ids: Vec<Uuid>,
    ) -> ServiceResult<Vec<grades::Model>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Self::newest_first(
            grades::Entity::find().filter(grades::Column::CourseId.is_in(course_ids)),
        )
        .all(db)
        .await?)
    }

    fn pair(student_id: Uuid, course_id: Uuid) -> Select<grades::Entity> {
        grades::Entity::find()
            .filter(grades::Column::StudentId.eq(student_id))
            .filter(grades::Column::CourseId.eq(course_id))
    }

    // ids are assigned in insertion order, so they break created_at ties
    fn newest_first(query: Select<grades::Entity>) -> Select<grades::Entity> {
        query
            .order_by_desc(grades::Column::CreatedAt)
            .order_by_desc(grades::Column::Id)
    }
}

/// Runs `attempt` a second time when it lost a race to insert the same pair.
/// The pair exists by then, so the retry takes the update path.
async fn retry_after_insert_race<T, F, Fut>(mut attempt: F) -> ServiceResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ServiceResult<T>>,
{
    match attempt().await {
        Err(ServiceError::DuplicateEnrollment {
            student_id,
            course_id,
        }) => {
            log::debug!("Retrying write for {student_id}/{course_id} after insert race");
            attempt().await
        }
        result => result,
    }
}

/// Writes the input scores and the grades derived from them
fn apply_scores(record: &mut grades::ActiveModel, scores: Scores) {
    let outcome = scores.outcome();

    record.assignment_score = Set(scores.assignment);
    record.midterm_score = Set(scores.midterm);
    record.final_score = Set(scores.final_exam);
    record.final_grade = Set(outcome.map(|o| o.final_grade));
    record.letter_grade = Set(outcome.map(|o| o.letter_grade));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{course, dec, instructor, setup_db, student};
    use models::{LetterGrade, grading};
    use sea_orm::PaginatorTrait;

    fn full(assignment: &str, midterm: &str, final_exam: &str) -> Scores {
        Scores::new(Some(dec(assignment)), Some(dec(midterm)), Some(dec(final_exam)))
    }

    fn partial() -> Scores {
        Scores::new(Some(dec("75")), None, None)
    }

    #[tokio::test]
    async fn test_written_record_matches_direct_calculation() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let bm101 = course(&db, "BM101", 3, None).await;

        GradeService::create(&db, budi.id, bm101.id, full("80", "70", "90"))
            .await
            .unwrap();

        let stored = GradeService::find(&db, budi.id, bm101.id)
            .await
            .unwrap()
            .unwrap();
        let expected = grading::calculate(dec("80"), dec("70"), dec("90"));
        assert_eq!(stored.final_grade.map(|g| g.round_dp(2)), Some(expected.final_grade));
        assert_eq!(stored.letter_grade, Some(expected.letter_grade));
        assert_eq!(stored.letter_grade, Some(LetterGrade::AMinus));
        assert_eq!(stored.grade_point(), Some(dec("3.7")));
    }

    #[tokio::test]
    async fn test_partial_scores_leave_derived_fields_empty() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let bm101 = course(&db, "BM101", 3, None).await;

        let stored = GradeService::create(
            &db,
            budi.id,
            bm101.id,
            Scores::new(Some(dec("90")), Some(dec("90")), None),
        )
        .await
        .unwrap();

        assert_eq!(stored.final_grade, None);
        assert_eq!(stored.letter_grade, None);
        assert_eq!(stored.grade_point(), None);

        // a NULL letter grade decodes back to None
        let read_back = GradeService::find(&db, budi.id, bm101.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read_back.letter_grade, None);
        assert_eq!(read_back.midterm_score.map(|s| s.round_dp(2)), Some(dec("90")));

        let listed = GradeService::list_by_student(&db, budi.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].letter_grade, None);
    }

    #[tokio::test]
    async fn test_upsert_updates_in_place_and_recomputes() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let bm101 = course(&db, "BM101", 3, None).await;

        let first = GradeService::upsert(
            &db,
            budi.id,
            bm101.id,
            Scores::new(Some(dec("85")), Some(dec("85")), None),
        )
        .await
        .unwrap();
        assert_eq!(first.letter_grade, None);

        // only the final score is sent; the stored ones are kept
        let second = GradeService::upsert(
            &db,
            budi.id,
            bm101.id,
            Scores::new(None, None, Some(dec("85"))),
        )
        .await
        .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.assignment_score.map(|s| s.round_dp(2)), Some(dec("85")));
        assert_eq!(second.letter_grade, Some(LetterGrade::A));

        let third = GradeService::upsert(&db, budi.id, bm101.id, full("30", "30", "30"))
            .await
            .unwrap();
        assert_eq!(third.id, first.id);
        assert_eq!(third.letter_grade, Some(LetterGrade::E));

        let rows = grades::Entity::find().count(&db).await.unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_second_record_for_pair() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let bm101 = course(&db, "BM101", 3, None).await;

        GradeService::create(&db, budi.id, bm101.id, Scores::new(None, Some(dec("60")), None))
            .await
            .unwrap();
        let err = GradeService::create(&db, budi.id, bm101.id, full("1", "2", "3"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::DuplicateEnrollment { student_id, course_id }
                if student_id == budi.id && course_id == bm101.id
        ));

        // the rejected write changed nothing
        let stored = GradeService::find(&db, budi.id, bm101.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.assignment_score, None);
        assert_eq!(stored.midterm_score.map(|s| s.round_dp(2)), Some(dec("60")));
    }

    #[tokio::test]
    async fn test_unique_index_violation_maps_to_duplicate_enrollment() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let bm101 = course(&db, "BM101", 3, None).await;
        GradeService::create(&db, budi.id, bm101.id, full("80", "80", "80"))
            .await
            .unwrap();

        let now = Utc::now().naive_utc();
        let raw = grades::ActiveModel {
            id: NotSet,
            student_id: Set(budi.id),
            course_id: Set(bm101.id),
            assignment_score: NotSet,
            midterm_score: NotSet,
            final_score: NotSet,
            final_grade: NotSet,
            letter_grade: NotSet,
            created_at: Set(now),
            updated_at: Set(now),
        };
        let err = raw.insert(&db).await.unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(matches!(ServiceError::from(err), ServiceError::Database(_)));

        // the insert step skips the pre-check, so only the index catches the duplicate
        let err = GradeService::insert_record(&db, budi.id, bm101.id, full("1", "2", "3"), now)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::DuplicateEnrollment { student_id, course_id }
                if student_id == budi.id && course_id == bm101.id
        ));

        let rows = grades::Entity::find().count(&db).await.unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_write_retried_once_after_insert_race() {
        let (student_id, course_id) = (Uuid::new_v4(), Uuid::new_v4());

        let mut attempts = 0;
        let result = retry_after_insert_race(|| {
            attempts += 1;
            let attempt = attempts;
            async move {
                if attempt == 1 {
                    Err(ServiceError::DuplicateEnrollment {
                        student_id,
                        course_id,
                    })
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts, 2);

        // a second lost race is reported, not retried forever
        let mut attempts = 0;
        let result: ServiceResult<()> = retry_after_insert_race(|| {
            attempts += 1;
            async move {
                Err(ServiceError::DuplicateEnrollment {
                    student_id,
                    course_id,
                })
            }
        })
        .await;
        assert!(matches!(result, Err(ServiceError::DuplicateEnrollment { .. })));
        assert_eq!(attempts, 2);

        // other failures are returned as they are
        let mut attempts = 0;
        let result: ServiceResult<()> = retry_after_insert_race(|| {
            attempts += 1;
            async { Err(ServiceError::NotFound("Course".to_owned())) }
        })
        .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_new_record_needs_at_least_one_score() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let bm101 = course(&db, "BM101", 3, None).await;

        let err = GradeService::create(&db, budi.id, bm101.id, Scores::default())
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("scores"));

        let err = GradeService::upsert(&db, budi.id, bm101.id, Scores::default())
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("scores"));
        assert!(GradeService::find(&db, budi.id, bm101.id).await.unwrap().is_none());

        // an empty write to an existing record leaves it as it was
        let stored = GradeService::upsert(&db, budi.id, bm101.id, full("80", "70", "90"))
            .await
            .unwrap();
        let unchanged = GradeService::upsert(&db, budi.id, bm101.id, Scores::default())
            .await
            .unwrap();
        assert_eq!(unchanged.id, stored.id);
        assert_eq!(unchanged.letter_grade, Some(LetterGrade::AMinus));
    }

    #[tokio::test]
    async fn test_write_rejects_invalid_input() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let dewi = instructor(&db, "dewi@prasetiyamulya.ac.id").await;
        let bm101 = course(&db, "BM101", 3, None).await;

        let err = GradeService::upsert(
            &db,
            budi.id,
            bm101.id,
            Scores::new(Some(dec("100.5")), None, None),
        )
        .await
        .unwrap_err();
        assert_eq!(err.field(), Some("assignment_score"));

        let err = GradeService::upsert(&db, dewi.id, bm101.id, full("80", "80", "80"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::RoleMismatch { expected: Role::Student, .. }));

        let err = GradeService::upsert(&db, budi.id, Uuid::new_v4(), full("80", "80", "80"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        assert!(GradeService::find(&db, budi.id, bm101.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lists_are_most_recent_first() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let rina = student(&db, "rina@student.prasetiyamulya.ac.id").await;
        let first = course(&db, "BM101", 3, None).await;
        let second = course(&db, "BM102", 3, None).await;

        let a = GradeService::create(&db, budi.id, first.id, partial())
            .await
            .unwrap();
        let b = GradeService::create(&db, budi.id, second.id, partial())
            .await
            .unwrap();
        let c = GradeService::create(&db, rina.id, first.id, partial())
            .await
            .unwrap();

        let ids = |records: Vec<grades::Model>| records.into_iter().map(|r| r.id).collect::<Vec<_>>();

        let by_student = GradeService::list_by_student(&db, budi.id).await.unwrap();
        assert_eq!(ids(by_student), [b.id, a.id]);

        let by_course = GradeService::list_by_course(&db, first.id).await.unwrap();
        assert_eq!(ids(by_course), [c.id, a.id]);

        let by_courses = GradeService::list_by_courses(&db, vec![first.id, second.id])
            .await
            .unwrap();
        assert_eq!(ids(by_courses), [c.id, b.id, a.id]);

        assert!(GradeService::list_by_courses(&db, Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_equal_timestamps_list_latest_insert_first() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let mut inserted = Vec::new();
        for code in ["BM101", "BM102", "BM103"] {
            let offered = course(&db, code, 3, None).await;
            let record = GradeService::create(&db, budi.id, offered.id, partial())
                .await
                .unwrap();
            inserted.push(record);
        }

        let same_instant = Utc::now().naive_utc();
        for record in &inserted {
            let mut record = record.clone().into_active_model();
            record.created_at = Set(same_instant);
            record.update(&db).await.unwrap();
        }

        let listed: Vec<i32> = GradeService::list_by_student(&db, budi.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        let mut expected: Vec<i32> = inserted.iter().map(|r| r.id).collect();
        expected.reverse();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let bm101 = course(&db, "BM101", 3, None).await;
        GradeService::create(&db, budi.id, bm101.id, full("80", "80", "80"))
            .await
            .unwrap();

        GradeService::delete(&db, budi.id, bm101.id).await.unwrap();
        assert!(GradeService::find(&db, budi.id, bm101.id).await.unwrap().is_none());

        let err = GradeService::delete(&db, budi.id, bm101.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
