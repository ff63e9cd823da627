use crate::{
    entities::{courses, grades},
    error::ServiceResult,
    services::{course::CourseService, grade::GradeService},
};
use models::GpaSummary;
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use std::collections::HashMap;
use uuid::Uuid;

pub struct GpaService;

impl GpaService {
    /// Course totals and credit-weighted GPA of one student
    pub async fn summarize<C: ConnectionTrait>(db: &C, student_id: Uuid) -> ServiceResult<GpaSummary> {
        let records = GradeService::list_by_student(db, student_id).await?;
        let courses =
            CourseService::find_many(db, records.iter().map(|record| record.course_id).collect())
                .await?;

        Ok(Self::from_records(&records, &courses))
    }

    pub async fn compute_gpa<C: ConnectionTrait>(db: &C, student_id: Uuid) -> ServiceResult<Decimal> {
        Ok(Self::summarize(db, student_id).await?.gpa)
    }

    /// Summary over records whose courses are already loaded
    pub fn from_records(
        records: &[grades::Model],
        courses: &HashMap<Uuid, courses::Model>,
    ) -> GpaSummary {
        GpaSummary::from_records(records.iter().filter_map(|record| {
            // the foreign key makes a missing course unreachable
            courses
                .get(&record.course_id)
                .map(|course| (record.letter_grade, course.credits))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{course, dec, setup_db, student};
    use models::Scores;

    #[tokio::test]
    async fn test_gpa_skips_ungraded_courses() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;
        let three = course(&db, "BM101", 3, None).await;
        let four = course(&db, "BM102", 4, None).await;
        let ungraded = course(&db, "BM103", 3, None).await;

        let scores = |score: &str| Scores::new(Some(dec(score)), Some(dec(score)), Some(dec(score)));
        // A
        GradeService::create(&db, budi.id, three.id, scores("90")).await.unwrap();
        // B
        GradeService::create(&db, budi.id, four.id, scores("72")).await.unwrap();
        GradeService::create(&db, budi.id, ungraded.id, Scores::new(Some(dec("90")), None, None))
            .await
            .unwrap();

        let summary = GpaService::summarize(&db, budi.id).await.unwrap();
        assert_eq!(summary.gpa, dec("3.43"));
        assert_eq!(summary.total_courses, 3);
        assert_eq!(summary.total_credits, 7);
    }

    #[tokio::test]
    async fn test_gpa_without_records_is_zero() {
        let db = setup_db().await;
        let budi = student(&db, "budi@student.prasetiyamulya.ac.id").await;

        assert_eq!(GpaService::compute_gpa(&db, budi.id).await.unwrap(), Decimal::ZERO);

        let summary = GpaService::summarize(&db, budi.id).await.unwrap();
        assert_eq!(summary.total_courses, 0);
        assert_eq!(summary.total_credits, 0);
    }
}
