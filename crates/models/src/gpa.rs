use crate::{
    course::Credits,
    grading::{LetterGrade, round2},
};
use rust_decimal::Decimal;
use serde::Serialize;

/// Credit-weighted summary of a student's enrollment records
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpaSummary {
    /// Every enrollment record, graded or not
    pub total_courses: usize,
    /// Credits of graded records only
    pub total_credits: u32,
    pub gpa: Decimal,
}

impl GpaSummary {
    /// Aggregates `(letter, credits)` pairs; ungraded records only count towards `total_courses`
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (Option<LetterGrade>, Credits)>,
    {
        let mut total_courses = 0;
        let mut total_credits = 0u32;
        let mut total_points = Decimal::ZERO;

        for (letter, credits) in records {
            total_courses += 1;

            if let Some(letter) = letter {
                total_credits += credits.value();
                total_points += letter.grade_point() * Decimal::from(credits.value());
            }
        }

        Self {
            total_courses,
            total_credits,
            gpa: weighted_average(total_points, total_credits),
        }
    }
}

/// `points / credits` rounded to two places, `0.0` when nothing is graded
fn weighted_average(total_points: Decimal, total_credits: u32) -> Decimal {
    if total_credits == 0 {
        return Decimal::ZERO;
    }

    round2(total_points / Decimal::from(total_credits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_gpa_excludes_ungraded_from_denominator() {
        let summary = GpaSummary::from_records([
            (Some(LetterGrade::A), Credits::Three),
            (Some(LetterGrade::B), Credits::Four),
            (None, Credits::Three),
        ]);

        // (4.0 * 3 + 3.0 * 4) / 7 = 3.428...
        assert_eq!(summary.gpa, Decimal::from_str("3.43").unwrap());
        assert_eq!(summary.total_courses, 3);
        assert_eq!(summary.total_credits, 7);
    }

    #[test]
    fn test_gpa_without_graded_records_is_zero() {
        let summary = GpaSummary::from_records([(None, Credits::Two), (None, Credits::Six)]);
        assert_eq!(summary.gpa, Decimal::ZERO);
        assert_eq!(summary.total_courses, 2);
        assert_eq!(summary.total_credits, 0);

        let empty = GpaSummary::from_records(Vec::new());
        assert_eq!(empty.gpa, Decimal::ZERO);
        assert_eq!(empty.total_courses, 0);
    }

    #[test]
    fn test_gpa_all_failing_is_zero_not_missing() {
        let summary = GpaSummary::from_records([(Some(LetterGrade::E), Credits::Four)]);
        assert_eq!(summary.gpa, Decimal::ZERO);
        assert_eq!(summary.total_credits, 4);
    }

    #[test]
    fn test_gpa_weights_by_credits() {
        let summary = GpaSummary::from_records([
            (Some(LetterGrade::AMinus), Credits::Six),
            (Some(LetterGrade::CPlus), Credits::Two),
        ]);

        // (3.7 * 6 + 2.3 * 2) / 8 = 26.8 / 8 = 3.35
        assert_eq!(summary.gpa, Decimal::from_str("3.35").unwrap());
    }
}
