use models::{LetterGrade, Scores};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One student's record in one course; doubles as the enrollment
///
/// `final_grade` and `letter_grade` are derived from the three scores and
/// are only ever written by `GradeService`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: Uuid,
    pub course_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub assignment_score: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub midterm_score: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub final_score: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub final_grade: Option<Decimal>,
    pub letter_grade: Option<LetterGrade>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    pub fn scores(&self) -> Scores {
        Scores::new(self.assignment_score, self.midterm_score, self.final_score)
    }

    /// Grade point of the letter grade, `None` while ungraded
    pub fn grade_point(&self) -> Option<Decimal> {
        self.letter_grade.map(|letter| letter.grade_point())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id",
        on_delete = "Cascade"
    )]
    Course,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
