use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // At most one enrollment record per (student, course)
        manager
            .create_index(
                Index::create()
                    .name("idx_grades_student_course")
                    .table(Grades::Table)
                    .col(Grades::StudentId)
                    .col(Grades::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on grades.course_id for the instructor dashboard
        manager
            .create_index(
                Index::create()
                    .name("idx_grades_course_id")
                    .table(Grades::Table)
                    .col(Grades::CourseId)
                    .to_owned(),
            )
            .await?;

        // Index on courses.instructor_id for courses-taught lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_courses_instructor_id")
                    .table(Courses::Table)
                    .col(Courses::InstructorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_semester_code")
                    .table(Courses::Table)
                    .col(Courses::Semester)
                    .col(Courses::Code)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_courses_semester_code",
            "idx_courses_instructor_id",
            "idx_grades_course_id",
            "idx_grades_student_course",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
enum Courses {
    Table,
    Semester,
    Code,
    InstructorId,
}

#[derive(Iden)]
enum Grades {
    Table,
    StudentId,
    CourseId,
}
