pub mod course;
pub mod email;
pub mod gpa;
pub mod grading;
pub mod profile;

pub use course::{CatalogValueError, Credits, Semester};
pub use gpa::GpaSummary;
pub use grading::{GradeOutcome, LetterGrade, ScoreError, Scores};
pub use profile::{Major, Role};
