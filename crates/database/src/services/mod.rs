pub mod course;
pub mod dashboard;
pub mod gpa;
pub mod grade;
pub mod profile;
