pub mod courses;
pub mod grades;
pub mod users;
