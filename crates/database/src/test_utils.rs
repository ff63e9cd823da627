use crate::{
    entities::{courses, users},
    services::{
        course::{CourseService, NewCourse},
        profile::{ProfileService, Registration},
    },
};
use migration::{Migrator, MigratorTrait};
use models::Major;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::str::FromStr;
use uuid::Uuid;

/// Fresh in-memory database with the production schema applied
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // every connection to `:memory:` is its own database
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn registration(email: &str, major: Option<Major>) -> Registration {
    Registration {
        email: email.to_owned(),
        username: None,
        full_name: display_name(email),
        major,
        password: "s3cret-pass".to_owned(),
        password_confirmation: "s3cret-pass".to_owned(),
    }
}

pub async fn student(db: &DatabaseConnection, email: &str) -> users::Model {
    ProfileService::register(db, registration(email, Some(Major::BusinessMathematics)))
        .await
        .unwrap()
}

pub async fn instructor(db: &DatabaseConnection, email: &str) -> users::Model {
    ProfileService::register(db, registration(email, None))
        .await
        .unwrap()
}

pub fn new_course(code: &str, credits: i32, instructor_id: Option<Uuid>) -> NewCourse {
    NewCourse {
        code: code.to_owned(),
        name: format!("Course {code}"),
        description: None,
        credits,
        semester: 1,
        major: Major::BusinessMathematics,
        instructor_id,
    }
}

pub async fn course(
    db: &DatabaseConnection,
    code: &str,
    credits: i32,
    instructor_id: Option<Uuid>,
) -> courses::Model {
    CourseService::create(db, new_course(code, credits, instructor_id))
        .await
        .unwrap()
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

/// "budi.santoso@..." becomes "Budi Santoso"
fn display_name(email: &str) -> String {
    models::email::local_part(email)
        .split(['.', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
