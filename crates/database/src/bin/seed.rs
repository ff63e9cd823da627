use database::{
    ServiceError,
    db::{DatabaseConfig, create_connection},
    services::{
        course::{CourseService, NewCourse},
        grade::GradeService,
        profile::{ProfileService, Registration},
    },
};
use models::{Major, Scores};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::{env, fs};

/// Fixture used when no path is given
const DEFAULT_FIXTURE: &str = "seed.json";

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    profiles: Vec<Registration>,
    #[serde(default)]
    courses: Vec<CourseFixture>,
    #[serde(default)]
    grades: Vec<GradeFixture>,
}

#[derive(Debug, Deserialize)]
struct CourseFixture {
    code: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    credits: i32,
    semester: i16,
    major: Major,
    #[serde(default)]
    instructor_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GradeFixture {
    student_email: String,
    course_code: String,
    #[serde(flatten)]
    scores: Scores,
}

/// Counts of what a seeding run wrote and skipped
#[derive(Debug, Default)]
struct SeedReport {
    written: usize,
    skipped: usize,
}

/// Registers the fixture's profiles; existing emails are skipped
async fn seed_profiles(db: &DatabaseConnection, profiles: Vec<Registration>) -> SeedReport {
    let mut report = SeedReport::default();

    for registration in profiles {
        match ProfileService::register(db, registration).await {
            Ok(_) => report.written += 1,
            Err(ServiceError::DuplicateEmail(email)) => {
                log::debug!("Profile {email} already exists");
                report.skipped += 1;
            }
            Err(e) => {
                log::error!("Failed to register profile: {e}");
                report.skipped += 1;
            }
        }
    }

    report
}

async fn seed_courses(db: &DatabaseConnection, courses: Vec<CourseFixture>) -> SeedReport {
    let mut report = SeedReport::default();

    for fixture in courses {
        let instructor_id = match &fixture.instructor_email {
            Some(email) => match ProfileService::find_by_email(db, email).await {
                Ok(Some(profile)) => Some(profile.id),
                Ok(None) => {
                    log::warn!("Instructor {email} of {} is unknown, leaving unassigned", fixture.code);
                    None
                }
                Err(e) => {
                    log::error!("Failed to look up instructor {email}: {e}");
                    report.skipped += 1;
                    continue;
                }
            },
            None => None,
        };

        let course = NewCourse {
            code: fixture.code,
            name: fixture.name,
            description: fixture.description,
            credits: fixture.credits,
            semester: fixture.semester,
            major: fixture.major,
            instructor_id,
        };

        match CourseService::create(db, course).await {
            Ok(_) => report.written += 1,
            Err(ServiceError::DuplicateCourse(code)) => {
                log::debug!("Course {code} already exists");
                report.skipped += 1;
            }
            Err(e) => {
                log::error!("Failed to create course: {e}");
                report.skipped += 1;
            }
        }
    }

    report
}

/// Grades go through the upsert path, so reseeding overwrites scores
async fn seed_grades(db: &DatabaseConnection, grades: Vec<GradeFixture>) -> SeedReport {
    let mut report = SeedReport::default();

    for fixture in grades {
        let student = ProfileService::find_by_email(db, &fixture.student_email).await;
        let course = CourseService::find_by_code(db, &fixture.course_code).await;

        let (Ok(Some(student)), Ok(Some(course))) = (student, course) else {
            log::warn!(
                "Skipping grade of {} in {}: unknown student or course",
                fixture.student_email,
                fixture.course_code
            );
            report.skipped += 1;
            continue;
        };

        match GradeService::upsert(db, student.id, course.id, fixture.scores).await {
            Ok(_) => report.written += 1,
            Err(e) => {
                log::error!(
                    "Failed to save grade of {} in {}: {e}",
                    fixture.student_email,
                    fixture.course_code
                );
                report.skipped += 1;
            }
        }
    }

    report
}

/// Loads a JSON fixture of profiles, courses and grades into the database
#[tokio::main]
async fn main() {
    env_logger::init();

    let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_FIXTURE.to_owned());
    let contents = fs::read_to_string(&path).expect("Failed to read fixture file");
    let fixture: Fixture = serde_json::from_str(&contents).expect("Failed to parse fixture file");

    let config = DatabaseConfig::from_env().expect("Invalid database configuration");
    let db = create_connection(&config)
        .await
        .expect("Failed to connect to database");

    log::info!("Seeding from {path}");

    let profiles = seed_profiles(&db, fixture.profiles).await;
    log::info!("Profiles: {} written, {} skipped", profiles.written, profiles.skipped);

    let courses = seed_courses(&db, fixture.courses).await;
    log::info!("Courses: {} written, {} skipped", courses.written, courses.skipped);

    let grades = seed_grades(&db, fixture.grades).await;
    log::info!("Grades: {} written, {} skipped", grades.written, grades.skipped);
}
