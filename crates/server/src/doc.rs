use crate::routes::{auth, dashboard, grade, health, root};
use utoipa::OpenApi;

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        auth::register,
        auth::login,
        dashboard::student_dashboard,
        dashboard::instructor_dashboard,
        grade::create_grade,
        grade::upsert_grade,
        grade::delete_grade
    ),
    tags(
        (name = "Health", description = "Liveness endpoints"),
        (name = "Authentication", description = "Registration and credential checks"),
        (name = "Dashboards", description = "Student and instructor read views"),
        (name = "Grades", description = "Enrollment record writes"),
    ),
    info(
        title = "Academic Records API",
        version = "1.0.0",
        description = "Grades, GPA and dashboards for Universitas Prasetiya Mulya",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for path in [
            "/",
            "/health",
            "/auth/register",
            "/auth/login",
            "/student",
            "/instructor",
            "/grades",
            "/grades/{student_id}/{course_id}",
        ] {
            assert!(paths.contains(&path), "missing {path}");
        }
    }
}
