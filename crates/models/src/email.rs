//! Institutional email policy: which addresses may register, and which role they get.

use crate::profile::Role;
use lazy_static::lazy_static;
use regex::Regex;

/// Suffix every instructor address ends with
pub const INSTRUCTOR_DOMAIN_SUFFIX: &str = "@prasetiyamulya.ac.id";

lazy_static! {
    static ref STUDENT_EMAIL: Regex =
        Regex::new(r"^[a-z0-9._%+-]+@student\.prasetiyamulya\.ac\.id$").unwrap();
    static ref INSTRUCTOR_EMAIL: Regex =
        Regex::new(r"^[a-z0-9._%+-]+@prasetiyamulya\.ac\.id$").unwrap();
}

/// Trims and lower-cases an address; every lookup and comparison uses this form
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Derives the role an address is entitled to, or `None` for foreign domains
pub fn role_for(email: &str) -> Option<Role> {
    let email = normalize(email);

    if STUDENT_EMAIL.is_match(&email) {
        Some(Role::Student)
    } else if INSTRUCTOR_EMAIL.is_match(&email) {
        Some(Role::Instructor)
    } else {
        None
    }
}

/// Whether an address belongs to the instructor domain
pub fn is_instructor_domain(email: &str) -> bool {
    normalize(email).ends_with(INSTRUCTOR_DOMAIN_SUFFIX)
}

/// The part before the `@`, used as the default username
pub fn local_part(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}
