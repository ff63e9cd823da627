use database::{
    ServiceError,
    entities::users,
    services::profile::{Registration, TokenClaims},
};
use models::Major;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// `@student.prasetiyamulya.ac.id` registers a student, `@prasetiyamulya.ac.id` an instructor
    pub email: String,
    /// Defaults to the part of the email before the `@`
    pub username: Option<String>,
    pub full_name: String,
    /// Program key (`business_mathematics`) or code (`BM`); required for students
    pub major: Option<String>,
    pub password: String,
    pub password_confirmation: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = ServiceError;

    fn try_from(request: RegisterRequest) -> Result<Self, Self::Error> {
        let major = request
            .major
            .as_deref()
            .map(str::trim)
            .filter(|major| !major.is_empty())
            .map(|major| {
                Major::from_str(major)
                    .map_err(|_| ServiceError::validation("major", format!("Unknown major: {major}")))
            })
            .transpose()?;

        Ok(Registration {
            email: request.email,
            username: request.username,
            full_name: request.full_name,
            major,
            password: request.password,
            password_confirmation: request.password_confirmation,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub major: Option<String>,
    pub role: String,
}

impl From<users::Model> for ProfileResponse {
    fn from(profile: users::Model) -> Self {
        Self {
            id: profile.id,
            major: profile.major.map(|major| major.as_str().to_owned()),
            role: profile.role.as_str().to_owned(),
            email: profile.email,
            username: profile.username,
            full_name: profile.full_name,
        }
    }
}

/// Claim values to embed in the access and refresh tokens
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimsResponse {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub major: Option<String>,
    pub role: String,
}

impl From<TokenClaims> for ClaimsResponse {
    fn from(claims: TokenClaims) -> Self {
        Self {
            email: claims.email,
            username: claims.username,
            full_name: claims.full_name,
            major: claims.major.map(|major| major.as_str().to_owned()),
            role: claims.role.as_str().to_owned(),
        }
    }
}
