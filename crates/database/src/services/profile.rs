use crate::{
    entities::users,
    error::{ServiceError, ServiceResult, is_unique_violation},
};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use models::{Major, Role, email};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Registration input; the role is never supplied, it follows from the email domain
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    pub full_name: String,
    #[serde(default)]
    pub major: Option<Major>,
    pub password: String,
    pub password_confirmation: String,
}

/// Claim values embedded into issued access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenClaims {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub major: Option<Major>,
    pub role: Role,
}

impl From<&users::Model> for TokenClaims {
    fn from(profile: &users::Model) -> Self {
        Self {
            email: profile.email.clone(),
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            major: profile.major,
            role: profile.role,
        }
    }
}

pub struct ProfileService;

impl ProfileService {
    /// Registers a new profile, deriving the role from the email domain
    pub async fn register<C: ConnectionTrait>(
        db: &C,
        registration: Registration,
    ) -> ServiceResult<users::Model> {
        let email = email::normalize(&registration.email);
        let role = email::role_for(&email).ok_or_else(|| {
            log::warn!("Rejected registration for foreign domain: {email}");
            ServiceError::InvalidEmailDomain(email.clone())
        })?;

        if Self::find_by_email(db, &email).await?.is_some() {
            return Err(ServiceError::DuplicateEmail(email));
        }

        let full_name = registration.full_name.trim();
        if full_name.is_empty() {
            return Err(ServiceError::validation("full_name", "Full name is required."));
        }

        if role == Role::Student && registration.major.is_none() {
            return Err(ServiceError::validation("major", "Students must choose a major."));
        }

        if registration.password.is_empty() {
            return Err(ServiceError::validation("password", "Password is required."));
        }
        if registration.password != registration.password_confirmation {
            return Err(ServiceError::validation(
                "password",
                "Password fields didn't match.",
            ));
        }

        let username = registration
            .username
            .as_deref()
            .map(str::trim)
            .filter(|username| !username.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| email::local_part(&email).to_owned());

        let now = Utc::now().naive_utc();
        let profile = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.clone()),
            username: Set(username),
            full_name: Set(full_name.to_owned()),
            major: Set(registration.major),
            role: Set(role),
            password_hash: Set(hash_password(&registration.password)?),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let profile = profile.insert(db).await.map_err(|err| {
            if is_unique_violation(&err) {
                ServiceError::DuplicateEmail(email.clone())
            } else {
                err.into()
            }
        })?;

        log::info!("Registered {} {}", profile.role.as_str(), profile.email);
        Ok(profile)
    }

    /// Checks an email/password pair; unknown email and wrong password look the same
    pub async fn authenticate<C: ConnectionTrait>(
        db: &C,
        email: &str,
        password: &str,
    ) -> ServiceResult<users::Model> {
        let profile = Self::find_by_email(db, email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if verify_password(password, &profile.password_hash) {
            Ok(profile)
        } else {
            Err(ServiceError::InvalidCredentials)
        }
    }

    /// Looks a profile up by email, case-insensitively
    pub async fn find_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> ServiceResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email::normalize(email)))
            .one(db)
            .await?)
    }

    /// Looks a profile up by email, only if it holds `role`
    pub async fn find_by_email_and_role<C: ConnectionTrait>(
        db: &C,
        email: &str,
        role: Role,
    ) -> ServiceResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email::normalize(email)))
            .filter(users::Column::Role.eq(role))
            .one(db)
            .await?)
    }

    /// Resolves a profile id that must hold `role`
    pub async fn require_role<C: ConnectionTrait>(
        db: &C,
        profile_id: Uuid,
        role: Role,
    ) -> ServiceResult<users::Model> {
        let profile = users::Entity::find_by_id(profile_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Profile {profile_id}")))?;

        if profile.role != role {
            return Err(ServiceError::RoleMismatch {
                profile_id,
                expected: role,
            });
        }

        Ok(profile)
    }

    /// Display names for a batch of profile ids
    pub async fn names_by_id<C: ConnectionTrait>(
        db: &C,
        profile_ids: Vec<Uuid>,
    ) -> ServiceResult<HashMap<Uuid, String>> {
        if profile_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = users::Entity::find()
            .filter(users::Column::Id.is_in(profile_ids))
            .all(db)
            .await?;

        Ok(profiles
            .into_iter()
            .map(|profile| (profile.id, profile.full_name))
            .collect())
    }
}

fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
