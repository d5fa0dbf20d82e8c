use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::error::AppError;
use crate::storage::{StorageError, UserRepository};
use crate::users::dto::{LoginRequest, SignupRequest};
use crate::users::repo_types::{NewUser, User};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Argon2 PHC string with a fresh random salt.
fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            AppError::Internal(e.to_string())
        })
}

fn password_matches(user: &User, plain: &str) -> Result<bool, AppError> {
    let stored = PasswordHash::new(&user.password_hash).map_err(|e| {
        error!(error = %e, user_id = user.id, "stored password hash is unreadable");
        AppError::Internal(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &stored)
        .is_ok())
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn signup(&self, req: SignupRequest) -> Result<User, AppError> {
        let email = req.email.trim().to_string();

        if !is_valid_email(&email) {
            warn!("invalid email");
            return Err(AppError::BadRequest("Invalid email".into()));
        }
        if req.password.is_empty() {
            warn!("empty password");
            return Err(AppError::BadRequest("Password is required".into()));
        }

        if self.repo.exists_by_email(&email).await? {
            warn!("email already registered");
            return Err(AppError::Conflict);
        }

        let username = req
            .username
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let password_hash = hash_password(&req.password)?;

        let user = match self
            .repo
            .create(NewUser { email, username, password_hash })
            .await
        {
            Ok(u) => u,
            // Lost a race with a concurrent signup for the same email.
            Err(StorageError::Duplicate) => {
                warn!("email registered concurrently");
                return Err(AppError::Conflict);
            }
            Err(e) => {
                error!(error = %e, "create user failed");
                return Err(e.into());
            }
        };

        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    #[instrument(skip(self, req), fields(email = ?req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<User, AppError> {
        let (Some(email), Some(password)) = (req.email, req.password) else {
            warn!("login without credentials");
            return Err(AppError::Unauthorized);
        };

        let Some(user) = self.repo.find_by_email(email.trim()).await? else {
            warn!("login unknown email");
            return Err(AppError::Unauthorized);
        };

        if !password_matches(&user, &password)? {
            warn!(user_id = user.id, "login invalid password");
            return Err(AppError::Unauthorized);
        }

        info!(user_id = user.id, "user logged in");
        Ok(user)
    }

    pub async fn list_all(&self) -> Result<Vec<User>, AppError> {
        Ok(self.repo.get_all().await?)
    }
}
