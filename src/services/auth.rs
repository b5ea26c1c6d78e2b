//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate user by login and return a JWT token with the user
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_login(login)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid login or password".to_string()))?;

        if !verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid login or password".to_string()));
        }

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.login.clone(),
            user_id: user.id,
            is_staff: user.is_staff,
            can_mark_returned: user.can_mark_returned,
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    /// Get user by ID (the "me" endpoint)
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }
}

/// Check a password against the stored argon2 hash
fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    if let Some(ref hash) = user.password {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        return Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok());
    }

    Ok(false)
}

/// Hash a password using Argon2 (used when provisioning accounts)
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_hash(hash: Option<String>) -> User {
        User {
            id: 1,
            login: "reader".to_string(),
            password: hash,
            first_name: None,
            last_name: None,
            email: None,
            is_staff: false,
            can_mark_returned: false,
            created_at: None,
        }
    }

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("s3cret").unwrap();
        let user = user_with_hash(Some(hash));
        assert!(verify_password(&user, "s3cret").unwrap());
        assert!(!verify_password(&user, "wrong").unwrap());
    }

    #[test]
    fn account_without_password_cannot_log_in() {
        let user = user_with_hash(None);
        assert!(!verify_password(&user, "anything").unwrap());
    }
}
