//! User accounts and authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{ChangePassword, RegisterUser, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password, returning a JWT and the user
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user.password_hash, password)? {
            tracing::warn!(username, "Failed login attempt");
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok((token, user))
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create an account; the role defaults to `user`
    pub async fn register(&self, data: &RegisterUser) -> AppResult<User> {
        data.validate()?;
        let hash = hash_password(&data.password)?;
        let user = self
            .repository
            .users
            .create(&data.username, &hash, data.role.unwrap_or_default())
            .await?;
        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    pub async fn change_password(&self, user_id: i32, data: &ChangePassword) -> AppResult<()> {
        data.validate()?;
        let user = self.repository.users.get_by_id(user_id).await?;
        if !verify_password(&user.password_hash, &data.current_password)? {
            return Err(AppError::Authentication(
                "Current password is incorrect".to_string(),
            ));
        }
        let hash = hash_password(&data.new_password)?;
        self.repository.users.update_password(user_id, &hash).await
    }

    /// Create the configured admin account when no user exists yet.
    /// Returns whether an account was created.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<bool> {
        let (Some(username), Some(password)) = (
            self.config.bootstrap_admin_username.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(false);
        };

        if self.repository.users.count().await? > 0 {
            return Ok(false);
        }

        let hash = hash_password(password)?;
        self.repository
            .users
            .create(username, &hash, Role::Admin)
            .await?;
        tracing::warn!(username, "Created bootstrap admin account, change its password");
        Ok(true)
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bootstrap: bool) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_hours: 1,
            bootstrap_admin_username: bootstrap.then(|| "admin".to_string()),
            bootstrap_admin_password: bootstrap.then(|| "admin-pass".to_string()),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_admin_runs_once() {
        let service = UsersService::new(Repository::in_memory(), config(true));
        assert!(service.ensure_bootstrap_admin().await.unwrap());
        assert!(!service.ensure_bootstrap_admin().await.unwrap());

        let (token, user) = service.authenticate("admin", "admin-pass").await.unwrap();
        assert_eq!(user.role, Role::Admin);
        let claims = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_no_bootstrap_without_credentials() {
        let service = UsersService::new(Repository::in_memory(), config(false));
        assert!(!service.ensure_bootstrap_admin().await.unwrap());
    }

    #[tokio::test]
    async fn test_register_login_and_change_password() {
        let service = UsersService::new(Repository::in_memory(), config(false));
        let user = service
            .register(&RegisterUser {
                username: "clerk".to_string(),
                password: "secret1".to_string(),
                role: None,
            })
            .await
            .unwrap();
        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "secret1");

        assert!(matches!(
            service.authenticate("clerk", "wrong").await,
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            service.authenticate("nobody", "secret1").await,
            Err(AppError::Authentication(_))
        ));

        service
            .change_password(
                user.id,
                &ChangePassword {
                    current_password: "secret1".to_string(),
                    new_password: "secret2".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(service.authenticate("clerk", "secret1").await.is_err());
        assert!(service.authenticate("clerk", "secret2").await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let service = UsersService::new(Repository::in_memory(), config(false));
        let request = RegisterUser {
            username: "clerk".to_string(),
            password: "secret1".to_string(),
            role: Some(Role::Admin),
        };
        service.register(&request).await.unwrap();
        assert!(matches!(
            service.register(&request).await,
            Err(AppError::Conflict(_))
        ));
    }
}
