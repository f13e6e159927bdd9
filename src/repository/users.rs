use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::repository::UserRepository;

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create(&self, user: NewUser) -> Result<(), AppError> {
        sqlx::query("INSERT INTO users (username, pass, email) VALUES ($1, $2, $3)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::Conflict("email already exists".into()),
                other => other,
            })?;

        log::info!("new user created: {}, {}", user.username, user.email);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT username, email, pass FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user email {} not found", email)))
    }
}
