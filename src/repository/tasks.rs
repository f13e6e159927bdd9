use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges};
use crate::repository::TaskRepository;

const TASK_COLUMNS: &str =
    "task_id, name, description, status, owner_email, created_at, updated_at";

/// `TaskRepository` over a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn not_found(id: i32) -> AppError {
        AppError::NotFound(format!("task with ID {} was not found", id))
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn exists(&self, id: i32, owner_email: &str) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE task_id = $1 AND owner_email = $2)",
        )
        .bind(id)
        .bind(owner_email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, owner_email: &str, task: NewTask) -> Result<i32, AppError> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO tasks (name, description, status, owner_email)
             VALUES ($1, $2, $3, $4)
             RETURNING task_id",
        )
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.status)
        .bind(owner_email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::warn!("failed inserting task for {}: {}", owner_email, e);
            AppError::from(e)
        })?;

        log::info!("task {} inserted for {}", id, owner_email);
        Ok(id)
    }

    async fn get_all(&self, owner_email: &str) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE owner_email = $1 ORDER BY task_id",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_email)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn get(&self, id: i32, owner_email: &str) -> Result<Task, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE task_id = $1 AND owner_email = $2",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn update(&self, id: i32, owner_email: &str, changes: TaskChanges) -> Result<(), AppError> {
        if !self.exists(id, owner_email).await? {
            return Err(Self::not_found(id));
        }

        // Column names come from this closed list, values are always bound.
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tasks SET ");
        let mut assignments = query.separated(", ");
        if let Some(name) = changes.name {
            assignments.push("name = ").push_bind_unseparated(name);
        }
        if let Some(status) = changes.status {
            assignments.push("status = ").push_bind_unseparated(status);
        }
        // Stamped on the database clock that set `created_at`, and never
        // earlier than the stored value.
        assignments.push("updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')");

        query
            .push(" WHERE task_id = ")
            .push_bind(id)
            .push(" AND owner_email = ")
            .push_bind(owner_email);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, id: i32, owner_email: &str) -> Result<(), AppError> {
        if !self.exists(id, owner_email).await? {
            return Err(Self::not_found(id));
        }

        let result = sqlx::query("DELETE FROM tasks WHERE task_id = $1 AND owner_email = $2")
            .bind(id)
            .bind(owner_email)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }

        log::info!("task {} deleted for {}", id, owner_email);
        Ok(())
    }
}
