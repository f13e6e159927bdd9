//! Persistence seams.
//!
//! Handlers depend on the `TaskRepository` and `UserRepository` traits and
//! receive concrete implementations as `web::Data<dyn ...>`. The Postgres
//! implementations live in the submodules; tests supply their own.

pub mod tasks;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskChanges, User};

pub use tasks::PgTaskRepository;
pub use users::PgUserRepository;

/// Owner-scoped task storage.
///
/// Every lookup and mutation is filtered by both the task id and the owner's
/// email. A task that exists but belongs to someone else is reported exactly
/// like one that does not exist.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn exists(&self, id: i32, owner_email: &str) -> Result<bool, AppError>;

    /// Persists a new task for `owner_email` and returns its id.
    async fn insert(&self, owner_email: &str, task: NewTask) -> Result<i32, AppError>;

    /// All tasks of the owner in id order; empty when there are none.
    async fn get_all(&self, owner_email: &str) -> Result<Vec<Task>, AppError>;

    async fn get(&self, id: i32, owner_email: &str) -> Result<Task, AppError>;

    /// Applies the supplied fields and stamps `updated_at`.
    ///
    /// Fails with `NotFound` if the task is not the owner's. The existence
    /// check and the update are separate statements.
    async fn update(&self, id: i32, owner_email: &str, changes: TaskChanges) -> Result<(), AppError>;

    /// Fails with `NotFound` if the task is not the owner's.
    async fn delete(&self, id: i32, owner_email: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Fails with `Conflict` if the email is already registered.
    async fn create(&self, user: NewUser) -> Result<(), AppError>;

    async fn find_by_email(&self, email: &str) -> Result<User, AppError>;
}

/// Fetches several tasks at once, one spawned fetch per id.
///
/// All or nothing: the first failing fetch fails the whole call and the
/// remaining fetches are aborted. Results come back in the order of `ids`.
/// Dropping the returned future also aborts whatever is still in flight.
pub async fn get_many(
    repo: Arc<dyn TaskRepository>,
    ids: &[i32],
    owner_email: &str,
) -> Result<Vec<Task>, AppError> {
    let mut fetches = JoinSet::new();
    for (slot, &id) in ids.iter().enumerate() {
        let repo = Arc::clone(&repo);
        let owner_email = owner_email.to_owned();
        fetches.spawn(async move { repo.get(id, &owner_email).await.map(|task| (slot, task)) });
    }

    let mut fetched = Vec::with_capacity(ids.len());
    while let Some(joined) = fetches.join_next().await {
        match joined {
            Ok(Ok(entry)) => fetched.push(entry),
            Ok(Err(err)) => {
                fetches.abort_all();
                return Err(err);
            }
            Err(join_err) => {
                fetches.abort_all();
                return Err(AppError::Internal(format!("task fetch did not complete: {}", join_err)));
            }
        }
    }

    fetched.sort_unstable_by_key(|(slot, _)| *slot);
    Ok(fetched.into_iter().map(|(_, task)| task).collect())
}
