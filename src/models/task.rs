use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;
use crate::models::payload::{FieldCheck, JsonObject};

/// A task as stored in the `tasks` table and returned by the API.
///
/// `owner_email` is populated from the database but never serialized: clients
/// only ever see their own tasks, and the owner is implied by the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    #[sqlx(rename = "task_id")]
    pub id: i32,
    pub name: String,
    pub description: String,
    pub status: bool,
    #[serde(skip_serializing, default)]
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /tasks`. The owner is supplied separately from the identity.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: String,
    pub status: bool,
}

impl NewTask {
    /// `name` is required; `description` and `status` default to `""` and
    /// `false` when absent, but a present value of the wrong type is rejected.
    pub fn from_payload(payload: &JsonObject) -> Result<Self, AppError> {
        let mut check = FieldCheck::new();
        let task = Self {
            name: check.required_string(payload, "name"),
            description: check.string(payload, "description").unwrap_or_default(),
            status: check.boolean(payload, "status").unwrap_or(false),
        };
        check.absorb(task.validate());
        check.finish()?;
        Ok(task)
    }
}

/// The client-mutable subset of a task, as sent with `PUT /tasks`.
///
/// Unset fields are left untouched; `updated_at` is stamped by the repository
/// regardless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct TaskChanges {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    pub status: Option<bool>,
}

impl TaskChanges {
    /// Unrecognised keys are ignored; an empty object is rejected outright.
    pub fn from_payload(payload: &JsonObject) -> Result<Self, AppError> {
        if payload.is_empty() {
            return Err(AppError::BadRequest("Request body cannot be empty".into()));
        }
        let mut check = FieldCheck::new();
        let changes = Self {
            name: check.string(payload, "name"),
            status: check.boolean(payload, "status"),
        };
        check.absorb(changes.validate());
        check.finish()?;
        Ok(changes)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none()
    }
}
