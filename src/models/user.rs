use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;
use crate::models::payload::{FieldCheck, JsonObject};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

/// A registered account. The hash lives in the `pass` column and never leaves
/// the server.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub username: String,
    pub email: String,
    #[sqlx(rename = "pass")]
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// A user ready to be inserted; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Body of `POST /users`.
#[derive(Debug, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub username: String,
    #[validate(regex(path = "EMAIL_REGEX", message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

impl SignupRequest {
    pub fn from_payload(payload: &JsonObject) -> Result<Self, AppError> {
        let mut check = FieldCheck::new();
        let request = Self {
            username: check.required_string(payload, "username"),
            email: check.required_string(payload, "email"),
            password: check.required_string(payload, "password"),
        };
        check.absorb(request.validate());
        check.finish()?;
        Ok(request)
    }
}

/// Body of `POST /login`.
#[derive(Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_payload(payload: &JsonObject) -> Result<Self, AppError> {
        let mut check = FieldCheck::new();
        let request = Self {
            email: check.required_string(payload, "email"),
            password: check.required_string(payload, "password"),
        };
        check.finish()?;
        Ok(request)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}
