use crate::{
    auth::{PasswordHasher, TokenService},
    error::AppError,
    models::{payload::parse_object, LoginRequest, LoginResponse, NewUser, SignupRequest},
    repository::UserRepository,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;

/// Register a new user
///
/// Expects `{username, password, email}`. The email must be well-formed and not
/// yet registered; the password is stored only as a bcrypt hash, computed on
/// the blocking thread pool.
///
/// ## Responses:
/// - `201 Created`: `{"message": "New user created: <username>"}`.
/// - `400 Bad Request`: missing body, malformed JSON, missing fields or bad email.
/// - `409 Conflict`: the email is already registered.
#[post("/users")]
pub async fn signup(
    users: web::Data<dyn UserRepository>,
    hasher: web::Data<PasswordHasher>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let payload = parse_object(&body)?;
    let request = SignupRequest::from_payload(&payload)?;

    if users.email_exists(&request.email).await? {
        return Err(AppError::Conflict("email already exists".into()));
    }

    let hasher = *hasher.get_ref();
    let password = request.password.clone();
    let password_hash = web::block(move || hasher.hash(&password)).await??;
    users
        .create(NewUser {
            username: request.username.clone(),
            email: request.email,
            password_hash,
        })
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": format!("New user created: {}", request.username)
    })))
}

/// Login user
///
/// Exchanges `{email, password}` for a signed identity token valid for the
/// configured lifetime. Unknown email and wrong password are reported the same way.
///
/// ## Responses:
/// - `200 OK`: `{"token": "<jwt>"}`.
/// - `400 Bad Request`: missing body, malformed JSON or missing fields.
/// - `401 Unauthorized`: invalid email or password.
#[post("/login")]
pub async fn login(
    users: web::Data<dyn UserRepository>,
    hasher: web::Data<PasswordHasher>,
    tokens: web::Data<TokenService>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let payload = parse_object(&body)?;
    let request = LoginRequest::from_payload(&payload)?;

    let user = match users.find_by_email(&request.email).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::Unauthorized("invalid email or password".into()))
        }
        Err(e) => return Err(e),
    };

    let hasher = *hasher.get_ref();
    let hashed = user.password_hash.clone();
    let password = request.password;
    if !web::block(move || hasher.verify(&hashed, &password)).await? {
        return Err(AppError::Unauthorized("invalid email or password".into()));
    }

    let token = tokens.issue(&user)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}
