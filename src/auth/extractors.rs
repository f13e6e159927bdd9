use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// The caller's identity, as established by `AuthMiddleware`.
///
/// Handlers take this as an argument and use `email` as the owner for every
/// repository call. It lives in the request's extensions, so it is dropped
/// together with the request.
///
/// If no identity is present (the middleware did not run), extraction fails
/// with `AppError::Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
    pub username: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            username: claims.username,
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized("No authenticated identity on request".into());
                ready(Err(err.into()))
            }
        }
    }
}
