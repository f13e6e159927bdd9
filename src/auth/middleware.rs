use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::token::TokenService;
use crate::error::AppError;

/// Rejects requests without a valid identity token before they reach the
/// wrapped service.
///
/// The token is read from the `Authorization` header, with or without a
/// `Bearer ` prefix, and checked against the `TokenService` registered as app
/// data. On success an `AuthenticatedUser` is stored in the request's
/// extensions for the handler to extract.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                Box::pin(self.service.call(req))
            }
            Err(app_err) => {
                log::debug!("rejected {} {}: {}", req.method(), req.path(), app_err);
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let token = bearer_token(req)
        .ok_or_else(|| AppError::Unauthorized("Authorization header is required".into()))?;

    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::Internal("token service is not configured".into()))?;

    let claims = tokens.validate(token)?;
    Ok(AuthenticatedUser::from(claims))
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
