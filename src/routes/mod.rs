pub mod auth;
pub mod tasks;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route. The app must carry `web::Data` for
/// `dyn TaskRepository`, `dyn UserRepository`, `TokenService` and
/// `PasswordHasher`.
///
/// `AuthMiddleware` wraps the whole `/tasks` resource, including the
/// fallback for unsupported methods: a `PATCH` without a valid token gets
/// `401`, and only an authenticated one gets `405`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::signup).service(auth::login).service(
        web::resource("/tasks")
            .wrap(AuthMiddleware)
            .route(web::get().to(tasks::get_tasks))
            .route(web::post().to(tasks::create_task))
            .route(web::put().to(tasks::update_task))
            .route(web::delete().to(tasks::delete_task))
            .default_service(web::to(method_not_allowed)),
    );
}

async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed(format!(
        "{} is not supported on {}",
        req.method(),
        req.path()
    )))
}
