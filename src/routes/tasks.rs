//! Handlers for the `/tasks` resource.
//!
//! All four handlers sit behind `AuthMiddleware` and take the caller's
//! `AuthenticatedUser` as an argument; the owner is never read from the body.
//! Each one checks the request shape (body present, valid JSON, field schema)
//! before the repository is touched.

use actix_web::{http::header::ContentType, web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::payload::parse_object;
use crate::models::{NewTask, TaskChanges};
use crate::repository::{self, TaskRepository};

/// `GET /tasks` lists every task of the caller.
/// `GET /tasks?id=1&id=2` fetches exactly those tasks, or fails as a whole.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks (`[]` when there are none).
/// - `400 Bad Request`: an `id` parameter is not an integer.
/// - `404 Not Found`: any requested id is missing or not owned by the caller.
pub async fn get_tasks(
    repo: web::Data<dyn TaskRepository>,
    user: AuthenticatedUser,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    match requested_ids(&req)? {
        None => {
            let tasks = repo.get_all(&user.email).await?;
            json_response(&tasks)
        }
        Some(ids) => {
            let tasks = repository::get_many(repo.into_inner(), &ids, &user.email)
                .await
                .map_err(|e| AppError::NotFound(format!("Error fetching task: {}", e)))?;
            json_response(&tasks)
        }
    }
}

/// `POST /tasks` creates a task owned by the caller.
///
/// ## Request Body:
/// - `name`: non-empty string (required).
/// - `description` (optional): string, defaults to `""`.
/// - `status` (optional): boolean, defaults to `false`.
///
/// ## Responses:
/// - `201 Created`: empty body.
/// - `400 Bad Request`: missing body, malformed JSON or invalid fields.
pub async fn create_task(
    repo: web::Data<dyn TaskRepository>,
    user: AuthenticatedUser,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let payload = parse_object(&body)?;
    let new_task = NewTask::from_payload(&payload)?;

    log::info!("creating task {:?} for {}", new_task.name, user.email);
    repo.insert(&user.email, new_task).await?;
    Ok(HttpResponse::Created().finish())
}

/// `PUT /tasks?id=N` changes `name` and/or `status` of one of the caller's tasks.
///
/// Other keys in the body are ignored; `updated_at` is always refreshed.
///
/// ## Responses:
/// - `200 OK`: plain-text confirmation.
/// - `400 Bad Request`: missing/invalid id, empty or malformed body, or the
///   task does not exist for this caller.
pub async fn update_task(
    repo: web::Data<dyn TaskRepository>,
    user: AuthenticatedUser,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let id = single_id(&req)?;
    let payload = parse_object(&body)?;
    let changes = TaskChanges::from_payload(&payload)?;

    repo.update(id, &user.email, changes)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::BadRequest(format!("Task does not exist, ID: {}", id)),
            other => other,
        })?;

    Ok(HttpResponse::Ok()
        .insert_header(ContentType::plaintext())
        .body(format!("Task with ID: {} successfully updated", id)))
}

/// `DELETE /tasks?id=N` removes one of the caller's tasks.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `400 Bad Request`: missing or invalid id.
/// - `404 Not Found`: no such task for this caller.
pub async fn delete_task(
    repo: web::Data<dyn TaskRepository>,
    user: AuthenticatedUser,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let id = single_id(&req)?;
    repo.delete(id, &user.email).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Every `id` query parameter, parsed; `None` when there is no `id` at all.
fn requested_ids(req: &HttpRequest) -> Result<Option<Vec<i32>>, AppError> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(req.query_string())
        .map_err(|e| AppError::BadRequest(format!("Invalid query string: {}", e)))?
        .into_inner();

    let ids: Vec<&str> = pairs
        .iter()
        .filter(|(key, _)| key == "id")
        .map(|(_, value)| value.as_str())
        .collect();
    if ids.is_empty() {
        return Ok(None);
    }
    ids.into_iter().map(parse_id).collect::<Result<Vec<_>, _>>().map(Some)
}

/// The first `id` query parameter; PUT and DELETE act on a single task.
fn single_id(req: &HttpRequest) -> Result<i32, AppError> {
    requested_ids(req)?
        .and_then(|ids| ids.into_iter().next())
        .ok_or_else(|| AppError::BadRequest("Task ID is required".into()))
}

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid ID format: {:?}", raw)))
}

fn json_response<T: Serialize>(value: &T) -> Result<HttpResponse, AppError> {
    let body = serde_json::to_string(value).map_err(|e| AppError::Serialization(e.to_string()))?;
    Ok(HttpResponse::Ok()
        .insert_header(ContentType::json())
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_requested_ids() {
        let req = TestRequest::get().uri("/tasks").to_http_request();
        assert_eq!(requested_ids(&req).unwrap(), None);

        let req = TestRequest::get().uri("/tasks?id=3&id=1&other=x").to_http_request();
        assert_eq!(requested_ids(&req).unwrap(), Some(vec![3, 1]));

        let req = TestRequest::get().uri("/tasks?id=3&id=abc").to_http_request();
        assert!(matches!(requested_ids(&req), Err(AppError::BadRequest(_))));

        let req = TestRequest::get().uri("/tasks?id=").to_http_request();
        assert!(matches!(requested_ids(&req), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_single_id_uses_first() {
        let req = TestRequest::put().uri("/tasks?id=7&id=8").to_http_request();
        assert_eq!(single_id(&req).unwrap(), 7);

        let req = TestRequest::put().uri("/tasks").to_http_request();
        assert!(matches!(single_id(&req), Err(AppError::BadRequest(m)) if m == "Task ID is required"));
    }
}
