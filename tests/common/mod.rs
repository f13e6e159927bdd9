#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use taskvault::auth::{PasswordHasher, TokenService};
use taskvault::error::AppError;
use taskvault::models::{NewTask, NewUser, Task, TaskChanges, User};
use taskvault::repository::{TaskRepository, UserRepository};
use taskvault::routes;

pub const TEST_SECRET: &str = "integration_test_secret";

/// In-memory stand-in for both repositories.
///
/// Counts every task repository call so tests can prove a request never
/// reached storage, and can be told to fail or slow down fetches per id.
#[derive(Default)]
pub struct MemoryStore {
    tasks: Mutex<Vec<Task>>,
    users: Mutex<Vec<User>>,
    next_id: AtomicI32,
    task_calls: AtomicUsize,
    broken_ids: Mutex<HashSet<i32>>,
    fetch_delays: Mutex<HashMap<i32, Duration>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn task_calls(&self) -> usize {
        self.task_calls.load(Ordering::SeqCst)
    }

    pub fn break_id(&self, id: i32) {
        self.broken_ids.lock().unwrap().insert(id);
    }

    pub fn delay_fetch(&self, id: i32, delay: Duration) {
        self.fetch_delays.lock().unwrap().insert(id, delay);
    }

    pub fn stored_tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    fn record_call(&self) {
        self.task_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn not_found(id: i32) -> AppError {
        AppError::NotFound(format!("task with ID {} was not found", id))
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn exists(&self, id: i32, owner_email: &str) -> Result<bool, AppError> {
        self.record_call();
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .any(|t| t.id == id && t.owner_email == owner_email))
    }

    async fn insert(&self, owner_email: &str, task: NewTask) -> Result<i32, AppError> {
        self.record_call();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        self.tasks.lock().unwrap().push(Task {
            id,
            name: task.name,
            description: task.description,
            status: task.status,
            owner_email: owner_email.to_string(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn get_all(&self, owner_email: &str) -> Result<Vec<Task>, AppError> {
        self.record_call();
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.owner_email == owner_email)
            .cloned()
            .collect())
    }

    async fn get(&self, id: i32, owner_email: &str) -> Result<Task, AppError> {
        self.record_call();
        let delay = self.fetch_delays.lock().unwrap().get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.broken_ids.lock().unwrap().contains(&id) {
            return Err(AppError::Persistence("connection reset".into()));
        }
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id && t.owner_email == owner_email)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn update(&self, id: i32, owner_email: &str, changes: TaskChanges) -> Result<(), AppError> {
        if !self.exists(id, owner_email).await? {
            return Err(Self::not_found(id));
        }
        self.record_call();
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id && t.owner_email == owner_email)
            .ok_or_else(|| Self::not_found(id))?;
        if let Some(name) = changes.name {
            task.name = name;
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        let now = Utc::now();
        task.updated_at = if now > task.updated_at {
            now
        } else {
            task.updated_at + chrono::Duration::microseconds(1)
        };
        Ok(())
    }

    async fn delete(&self, id: i32, owner_email: &str) -> Result<(), AppError> {
        if !self.exists(id, owner_email).await? {
            return Err(Self::not_found(id));
        }
        self.record_call();
        self.tasks
            .lock()
            .unwrap()
            .retain(|t| !(t.id == id && t.owner_email == owner_email));
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn create(&self, user: NewUser) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("email already exists".into()));
        }
        users.push(User {
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        });
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user email {} not found", email)))
    }
}

pub fn token_service() -> TokenService {
    TokenService::new(TEST_SECRET, chrono::Duration::hours(24)).unwrap()
}

/// The production route table over `store`, with a cheap bcrypt cost.
pub fn app(
    store: Arc<MemoryStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let tasks: Arc<dyn TaskRepository> = store.clone();
    let users: Arc<dyn UserRepository> = store;
    App::new()
        .app_data(web::Data::from(tasks))
        .app_data(web::Data::from(users))
        .app_data(web::Data::new(token_service()))
        .app_data(web::Data::new(PasswordHasher::new(4)))
        .configure(routes::config)
}

/// Signs up and logs in, returning the bearer token.
pub async fn register_and_login<S, B>(app: &S, email: &str, username: &str, password: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "username": username, "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED, "signup failed for {}", email);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK, "login failed for {}", email);
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["token"].as_str().unwrap().to_string()
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (actix_web::http::header::AUTHORIZATION, format!("Bearer {}", token))
}
