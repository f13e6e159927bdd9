#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Owner-scoped task management over HTTP: credential hashing, identity tokens,"]
#![doc = "the request authorization middleware, the task and user repositories, and the"]
#![doc = "route handlers. The binary (`main.rs`) wires them to Postgres and actix-web."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;

pub use crate::error::AppError;
