use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskvault::auth::{PasswordHasher, TokenService};
use taskvault::config::Config;
use taskvault::repository::{PgTaskRepository, PgUserRepository, TaskRepository, UserRepository};
use taskvault::routes;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            log::error!("Error opening database connection: {}", e);
            io::Error::other(e)
        })?;
    log::info!("Successfully connected to the database");

    let tokens = TokenService::new(&config.jwt_secret, chrono::Duration::hours(config.token_ttl_hours))
        .map_err(io::Error::other)?;
    let hasher = PasswordHasher::new(config.bcrypt_cost);

    let task_repo: Arc<dyn TaskRepository> = Arc::new(PgTaskRepository::new(pool.clone()));
    let user_repo: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let tasks = web::Data::from(task_repo);
    let users = web::Data::from(user_repo);
    let tokens = web::Data::new(tokens);
    let hasher = web::Data::new(hasher);

    log::info!("Starting taskvault server at {}", config.server_url());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(tasks.clone())
            .app_data(users.clone())
            .app_data(tokens.clone())
            .app_data(hasher.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await;

    pool.close().await;
    server
}
