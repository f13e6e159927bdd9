//! Credential hashing, identity tokens and the request authorization layer.

pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenService};
