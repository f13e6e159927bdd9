use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Salted one-way password hashing backed by bcrypt.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Hashing(format!("Failed to hash password: {}", e)))
    }

    /// A mismatch and a malformed stored hash both count as "no match".
    pub fn verify(&self, hashed_password: &str, password: &str) -> bool {
        verify(password, hashed_password).unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}
