//! # User Repository
//!
//! Database operations for user accounts.
//!
//! Passwords arrive here already hashed; this repository never sees
//! plaintext credentials.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{generate_id, parse_id};
use carlot_core::User;

/// Column list shared by every user SELECT.
const USER_COLUMNS: &str = "id, username, password_hash, created_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user and returns the persisted record.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - Username already taken
    pub async fn insert(&self, username: &str, password_hash: &str) -> DbResult<User> {
        let id = generate_id();
        let created_at = Utc::now();

        debug!(username = %username, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&id)
        .bind(username)
        .bind(password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("User", &id))
    }

    /// Fetches a user by its identifier.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let key = parse_id(id)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Fetches a user by username.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
