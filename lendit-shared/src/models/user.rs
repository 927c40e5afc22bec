/// User model and database operations
///
/// This module provides the User model and CRUD operations for user accounts.
/// Users hold roles via the `user_roles` join table (see [`crate::models::role`])
/// and appear in contracts as the rentee, or as the lender through the items
/// they list.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     primary_email VARCHAR(255) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User model representing a user account
///
/// Usernames are stored lowercase and are the stable identity key used in
/// party checks. Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Username (unique, stored lowercase)
    pub username: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Primary email address (unique)
    pub primary_email: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Username (will be stored lowercase)
    pub username: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    /// Primary email address
    pub primary_email: String,
}

impl User {
    /// Creates a new user in the database
    ///
    /// The username is lowercased before storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email already exists (unique
    /// constraint violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, primary_email)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, primary_email, created_at, updated_at
            "#,
        )
        .bind(data.username.to_lowercase())
        .bind(data.password_hash)
        .bind(data.primary_email)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, primary_email, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    ///
    /// Lookup is case-insensitive: the argument is lowercased to match storage.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, primary_email, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.to_lowercase())
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users
    ///
    /// No pagination; ordering follows insertion (id) order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, primary_email, created_at, updated_at
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
