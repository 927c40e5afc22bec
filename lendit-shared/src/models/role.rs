/// Role model and user-role assignments
///
/// This module provides the Role model and the many-to-many user-role
/// relationship used for endpoint-level access control. The seeded role set is
/// `admin`, `lender`, and `user`; a user may hold any combination.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(50) NOT NULL UNIQUE
/// );
///
/// CREATE TABLE user_roles (
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role_id BIGINT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
///     PRIMARY KEY (user_id, role_id)
/// );
/// ```
///
/// # Roles
///
/// - **admin**: May list all users, items, and contracts, and delete any record
/// - **lender**: May list items, update own items, delete contracts on them
/// - **user**: May form contracts and update their own half of the flag set

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

/// Well-known role names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    /// Full access to every collection and record
    Admin,

    /// Lists items and manages contracts on them
    Lender,

    /// Rents items and manages their own contract flags
    User,
}

impl RoleName {
    /// Converts the role to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::Lender => "lender",
            RoleName::User => "user",
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(RoleName::Admin),
            "lender" => Ok(RoleName::Lender),
            "user" => Ok(RoleName::User),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Role model representing a named role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    /// Unique role ID
    pub id: i64,

    /// Role name (unique, stored lowercase)
    pub name: String,
}

impl Role {
    /// Creates a new role
    ///
    /// The name is lowercased before storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the name already exists (unique constraint
    /// violation) or the database operation fails.
    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name)
            VALUES ($1)
            RETURNING id, name
            "#,
        )
        .bind(name.to_lowercase())
        .fetch_one(pool)
        .await?;

        Ok(role)
    }

    /// Finds a role by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(role)
    }

    /// Finds a role by name (case-insensitive)
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name.to_lowercase())
            .fetch_optional(pool)
            .await?;

        Ok(role)
    }

    /// Lists all roles
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY id ASC")
            .fetch_all(pool)
            .await?;

        Ok(roles)
    }

    /// Assigns this role to a user
    ///
    /// Idempotent: assigning an already-held role is a no-op.
    pub async fn assign_to_user(&self, pool: &PgPool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(self.id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists the role names held by a user
    pub async fn names_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<String>, sqlx::Error> {
        let names: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_as_str() {
        assert_eq!(RoleName::Admin.as_str(), "admin");
        assert_eq!(RoleName::Lender.as_str(), "lender");
        assert_eq!(RoleName::User.as_str(), "user");
    }

    #[test]
    fn test_role_name_parse() {
        assert_eq!("admin".parse::<RoleName>().unwrap(), RoleName::Admin);
        assert_eq!("LENDER".parse::<RoleName>().unwrap(), RoleName::Lender);
        assert_eq!("User".parse::<RoleName>().unwrap(), RoleName::User);
        assert!("superuser".parse::<RoleName>().is_err());
    }

    #[test]
    fn test_role_name_roundtrip() {
        for role in [RoleName::Admin, RoleName::Lender, RoleName::User] {
            assert_eq!(role.as_str().parse::<RoleName>().unwrap(), role);
        }
    }
}
