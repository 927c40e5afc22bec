/// Item model and database operations
///
/// This module provides the Item model representing things listed for rent.
/// Each item belongs to exactly one lender (a user); contracts reference items
/// and derive the lending party through `lender_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE items (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(30) NOT NULL,
///     item_type VARCHAR(50) NOT NULL,
///     description VARCHAR(140) NOT NULL,
///     location VARCHAR(64) NOT NULL,
///     available BOOLEAN NOT NULL DEFAULT FALSE,
///     rate DOUBLE PRECISION NOT NULL CHECK (rate >= 0),
///     image_url VARCHAR(512),
///     lender_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Item model representing a listed rental item
///
/// Name and type are stored lowercase.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Unique item ID
    pub id: i64,

    /// Item name (2-30 characters, stored lowercase)
    pub name: String,

    /// Item type/category (stored lowercase)
    pub item_type: String,

    /// Item description (10-140 characters)
    pub description: String,

    /// Pickup location (2-64 characters)
    pub location: String,

    /// Whether the item is currently available for rent
    pub available: bool,

    /// Rental rate per day (non-negative, 2 decimal places)
    pub rate: f64,

    /// Optional image URL
    pub image_url: Option<String>,

    /// User who owns and lends this item
    pub lender_id: i64,

    /// When the item was listed
    pub created_at: DateTime<Utc>,

    /// When the item was last updated
    pub updated_at: DateTime<Utc>,
}

/// Full column set for inserting or replacing an item
///
/// Built by the item service after lender resolution and normalization;
/// handlers never construct this directly.
#[derive(Debug, Clone)]
pub struct ItemRecord {
    /// Item name (already lowercased)
    pub name: String,

    /// Item type (already lowercased)
    pub item_type: String,

    /// Item description
    pub description: String,

    /// Pickup location
    pub location: String,

    /// Availability flag
    pub available: bool,

    /// Rental rate per day
    pub rate: f64,

    /// Optional image URL
    pub image_url: Option<String>,

    /// Resolved lender user ID
    pub lender_id: i64,
}

impl Item {
    /// Inserts a new item and returns the stored row
    pub async fn insert(pool: &PgPool, record: ItemRecord) -> Result<Self, sqlx::Error> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, item_type, description, location, available, rate, image_url, lender_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, item_type, description, location, available, rate, image_url,
                      lender_id, created_at, updated_at
            "#,
        )
        .bind(record.name)
        .bind(record.item_type)
        .bind(record.description)
        .bind(record.location)
        .bind(record.available)
        .bind(record.rate)
        .bind(record.image_url)
        .bind(record.lender_id)
        .fetch_one(pool)
        .await?;

        Ok(item)
    }

    /// Replaces an existing item row in full
    ///
    /// Returns the stored row, or None if the id does not exist.
    pub async fn replace(
        pool: &PgPool,
        id: i64,
        record: ItemRecord,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET name = $2,
                item_type = $3,
                description = $4,
                location = $5,
                available = $6,
                rate = $7,
                image_url = $8,
                lender_id = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, item_type, description, location, available, rate, image_url,
                      lender_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(record.name)
        .bind(record.item_type)
        .bind(record.description)
        .bind(record.location)
        .bind(record.available)
        .bind(record.rate)
        .bind(record.image_url)
        .bind(record.lender_id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Finds an item by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, item_type, description, location, available, rate, image_url,
                   lender_id, created_at, updated_at
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Finds an item by exact name
    ///
    /// Names are stored lowercase; the argument is lowercased to match.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, item_type, description, location, available, rate, image_url,
                   lender_id, created_at, updated_at
            FROM items
            WHERE name = $1
            "#,
        )
        .bind(name.to_lowercase())
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Finds items whose name contains the given substring (case-insensitive)
    ///
    /// Zero matches returns an empty list, not an error.
    pub async fn find_by_name_containing(
        pool: &PgPool,
        fragment: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", fragment.replace('%', "\\%").replace('_', "\\_"));

        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, item_type, description, location, available, rate, image_url,
                   lender_id, created_at, updated_at
            FROM items
            WHERE name ILIKE $1
            ORDER BY id ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Lists all items
    ///
    /// No pagination; ordering follows insertion (id) order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, item_type, description, location, available, rate, image_url,
                   lender_id, created_at, updated_at
            FROM items
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Deletes an item
    ///
    /// Returns true if a row was removed. Contracts referencing the item are
    /// removed by CASCADE.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_record_fields() {
        let record = ItemRecord {
            name: "acer desktop pc".to_string(),
            item_type: "desktop".to_string(),
            description: "A well-loved desktop computer".to_string(),
            location: "11345 Beggars Canyon, Wamprat road".to_string(),
            available: true,
            rate: 26.95,
            image_url: None,
            lender_id: 2,
        };

        assert_eq!(record.name, "acer desktop pc");
        assert_eq!(record.rate, 26.95);
        assert!(record.image_url.is_none());
    }

    // Integration tests for database operations are in lendit-api/tests/
}
