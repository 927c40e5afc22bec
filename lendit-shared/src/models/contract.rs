/// Contract model and lifecycle flags
///
/// This module provides the Contract model representing a rental agreement
/// between a rentee and the lender of an item, plus the pure flag logic that
/// governs the contract lifecycle.
///
/// # Lifecycle
///
/// A contract is not a single-enum state machine; its state is the composite
/// of four independent booleans, two per party:
///
/// ```text
/// proposed  --(both accept flags true)-->  accepted   (dates stamped once)
/// accepted  --(both complete flags true)-> completed  (active = false)
/// ```
///
/// Any other flag combination leaves the contract active. There is no terminal
/// state: clearing the complete flags on a later save reactivates the
/// contract. Dates, once stamped, are never retracted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE contracts (
///     id BIGSERIAL PRIMARY KEY,
///     length_days INTEGER NOT NULL CHECK (length_days > 0),
///     fee DOUBLE PRECISION NOT NULL DEFAULT 0 CHECK (fee >= 0),
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     rentee_accept BOOLEAN NOT NULL DEFAULT FALSE,
///     lender_accept BOOLEAN NOT NULL DEFAULT FALSE,
///     rentee_complete BOOLEAN NOT NULL DEFAULT FALSE,
///     lender_complete BOOLEAN NOT NULL DEFAULT FALSE,
///     start_date TIMESTAMPTZ,
///     end_date TIMESTAMPTZ,
///     rentee_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     item_id BIGINT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// The four per-party lifecycle flags of a contract
///
/// Each party owns exactly one accept flag and one complete flag; the derived
/// `active` status and the date stamping condition are pure functions of this
/// set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFlags {
    /// Rentee has confirmed the contract should commence
    pub rentee_accept: bool,

    /// Lender has confirmed the contract should commence
    pub lender_accept: bool,

    /// Rentee has confirmed the contract has concluded
    pub rentee_complete: bool,

    /// Lender has confirmed the contract has concluded
    pub lender_complete: bool,
}

/// Coarse lifecycle phase derived from the flag set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractPhase {
    /// Not yet accepted by both parties
    Proposed,

    /// Accepted by both parties, not yet settled
    Accepted,

    /// Marked complete by both parties
    Completed,
}

impl ContractFlags {
    /// A contract stays active until both parties have marked it complete
    pub fn is_active(&self) -> bool {
        !(self.rentee_complete && self.lender_complete)
    }

    /// Both parties have accepted; the rental period may be stamped
    pub fn is_fully_accepted(&self) -> bool {
        self.rentee_accept && self.lender_accept
    }

    /// Derives the coarse lifecycle phase
    ///
    /// Completion wins over acceptance when both conditions hold.
    pub fn phase(&self) -> ContractPhase {
        if !self.is_active() {
            ContractPhase::Completed
        } else if self.is_fully_accepted() {
            ContractPhase::Accepted
        } else {
            ContractPhase::Proposed
        }
    }
}

/// Contract model representing a rental agreement
///
/// The lender is not stored on the contract; it is derived through
/// `item_id -> items.lender_id` at the service boundary.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contract {
    /// Unique contract ID
    pub id: i64,

    /// Rental length in days (positive)
    pub length_days: i32,

    /// Total fee, derived from length and item rate (2 decimal places)
    pub fee: f64,

    /// Derived activity status: false only when both complete flags are set
    pub active: bool,

    /// Rentee acceptance flag
    pub rentee_accept: bool,

    /// Lender acceptance flag
    pub lender_accept: bool,

    /// Rentee completion flag
    pub rentee_complete: bool,

    /// Lender completion flag
    pub lender_complete: bool,

    /// Rental start, stamped when both parties have accepted
    pub start_date: Option<DateTime<Utc>>,

    /// Rental end, always `start_date + length_days` days
    pub end_date: Option<DateTime<Utc>>,

    /// User renting the item
    pub rentee_id: i64,

    /// Item being rented
    pub item_id: i64,

    /// When the contract was created
    pub created_at: DateTime<Utc>,

    /// When the contract was last updated
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// Extracts the lifecycle flag set
    pub fn flags(&self) -> ContractFlags {
        ContractFlags {
            rentee_accept: self.rentee_accept,
            lender_accept: self.lender_accept,
            rentee_complete: self.rentee_complete,
            lender_complete: self.lender_complete,
        }
    }
}

/// Full column set for inserting or replacing a contract
///
/// Built by the contract service after rentee/item resolution and derivation
/// of fee, active, and dates; handlers never construct this directly.
#[derive(Debug, Clone)]
pub struct ContractRecord {
    /// Rental length in days
    pub length_days: i32,

    /// Derived fee
    pub fee: f64,

    /// Derived activity status
    pub active: bool,

    /// Lifecycle flags as supplied by the caller
    pub flags: ContractFlags,

    /// Rental start (None until both parties accept)
    pub start_date: Option<DateTime<Utc>>,

    /// Rental end (None until both parties accept)
    pub end_date: Option<DateTime<Utc>>,

    /// Resolved rentee user ID
    pub rentee_id: i64,

    /// Referenced item ID
    pub item_id: i64,
}

impl Contract {
    /// Inserts a new contract and returns the stored row
    pub async fn insert(pool: &PgPool, record: ContractRecord) -> Result<Self, sqlx::Error> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts (length_days, fee, active,
                                   rentee_accept, lender_accept, rentee_complete, lender_complete,
                                   start_date, end_date, rentee_id, item_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, length_days, fee, active,
                      rentee_accept, lender_accept, rentee_complete, lender_complete,
                      start_date, end_date, rentee_id, item_id, created_at, updated_at
            "#,
        )
        .bind(record.length_days)
        .bind(record.fee)
        .bind(record.active)
        .bind(record.flags.rentee_accept)
        .bind(record.flags.lender_accept)
        .bind(record.flags.rentee_complete)
        .bind(record.flags.lender_complete)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.rentee_id)
        .bind(record.item_id)
        .fetch_one(pool)
        .await?;

        Ok(contract)
    }

    /// Replaces an existing contract row in full
    ///
    /// Returns the stored row, or None if the id does not exist.
    pub async fn replace(
        pool: &PgPool,
        id: i64,
        record: ContractRecord,
    ) -> Result<Option<Self>, sqlx::Error> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET length_days = $2,
                fee = $3,
                active = $4,
                rentee_accept = $5,
                lender_accept = $6,
                rentee_complete = $7,
                lender_complete = $8,
                start_date = $9,
                end_date = $10,
                rentee_id = $11,
                item_id = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, length_days, fee, active,
                      rentee_accept, lender_accept, rentee_complete, lender_complete,
                      start_date, end_date, rentee_id, item_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(record.length_days)
        .bind(record.fee)
        .bind(record.active)
        .bind(record.flags.rentee_accept)
        .bind(record.flags.lender_accept)
        .bind(record.flags.rentee_complete)
        .bind(record.flags.lender_complete)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.rentee_id)
        .bind(record.item_id)
        .fetch_optional(pool)
        .await?;

        Ok(contract)
    }

    /// Finds a contract by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            SELECT id, length_days, fee, active,
                   rentee_accept, lender_accept, rentee_complete, lender_complete,
                   start_date, end_date, rentee_id, item_id, created_at, updated_at
            FROM contracts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(contract)
    }

    /// Lists all contracts
    ///
    /// No pagination; ordering follows insertion (id) order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let contracts = sqlx::query_as::<_, Contract>(
            r#"
            SELECT id, length_days, fee, active,
                   rentee_accept, lender_accept, rentee_complete, lender_complete,
                   start_date, end_date, rentee_id, item_id, created_at, updated_at
            FROM contracts
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(contracts)
    }

    /// Deletes a contract
    ///
    /// Returns true if a row was removed.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
