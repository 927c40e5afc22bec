/// Business services for Lendit
///
/// Services orchestrate models, the fee calculator, and the change policy.
/// Handlers never touch contract or item rows directly; every mutation goes
/// through a service so derived fields stay consistent.
///
/// - `contracts`: contract lifecycle (save, party-split update, accept, delete)
/// - `items`: item listing CRUD with ownership-style partial update

pub mod contracts;
pub mod items;

/// Error type shared by all services
///
/// Converted into HTTP responses by the API crate's error module.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A referenced id, name, or username does not exist
    #[error("{0}")]
    NotFound(String),

    /// The acting identity is not permitted to make this change
    #[error("{0}")]
    Forbidden(String),

    /// The backing store failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
