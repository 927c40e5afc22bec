/// Database models for Lendit
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts
/// - `role`: Roles and user-role assignments
/// - `item`: Items listed for rent
/// - `contract`: Rental contracts and their lifecycle flags
///
/// # Example
///
/// ```no_run
/// use lendit_shared::models::user::{User, CreateUser};
/// use lendit_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "cinnamon".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     primary_email: "cinnamon@mymail.local".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod contract;
pub mod item;
pub mod role;
pub mod user;
