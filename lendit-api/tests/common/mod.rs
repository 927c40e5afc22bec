/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user and item creation
/// - JWT token generation
///
/// Tests using this context require a reachable PostgreSQL instance; set
/// `DATABASE_URL` and `JWT_SECRET` and run the ignored tests explicitly:
///
/// ```bash
/// DATABASE_URL=postgresql://localhost/lendit_test \
/// JWT_SECRET=test-secret-key-at-least-32-bytes-long \
/// cargo test -p lendit-api -- --ignored
/// ```

use lendit_api::app::{build_router, AppState};
use lendit_api::config::Config;
use lendit_shared::auth::jwt::{create_token, Claims, TokenType};
use lendit_shared::auth::password::hash_password;
use lendit_shared::models::item::{Item, ItemRecord};
use lendit_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use std::time::{SystemTime, UNIX_EPOCH};

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub lender: User,
    pub rentee: User,
    pub outsider: User,
    pub item: Item,
}

/// Nanosecond suffix to keep test rows unique across runs
fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

impl TestContext {
    /// Creates a new test context with its own users and item
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../lendit-shared/migrations").run(&db).await?;

        let suffix = unique_suffix();
        let lender = create_test_user(&db, &format!("lender-{}", suffix)).await?;
        let rentee = create_test_user(&db, &format!("rentee-{}", suffix)).await?;
        let outsider = create_test_user(&db, &format!("outsider-{}", suffix)).await?;

        let item = Item::insert(
            &db,
            ItemRecord {
                name: format!("test rig {}", suffix),
                item_type: "desktop".to_string(),
                description: "A well-loved test machine".to_string(),
                location: "11345 Beggars Canyon, Wamprat road".to_string(),
                available: true,
                rate: 26.95,
                image_url: None,
                lender_id: lender.id,
            },
        )
        .await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            lender,
            rentee,
            outsider,
            item,
        })
    }

    /// Mints an access token for a user with the given role names
    pub fn token_for(&self, user: &User, roles: &[&str]) -> String {
        let claims = Claims::new(
            user.id,
            &user.username,
            roles.iter().map(|r| r.to_string()).collect(),
            TokenType::Access,
        );
        create_token(&claims, &self.config.jwt.secret).expect("token creation")
    }

    /// Returns an authorization header value for a user
    pub fn auth_header_for(&self, user: &User, roles: &[&str]) -> String {
        format!("Bearer {}", self.token_for(user, roles))
    }

    /// Cleans up test data
    ///
    /// Deleting the users cascades to their items and contracts.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id IN ($1, $2, $3)")
            .bind(self.lender.id)
            .bind(self.rentee.id)
            .bind(self.outsider.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

async fn create_test_user(db: &PgPool, username: &str) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            username: username.to_string(),
            password_hash: hash_password("test-password-123")?,
            primary_email: format!("{}@lendit.test", username),
        },
    )
    .await?;

    Ok(user)
}
