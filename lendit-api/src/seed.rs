/// Seed data for development and demos
///
/// Puts a known set of roles, users, and items into the database. Runs once at
/// startup when `SEED_DATA=true`. The process never removes data: rows whose
/// unique keys already exist are left in place, so reseeding an existing
/// database is a no-op.

use anyhow::Result;
use tracing::info;

use crate::app::AppState;
use lendit_shared::auth::password::hash_password;
use lendit_shared::models::role::Role;
use lendit_shared::models::user::{CreateUser, User};
use lendit_shared::services::items::ItemDraft;
use lendit_shared::services::ServiceError;

/// Seeds known roles, users, and items
pub async fn run(state: &AppState) -> Result<()> {
    info!("Seeding known data");

    let admin_role = ensure_role(state, "admin").await?;
    let lender_role = ensure_role(state, "lender").await?;
    let user_role = ensure_role(state, "user").await?;

    // admin holds every role
    let admin = ensure_user(state, "admin", "password", "admin@lendit.local").await?;
    admin_role.assign_to_user(&state.db, admin.id).await?;
    lender_role.assign_to_user(&state.db, admin.id).await?;
    user_role.assign_to_user(&state.db, admin.id).await?;

    // cinnamon lends items
    let cinnamon = ensure_user(state, "cinnamon", "1234567", "cinnamon@lendit.local").await?;
    lender_role.assign_to_user(&state.db, cinnamon.id).await?;
    user_role.assign_to_user(&state.db, cinnamon.id).await?;

    // barnbarn rents them
    let barnbarn = ensure_user(state, "barnbarn", "ILuvM4th!", "barnbarn@lendit.local").await?;
    user_role.assign_to_user(&state.db, barnbarn.id).await?;

    ensure_item(
        state,
        ItemDraft {
            id: 0,
            name: "Acer Desktop PC".to_string(),
            item_type: "Desktop".to_string(),
            description: "A well-loved desktop computer".to_string(),
            location: "11345 Beggars Canyon, Wamprat road".to_string(),
            available: true,
            rate: 26.95,
            image_url: None,
            lender_username: "cinnamon".to_string(),
        },
    )
    .await?;

    ensure_item(
        state,
        ItemDraft {
            id: 0,
            name: "Garden Tiller".to_string(),
            item_type: "Tool".to_string(),
            description: "Front-tine tiller, starts on the second pull".to_string(),
            location: "88 Dagobah Swamp Lane".to_string(),
            available: true,
            rate: 12.5,
            image_url: None,
            lender_username: "cinnamon".to_string(),
        },
    )
    .await?;

    info!("Seed data complete");
    Ok(())
}

async fn ensure_role(state: &AppState, name: &str) -> Result<Role> {
    match Role::find_by_name(&state.db, name).await? {
        Some(role) => Ok(role),
        None => Ok(Role::create(&state.db, name).await?),
    }
}

async fn ensure_user(
    state: &AppState,
    username: &str,
    password: &str,
    email: &str,
) -> Result<User> {
    if let Some(user) = User::find_by_username(&state.db, username).await? {
        return Ok(user);
    }

    let user = User::create(
        &state.db,
        CreateUser {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            primary_email: email.to_string(),
        },
    )
    .await?;

    info!(username = %user.username, "Seeded user");
    Ok(user)
}

async fn ensure_item(state: &AppState, draft: ItemDraft) -> Result<()> {
    // Item names are not unique in the schema; match the seed set by name
    match state.items.find_by_name(&draft.name).await {
        Ok(_) => return Ok(()),
        Err(ServiceError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let item = state.items.save(draft).await?;
    info!(item_id = item.id, name = %item.name, "Seeded item");
    Ok(())
}
