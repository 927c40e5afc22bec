/// User lookup endpoints
///
/// Read-only collaborator surface; account creation happens through
/// `/auth/register`. Password hashes never serialize into responses.
///
/// # Endpoints
///
/// - `GET /users/users` - list all users (ADMIN)
/// - `GET /users/user/:id` - fetch one user (ADMIN)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use lendit_shared::auth::authorization::require_role;
use lendit_shared::auth::middleware::AuthContext;
use lendit_shared::models::role::RoleName;
use lendit_shared::models::user::User;

/// Lists all users
///
/// Requires the ADMIN role.
pub async fn list_all_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<User>>> {
    require_role(&auth, RoleName::Admin)?;

    let users = User::list(&state.db).await?;
    Ok(Json(users))
}

/// Fetches a single user by id
///
/// Requires the ADMIN role.
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    require_role(&auth, RoleName::Admin)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User id {} not found", id)))?;
    Ok(Json(user))
}
