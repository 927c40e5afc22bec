/// Role management endpoints
///
/// # Endpoints
///
/// - `GET /roles/roles` - list all roles (ADMIN)
/// - `GET /roles/role/:id` - fetch one role (ADMIN)
/// - `POST /roles/role` - create a role (ADMIN)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use lendit_shared::auth::authorization::require_role;
use lendit_shared::auth::middleware::AuthContext;
use lendit_shared::models::role::{Role, RoleName};
use serde::Deserialize;
use validator::Validate;

/// Body for creating a role
#[derive(Debug, Deserialize, Validate)]
pub struct NewRoleRequest {
    /// Role name (stored lowercase, unique)
    #[validate(length(min = 2, max = 50, message = "Role name must be between 2 and 50 characters"))]
    pub name: String,
}

/// Lists all roles
///
/// Requires the ADMIN role.
pub async fn list_all_roles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Role>>> {
    require_role(&auth, RoleName::Admin)?;

    let roles = Role::list(&state.db).await?;
    Ok(Json(roles))
}

/// Fetches a single role by id
///
/// Requires the ADMIN role.
pub async fn get_role_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Role>> {
    require_role(&auth, RoleName::Admin)?;

    let role = Role::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Role id {} not found", id)))?;
    Ok(Json(role))
}

/// Creates a new role
///
/// Requires the ADMIN role. Responds 201 with a Location header; duplicate
/// names conflict.
pub async fn add_new_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<NewRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&auth, RoleName::Admin)?;
    req.validate()?;

    let role = Role::create(&state.db, &req.name).await?;

    let location = format!("/roles/role/{}", role.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(role),
    ))
}
