/// Item listing endpoints
///
/// # Endpoints
///
/// - `GET /items/items` - list all items (ADMIN)
/// - `GET /items/item/:id` - fetch one item
/// - `GET /items/item/name/:name` - fetch by exact name
/// - `GET /items/item/name/like/:fragment` - case-insensitive substring search
/// - `POST /items/item` - list a new item (ADMIN/LENDER)
/// - `PUT /items/item/:id` - full replace
/// - `PATCH /items/item/:id` - partial update
/// - `DELETE /items/item/:id` - hard delete (ADMIN/LENDER)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use lendit_shared::auth::authorization::{require_any_role, require_role};
use lendit_shared::auth::middleware::AuthContext;
use lendit_shared::models::item::Item;
use lendit_shared::models::role::RoleName;
use lendit_shared::services::items::{ItemDraft, ItemPatch};
use serde::Deserialize;
use validator::Validate;

/// Full item body for POST and PUT
#[derive(Debug, Deserialize, Validate)]
pub struct SaveItemRequest {
    /// Item name
    #[validate(length(min = 2, max = 30, message = "Item name must be between 2 and 30 characters"))]
    pub name: String,

    /// Item type/category
    #[validate(length(min = 1, max = 50, message = "Item type must be between 1 and 50 characters"))]
    pub item_type: String,

    /// Item description
    #[validate(length(
        min = 10,
        max = 140,
        message = "Item description must be between 10 and 140 characters"
    ))]
    pub description: String,

    /// Pickup location
    #[validate(length(min = 2, max = 64, message = "Item location must be between 2 and 64 characters"))]
    pub location: String,

    /// Availability flag
    #[serde(default)]
    pub available: bool,

    /// Daily rental rate
    #[validate(range(min = 0.0, message = "Rate must be non-negative"))]
    pub rate: f64,

    /// Optional image URL
    pub image_url: Option<String>,

    /// Username of the owning lender
    #[validate(length(min = 1, message = "Lender username is required"))]
    pub lender_username: String,
}

/// Partial item body for PATCH
#[derive(Debug, Default, Deserialize)]
pub struct PatchItemRequest {
    /// New name
    pub name: Option<String>,

    /// New type
    pub item_type: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New location
    pub location: Option<String>,

    /// New availability flag
    pub available: Option<bool>,

    /// New daily rate
    pub rate: Option<f64>,

    /// New image URL
    pub image_url: Option<String>,
}

impl From<PatchItemRequest> for ItemPatch {
    fn from(req: PatchItemRequest) -> Self {
        ItemPatch {
            name: req.name,
            item_type: req.item_type,
            description: req.description,
            location: req.location,
            available: req.available,
            rate: req.rate,
            image_url: req.image_url,
        }
    }
}

/// Lists all items
///
/// Requires the ADMIN role.
pub async fn list_all_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Item>>> {
    require_role(&auth, RoleName::Admin)?;

    let items = state.items.find_all().await?;
    Ok(Json(items))
}

/// Fetches a single item by id
pub async fn get_item_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Item>> {
    let item = state.items.find_by_id(id).await?;
    Ok(Json(item))
}

/// Fetches a single item by exact name
pub async fn get_item_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Item>> {
    let item = state.items.find_by_name(&name).await?;
    Ok(Json(item))
}

/// Lists items whose name contains the given substring, case-insensitively
///
/// Zero matches returns an empty list.
pub async fn get_items_like_name(
    State(state): State<AppState>,
    Path(fragment): Path<String>,
) -> ApiResult<Json<Vec<Item>>> {
    let items = state.items.find_by_name_containing(&fragment).await?;
    Ok(Json(items))
}

/// Lists a new item
///
/// Requires the ADMIN or LENDER role. Responds 201 with a Location header
/// pointing at the new item.
pub async fn add_new_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SaveItemRequest>,
) -> ApiResult<impl IntoResponse> {
    require_any_role(&auth, &[RoleName::Admin, RoleName::Lender])?;
    req.validate()?;

    let item = state.items.save(draft_from(req, 0)).await?;

    let location = format!("/items/item/{}", item.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(item),
    ))
}

/// Fully replaces an item
///
/// The path id must reference an existing item.
pub async fn replace_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SaveItemRequest>,
) -> ApiResult<Json<Item>> {
    req.validate()?;

    let item = state.items.save(draft_from(req, id)).await?;
    Ok(Json(item))
}

/// Applies a partial update to an item
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<PatchItemRequest>,
) -> ApiResult<Json<Item>> {
    let item = state.items.update(req.into(), id).await?;
    Ok(Json(item))
}

/// Deletes an item
///
/// Requires the ADMIN or LENDER role.
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_any_role(&auth, &[RoleName::Admin, RoleName::Lender])?;

    state.items.delete(id).await?;
    Ok(StatusCode::OK)
}

fn draft_from(req: SaveItemRequest, id: i64) -> ItemDraft {
    ItemDraft {
        id,
        name: req.name,
        item_type: req.item_type,
        description: req.description,
        location: req.location,
        available: req.available,
        rate: req.rate,
        image_url: req.image_url,
        lender_username: req.lender_username,
    }
}
