/// Item service: listing CRUD over the store
///
/// The simpler sibling of the contract service: no state machine, but the
/// same save/update split. `save` is a full replace-or-create with name/type
/// normalization and lender resolution; `update` is a partial overwrite gated
/// by the change policy.
///
/// Patch fields use explicit presence (`Option`), so `false` and `0.0` are
/// settable values, not "unset" markers.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::ServiceError;
use crate::auth::authorization::{ChangePolicy, Decision, ResourceKind, ResourceRef};
use crate::models::item::{Item, ItemRecord};
use crate::models::user::User;

/// Full item payload for create-or-replace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    /// Target item id; 0 means create a new record
    pub id: i64,

    /// Item name (will be stored lowercase)
    pub name: String,

    /// Item type (will be stored lowercase)
    pub item_type: String,

    /// Item description
    pub description: String,

    /// Pickup location
    pub location: String,

    /// Availability flag
    pub available: bool,

    /// Daily rental rate
    pub rate: f64,

    /// Optional image URL
    pub image_url: Option<String>,

    /// Username of the owning lender (resolved against the store)
    pub lender_username: String,
}

/// Partial item payload
///
/// Absent fields leave the stored value untouched; present fields overwrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    /// New name (lowercased on apply)
    pub name: Option<String>,

    /// New type (lowercased on apply)
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

/// Merges a patch into an existing item, producing the full replacement row
///
/// The lender never changes through a patch.
fn merge_item(existing: &Item, patch: ItemPatch) -> ItemRecord {
    ItemRecord {
        name: patch
            .name
            .map(|n| n.to_lowercase())
            .unwrap_or_else(|| existing.name.clone()),
        item_type: patch
            .item_type
            .map(|t| t.to_lowercase())
            .unwrap_or_else(|| existing.item_type.clone()),
        description: patch
            .description
            .unwrap_or_else(|| existing.description.clone()),
        location: patch.location.unwrap_or_else(|| existing.location.clone()),
        available: patch.available.unwrap_or(existing.available),
        rate: patch.rate.unwrap_or(existing.rate),
        image_url: match patch.image_url {
            Some(url) => Some(url),
            None => existing.image_url.clone(),
        },
        lender_id: existing.lender_id,
    }
}

/// Item service
#[derive(Clone)]
pub struct ItemService {
    pool: PgPool,
    policy: Arc<dyn ChangePolicy>,
}

impl ItemService {
    /// Creates an item service with the given policy
    pub fn new(pool: PgPool, policy: Arc<dyn ChangePolicy>) -> Self {
        Self { pool, policy }
    }

    /// Finds an item by id
    ///
    /// # Errors
    ///
    /// `NotFound` if the id does not exist
    pub async fn find_by_id(&self, id: i64) -> Result<Item, ServiceError> {
        Item::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item id {} not found", id)))
    }

    /// Finds an item by its exact (lowercased) name
    ///
    /// # Errors
    ///
    /// `NotFound` if no item carries the name
    pub async fn find_by_name(&self, name: &str) -> Result<Item, ServiceError> {
        Item::find_by_name(&self.pool, name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item name {} not found", name)))
    }

    /// Finds items whose name contains the given substring, case-insensitively
    ///
    /// Zero matches returns an empty list.
    pub async fn find_by_name_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Item>, ServiceError> {
        Ok(Item::find_by_name_containing(&self.pool, fragment).await?)
    }

    /// Lists all items
    pub async fn find_all(&self) -> Result<Vec<Item>, ServiceError> {
        Ok(Item::list(&self.pool).await?)
    }

    /// Creates or fully replaces an item
    ///
    /// Lowercases the name and type, resolves the lender by username, and
    /// replaces every column of an existing row.
    ///
    /// # Errors
    ///
    /// `NotFound` if the draft's nonzero id or lender username does not
    /// resolve
    pub async fn save(&self, draft: ItemDraft) -> Result<Item, ServiceError> {
        let existing = match draft.id {
            0 => None,
            id => Some(
                Item::find_by_id(&self.pool, id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("Item id {} not found", id)))?,
            ),
        };

        let lender = User::find_by_username(&self.pool, &draft.lender_username)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("User {} not found", draft.lender_username))
            })?;

        let record = ItemRecord {
            name: draft.name.to_lowercase(),
            item_type: draft.item_type.to_lowercase(),
            description: draft.description,
            location: draft.location,
            available: draft.available,
            rate: draft.rate,
            image_url: draft.image_url,
            lender_id: lender.id,
        };

        let stored = match existing {
            Some(current) => Item::replace(&self.pool, current.id, record)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Item id {} not found", current.id))
                })?,
            None => Item::insert(&self.pool, record).await?,
        };

        info!(item_id = stored.id, name = %stored.name, "Item saved");
        Ok(stored)
    }

    /// Applies a partial update to an existing item
    ///
    /// The change policy here is keyed on the item name, not an identity; the
    /// key mirrors the surface this service replaced and the policy seam is
    /// where a deployment corrects it.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the id does not exist
    /// - `Forbidden` if the policy denies the change
    pub async fn update(&self, patch: ItemPatch, id: i64) -> Result<Item, ServiceError> {
        let existing = self.find_by_id(id).await?;

        let decision = self
            .policy
            .may_change(
                &existing.name,
                ResourceRef {
                    kind: ResourceKind::Item,
                    key: &existing.name,
                },
            )
            .await;
        if decision == Decision::Deny {
            return Err(ServiceError::Forbidden(
                "You are not authorized to make changes on this item".to_string(),
            ));
        }

        let record = merge_item(&existing, patch);

        let stored = Item::replace(&self.pool, existing.id, record)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item id {} not found", existing.id)))?;

        info!(item_id = stored.id, name = %stored.name, "Item updated");
        Ok(stored)
    }

    /// Deletes an item
    ///
    /// # Errors
    ///
    /// `NotFound` if the id does not exist
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let removed = Item::delete(&self.pool, id).await?;
        if !removed {
            return Err(ServiceError::NotFound(format!("Item id {} not found", id)));
        }

        info!(item_id = id, "Item deleted");
        Ok(())
    }
}
