/// Contract lifecycle endpoints
///
/// All handlers delegate to the contract service; derived fields (fee, active,
/// dates) are never computed here.
///
/// # Endpoints
///
/// - `GET /contracts/contracts` - list all contracts (ADMIN)
/// - `GET /contracts/contract/:id` - fetch one contract
/// - `POST /contracts/new/:item_id` - propose a contract on an item
/// - `PUT /contracts/contract/:id` - full replace
/// - `PATCH /contracts/contract/agree/:id` - record the caller's acceptance
/// - `PATCH /contracts/contract/:id` - party-split partial update
/// - `DELETE /contracts/contract/:id` - hard delete (ADMIN/LENDER)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use lendit_shared::auth::authorization::{require_any_role, require_role};
use lendit_shared::auth::middleware::AuthContext;
use lendit_shared::models::contract::{Contract, ContractFlags};
use lendit_shared::models::role::RoleName;
use lendit_shared::services::contracts::{ContractDraft, ContractPatch};
use serde::Deserialize;
use validator::Validate;

/// Body for proposing a contract on an item
#[derive(Debug, Deserialize, Validate)]
pub struct NewContractRequest {
    /// Rental length in days
    #[validate(range(min = 1, message = "Contract length must be at least 1 day"))]
    pub length_days: i32,
}

/// Full contract body for PUT replacement
///
/// Flags default to false when absent; callers replacing an existing contract
/// must resend current flag values or they will be reset.
#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceContractRequest {
    /// Rental length in days
    #[validate(range(min = 1, message = "Contract length must be at least 1 day"))]
    pub length_days: i32,

    /// Username of the renting party
    #[validate(length(min = 1, message = "Rentee username is required"))]
    pub rentee_username: String,

    /// Item being rented
    pub item_id: i64,

    /// Rentee acceptance flag
    #[serde(default)]
    pub rentee_accept: bool,

    /// Lender acceptance flag
    #[serde(default)]
    pub lender_accept: bool,

    /// Rentee completion flag
    #[serde(default)]
    pub rentee_complete: bool,

    /// Lender completion flag
    #[serde(default)]
    pub lender_complete: bool,
}

/// Partial contract body for PATCH updates
#[derive(Debug, Default, Deserialize)]
pub struct PatchContractRequest {
    /// New rental length; accepted but currently never applied
    pub length_days: Option<i32>,

    /// Rentee acceptance flag
    pub rentee_accept: Option<bool>,

    /// Lender acceptance flag
    pub lender_accept: Option<bool>,

    /// Rentee completion flag
    pub rentee_complete: Option<bool>,

    /// Lender completion flag
    pub lender_complete: Option<bool>,
}

/// Lists all contracts
///
/// Requires the ADMIN role.
pub async fn list_all_contracts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Contract>>> {
    require_role(&auth, RoleName::Admin)?;

    let contracts = state.contracts.find_all().await?;
    Ok(Json(contracts))
}

/// Fetches a single contract by id
pub async fn get_contract_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Contract>> {
    let contract = state.contracts.find_by_id(id).await?;
    Ok(Json(contract))
}

/// Proposes a new contract on an item
///
/// The authenticated caller becomes the rentee; all lifecycle flags start
/// false. Responds 201 with a Location header pointing at the new contract.
pub async fn add_new_contract(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(item_id): Path<i64>,
    Json(req): Json<NewContractRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let draft = ContractDraft {
        id: 0,
        length_days: req.length_days,
        rentee_username: auth.username.clone(),
        item_id,
        flags: ContractFlags::default(),
    };

    let contract = state.contracts.save(draft).await?;

    let location = format!("/contracts/contract/{}", contract.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(contract),
    ))
}

/// Fully replaces a contract
///
/// The path id must reference an existing contract.
pub async fn replace_contract(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ReplaceContractRequest>,
) -> ApiResult<Json<Contract>> {
    req.validate()?;

    let draft = ContractDraft {
        id,
        length_days: req.length_days,
        rentee_username: req.rentee_username,
        item_id: req.item_id,
        flags: ContractFlags {
            rentee_accept: req.rentee_accept,
            lender_accept: req.lender_accept,
            rentee_complete: req.rentee_complete,
            lender_complete: req.lender_complete,
        },
    };

    let contract = state.contracts.save(draft).await?;
    Ok(Json(contract))
}

/// Records the caller's acceptance of a contract
///
/// 404 if the caller is neither the lender nor the rentee. Responds 201 with
/// a Location header, matching the propose endpoint.
pub async fn agree_contract(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let contract = state.contracts.accept(id, &auth).await?;

    let location = format!("/contracts/contract/{}", contract.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(contract),
    ))
}

/// Applies a party-restricted partial update
///
/// Requires one of the ADMIN/LENDER/USER roles; the service further restricts
/// the change to the caller's own half of the flag set.
pub async fn update_contract(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<PatchContractRequest>,
) -> ApiResult<Json<Contract>> {
    require_any_role(&auth, &[RoleName::Admin, RoleName::Lender, RoleName::User])?;

    let patch = ContractPatch {
        length_days: req.length_days,
        rentee_accept: req.rentee_accept,
        lender_accept: req.lender_accept,
        rentee_complete: req.rentee_complete,
        lender_complete: req.lender_complete,
    };

    let contract = state.contracts.update(patch, id, &auth).await?;
    Ok(Json(contract))
}

/// Deletes a contract
///
/// Requires the ADMIN or LENDER role.
pub async fn delete_contract(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_any_role(&auth, &[RoleName::Admin, RoleName::Lender])?;

    state.contracts.delete(id).await?;
    Ok(StatusCode::OK)
}
