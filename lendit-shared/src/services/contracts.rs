/// Contract service: lifecycle orchestration over the store
///
/// Composes the fee calculator, the flag state machine, and the change policy
/// into the save/update/accept/delete operations of a contract. All derived
/// fields (fee, active, dates) are computed here through one pure path, so a
/// full save and a party update can never disagree about them.
///
/// # Save semantics
///
/// `save` is a full overwrite: every column of the stored row is replaced from
/// the incoming draft. Flags are taken from the draft and never defaulted from
/// the stored record, so callers must resend current flag values to avoid
/// resetting them. An id of 0 creates a new contract; a nonzero id must
/// reference an existing record.
///
/// # Update semantics
///
/// `update` is the party-split partial mutation: the lender may only set their
/// own accept/complete pair, the rentee theirs. Patch fields use explicit
/// presence (`Option`), so `false` is a settable value, not an "unset" marker.
///
/// # Date stamping
///
/// Dates are stamped the first time an operation observes both accept flags
/// true, and are never re-stamped or retracted afterwards, even if a flag
/// later flips back.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::ServiceError;
use crate::auth::authorization::{ChangePolicy, Decision, ResourceKind, ResourceRef};
use crate::auth::middleware::AuthContext;
use crate::fees;
use crate::models::contract::{Contract, ContractFlags, ContractRecord};
use crate::models::item::Item;
use crate::models::user::User;

/// Full contract payload for create-or-replace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractDraft {
    /// Target contract id; 0 means create a new record
    pub id: i64,

    /// Rental length in days
    pub length_days: i32,

    /// Username of the renting party (resolved against the store)
    pub rentee_username: String,

    /// Item being rented
    pub item_id: i64,

    /// Lifecycle flags, taken verbatim from the caller
    pub flags: ContractFlags,
}

/// Partial contract payload for party updates
///
/// Absent fields leave the stored value untouched; present fields overwrite,
/// including `false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractPatch {
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

/// Which side of the contract an actor is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractParty {
    /// The user lending the item (via `item.lender_id`)
    Lender,

    /// The user renting the item
    Rentee,
}

/// Merges a patch into the current flag set, restricted to one party's half
///
/// A lender's patch can only move `lender_accept`/`lender_complete`; rentee
/// fields present in it are ignored, and vice versa.
fn merge_party_flags(
    current: ContractFlags,
    patch: &ContractPatch,
    party: ContractParty,
) -> ContractFlags {
    let mut merged = current;
    match party {
        ContractParty::Lender => {
            if let Some(value) = patch.lender_accept {
                merged.lender_accept = value;
            }
            if let Some(value) = patch.lender_complete {
                merged.lender_complete = value;
            }
        }
        ContractParty::Rentee => {
            if let Some(value) = patch.rentee_accept {
                merged.rentee_accept = value;
            }
            if let Some(value) = patch.rentee_complete {
                merged.rentee_complete = value;
            }
        }
    }
    merged
}

/// Derives the rental period for a contract about to be persisted
///
/// Existing dates always win: once stamped they are neither refreshed nor
/// retracted. Otherwise the period starts now and runs for `length_days` days
/// as soon as both parties have accepted.
fn derive_dates(
    flags: ContractFlags,
    existing_start: Option<DateTime<Utc>>,
    existing_end: Option<DateTime<Utc>>,
    length_days: i32,
    now: DateTime<Utc>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    if existing_start.is_some() {
        return (existing_start, existing_end);
    }
    if flags.is_fully_accepted() {
        let end = now + Duration::days(i64::from(length_days));
        return (Some(now), Some(end));
    }
    (None, None)
}

/// Contract service
///
/// Holds the pool and the injected change policy. Cheap to clone.
#[derive(Clone)]
pub struct ContractService {
    pool: PgPool,
    policy: Arc<dyn ChangePolicy>,
}

impl ContractService {
    /// Creates a contract service with the given policy
    pub fn new(pool: PgPool, policy: Arc<dyn ChangePolicy>) -> Self {
        Self { pool, policy }
    }

    /// Finds a contract by id
    ///
    /// # Errors
    ///
    /// `NotFound` if the id does not exist
    pub async fn find_by_id(&self, id: i64) -> Result<Contract, ServiceError> {
        Contract::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Contract id {} not found", id)))
    }

    /// Lists all contracts, in storage iteration order
    pub async fn find_all(&self) -> Result<Vec<Contract>, ServiceError> {
        Ok(Contract::list(&self.pool).await?)
    }

    /// Creates or fully replaces a contract
    ///
    /// Resolves the rentee by username and the item by id, recomputes the fee
    /// and active status from the draft, and stamps the rental period if the
    /// draft is fully accepted and no dates exist yet.
    ///
    /// # Errors
    ///
    /// `NotFound` if the draft's nonzero id, rentee username, or item id does
    /// not resolve
    pub async fn save(&self, draft: ContractDraft) -> Result<Contract, ServiceError> {
        let existing = match draft.id {
            0 => None,
            id => Some(
                Contract::find_by_id(&self.pool, id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("Contract id {} not found", id)))?,
            ),
        };

        let rentee = User::find_by_username(&self.pool, &draft.rentee_username)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("User {} not found", draft.rentee_username))
            })?;

        let item = Item::find_by_id(&self.pool, draft.item_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item id {} not found", draft.item_id)))?;

        let (start_date, end_date) = derive_dates(
            draft.flags,
            existing.as_ref().and_then(|c| c.start_date),
            existing.as_ref().and_then(|c| c.end_date),
            draft.length_days,
            Utc::now(),
        );

        let record = ContractRecord {
            length_days: draft.length_days,
            fee: fees::contract_fee(draft.length_days, item.rate),
            active: draft.flags.is_active(),
            flags: draft.flags,
            start_date,
            end_date,
            rentee_id: rentee.id,
            item_id: item.id,
        };

        let stored = match existing {
            Some(current) => Contract::replace(&self.pool, current.id, record)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Contract id {} not found", current.id))
                })?,
            None => Contract::insert(&self.pool, record).await?,
        };

        info!(
            contract_id = stored.id,
            fee = stored.fee,
            active = stored.active,
            "Contract saved"
        );
        Ok(stored)
    }

    /// Applies a party-restricted partial update
    ///
    /// The actor must pass the change policy (keyed on their username) and be
    /// one of the contract's two parties. Only the actor's own half of the
    /// flag set is applied; active and dates are re-derived afterwards. The
    /// fee and length are left untouched.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the contract or its item does not exist
    /// - `Forbidden` if the policy denies the change or the actor is neither
    ///   lender nor rentee
    pub async fn update(
        &self,
        patch: ContractPatch,
        id: i64,
        actor: &AuthContext,
    ) -> Result<Contract, ServiceError> {
        let contract = self.find_by_id(id).await?;

        let key = id.to_string();
        let decision = self
            .policy
            .may_change(
                &actor.username,
                ResourceRef {
                    kind: ResourceKind::Contract,
                    key: &key,
                },
            )
            .await;
        if decision == Decision::Deny {
            return Err(ServiceError::Forbidden(
                "You are not authorized to make changes on this contract".to_string(),
            ));
        }

        let party = self.party_of(&contract, actor).await?.ok_or_else(|| {
            ServiceError::Forbidden(
                "Only the lender or rentee may change this contract".to_string(),
            )
        })?;

        let merged = merge_party_flags(contract.flags(), &patch, party);

        // TODO: applying patch.length_days requires both parties to re-accept
        // the renegotiated period; it is accepted but not applied until then.

        self.persist_with_flags(contract, merged).await
    }

    /// Records the calling party's acceptance of a contract
    ///
    /// Sets the actor's accept flag to true and persists through the same
    /// derivation path as update, so the rental period is stamped the moment
    /// the second party accepts.
    ///
    /// # Errors
    ///
    /// `NotFound` if the contract does not exist or the actor is neither
    /// lender nor rentee
    pub async fn accept(&self, id: i64, actor: &AuthContext) -> Result<Contract, ServiceError> {
        let contract = self.find_by_id(id).await?;

        let party = self.party_of(&contract, actor).await?.ok_or_else(|| {
            ServiceError::NotFound(
                "You must be the lender or rentee to change this value".to_string(),
            )
        })?;

        let mut flags = contract.flags();
        match party {
            ContractParty::Lender => flags.lender_accept = true,
            ContractParty::Rentee => flags.rentee_accept = true,
        }

        self.persist_with_flags(contract, flags).await
    }

    /// Deletes a contract
    ///
    /// # Errors
    ///
    /// `NotFound` if the id does not exist
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let removed = Contract::delete(&self.pool, id).await?;
        if !removed {
            return Err(ServiceError::NotFound(format!(
                "Contract id {} not found",
                id
            )));
        }

        info!(contract_id = id, "Contract deleted");
        Ok(())
    }

    /// Determines which side of the contract the actor is on, if any
    ///
    /// The lender is resolved through the item; comparison uses stable user
    /// ids, never reference identity.
    async fn party_of(
        &self,
        contract: &Contract,
        actor: &AuthContext,
    ) -> Result<Option<ContractParty>, ServiceError> {
        let item = Item::find_by_id(&self.pool, contract.item_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item id {} not found", contract.item_id))
            })?;

        if actor.user_id == item.lender_id {
            Ok(Some(ContractParty::Lender))
        } else if actor.user_id == contract.rentee_id {
            Ok(Some(ContractParty::Rentee))
        } else {
            Ok(None)
        }
    }

    /// Re-derives active and dates for a new flag set and replaces the row
    ///
    /// Length, fee, rentee, and item are carried over unchanged.
    async fn persist_with_flags(
        &self,
        contract: Contract,
        flags: ContractFlags,
    ) -> Result<Contract, ServiceError> {
        let (start_date, end_date) = derive_dates(
            flags,
            contract.start_date,
            contract.end_date,
            contract.length_days,
            Utc::now(),
        );

        let record = ContractRecord {
            length_days: contract.length_days,
            fee: contract.fee,
            active: flags.is_active(),
            flags,
            start_date,
            end_date,
            rentee_id: contract.rentee_id,
            item_id: contract.item_id,
        };

        let stored = Contract::replace(&self.pool, contract.id, record)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Contract id {} not found", contract.id))
            })?;

        info!(
            contract_id = stored.id,
            active = stored.active,
            accepted = stored.flags().is_fully_accepted(),
            "Contract flags updated"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_false() -> ContractFlags {
        ContractFlags::default()
    }

    #[test]
    fn test_lender_patch_only_moves_lender_flags() {
        let patch = ContractPatch {
            lender_accept: Some(true),
            rentee_accept: Some(true),
            rentee_complete: Some(true),
            ..Default::default()
        };

        let merged = merge_party_flags(all_false(), &patch, ContractParty::Lender);
        assert!(merged.lender_accept);
        assert!(!merged.rentee_accept, "rentee flag must survive a lender patch");
        assert!(!merged.rentee_complete);
        assert!(!merged.lender_complete);
    }

    #[test]
    fn test_rentee_patch_only_moves_rentee_flags() {
        let patch = ContractPatch {
            rentee_accept: Some(true),
            lender_accept: Some(true),
            lender_complete: Some(true),
            ..Default::default()
        };

        let merged = merge_party_flags(all_false(), &patch, ContractParty::Rentee);
        assert!(merged.rentee_accept);
        assert!(!merged.lender_accept, "lender flag must survive a rentee patch");
        assert!(!merged.lender_complete);
    }

    #[test]
    fn test_present_false_clears_a_flag() {
        let current = ContractFlags {
            lender_accept: true,
            lender_complete: true,
            ..Default::default()
        };
        let patch = ContractPatch {
            lender_complete: Some(false),
            ..Default::default()
        };

        let merged = merge_party_flags(current, &patch, ContractParty::Lender);
        assert!(merged.lender_accept, "absent field left untouched");
        assert!(!merged.lender_complete, "present false overwrites");
    }

    #[test]
    fn test_absent_fields_leave_flags_untouched() {
        let current = ContractFlags {
            rentee_accept: true,
            rentee_complete: true,
            ..Default::default()
        };

        let merged = merge_party_flags(current, &ContractPatch::default(), ContractParty::Rentee);
        assert_eq!(merged, current);
    }

    #[test]
    fn test_dates_stamped_when_fully_accepted() {
        let flags = ContractFlags {
            rentee_accept: true,
            lender_accept: true,
            ..Default::default()
        };
        let now = Utc::now();

        let (start, end) = derive_dates(flags, None, None, 3, now);
        assert_eq!(start, Some(now));
        assert_eq!(end, Some(now + Duration::days(3)));

        // length=3 -> exactly 259200 seconds apart
        let span = end.unwrap() - start.unwrap();
        assert_eq!(span.num_seconds(), 259_200);
    }

    #[test]
    fn test_no_dates_before_mutual_acceptance() {
        let half_accepted = ContractFlags {
            rentee_accept: true,
            ..Default::default()
        };
        let now = Utc::now();

        assert_eq!(derive_dates(all_false(), None, None, 7, now), (None, None));
        assert_eq!(derive_dates(half_accepted, None, None, 7, now), (None, None));
    }

    #[test]
    fn test_existing_dates_never_retracted_or_restamped() {
        let stamped_start = Utc::now() - Duration::days(2);
        let stamped_end = stamped_start + Duration::days(7);
        let now = Utc::now();

        // Acceptance lapsed: dates stick
        let lapsed = ContractFlags {
            rentee_accept: false,
            lender_accept: true,
            ..Default::default()
        };
        let (start, end) = derive_dates(lapsed, Some(stamped_start), Some(stamped_end), 7, now);
        assert_eq!(start, Some(stamped_start));
        assert_eq!(end, Some(stamped_end));

        // Still accepted: dates are not refreshed to `now`
        let accepted = ContractFlags {
            rentee_accept: true,
            lender_accept: true,
            ..Default::default()
        };
        let (start, end) = derive_dates(accepted, Some(stamped_start), Some(stamped_end), 7, now);
        assert_eq!(start, Some(stamped_start));
        assert_eq!(end, Some(stamped_end));
    }

    #[test]
    fn test_completed_contract_can_reactivate() {
        // Clearing one complete flag flips active back on; no terminal state.
        let completed = ContractFlags {
            rentee_accept: true,
            lender_accept: true,
            rentee_complete: true,
            lender_complete: true,
        };
        assert!(!completed.is_active());

        let patch = ContractPatch {
            rentee_complete: Some(false),
            ..Default::default()
        };
        let reopened = merge_party_flags(completed, &patch, ContractParty::Rentee);
        assert!(reopened.is_active());
    }

    // Store-backed save/update/accept/delete paths are covered by the
    // integration tests in lendit-api/tests/.
}
