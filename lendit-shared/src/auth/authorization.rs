/// Authorization helpers and the pluggable change policy
///
/// Two layers of authorization exist in Lendit:
///
/// 1. **Role gates** at the endpoint level: handlers call [`require_role`] /
///    [`require_any_role`] against the request's [`AuthContext`].
/// 2. **The change policy** inside services: every mutation passes through a
///    single [`ChangePolicy`] seam before field-level party checks run.
///
/// The reference policy, [`AllowAll`], admits every change. A deployment
/// substitutes its own ownership/role policy by injecting a different
/// implementation into the services; no call site changes.
///
/// # Example
///
/// ```
/// use lendit_shared::auth::authorization::{AllowAll, ChangePolicy, Decision, ResourceRef, ResourceKind};
///
/// # async fn example() {
/// let policy = AllowAll;
/// let decision = policy
///     .may_change("cinnamon", ResourceRef { kind: ResourceKind::Contract, key: "4" })
///     .await;
/// assert_eq!(decision, Decision::Allow);
/// # }
/// ```

use async_trait::async_trait;

use super::middleware::AuthContext;
use crate::models::role::RoleName;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User doesn't have a required role
    #[error("Requires the {0} role")]
    MissingRole(RoleName),

    /// User doesn't have any of the required roles
    #[error("Requires one of the roles: {0}")]
    MissingAnyRole(String),
}

/// Outcome of a change-policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The change may proceed
    Allow,

    /// The change is rejected
    Deny,
}

/// Kind of resource a change targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A rental contract
    Contract,

    /// A listed item
    Item,
}

/// Reference to the resource a change targets
#[derive(Debug, Clone, Copy)]
pub struct ResourceRef<'a> {
    /// The kind of resource
    pub kind: ResourceKind,

    /// Stable key of the resource (id or unique name)
    pub key: &'a str,
}

/// Policy deciding whether an actor may mutate a resource
///
/// Services hold an `Arc<dyn ChangePolicy>`; swapping the policy is the single
/// seam for introducing real ownership or administrative checks. The trait is
/// async so an implementation can consult the store.
#[async_trait]
pub trait ChangePolicy: Send + Sync {
    /// Decides whether `actor` may mutate the given resource
    async fn may_change(&self, actor: &str, resource: ResourceRef<'_>) -> Decision;
}

/// Reference policy: admits every change
///
/// Matches the upstream behavior this system was built against. Any real
/// deployment should replace this with an ownership/role policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl ChangePolicy for AllowAll {
    async fn may_change(&self, _actor: &str, _resource: ResourceRef<'_>) -> Decision {
        Decision::Allow
    }
}

/// Requires the auth context to hold a specific role
pub fn require_role(auth: &AuthContext, role: RoleName) -> Result<(), AuthzError> {
    if !auth.has_role(role) {
        return Err(AuthzError::MissingRole(role));
    }
    Ok(())
}

/// Requires the auth context to hold at least one of the given roles
pub fn require_any_role(auth: &AuthContext, roles: &[RoleName]) -> Result<(), AuthzError> {
    if !auth.has_any_role(roles) {
        let names = roles
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AuthzError::MissingAnyRole(names));
    }
    Ok(())
}
